//! Configuration for the composer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where request-scoped artifacts are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root for per-request scratch directories (normalized subtitles).
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Root for per-request output directories.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Keep the scratch directory after the request finishes.
    #[serde(default)]
    pub keep_temp: bool,
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("media-composer").join("work")
}

fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join("media-composer").join("output")
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            output_dir: default_output_dir(),
            keep_temp: false,
        }
    }
}

impl WorkspaceConfig {
    /// Puts both roots under `root`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            temp_dir: root.join("work"),
            output_dir: root.join("output"),
            keep_temp: false,
        }
    }
}
