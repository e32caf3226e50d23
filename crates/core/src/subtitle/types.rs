//! Types for the subtitle module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A subtitle file prepared for burn-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSubtitle {
    /// The subtitle file as supplied by the caller.
    pub source_path: PathBuf,
    /// Detected encoding label, or `unknown` when detection never ran.
    pub encoding: String,
    /// UTF-8 copy of the subtitle, or `source_path` when normalization failed.
    pub utf8_path: PathBuf,
}

impl NormalizedSubtitle {
    /// A result that points burn-in at the original file.
    pub fn passthrough(source_path: &Path, encoding: impl Into<String>) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            encoding: encoding.into(),
            utf8_path: source_path.to_path_buf(),
        }
    }

    /// Whether a UTF-8 copy was written.
    pub fn was_converted(&self) -> bool {
        self.utf8_path != self.source_path
    }
}
