use serde::{Deserialize, Serialize};

use crate::composer::WorkspaceConfig;
use crate::plan::{BurnInStyle, EncodingConfig};
use crate::supervisor::ToolConfig;

/// Root configuration
///
/// Every section has defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub burn_in: BurnInStyle,
}
