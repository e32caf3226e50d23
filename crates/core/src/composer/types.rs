//! Types for the composer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::plan::{CompositionMode, InputSet, OutputFormat};
use crate::supervisor::ExecutionResult;

/// One composition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeRequest {
    /// Request id, used to scope every path the request writes.
    pub id: Uuid,
    pub inputs: InputSet,
    #[serde(default)]
    pub format: OutputFormat,
}

impl ComposeRequest {
    /// Creates a request with a fresh id.
    pub fn new(inputs: InputSet, format: OutputFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            inputs,
            format,
        }
    }

    /// Overrides the generated id.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// Result of a successful composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeOutput {
    pub request_id: Uuid,
    pub output_path: PathBuf,
    pub mode: CompositionMode,
    /// Encoding detected for the subtitle, when one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_encoding: Option<String>,
    pub result: ExecutionResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_get_distinct_ids() {
        let a = ComposeRequest::new(InputSet::new("/in/a.mp4"), OutputFormat::Mp4);
        let b = ComposeRequest::new(InputSet::new("/in/a.mp4"), OutputFormat::Mp4);
        assert_ne!(a.id, b.id);

        let fixed = Uuid::nil();
        assert_eq!(a.with_id(fixed).id, fixed);
    }
}
