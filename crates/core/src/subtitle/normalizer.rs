//! Re-encodes subtitle files to UTF-8 before burn-in.

use encoding_rs::{Encoding, UTF_8};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::detector::{CharsetDetector, ChardetngDetector};
use super::types::NormalizedSubtitle;

/// File name of the UTF-8 copy inside the request work directory.
pub const NORMALIZED_FILE_NAME: &str = "subtitle.utf8.srt";

/// Encoding label reported when the source could not even be read.
pub const UNKNOWN_ENCODING: &str = "unknown";

#[derive(Debug, Error)]
enum NormalizeError {
    #[error("failed to read subtitle: {0}")]
    Read(#[source] std::io::Error),

    #[error("detector returned unrecognised encoding label {0:?}")]
    UnknownLabel(String),

    #[error("subtitle is not valid {0}")]
    Malformed(&'static str),

    #[error("failed to write UTF-8 copy: {0}")]
    Write(#[source] std::io::Error),
}

/// Produces UTF-8 copies of subtitle files.
///
/// Normalization never fails the request: any error is logged as a warning
/// and the original file is used for burn-in as is.
#[derive(Clone)]
pub struct SubtitleNormalizer {
    detector: Arc<dyn CharsetDetector>,
}

impl Default for SubtitleNormalizer {
    fn default() -> Self {
        Self::new(ChardetngDetector)
    }
}

impl std::fmt::Debug for SubtitleNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubtitleNormalizer")
            .field("detector", &self.detector.name())
            .finish()
    }
}

impl SubtitleNormalizer {
    pub fn new(detector: impl CharsetDetector + 'static) -> Self {
        Self {
            detector: Arc::new(detector),
        }
    }

    /// Normalizes `source` into `work_dir`.
    pub async fn normalize(&self, source: &Path, work_dir: &Path) -> NormalizedSubtitle {
        let bytes = match tokio::fs::read(source).await {
            Ok(bytes) => bytes,
            Err(e) => return degrade(source, UNKNOWN_ENCODING, NormalizeError::Read(e)),
        };

        let label = self.detector.detect(&bytes);
        let encoding = match label.as_deref() {
            Some(label) => match Encoding::for_label(label.as_bytes()) {
                Some(encoding) => encoding,
                None => {
                    return degrade(
                        source,
                        label,
                        NormalizeError::UnknownLabel(label.to_string()),
                    )
                }
            },
            None => UTF_8,
        };

        let (text, encoding) = match decode(&bytes, encoding) {
            Ok(decoded) => decoded,
            Err(e) => return degrade(source, encoding.name(), e),
        };

        match write_utf8(work_dir, &text).await {
            Ok(utf8_path) => {
                debug!(
                    source = %source.display(),
                    encoding = encoding.name(),
                    detector = self.detector.name(),
                    "Normalized subtitle to UTF-8"
                );
                NormalizedSubtitle {
                    source_path: source.to_path_buf(),
                    encoding: encoding.name().to_string(),
                    utf8_path,
                }
            }
            Err(e) => degrade(source, encoding.name(), e),
        }
    }
}

/// Decodes strictly; a byte order mark overrides the detected encoding.
fn decode(
    bytes: &[u8],
    detected: &'static Encoding,
) -> Result<(String, &'static Encoding), NormalizeError> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (detected, bytes),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| (text.into_owned(), encoding))
        .ok_or(NormalizeError::Malformed(encoding.name()))
}

async fn write_utf8(work_dir: &Path, text: &str) -> Result<PathBuf, NormalizeError> {
    tokio::fs::create_dir_all(work_dir)
        .await
        .map_err(NormalizeError::Write)?;

    let path = work_dir.join(NORMALIZED_FILE_NAME);
    tokio::fs::write(&path, text.as_bytes())
        .await
        .map_err(NormalizeError::Write)?;
    Ok(path)
}

fn degrade(source: &Path, encoding: &str, error: NormalizeError) -> NormalizedSubtitle {
    warn!(
        source = %source.display(),
        error = %error,
        "Subtitle normalization failed, burning in the original file"
    );
    NormalizedSubtitle::passthrough(source, encoding)
}
