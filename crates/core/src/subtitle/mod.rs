//! Subtitle encoding normalization.
//!
//! Subtitle files arrive in whatever encoding the author's editor used. Burn-in
//! reads them as UTF-8, so each subtitle is sniffed with a [`CharsetDetector`]
//! and rewritten as a UTF-8 copy in the request work directory. When anything
//! goes wrong the original file is used instead and a warning is logged.

mod detector;
mod normalizer;
mod types;

pub use detector::{ChardetngDetector, CharsetDetector};
pub use normalizer::{SubtitleNormalizer, NORMALIZED_FILE_NAME, UNKNOWN_ENCODING};
pub use types::NormalizedSubtitle;
