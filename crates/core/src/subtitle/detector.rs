//! Byte-level charset detection.

use chardetng::EncodingDetector;

/// Guesses the character encoding of raw text bytes.
pub trait CharsetDetector: Send + Sync {
    /// Returns the name of this detector implementation.
    fn name(&self) -> &str;

    /// Returns a best-guess WHATWG encoding label, or `None` when no guess
    /// can be made.
    fn detect(&self, bytes: &[u8]) -> Option<String>;
}

/// Detector backed by `chardetng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChardetngDetector;

impl CharsetDetector for ChardetngDetector {
    fn name(&self) -> &str {
        "chardetng"
    }

    fn detect(&self, bytes: &[u8]) -> Option<String> {
        if bytes.is_empty() {
            return None;
        }

        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        Some(detector.guess(None, true).name().to_string())
    }
}
