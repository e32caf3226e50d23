//! Testing utilities and mock implementations.
//!
//! Lets the composition pipeline be exercised without an ffmpeg binary.

mod mock_runner;

pub use mock_runner::{MockRunner, RecordedRun};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::plan::InputSet;

    /// A short SubRip document.
    pub const SAMPLE_SRT: &str = "1\n00:00:01,000 --> 00:00:03,000\nHello there\n\n2\n00:00:04,000 --> 00:00:06,000\nGeneral Kenobi\n";

    /// Writes placeholder input files into `dir` and returns the matching set.
    ///
    /// The files only need to exist; their content is never decoded as media.
    pub fn input_set(dir: &Path, audio: bool, subtitle: bool) -> InputSet {
        let video = dir.join("input-video.mp4");
        std::fs::write(&video, b"video").expect("Failed to write video fixture");
        let mut inputs = InputSet::new(video);

        if audio {
            let path = dir.join("input-audio.wav");
            std::fs::write(&path, b"audio").expect("Failed to write audio fixture");
            inputs = inputs.with_audio(path);
        }

        if subtitle {
            let path = dir.join("input-subtitle.srt");
            std::fs::write(&path, SAMPLE_SRT).expect("Failed to write subtitle fixture");
            inputs = inputs.with_subtitle(path);
        }

        inputs
    }
}
