use std::path::{Path, PathBuf};

use thiserror::Error;

use super::audio_segment::AudioSegment;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("unsupported audio format in {}: expected {expected}, found {actual}", .path.display())]
    FormatMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
    #[error("failed to decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },
}

/// Domain interface for loading a whole recording.
pub trait AudioSource: Send {
    fn read(&self, path: &Path) -> Result<AudioSegment, AudioError>;
}
