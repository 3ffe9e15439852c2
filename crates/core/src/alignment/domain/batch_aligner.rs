use std::path::{Path, PathBuf};

use crate::segmentation::domain::transcript_segment::TranscriptSegment;

use super::session_error::SessionError;

/// Integer CTM files left behind by one batch run: symbol ids in the label
/// column, times relative to each segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtmFiles {
    pub words: PathBuf,
    pub phones: PathBuf,
}

/// Domain interface for aligners that process a whole recording in one
/// run instead of one segment at a time.
pub trait BatchAligner: Send {
    /// Segment ids must match the utterance ids of the prepared
    /// transcription.
    fn align(&self, audio: &Path, segments: &[TranscriptSegment]) -> Result<CtmFiles, SessionError>;
}
