use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::segmentation::domain::segmentation_provider::{SegmentationError, SegmentationProvider};
use crate::segmentation::domain::transcript_segment::TranscriptSegment;
use crate::shared::constants::DEFAULT_RECORDING;

/// The first line of a plain text file, spanning the whole recording.
pub struct SingleUtteranceProvider {
    text_path: PathBuf,
}

impl SingleUtteranceProvider {
    pub fn new(text_path: &Path) -> Self {
        Self {
            text_path: text_path.to_path_buf(),
        }
    }
}

impl SegmentationProvider for SingleUtteranceProvider {
    fn segments(&self, recording_duration: f64) -> Result<Vec<TranscriptSegment>, SegmentationError> {
        let io_error = |e| SegmentationError::Io {
            path: self.text_path.clone(),
            source: e,
        };
        let file = File::open(&self.text_path).map_err(io_error)?;
        let mut first = String::new();
        BufReader::new(file).read_line(&mut first).map_err(io_error)?;

        let text = first.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            return Err(SegmentationError::EmptyTranscript {
                path: self.text_path.clone(),
            });
        }
        Ok(vec![TranscriptSegment {
            id: DEFAULT_RECORDING.to_string(),
            recording: DEFAULT_RECORDING.to_string(),
            text,
            start: 0.0,
            end: recording_duration,
        }])
    }
}
