use std::path::PathBuf;

use thiserror::Error;

use crate::ctm::domain::segment_record::SegmentRegistry;
use crate::lexicon::domain::transcription::Transcription;

use super::transcript_segment::TranscriptSegment;

#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("malformed segment line {line_number}: {line:?}")]
    MalformedSegment { line_number: usize, line: String },
    #[error("segment {id:?} has no transcript")]
    MissingText { id: String },
    #[error("no transcript in {}", .path.display())]
    EmptyTranscript { path: PathBuf },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of the segments a recording is aligned in.
pub trait SegmentationProvider: Send {
    /// Segments ordered by start time. `recording_duration` bounds segments
    /// that run to the end of the recording.
    fn segments(&self, recording_duration: f64) -> Result<Vec<TranscriptSegment>, SegmentationError>;
}

pub fn segment_registry(segments: &[TranscriptSegment]) -> SegmentRegistry {
    SegmentRegistry::from_records(segments.iter().map(TranscriptSegment::to_segment_record))
}

/// One utterance per segment, for lexicon compilation.
pub fn transcription(segments: &[TranscriptSegment]) -> Transcription {
    let mut transcription = Transcription::new();
    for segment in segments {
        transcription.insert(&segment.id, segment.words().map(String::from).collect());
    }
    transcription
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: &str, text: &str, start: f64, end: f64) -> TranscriptSegment {
        TranscriptSegment {
            id: id.into(),
            recording: "input".into(),
            text: text.into(),
            start,
            end,
        }
    }

    #[test]
    fn test_registry_and_transcription_follow_segments() {
        let segments = [segment("s0", "ala ma", 0.0, 1.0), segment("s1", "kota  ma", 1.0, 2.5)];
        let registry = segment_registry(&segments);
        assert_eq!(registry.get("s1").unwrap().start, 1.0);

        let t = transcription(&segments);
        assert_eq!(t.word_list(), ["ala", "kota", "ma"]);
        assert_eq!(t.utterances()[1].1, ["kota", "ma"]);
    }
}
