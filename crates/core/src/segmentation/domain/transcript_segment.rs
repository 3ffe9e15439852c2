use crate::ctm::domain::segment_record::SegmentRecord;

/// A stretch of a recording together with what is said in it.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub id: String,
    pub recording: String,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl TranscriptSegment {
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }

    pub fn to_segment_record(&self) -> SegmentRecord {
        SegmentRecord {
            id: self.id.clone(),
            recording: self.recording.clone(),
            start: self.start,
            end: self.end,
        }
    }
}
