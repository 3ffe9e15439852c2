/// A label with segment-relative timing in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedLabel {
    pub label: String,
    pub start: f64,
    pub duration: f64,
}

impl TimedLabel {
    pub fn new(label: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            label: label.into(),
            start,
            duration,
        }
    }
}

/// Aligner output for one segment, both lists in aligner order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentResult {
    pub words: Vec<TimedLabel>,
    pub phones: Vec<TimedLabel>,
}

impl AlignmentResult {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.phones.is_empty()
    }
}
