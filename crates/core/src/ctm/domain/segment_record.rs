use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::ctm_error::CtmError;

/// One segment of a recording, times in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    pub id: String,
    pub recording: String,
    pub start: f64,
    pub end: f64,
}

impl SegmentRecord {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Parse `id recording start end`.
    pub fn parse(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [id, recording, start, end] = tokens.as_slice() else {
            return None;
        };
        Some(Self {
            id: id.to_string(),
            recording: recording.to_string(),
            start: start.parse().ok()?,
            end: end.parse().ok()?,
        })
    }
}

/// Read-only lookup of segments by id.
#[derive(Debug, Clone, Default)]
pub struct SegmentRegistry {
    segments: HashMap<String, SegmentRecord>,
}

impl SegmentRegistry {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = SegmentRecord>,
    {
        Self {
            segments: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Kaldi `segments` format. Blank lines are ignored.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, CtmError> {
        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = SegmentRecord::parse(&line).ok_or_else(|| CtmError::MalformedSegment {
                line_number: i + 1,
                line: line.clone(),
            })?;
            records.push(record);
        }
        Ok(Self::from_records(records))
    }

    pub fn load(path: &Path) -> Result<Self, CtmError> {
        let file = File::open(path).map_err(|e| CtmError::file(path, e))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn get(&self, id: &str) -> Option<&SegmentRecord> {
        self.segments.get(id)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    #[test]
    fn test_parses_segments_file() {
        let registry =
            SegmentRegistry::from_reader(Cursor::new("seg_000 input 1.23 4.56\n\nseg_001 input 4.56 7.00\n"))
                .unwrap();
        assert_eq!(registry.len(), 2);
        let seg = registry.get("seg_001").unwrap();
        assert_eq!(seg.recording, "input");
        assert_relative_eq!(seg.duration(), 2.44, epsilon = 1e-9);
    }

    #[test]
    fn test_wrong_field_count_is_rejected() {
        let err = SegmentRegistry::from_reader(Cursor::new("seg_000 input 1.23\n")).unwrap_err();
        assert!(matches!(err, CtmError::MalformedSegment { line_number: 1, .. }));
    }

    #[test]
    fn test_non_numeric_time_is_rejected() {
        assert!(SegmentRecord::parse("a b c d").is_none());
    }
}
