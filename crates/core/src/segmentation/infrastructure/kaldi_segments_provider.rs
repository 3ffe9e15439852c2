use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::ctm::domain::segment_record::SegmentRecord;
use crate::segmentation::domain::segmentation_provider::{SegmentationError, SegmentationProvider};
use crate::segmentation::domain::transcript_segment::TranscriptSegment;

/// Kaldi-style `segments` (`id recording start end`) plus `text`
/// (`id words...`) files, joined by segment id.
pub struct KaldiSegmentsProvider {
    segments_path: PathBuf,
    text_path: PathBuf,
}

impl KaldiSegmentsProvider {
    pub fn new(segments_path: &Path, text_path: &Path) -> Self {
        Self {
            segments_path: segments_path.to_path_buf(),
            text_path: text_path.to_path_buf(),
        }
    }
}

impl SegmentationProvider for KaldiSegmentsProvider {
    fn segments(&self, _recording_duration: f64) -> Result<Vec<TranscriptSegment>, SegmentationError> {
        let records = read_lines(&self.segments_path)?
            .into_iter()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                SegmentRecord::parse(&line).ok_or(SegmentationError::MalformedSegment {
                    line_number: i + 1,
                    line,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut texts: HashMap<String, String> = read_lines(&self.text_path)?
            .into_iter()
            .filter_map(|line| {
                let line = line.trim();
                let (id, text) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
                (!id.is_empty()).then(|| (id.to_string(), text.trim().to_string()))
            })
            .collect();

        let mut segments = records
            .into_iter()
            .map(|record| {
                let text = texts
                    .remove(&record.id)
                    .ok_or_else(|| SegmentationError::MissingText {
                        id: record.id.clone(),
                    })?;
                Ok(TranscriptSegment {
                    id: record.id,
                    recording: record.recording,
                    text,
                    start: record.start,
                    end: record.end,
                })
            })
            .collect::<Result<Vec<_>, SegmentationError>>()?;

        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        log::info!("Found {} segments", segments.len());
        Ok(segments)
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, SegmentationError> {
    let io_error = |e| SegmentationError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    let file = File::open(path).map_err(io_error)?;
    BufReader::new(file)
        .lines()
        .collect::<Result<_, _>>()
        .map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn provider(segments: &str, text: &str) -> (tempfile::TempDir, KaldiSegmentsProvider) {
        let dir = tempfile::tempdir().unwrap();
        let s = dir.path().join("segments");
        let t = dir.path().join("text");
        fs::write(&s, segments).unwrap();
        fs::write(&t, text).unwrap();
        let p = KaldiSegmentsProvider::new(&s, &t);
        (dir, p)
    }

    #[test]
    fn test_joins_and_sorts_by_start() {
        let (_dir, p) = provider(
            "seg_001 input 2.00 3.50\nseg_000 input 0.00 2.00\n",
            "seg_000 ala ma kota\nseg_001 kot ma ale\n",
        );
        let segments = p.segments(10.0).unwrap();
        let ids: Vec<&str> = segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["seg_000", "seg_001"]);
        assert_eq!(segments[0].text, "ala ma kota");
        assert_eq!(segments[1].end, 3.5);
    }

    #[test]
    fn test_segment_without_text_is_an_error() {
        let (_dir, p) = provider("seg_000 input 0 1\n", "seg_999 x\n");
        assert!(matches!(
            p.segments(1.0),
            Err(SegmentationError::MissingText { ref id }) if id == "seg_000"
        ));
    }

    #[test]
    fn test_malformed_segment_line() {
        let (_dir, p) = provider("\nseg_000 input zero 1\n", "seg_000 x\n");
        assert!(matches!(
            p.segments(1.0),
            Err(SegmentationError::MalformedSegment { line_number: 2, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let p = KaldiSegmentsProvider::new(Path::new("/nonexistent/segments"), Path::new("t"));
        assert!(matches!(p.segments(1.0), Err(SegmentationError::Io { .. })));
    }
}
