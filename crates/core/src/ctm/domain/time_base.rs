use std::io::{BufRead, Write};

use super::ctm_error::CtmError;
use super::ctm_record::CtmRecord;
use super::segment_record::SegmentRegistry;

/// Nearest centisecond, judged on the exact binary value; exact ties go to
/// the even digit.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Moves segment-relative CTM timings onto the recording's time axis.
pub struct TimeBaseReconstructor<'a> {
    registry: &'a SegmentRegistry,
}

impl<'a> TimeBaseReconstructor<'a> {
    pub fn new(registry: &'a SegmentRegistry) -> Self {
        Self { registry }
    }

    /// Swap the segment id for its recording and shift `start` by the
    /// segment offset. Both times are rounded to centiseconds.
    pub fn rebase(&self, record: &CtmRecord) -> Result<CtmRecord, CtmError> {
        let segment = self
            .registry
            .get(&record.id)
            .ok_or_else(|| CtmError::UnknownSegment {
                id: record.id.clone(),
            })?;
        Ok(CtmRecord {
            id: segment.recording.clone(),
            channel: record.channel.clone(),
            start: round2(record.start + segment.start),
            duration: round2(record.duration),
            label: record.label.clone(),
        })
    }

    /// Rebase text lines in order; blank lines are skipped.
    pub fn rebase_lines<'b, I>(&'b self, lines: I) -> impl Iterator<Item = Result<String, CtmError>> + 'b
    where
        I: IntoIterator<Item = std::io::Result<String>>,
        I::IntoIter: 'b,
    {
        lines
            .into_iter()
            .enumerate()
            .filter_map(move |(i, line)| -> Option<Result<String, CtmError>> {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => return Some(Err(e.into())),
                };
                if line.trim().is_empty() {
                    return None;
                }
                let result = CtmRecord::parse(&line)
                    .ok_or_else(|| CtmError::MalformedRecord {
                        line_number: i + 1,
                        line: line.clone(),
                    })
                    .and_then(|record| self.rebase(&record))
                    .map(|record| record.to_string());
                Some(result)
            })
    }

    pub fn rebase_stream<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut writer: W,
    ) -> Result<usize, CtmError> {
        let mut count = 0;
        for line in self.rebase_lines(reader.lines()) {
            writeln!(writer, "{}", line?)?;
            count += 1;
        }
        writer.flush()?;
        log::debug!("Rebased {count} CTM lines");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctm::domain::segment_record::SegmentRecord;
    use rstest::rstest;
    use std::io::Cursor;

    fn registry() -> SegmentRegistry {
        SegmentRegistry::from_records([
            SegmentRecord {
                id: "seg_000".into(),
                recording: "input".into(),
                start: 1.23,
                end: 4.56,
            },
            SegmentRecord {
                id: "seg_001".into(),
                recording: "input".into(),
                start: 4.56,
                end: 9.0,
            },
        ])
    }

    #[test]
    fn test_shifts_start_and_renames_recording() {
        let registry = registry();
        let reconstructor = TimeBaseReconstructor::new(&registry);
        let mut out = Vec::new();
        reconstructor
            .rebase_stream(Cursor::new("seg_000 1 0.10 0.20 w\n"), &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "input 1 1.33 0.20 w\n");
    }

    #[test]
    fn test_preserves_order_across_segments() {
        let registry = registry();
        let reconstructor = TimeBaseReconstructor::new(&registry);
        let mut out = Vec::new();
        let n = reconstructor
            .rebase_stream(
                Cursor::new("seg_001 1 0.00 0.50 b\n\nseg_000 1 0.00 0.30\n"),
                &mut out,
            )
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "input 1 4.56 0.50 b\ninput 1 1.23 0.30\n"
        );
    }

    #[test]
    fn test_unknown_segment_is_fatal() {
        let registry = registry();
        let reconstructor = TimeBaseReconstructor::new(&registry);
        let err = reconstructor
            .rebase_stream(Cursor::new("seg_999 1 0.00 0.50 b\n"), Vec::new())
            .unwrap_err();
        assert!(matches!(err, CtmError::UnknownSegment { ref id } if id == "seg_999"));
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let registry = registry();
        let reconstructor = TimeBaseReconstructor::new(&registry);
        let err = reconstructor
            .rebase_stream(Cursor::new("seg_000 1 0.1 0.1\nseg_000 1\n"), Vec::new())
            .unwrap_err();
        assert!(matches!(err, CtmError::MalformedRecord { line_number: 2, .. }));
    }

    #[rstest]
    #[case(1.234, 1.23)]
    #[case(1.236, 1.24)]
    #[case(0.0, 0.0)]
    #[case(0.125, 0.12)]
    #[case(0.375, 0.38)]
    #[case(-0.125, -0.12)]
    #[case(2.675, 2.67)]
    #[case(1.005, 1.0)]
    #[case(4.5 + 0.25, 4.75)]
    fn test_round2(#[case] input: f64, #[case] expected: f64) {
        approx::assert_relative_eq!(round2(input), expected);
    }
}
