use std::io::{self, Write};

use crate::shared::constants::READY_TOKEN;

use super::alignment_result::TimedLabel;
use super::session_error::SessionError;

/// One framed request: PCM samples plus the transcript to align them to.
///
/// Wire layout, little-endian: `i32 count | i16 x count | i32 0 | i32 len |
/// len bytes of UTF-8`.
#[derive(Debug, Clone, Copy)]
pub struct SegmentRequest<'a> {
    pub samples: &'a [i16],
    pub transcript: &'a str,
}

impl<'a> SegmentRequest<'a> {
    pub fn new(samples: &'a [i16], transcript: &'a str) -> Self {
        Self {
            samples,
            transcript,
        }
    }

    pub fn encoded_len(&self) -> usize {
        4 + self.samples.len() * 2 + 4 + 4 + self.transcript.len()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), SessionError> {
        let count = frame_len("sample count", self.samples.len())?;
        let text_len = frame_len("transcript length", self.transcript.len())?;

        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&count.to_le_bytes());
        for sample in self.samples {
            buf.extend_from_slice(&sample.to_le_bytes());
        }
        buf.extend_from_slice(&0i32.to_le_bytes());
        buf.extend_from_slice(&text_len.to_le_bytes());
        buf.extend_from_slice(self.transcript.as_bytes());

        writer.write_all(&buf)?;
        Ok(())
    }
}

fn frame_len(what: &'static str, len: usize) -> Result<i32, SessionError> {
    i32::try_from(len).map_err(|_| SessionError::FrameTooLarge { what, len })
}

/// Two zero frames tell the aligner no more segments follow.
pub fn write_end_of_stream<W: Write>(writer: &mut W) -> io::Result<()> {
    writer.write_all(&0i32.to_le_bytes())?;
    writer.write_all(&0i32.to_le_bytes())
}

pub fn check_ready(line: &str) -> Result<(), SessionError> {
    let token = line.trim();
    if token == READY_TOKEN {
        Ok(())
    } else {
        Err(SessionError::NotReady {
            token: token.to_string(),
        })
    }
}

/// `NW <n>` or `NW <n> NP <m>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub words: usize,
    pub phones: usize,
}

impl ResponseHeader {
    pub fn parse(line: &str) -> Result<Self, SessionError> {
        let malformed = || SessionError::MalformedHeader {
            line: line.trim_end().to_string(),
        };
        let count = |s: &str| s.parse::<usize>().map_err(|_| malformed());

        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["NW", words] => Ok(Self {
                words: count(*words)?,
                phones: 0,
            }),
            ["NW", words, "NP", phones] => Ok(Self {
                words: count(*words)?,
                phones: count(*phones)?,
            }),
            _ => Err(malformed()),
        }
    }
}

/// Which result list a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTag {
    Word,
    Phone,
}

impl ResultTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultTag::Word => "W",
            ResultTag::Phone => "P",
        }
    }

    fn as_char(&self) -> char {
        match self {
            ResultTag::Word => 'W',
            ResultTag::Phone => 'P',
        }
    }
}

/// `<tag> <label> <start> <duration>`.
pub fn parse_result_line(line: &str, tag: ResultTag) -> Result<TimedLabel, SessionError> {
    let malformed = || SessionError::MalformedResultLine {
        expected: tag.as_char(),
        line: line.trim_end().to_string(),
    };
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [found, label, start, duration] = tokens.as_slice() else {
        return Err(malformed());
    };
    if *found != tag.as_str() {
        return Err(malformed());
    }
    let start: f64 = start.parse().map_err(|_| malformed())?;
    let duration: f64 = duration.parse().map_err(|_| malformed())?;
    Ok(TimedLabel::new(*label, start, duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_request_layout() {
        let samples = [1i16, -2];
        let mut buf = Vec::new();
        SegmentRequest::new(&samples, "ał").write_to(&mut buf).unwrap();
        assert_eq!(
            buf,
            [
                2, 0, 0, 0, // sample count
                1, 0, 0xfe, 0xff, // samples
                0, 0, 0, 0, // terminator
                3, 0, 0, 0, // byte length of "ał"
                b'a', 0xc5, 0x82,
            ]
        );
        assert_eq!(buf.len(), SegmentRequest::new(&samples, "ał").encoded_len());
    }

    #[test]
    fn test_end_of_stream_is_two_zero_frames() {
        let mut buf = Vec::new();
        write_end_of_stream(&mut buf).unwrap();
        assert_eq!(buf, [0u8; 8]);
    }

    #[rstest]
    #[case("RDY\n", true)]
    #[case("RDY", true)]
    #[case("READY\n", false)]
    #[case("\n", false)]
    fn test_check_ready(#[case] line: &str, #[case] ok: bool) {
        assert_eq!(check_ready(line).is_ok(), ok);
    }

    #[rstest]
    #[case("NW 3\n", 3, 0)]
    #[case("NW 2 NP 7", 2, 7)]
    #[case("NW 0 NP 0", 0, 0)]
    fn test_header_parses(#[case] line: &str, #[case] words: usize, #[case] phones: usize) {
        assert_eq!(
            ResponseHeader::parse(line).unwrap(),
            ResponseHeader { words, phones }
        );
    }

    #[rstest]
    #[case("")]
    #[case("NW")]
    #[case("NW -1")]
    #[case("NW 1 NP")]
    #[case("NP 1 NW 2")]
    #[case("NW x")]
    #[case("W hello 0.00 1.00")]
    fn test_header_rejects(#[case] line: &str) {
        assert!(matches!(
            ResponseHeader::parse(line),
            Err(SessionError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_result_line() {
        let label = parse_result_line("W hello 0.00 1.00\n", ResultTag::Word).unwrap();
        assert_eq!(label.label, "hello");
        assert_relative_eq!(label.start, 0.0);
        assert_relative_eq!(label.duration, 1.0);
    }

    #[rstest]
    #[case("P a_B 0.1 0.2", ResultTag::Word)]
    #[case("W hello 0.0", ResultTag::Word)]
    #[case("W hello x 1.0", ResultTag::Word)]
    #[case("P a_B 0.1 0.2 extra", ResultTag::Phone)]
    fn test_result_line_rejects(#[case] line: &str, #[case] tag: ResultTag) {
        assert!(matches!(
            parse_result_line(line, tag),
            Err(SessionError::MalformedResultLine { .. })
        ));
    }
}
