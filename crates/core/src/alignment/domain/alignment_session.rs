use std::io::{BufRead, Write};

use super::alignment_result::AlignmentResult;
use super::protocol::{
    check_ready, parse_result_line, write_end_of_stream, ResponseHeader, ResultTag, SegmentRequest,
};
use super::session_error::SessionError;
use super::session_state::SessionState;

/// Request/response state machine over a long-lived aligner's pipes.
///
/// At most one request is outstanding. Any protocol failure moves the session
/// to `Desynchronized` for good; it is never repaired.
pub struct AlignmentSession<W: Write, R: BufRead> {
    writer: W,
    reader: R,
    state: SessionState,
}

impl<W: Write, R: BufRead> AlignmentSession<W, R> {
    /// Blocks until the aligner announces readiness.
    pub fn start(writer: W, reader: R) -> Result<Self, SessionError> {
        let mut session = Self {
            writer,
            reader,
            state: SessionState::Starting,
        };
        let line = session.read_line()?;
        check_ready(&line)?;
        session.state = SessionState::Ready;
        log::debug!("Aligner is ready");
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Send one segment and block until its full result has been read.
    pub fn process_segment(
        &mut self,
        samples: &[i16],
        transcript: &str,
    ) -> Result<AlignmentResult, SessionError> {
        if self.state != SessionState::Ready {
            return Err(SessionError::Unusable { state: self.state });
        }
        match self.exchange(SegmentRequest::new(samples, transcript)) {
            Ok(result) => {
                self.state = SessionState::Ready;
                Ok(result)
            }
            Err(e) => {
                log::error!("Alignment session failed while {}: {e}", self.state);
                self.state = SessionState::Desynchronized;
                Err(e)
            }
        }
    }

    fn exchange(&mut self, request: SegmentRequest<'_>) -> Result<AlignmentResult, SessionError> {
        self.state = SessionState::Sending;
        request.write_to(&mut self.writer)?;
        self.writer.flush()?;

        self.state = SessionState::AwaitingHeader;
        let header = ResponseHeader::parse(&self.read_line()?)?;

        self.state = SessionState::ReadingWords;
        let mut result = AlignmentResult::default();
        for _ in 0..header.words {
            let line = self.read_line()?;
            result.words.push(parse_result_line(&line, ResultTag::Word)?);
        }

        self.state = SessionState::ReadingPhones;
        for _ in 0..header.phones {
            let line = self.read_line()?;
            result.phones.push(parse_result_line(&line, ResultTag::Phone)?);
        }
        Ok(result)
    }

    fn read_line(&mut self) -> Result<String, SessionError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(SessionError::UnexpectedEof { state: self.state });
        }
        Ok(line)
    }

    /// Signal end of stream and release both channels. Does not wait for the
    /// aligner to exit.
    pub fn close(mut self) -> Result<(), SessionError> {
        let result = if self.state == SessionState::Ready {
            self.state = SessionState::Closing;
            write_end_of_stream(&mut self.writer)
                .and_then(|()| self.writer.flush())
                .map_err(SessionError::from)
        } else {
            log::warn!("Closing alignment session while {}", self.state);
            Ok(())
        };
        self.state = SessionState::Closed;
        result
    }
}
