use std::io::{BufRead, Write};

use super::alignment_result::AlignmentResult;
use super::alignment_session::AlignmentSession;
use super::session_error::SessionError;

/// Domain interface for anything that aligns one segment at a time.
pub trait SegmentAligner: Send {
    fn align(&mut self, samples: &[i16], transcript: &str) -> Result<AlignmentResult, SessionError>;

    /// End the stream and release the backend.
    fn finish(self: Box<Self>) -> Result<(), SessionError>;
}

impl<W, R> SegmentAligner for AlignmentSession<W, R>
where
    W: Write + Send,
    R: BufRead + Send,
{
    fn align(&mut self, samples: &[i16], transcript: &str) -> Result<AlignmentResult, SessionError> {
        self.process_segment(samples, transcript)
    }

    fn finish(self: Box<Self>) -> Result<(), SessionError> {
        (*self).close()
    }
}
