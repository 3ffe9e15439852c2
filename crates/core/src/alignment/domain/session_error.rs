use std::path::PathBuf;

use thiserror::Error;

use crate::shared::external_program::ProcessError;

use super::session_state::SessionState;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("aligner sent {token:?} instead of its readiness token")]
    NotReady { token: String },
    #[error("malformed aligner header: {line:?}")]
    MalformedHeader { line: String },
    #[error("malformed aligner result line (expected tag {expected}): {line:?}")]
    MalformedResultLine { expected: char, line: String },
    #[error("aligner output ended while {state}")]
    UnexpectedEof { state: SessionState },
    #[error("session is {state} and cannot accept requests")]
    Unusable { state: SessionState },
    #[error("{what} of {len} does not fit a 32-bit frame length")]
    FrameTooLarge { what: &'static str, len: usize },
    #[error("aligner resource {} does not exist", .path.display())]
    MissingResource { path: PathBuf },
    #[error("aligner I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Process(#[from] ProcessError),
}
