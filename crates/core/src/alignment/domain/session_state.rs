use std::fmt;

/// Lifecycle of a streaming alignment session.
///
/// `Desynchronized` and `Closed` are terminal; a session in either state
/// refuses further requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Ready,
    Sending,
    AwaitingHeader,
    ReadingWords,
    ReadingPhones,
    Desynchronized,
    Closing,
    Closed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Desynchronized | SessionState::Closed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Starting => "starting",
            SessionState::Ready => "ready",
            SessionState::Sending => "sending",
            SessionState::AwaitingHeader => "awaiting header",
            SessionState::ReadingWords => "reading words",
            SessionState::ReadingPhones => "reading phones",
            SessionState::Desynchronized => "desynchronized",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}
