pub mod alignment_result;
pub mod alignment_session;
pub mod batch_aligner;
pub mod protocol;
pub mod segment_aligner;
pub mod session_error;
pub mod session_state;
