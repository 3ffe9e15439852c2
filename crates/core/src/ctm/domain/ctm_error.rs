use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CtmError {
    #[error("malformed segment line {line_number}: {line:?}")]
    MalformedSegment { line_number: usize, line: String },
    #[error("malformed CTM line {line_number}: {line:?}")]
    MalformedRecord { line_number: usize, line: String },
    #[error("segment {id:?} is not in the segment registry")]
    UnknownSegment { id: String },
    #[error("malformed phone map line {line_number}: {line:?}")]
    MalformedPhoneMap { line_number: usize, line: String },
    #[error("I/O error on {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CtmError {
    pub(crate) fn file(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::File {
            path: path.to_path_buf(),
            source,
        }
    }
}
