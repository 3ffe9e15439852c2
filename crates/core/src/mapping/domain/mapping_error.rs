use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("invalid field selector {spec:?}: {reason}")]
    InvalidSelector { spec: String, reason: String },
    #[error("mapping table line {line_number} must have exactly two fields: {line:?}")]
    MalformedTableLine { line_number: usize, line: String },
    #[error("no mapping for {key:?}")]
    LookupMiss { key: String },
    #[error("field {index} out of range for a record of {len} fields")]
    FieldOutOfRange { index: usize, len: usize },
    #[error("record {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: Box<MappingError>,
    },
    #[error("I/O error on {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MappingError {
    /// The innermost error, skipping record-number context.
    pub fn root_cause(&self) -> &MappingError {
        match self {
            MappingError::Record { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
