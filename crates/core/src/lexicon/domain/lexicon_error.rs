use std::path::PathBuf;

use thiserror::Error;

use crate::mapping::domain::mapping_error::MappingError;
use crate::shared::external_program::ProcessError;

/// Failures while building pronunciation resources.
///
/// Everything except I/O and process failures is a data-integrity error:
/// an upstream collaborator handed over inconsistent data.
#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("invalid phone set: {reason}")]
    InvalidPhoneSet { reason: String },
    #[error("{phone} is not a proper phoneme (in pronunciation of {word:?})")]
    UnknownPhone { phone: String, word: String },
    #[error("no pronunciation for {word:?} in the dictionary or the G2P output")]
    MissingPronunciation { word: String },
    #[error("symbol {label:?} would be assigned twice")]
    DuplicateSymbol { label: String },
    #[error("word {word:?} in utterance {utterance:?} is not in the word table")]
    UnknownWord { word: String, utterance: String },
    #[error("silence probability must lie strictly between 0 and 1, got {value}")]
    InvalidSilenceProbability { value: f64 },
    #[error("malformed G2P output line: {line:?}")]
    MalformedOracleOutput { line: String },
    #[error("G2P oracle failed: {source}")]
    Oracle {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl LexiconError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
