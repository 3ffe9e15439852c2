use std::collections::HashMap;

use super::lexicon_error::LexiconError;

/// N-best phone sequences per word, best first.
pub type G2pPredictions = HashMap<String, Vec<Vec<String>>>;

/// Domain interface for grapheme-to-phoneme prediction.
///
/// Implementations must be deterministic for a given model; callers never
/// retry a failed prediction.
pub trait G2pOracle: Send {
    fn predict(&self, words: &[String]) -> Result<G2pPredictions, LexiconError>;
}
