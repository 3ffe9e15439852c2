use std::path::Path;

use super::lexicon_error::LexiconError;
use super::lexicon_fst::LexiconFst;
use super::symbol_table::SymbolTable;

/// Turns the text transducer into a binary artifact at `output`.
pub trait FstMaterializer: Send {
    fn materialize(
        &self,
        fst: &LexiconFst<'_>,
        phones: &SymbolTable,
        words: &SymbolTable,
        output: &Path,
    ) -> Result<(), LexiconError>;
}
