use std::collections::HashMap;

use crate::shared::constants::{SENTENCE_END, SENTENCE_START, WORD_DISAMBIG};

use super::disambiguator::{Disambiguation, Disambiguator};
use super::g2p_oracle::G2pOracle;
use super::lexicon_entry::{LexiconEntry, PronunciationSource};
use super::lexicon_error::LexiconError;
use super::phone_inventory::build_phone_tables;
use super::phone_set::PhoneSet;
use super::positional_tagger::tag_positions;
use super::pronunciation_dictionary::PronunciationDictionary;
use super::symbol_table::SymbolTable;
use super::transcription::{EncodedTranscription, Transcription};
use super::word_boundary::WordBoundaryTable;

/// Everything downstream stages need from one compilation.
#[derive(Debug, Clone)]
pub struct CompiledLexicon {
    /// OOV entry first, then every word's variants in sorted word order.
    pub entries: Vec<LexiconEntry>,
    pub phones: SymbolTable,
    pub words: SymbolTable,
    pub word_boundaries: WordBoundaryTable,
    pub disambiguation: Disambiguation,
    pub phone_set: PhoneSet,
    pub oov_word: String,
}

impl CompiledLexicon {
    pub fn encode_transcription(
        &self,
        transcription: &Transcription,
    ) -> Result<EncodedTranscription, LexiconError> {
        transcription.encode(&self.words)
    }
}

/// Merges the static dictionary with G2P fallbacks and derives the symbol
/// tables.
pub struct LexiconCompiler {
    phone_set: PhoneSet,
    dictionary: PronunciationDictionary,
    oracle: Box<dyn G2pOracle>,
    oov_word: String,
}

impl LexiconCompiler {
    pub fn new(
        phone_set: PhoneSet,
        dictionary: PronunciationDictionary,
        oracle: Box<dyn G2pOracle>,
        oov_word: impl Into<String>,
    ) -> Self {
        Self {
            phone_set,
            dictionary,
            oracle,
            oov_word: oov_word.into(),
        }
    }

    pub fn compile(&self, words: &[String]) -> Result<CompiledLexicon, LexiconError> {
        let mut words = words.to_vec();
        words.sort();
        words.dedup();

        let sources = self.resolve_sources(&words)?;

        let mut entries = vec![LexiconEntry::new(
            self.oov_word.as_str(),
            vec![self.phone_set.spoken_noise().to_string()],
        )];
        for (word, source) in words.iter().zip(&sources) {
            entries.extend(
                source
                    .variants()
                    .iter()
                    .map(|phones| LexiconEntry::new(word.as_str(), phones.clone())),
            );
        }

        validate_phones(&entries, &self.phone_set)?;

        for entry in entries.iter_mut() {
            tag_positions(&mut entry.phones);
        }
        let disambiguation = Disambiguator::assign(&mut entries);

        let (phones, word_boundaries) = build_phone_tables(&self.phone_set, &disambiguation)?;
        let words = build_word_table(&entries)?;

        log::info!(
            "Compiled lexicon: {} entries, {} phones, {} words",
            entries.len(),
            phones.len(),
            words.len()
        );

        Ok(CompiledLexicon {
            entries,
            phones,
            words,
            word_boundaries,
            disambiguation,
            phone_set: self.phone_set.clone(),
            oov_word: self.oov_word.clone(),
        })
    }

    /// One source per word, in the order of `words`.
    fn resolve_sources(&self, words: &[String]) -> Result<Vec<PronunciationSource>, LexiconError> {
        let missing: Vec<String> = words
            .iter()
            .filter(|w| !self.dictionary.contains(w))
            .cloned()
            .collect();

        let mut predictions = if missing.is_empty() {
            HashMap::new()
        } else {
            log::info!("Predicting pronunciations for {} words", missing.len());
            self.oracle.predict(&missing)?
        };

        words
            .iter()
            .map(|word| match self.dictionary.variants(word) {
                Some(variants) => Ok(PronunciationSource::FromDictionary(variants.to_vec())),
                None => predictions
                    .remove(word)
                    .filter(|variants| !variants.is_empty())
                    .map(PronunciationSource::FromOracle)
                    .ok_or_else(|| LexiconError::MissingPronunciation { word: word.clone() }),
            })
            .collect()
    }
}

/// Every phone of every entry must belong to the phone set.
pub fn validate_phones(entries: &[LexiconEntry], phone_set: &PhoneSet) -> Result<(), LexiconError> {
    for entry in entries {
        if let Some(phone) = entry.phones.iter().find(|p| !phone_set.contains(p)) {
            return Err(LexiconError::UnknownPhone {
                phone: phone.clone(),
                word: entry.word.clone(),
            });
        }
    }
    Ok(())
}

fn build_word_table(entries: &[LexiconEntry]) -> Result<SymbolTable, LexiconError> {
    let mut distinct: Vec<&str> = entries.iter().map(|e| e.word.as_str()).collect();
    distinct.sort_unstable();
    distinct.dedup();

    let mut table = SymbolTable::with_epsilon();
    for word in distinct {
        table.push(word)?;
    }
    for reserved in [WORD_DISAMBIG, SENTENCE_START, SENTENCE_END] {
        table.push(reserved)?;
    }
    Ok(table)
}
