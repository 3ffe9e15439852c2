use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use super::lexicon_error::LexiconError;
use super::symbol_table::SymbolTable;

/// Utterance id -> word sequence, in file order.
///
/// Text format: `utterance-id word word ...` per line. A repeated id keeps
/// its first position and takes the later words.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcription {
    utterances: Vec<(String, Vec<String>)>,
}

/// A transcription encoded against a word table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTranscription {
    pub utterances: Vec<(String, Vec<u32>)>,
}

impl Transcription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let file = File::open(path).map_err(|e| LexiconError::io(path, e))?;
        Self::from_reader(BufReader::new(file)).map_err(|e| LexiconError::io(path, e))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut transcription = Self::new();
        for line in reader.lines() {
            let line = line?;
            let mut tokens = line.split_whitespace();
            let Some(id) = tokens.next() else {
                continue;
            };
            transcription.insert(id, tokens.map(String::from).collect());
        }
        Ok(transcription)
    }

    pub fn insert(&mut self, utterance: &str, words: Vec<String>) {
        match self.utterances.iter_mut().find(|(id, _)| id == utterance) {
            Some((_, existing)) => *existing = words,
            None => self.utterances.push((utterance.to_string(), words)),
        }
    }

    pub fn utterances(&self) -> &[(String, Vec<String>)] {
        &self.utterances
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    /// Sorted distinct words across all utterances.
    pub fn word_list(&self) -> Vec<String> {
        let mut words: Vec<String> = self
            .utterances
            .iter()
            .flat_map(|(_, words)| words.iter().cloned())
            .collect();
        words.sort();
        words.dedup();
        words
    }

    pub fn encode(&self, words: &SymbolTable) -> Result<EncodedTranscription, LexiconError> {
        let utterances = self
            .utterances
            .iter()
            .map(|(id, sequence)| {
                let ids = sequence
                    .iter()
                    .map(|w| {
                        words.id(w).ok_or_else(|| LexiconError::UnknownWord {
                            word: w.clone(),
                            utterance: id.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((id.clone(), ids))
            })
            .collect::<Result<Vec<_>, LexiconError>>()?;
        Ok(EncodedTranscription { utterances })
    }
}

impl EncodedTranscription {
    /// `utterance-id id id ...` per line.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (id, words) in &self.utterances {
            write!(writer, "{id}")?;
            for w in words {
                write!(writer, " {w}")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}
