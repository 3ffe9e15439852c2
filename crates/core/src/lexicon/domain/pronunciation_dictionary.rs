use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::lexicon_error::LexiconError;

/// Static word → pronunciation variants lookup.
///
/// File format: `word phone phone ...` per line; a repeated word adds a
/// variant. A word with no phones has an empty pronunciation.
#[derive(Debug, Clone, Default)]
pub struct PronunciationDictionary {
    entries: HashMap<String, Vec<Vec<String>>>,
}

impl PronunciationDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let file = File::open(path).map_err(|e| LexiconError::io(path, e))?;
        Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            LexiconError::Io { source, .. } => LexiconError::io(path, source),
            other => other,
        })
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LexiconError> {
        let mut dict = Self::new();
        for line in reader.lines() {
            let line = line.map_err(|e| LexiconError::io("<dictionary>", e))?;
            let mut tokens = line.split_whitespace();
            let Some(word) = tokens.next() else {
                continue;
            };
            dict.insert(word, tokens.map(String::from).collect());
        }
        log::debug!("Loaded {} dictionary words", dict.len());
        Ok(dict)
    }

    pub fn insert(&mut self, word: &str, phones: Vec<String>) {
        self.entries.entry(word.to_string()).or_default().push(phones);
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn variants(&self, word: &str) -> Option<&[Vec<String>]> {
        self.entries.get(word).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_repeated_word_adds_variants_in_order() {
        let text = "kot k o t\nala a l a\nkot k o d\n";
        let dict = PronunciationDictionary::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(dict.len(), 2);
        let variants = dict.variants("kot").unwrap();
        assert_eq!(variants, [vec!["k", "o", "t"], vec!["k", "o", "d"]]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dict = PronunciationDictionary::from_reader(Cursor::new("\n  \na a\n")).unwrap();
        assert_eq!(dict.len(), 1);
        assert!(dict.contains("a"));
    }

    #[test]
    fn test_word_without_phones_has_empty_variant() {
        let dict = PronunciationDictionary::from_reader(Cursor::new("<sil>\n")).unwrap();
        assert_eq!(dict.variants("<sil>").unwrap(), [Vec::<String>::new()]);
    }

    #[test]
    fn test_unknown_word_has_no_variants() {
        let dict = PronunciationDictionary::new();
        assert!(dict.is_empty());
        assert!(dict.variants("nic").is_none());
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = PronunciationDictionary::load(Path::new("/nonexistent/lexicon.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/lexicon.txt"));
    }
}
