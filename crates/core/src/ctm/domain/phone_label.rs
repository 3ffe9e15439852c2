use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::lexicon::domain::phone_set::WordPosition;

use super::ctm_error::CtmError;

/// Maps aligner phone labels to the labels reported to users.
///
/// Positional suffixes are always stripped. A custom table line holding a
/// single phone drops that phone; two tokens rename it.
#[derive(Debug, Clone, Default)]
pub struct PhoneLabelMap {
    custom: HashMap<String, Option<String>>,
}

impl PhoneLabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, CtmError> {
        let mut custom = HashMap::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [] => {}
                [phone] => {
                    custom.insert(phone.to_string(), None);
                }
                [phone, replacement] => {
                    custom.insert(phone.to_string(), Some(replacement.to_string()));
                }
                _ => {
                    return Err(CtmError::MalformedPhoneMap {
                        line_number: i + 1,
                        line,
                    })
                }
            }
        }
        Ok(Self { custom })
    }

    pub fn load(path: &Path) -> Result<Self, CtmError> {
        let file = File::open(path).map_err(|e| CtmError::file(path, e))?;
        Self::from_reader(BufReader::new(file))
    }

    /// `None` when the phone should be dropped from the output.
    pub fn normalize(&self, label: &str) -> Option<String> {
        let base = WordPosition::strip(label);
        match self.custom.get(base) {
            Some(replacement) => replacement.clone(),
            None => Some(base.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    fn map() -> PhoneLabelMap {
        PhoneLabelMap::from_reader(Cursor::new("sil\nspn\ntS ts'\n\n")).unwrap()
    }

    #[rstest]
    #[case("a_B", Some("a"))]
    #[case("tS_E", Some("ts'"))]
    #[case("sil", None)]
    #[case("spn_S", None)]
    #[case("dzi_I", Some("dzi"))]
    #[case("on", Some("on"))]
    fn test_normalize(#[case] label: &str, #[case] expected: Option<&str>) {
        assert_eq!(map().normalize(label).as_deref(), expected);
    }

    #[test]
    fn test_empty_map_only_strips() {
        assert_eq!(PhoneLabelMap::new().normalize("sil_S").as_deref(), Some("sil"));
    }

    #[test]
    fn test_rejects_three_tokens() {
        let err = PhoneLabelMap::from_reader(Cursor::new("a b c\n")).unwrap_err();
        assert!(matches!(err, CtmError::MalformedPhoneMap { line_number: 1, .. }));
    }
}
