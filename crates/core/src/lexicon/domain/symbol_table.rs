use std::collections::HashMap;
use std::io::{self, Write};

use crate::shared::constants::EPSILON;

use super::lexicon_error::LexiconError;

/// Dense label <-> integer id mapping, ids assigned in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: Vec<String>,
    ids: HashMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table whose id 0 is `<eps>`.
    pub fn with_epsilon() -> Self {
        let mut table = Self::new();
        table.symbols.push(EPSILON.to_string());
        table.ids.insert(EPSILON.to_string(), 0);
        table
    }

    /// Append `label` with the next free id.
    pub fn push(&mut self, label: impl Into<String>) -> Result<u32, LexiconError> {
        let label = label.into();
        if self.ids.contains_key(&label) {
            return Err(LexiconError::DuplicateSymbol { label });
        }
        let id = self.symbols.len() as u32;
        self.ids.insert(label.clone(), id);
        self.symbols.push(label);
        Ok(id)
    }

    pub fn id(&self, label: &str) -> Option<u32> {
        self.ids.get(label).copied()
    }

    pub fn label(&self, id: u32) -> Option<&str> {
        self.symbols.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(id, label)| (label.as_str(), id as u32))
    }

    /// `label id` per line.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (label, id) in self.iter() {
            writeln!(writer, "{label} {id}")?;
        }
        Ok(())
    }

    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_epsilon_starts_at_zero() {
        let mut table = SymbolTable::with_epsilon();
        assert_eq!(table.id("<eps>"), Some(0));
        assert_eq!(table.push("a").unwrap(), 1);
        assert_eq!(table.push("b").unwrap(), 2);
        assert_eq!(table.label(2), Some("b"));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_duplicate_label_is_rejected() {
        let mut table = SymbolTable::with_epsilon();
        table.push("a").unwrap();
        let err = table.push("a").unwrap_err();
        assert!(matches!(err, LexiconError::DuplicateSymbol { ref label } if label == "a"));
    }

    #[test]
    fn test_text_format_is_label_then_id() {
        let mut table = SymbolTable::with_epsilon();
        table.push("sil").unwrap();
        assert_eq!(table.to_text(), "<eps> 0\nsil 1\n");
    }

    #[test]
    fn test_unknown_lookups_are_none() {
        let table = SymbolTable::new();
        assert!(table.is_empty());
        assert_eq!(table.id("x"), None);
        assert_eq!(table.label(0), None);
    }
}
