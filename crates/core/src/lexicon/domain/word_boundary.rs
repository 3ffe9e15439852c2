use std::fmt;
use std::io::{self, Write};

use super::phone_set::WordPosition;

/// Word-boundary category of a phone id, as consumed by the aligner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordBoundaryCategory {
    Nonword,
    Begin,
    End,
    Singleton,
    Internal,
}

impl WordBoundaryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordBoundaryCategory::Nonword => "nonword",
            WordBoundaryCategory::Begin => "begin",
            WordBoundaryCategory::End => "end",
            WordBoundaryCategory::Singleton => "singleton",
            WordBoundaryCategory::Internal => "internal",
        }
    }
}

impl From<WordPosition> for WordBoundaryCategory {
    fn from(position: WordPosition) -> Self {
        match position {
            WordPosition::Begin => WordBoundaryCategory::Begin,
            WordPosition::End => WordBoundaryCategory::End,
            WordPosition::Singleton => WordBoundaryCategory::Singleton,
            WordPosition::Internal => WordBoundaryCategory::Internal,
        }
    }
}

impl fmt::Display for WordBoundaryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBoundaryEntry {
    pub phone: String,
    pub id: u32,
    pub category: WordBoundaryCategory,
}

/// Categories for every non-epsilon, non-disambiguation phone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBoundaryTable {
    entries: Vec<WordBoundaryEntry>,
}

impl WordBoundaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, phone: impl Into<String>, id: u32, category: WordBoundaryCategory) {
        self.entries.push(WordBoundaryEntry {
            phone: phone.into(),
            id,
            category,
        });
    }

    pub fn entries(&self) -> &[WordBoundaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `id category` per line.
    pub fn write_int<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for e in &self.entries {
            writeln!(writer, "{} {}", e.id, e.category)?;
        }
        Ok(())
    }

    /// `phone category` per line.
    pub fn write_text<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for e in &self.entries {
            writeln!(writer, "{} {}", e.phone, e.category)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_follow_positions() {
        assert_eq!(
            WordBoundaryCategory::from(WordPosition::Internal),
            WordBoundaryCategory::Internal
        );
        assert_eq!(WordBoundaryCategory::Nonword.to_string(), "nonword");
    }

    #[test]
    fn test_int_and_text_forms() {
        let mut table = WordBoundaryTable::new();
        table.push("sil", 1, WordBoundaryCategory::Nonword);
        table.push("sil_B", 2, WordBoundaryCategory::Begin);

        let mut int = Vec::new();
        table.write_int(&mut int).unwrap();
        assert_eq!(String::from_utf8(int).unwrap(), "1 nonword\n2 begin\n");

        let mut text = Vec::new();
        table.write_text(&mut text).unwrap();
        assert_eq!(String::from_utf8(text).unwrap(), "sil nonword\nsil_B begin\n");
    }
}
