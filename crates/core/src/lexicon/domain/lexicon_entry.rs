use std::fmt;

/// One pronunciation variant of a word.
///
/// `phones` holds bare phones until positional tagging and disambiguation
/// rewrite it in place during compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconEntry {
    pub word: String,
    pub weight: f64,
    pub phones: Vec<String>,
}

impl LexiconEntry {
    pub fn new(word: impl Into<String>, phones: Vec<String>) -> Self {
        Self {
            word: word.into(),
            weight: 1.0,
            phones,
        }
    }

    /// The phone sequence joined into a single comparable key.
    pub fn pronunciation_key(&self) -> String {
        self.phones.join(" ")
    }
}

/// `word<TAB>weight<TAB>phones`, the lexicon line format consumed by FST tooling.
impl fmt::Display for LexiconEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{:.1}\t{}", self.word, self.weight, self.phones.join(" "))
    }
}

/// Where a word's pronunciations came from.
///
/// Dictionary variants are authoritative; oracle variants are only consulted
/// for words the dictionary does not know.
#[derive(Debug, Clone, PartialEq)]
pub enum PronunciationSource {
    FromDictionary(Vec<Vec<String>>),
    FromOracle(Vec<Vec<String>>),
}

impl PronunciationSource {
    pub fn variants(&self) -> &[Vec<String>] {
        match self {
            PronunciationSource::FromDictionary(v) | PronunciationSource::FromOracle(v) => v,
        }
    }

    pub fn is_oracle(&self) -> bool {
        matches!(self, PronunciationSource::FromOracle(_))
    }
}
