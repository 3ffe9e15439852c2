use super::lexicon_error::LexiconError;
use crate::shared::constants::{NONSILENCE_PHONES, OPTIONAL_SILENCE, SILENCE_PHONES, SPOKEN_NOISE};

/// Role of a phone inside a single pronunciation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordPosition {
    Begin,
    End,
    Singleton,
    Internal,
}

impl WordPosition {
    /// Order in which positional variants are numbered in the phone table.
    pub const ALL: [WordPosition; 4] = [
        WordPosition::Begin,
        WordPosition::End,
        WordPosition::Singleton,
        WordPosition::Internal,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            WordPosition::Begin => "_B",
            WordPosition::End => "_E",
            WordPosition::Singleton => "_S",
            WordPosition::Internal => "_I",
        }
    }

    pub fn tag(self, phone: &str) -> String {
        format!("{phone}{}", self.suffix())
    }

    /// Remove a positional suffix, if the label carries one.
    pub fn strip(label: &str) -> &str {
        Self::ALL
            .iter()
            .find_map(|pos| label.strip_suffix(pos.suffix()))
            .filter(|base| !base.is_empty())
            .unwrap_or(label)
    }
}

/// Base phoneme inventory, partitioned into silence and nonsilence classes.
///
/// Both classes are kept sorted; that order drives symbol-id assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneSet {
    silence: Vec<String>,
    nonsilence: Vec<String>,
    optional_silence: String,
    spoken_noise: String,
}

impl PhoneSet {
    pub fn new<S, N>(
        silence: S,
        nonsilence: N,
        optional_silence: &str,
        spoken_noise: &str,
    ) -> Result<Self, LexiconError>
    where
        S: IntoIterator,
        S::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        let silence = sorted_unique(silence);
        let nonsilence = sorted_unique(nonsilence);

        if silence.is_empty() || nonsilence.is_empty() {
            return Err(LexiconError::InvalidPhoneSet {
                reason: "silence and nonsilence classes must both be non-empty".to_string(),
            });
        }
        if let Some(shared) = silence.iter().find(|p| nonsilence.binary_search(*p).is_ok()) {
            return Err(LexiconError::InvalidPhoneSet {
                reason: format!("{shared} is both silence and nonsilence"),
            });
        }
        for (role, phone) in [
            ("optional silence", optional_silence),
            ("spoken noise", spoken_noise),
        ] {
            if silence.binary_search_by(|p| p.as_str().cmp(phone)).is_err() {
                return Err(LexiconError::InvalidPhoneSet {
                    reason: format!("{role} phone {phone} is not a silence phone"),
                });
            }
        }

        Ok(Self {
            silence,
            nonsilence,
            optional_silence: optional_silence.to_string(),
            spoken_noise: spoken_noise.to_string(),
        })
    }

    /// The built-in Polish SAMPA inventory.
    pub fn polish_sampa() -> Self {
        Self {
            silence: sorted_unique(SILENCE_PHONES.iter().copied()),
            nonsilence: sorted_unique(NONSILENCE_PHONES.iter().copied()),
            optional_silence: OPTIONAL_SILENCE.to_string(),
            spoken_noise: SPOKEN_NOISE.to_string(),
        }
    }

    pub fn silence(&self) -> &[String] {
        &self.silence
    }

    pub fn nonsilence(&self) -> &[String] {
        &self.nonsilence
    }

    pub fn optional_silence(&self) -> &str {
        &self.optional_silence
    }

    pub fn spoken_noise(&self) -> &str {
        &self.spoken_noise
    }

    pub fn is_silence(&self, phone: &str) -> bool {
        self.silence
            .binary_search_by(|p| p.as_str().cmp(phone))
            .is_ok()
    }

    pub fn contains(&self, phone: &str) -> bool {
        self.is_silence(phone)
            || self
                .nonsilence
                .binary_search_by(|p| p.as_str().cmp(phone))
                .is_ok()
    }

    /// Silence phones with their bare form followed by every positional variant.
    pub fn positional_silence(&self) -> Vec<String> {
        self.silence
            .iter()
            .flat_map(|ph| {
                std::iter::once(ph.clone()).chain(WordPosition::ALL.iter().map(|pos| pos.tag(ph)))
            })
            .collect()
    }

    /// Nonsilence phones exist only in positional form.
    pub fn positional_nonsilence(&self) -> Vec<String> {
        self.nonsilence
            .iter()
            .flat_map(|ph| WordPosition::ALL.iter().map(|pos| pos.tag(ph)))
            .collect()
    }
}

fn sorted_unique<I>(phones: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut v: Vec<String> = phones.into_iter().map(Into::into).collect();
    v.sort();
    v.dedup();
    v
}
