use std::collections::{HashMap, HashSet};

use super::lexicon_entry::LexiconEntry;

/// `#0` belongs to word-level disambiguation and is never assigned here.
const FIRST_SYMBOL: u32 = 1;

pub fn disambiguation_symbol(n: u32) -> String {
    format!("#{n}")
}

pub fn is_disambiguation_symbol(label: &str) -> bool {
    label.starts_with('#')
}

/// Result of disambiguating a lexicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disambiguation {
    /// Highest symbol appended to any entry (0 when none was needed).
    pub max_assigned: u32,
    /// One past `max_assigned`; reserved for the silence loop of the
    /// lexicon transducer.
    pub silence_symbol: u32,
}

impl Disambiguation {
    /// Symbols `#0..=silence_symbol` all get phone ids.
    pub fn symbols(&self) -> impl Iterator<Item = String> {
        (0..=self.silence_symbol).map(disambiguation_symbol)
    }
}

/// Appends `#n` markers so that no pronunciation is a duplicate or a proper
/// prefix of another, keeping the lexicon transducer determinizable.
///
/// All counters live in this value for the duration of one pass.
#[derive(Debug, Default)]
pub struct Disambiguator {
    max_disambig: u32,
    reserved_empty: HashSet<u32>,
    last_symbol: HashMap<String, u32>,
}

impl Disambiguator {
    /// Disambiguate tagged entries in place, in entry order.
    pub fn assign(entries: &mut [LexiconEntry]) -> Disambiguation {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut prefixes: HashSet<String> = HashSet::new();
        for entry in entries.iter() {
            *counts.entry(entry.pronunciation_key()).or_default() += 1;
            // Includes the empty prefix of every non-empty pronunciation.
            for len in 0..entry.phones.len() {
                prefixes.insert(entry.phones[..len].join(" "));
            }
        }

        let mut state = Self::default();
        for entry in entries.iter_mut() {
            let key = entry.pronunciation_key();
            if !prefixes.contains(&key) && counts[&key] == 1 {
                continue;
            }
            let symbol = state.next_symbol(&key);
            entry.phones.push(disambiguation_symbol(symbol));
        }

        log::debug!(
            "Disambiguation used symbols up to #{}",
            state.max_disambig
        );
        Disambiguation {
            max_assigned: state.max_disambig,
            silence_symbol: state.max_disambig + 1,
        }
    }

    fn next_symbol(&mut self, key: &str) -> u32 {
        if key.is_empty() {
            // Empty pronunciations get a fresh symbol nobody else may reuse.
            self.max_disambig += 1;
            self.reserved_empty.insert(self.max_disambig);
            return self.max_disambig;
        }

        let mut symbol = match self.last_symbol.get(key) {
            Some(last) => last + 1,
            None => FIRST_SYMBOL,
        };
        while self.reserved_empty.contains(&symbol) {
            symbol += 1;
        }
        self.max_disambig = self.max_disambig.max(symbol);
        self.last_symbol.insert(key.to_string(), symbol);
        symbol
    }
}
