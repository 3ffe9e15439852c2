use std::io::{self, Write};

use crate::shared::constants::EPSILON;

use super::lexicon_entry::LexiconEntry;
use super::lexicon_error::LexiconError;

const START_STATE: u32 = 0;
/// Words enter and leave from here.
const LOOP_STATE: u32 = 1;
/// Words followed by optional silence end here.
const SILENCE_STATE: u32 = 2;

/// Text form of the lexicon transducer with optional silence between words.
///
/// Arcs are written as `src<TAB>dst<TAB>phone<TAB>word<TAB>cost`, costs as
/// negated natural logs; the last line marks the loop state final.
#[derive(Debug, Clone)]
pub struct LexiconFst<'a> {
    entries: &'a [LexiconEntry],
    silence_probability: f64,
    optional_silence: &'a str,
    silence_disambig: Option<String>,
}

impl<'a> LexiconFst<'a> {
    pub fn new(
        entries: &'a [LexiconEntry],
        silence_probability: f64,
        optional_silence: &'a str,
    ) -> Result<Self, LexiconError> {
        if !(silence_probability > 0.0 && silence_probability < 1.0) {
            return Err(LexiconError::InvalidSilenceProbability {
                value: silence_probability,
            });
        }
        Ok(Self {
            entries,
            silence_probability,
            optional_silence,
            silence_disambig: None,
        })
    }

    /// Route the silence loop through an extra state that emits `symbol`.
    pub fn with_silence_disambig(mut self, symbol: impl Into<String>) -> Self {
        self.silence_disambig = Some(symbol.into());
        self
    }

    pub fn write_text<W: Write>(&self, mut out: W) -> io::Result<()> {
        let sil_cost = -self.silence_probability.ln();
        let no_sil_cost = -(1.0 - self.silence_probability).ln();
        let sil = self.optional_silence;
        let mut next_state = SILENCE_STATE + 1;

        arc(&mut out, START_STATE, LOOP_STATE, EPSILON, EPSILON, no_sil_cost)?;
        arc(&mut out, START_STATE, SILENCE_STATE, EPSILON, EPSILON, sil_cost)?;
        match &self.silence_disambig {
            None => arc(&mut out, SILENCE_STATE, LOOP_STATE, sil, EPSILON, 0.0)?,
            Some(disambig) => {
                let disambig_state = next_state;
                next_state += 1;
                arc(&mut out, SILENCE_STATE, disambig_state, sil, EPSILON, 0.0)?;
                arc(&mut out, disambig_state, LOOP_STATE, disambig, EPSILON, 0.0)?;
            }
        }

        for entry in self.entries {
            let pron_cost = -entry.weight.ln();
            let mut current = LOOP_STATE;
            let (last, body) = match entry.phones.split_last() {
                Some((last, body)) => (last.as_str(), body),
                None => (EPSILON, &[][..]),
            };

            for (i, phone) in body.iter().enumerate() {
                let (word, cost) = if i == 0 {
                    (entry.word.as_str(), pron_cost)
                } else {
                    (EPSILON, 0.0)
                };
                arc(&mut out, current, next_state, phone, word, cost)?;
                current = next_state;
                next_state += 1;
            }

            // The word label rides on the final arc only for pronunciations
            // of at most one phone.
            let (word, extra) = if body.is_empty() {
                (entry.word.as_str(), pron_cost)
            } else {
                (EPSILON, 0.0)
            };
            arc(&mut out, current, LOOP_STATE, last, word, no_sil_cost + extra)?;
            arc(&mut out, current, SILENCE_STATE, last, word, sil_cost + extra)?;
        }

        writeln!(out, "{LOOP_STATE}\t{:?}", 0.0_f64)
    }

    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        let _ = self.write_text(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn arc<W: Write>(
    out: &mut W,
    src: u32,
    dst: u32,
    phone: &str,
    word: &str,
    cost: f64,
) -> io::Result<()> {
    writeln!(out, "{src}\t{dst}\t{phone}\t{word}\t{cost:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn entry(word: &str, phones: &[&str]) -> LexiconEntry {
        LexiconEntry::new(word, phones.iter().map(|p| p.to_string()).collect())
    }

    fn arcs(text: &str) -> Vec<Vec<String>> {
        text.lines()
            .map(|l| l.split('\t').map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_rejects_probability_outside_open_interval() {
        for p in [0.0, 1.0, -0.2, 1.5] {
            assert!(matches!(
                LexiconFst::new(&[], p, "sil"),
                Err(LexiconError::InvalidSilenceProbability { .. })
            ));
        }
    }

    #[test]
    fn test_header_without_silence_disambig() {
        let text = LexiconFst::new(&[], 0.5, "sil").unwrap().to_text();
        let lines = arcs(&text);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0][..4], ["0", "1", "<eps>", "<eps>"]);
        assert_eq!(lines[1][..4], ["0", "2", "<eps>", "<eps>"]);
        assert_eq!(lines[2], ["2", "1", "sil", "<eps>", "0.0"]);
        assert_eq!(lines[3], ["1", "0.0"]);
        let cost: f64 = lines[0][4].parse().unwrap();
        assert_relative_eq!(cost, std::f64::consts::LN_2);
    }

    #[rstest]
    #[case(None)]
    #[case(Some("#2"))]
    fn test_leading_silence_is_one_phone(#[case] disambig: Option<&str>) {
        let entries = [entry("a", &["a_S"])];
        let mut fst = LexiconFst::new(&entries, 0.5, "sil").unwrap();
        if let Some(symbol) = disambig {
            fst = fst.with_silence_disambig(symbol);
        }
        let lines = arcs(&fst.to_text());
        let header = &lines[..lines.len() - 3];
        let silence_arcs: Vec<_> = header.iter().filter(|l| l[2] == "sil").collect();
        assert_eq!(silence_arcs.len(), 1);
        assert_eq!(silence_arcs[0][0], "2");
    }

    #[test]
    fn test_silence_disambig_adds_state() {
        let text = LexiconFst::new(&[], 0.5, "sil")
            .unwrap()
            .with_silence_disambig("#3")
            .to_text();
        let lines = arcs(&text);
        assert_eq!(lines[2], ["2", "3", "sil", "<eps>", "0.0"]);
        assert_eq!(lines[3], ["3", "1", "#3", "<eps>", "0.0"]);
    }

    #[test]
    fn test_multi_phone_entry_chain() {
        let entries = [entry("ala", &["a_B", "l_I", "a_E"])];
        let text = LexiconFst::new(&entries, 0.5, "sil").unwrap().to_text();
        let lines = arcs(&text);
        // Three header arcs, two chain arcs, two closing arcs, final state.
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[3][..4], ["1", "3", "a_B", "ala"]);
        assert_eq!(lines[4], ["3", "4", "l_I", "<eps>", "0.0"]);
        assert_eq!(lines[5][..4], ["4", "1", "a_E", "<eps>"]);
        assert_eq!(lines[6][..4], ["4", "2", "a_E", "<eps>"]);
    }

    #[test]
    fn test_single_phone_entry_carries_word_on_closing_arcs() {
        let entries = [entry("<unk>", &["spn_S"])];
        let text = LexiconFst::new(&entries, 0.5, "sil").unwrap().to_text();
        let lines = arcs(&text);
        assert_eq!(lines[3][..4], ["1", "1", "spn_S", "<unk>"]);
        assert_eq!(lines[4][..4], ["1", "2", "spn_S", "<unk>"]);
    }

    #[test]
    fn test_empty_pronunciation_uses_epsilon() {
        let entries = [entry("x", &[])];
        let text = LexiconFst::new(&entries, 0.5, "sil").unwrap().to_text();
        let lines = arcs(&text);
        assert_eq!(lines[3][..4], ["1", "1", "<eps>", "x"]);
    }

    #[test]
    fn test_weight_contributes_pronunciation_cost() {
        let mut e = entry("a", &["a_S"]);
        e.weight = 0.5;
        let entries = [e];
        let text = LexiconFst::new(&entries, 0.5, "sil").unwrap().to_text();
        let lines = arcs(&text);
        let cost: f64 = lines[3][4].parse().unwrap();
        assert_relative_eq!(cost, 2.0 * std::f64::consts::LN_2);
    }
}
