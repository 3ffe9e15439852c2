use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::lexicon::domain::disambiguator::is_disambiguation_symbol;
use crate::lexicon::domain::lexicon_compiler::CompiledLexicon;
use crate::lexicon::domain::lexicon_error::LexiconError;
use crate::lexicon::domain::symbol_table::SymbolTable;
use crate::lexicon::domain::transcription::Transcription;
use crate::mapping::domain::field_remapper::FieldRemapper;
use crate::mapping::domain::field_selector::FieldSelector;
use crate::shared::constants::{EPSILON, WORD_DISAMBIG};

/// On-disk layout of a compiled language.
#[derive(Debug, Clone)]
pub struct LangDirectory {
    root: PathBuf,
}

impl LangDirectory {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn phones_dir(&self) -> PathBuf {
        self.root.join("phones")
    }

    pub fn phones_table(&self) -> PathBuf {
        self.root.join("phones.txt")
    }

    pub fn words_table(&self) -> PathBuf {
        self.root.join("words.txt")
    }

    pub fn word_boundary_int(&self) -> PathBuf {
        self.root.join("word_boundary.int")
    }

    pub fn disambig_int(&self) -> PathBuf {
        self.phones_dir().join("disambig.int")
    }

    pub fn lexicon_fst(&self) -> PathBuf {
        self.root.join("L.fst")
    }

    pub fn lexicon_disambig_fst(&self) -> PathBuf {
        self.root.join("L_disambig.fst")
    }

    pub fn trans_int(&self) -> PathBuf {
        self.root.join("trans.int")
    }

    /// Write every text and integer artifact of `lexicon`. Transducers are
    /// produced separately by an `FstMaterializer`.
    pub fn write(
        &self,
        lexicon: &CompiledLexicon,
        transcription: Option<&Transcription>,
    ) -> Result<(), LexiconError> {
        let phones_dir = self.phones_dir();
        fs::create_dir_all(&phones_dir).map_err(|e| LexiconError::io(&phones_dir, e))?;

        let phone_ids = remapper(&lexicon.phones);
        let word_ids = remapper(&lexicon.words);
        let first = FieldSelector::Indices(vec![0]);

        write_file(&self.phones_table(), |w| lexicon.phones.write_to(w))?;
        write_file(&self.words_table(), |w| lexicon.words.write_to(w))?;

        let oov = [lexicon.oov_word.clone()];
        self.write_listing("oov", &oov, &word_ids, &first, &self.root)?;

        write_file(&self.root.join("lexiconp.txt"), |w| {
            for entry in &lexicon.entries {
                let phones: Vec<&str> = real_phones(&entry.phones).collect();
                writeln!(w, "{}\t{:.1}\t{}", entry.word, entry.weight, phones.join(" "))?;
            }
            Ok(())
        })?;
        write_file(&self.root.join("lexiconp_disambig.txt"), |w| {
            for entry in &lexicon.entries {
                writeln!(w, "{entry}")?;
            }
            Ok(())
        })?;

        let phone_set = &lexicon.phone_set;
        let silence = phone_set.positional_silence();
        let nonsilence = phone_set.positional_nonsilence();
        let optional = [phone_set.optional_silence().to_string()];
        let disambig: Vec<String> = lexicon.disambiguation.symbols().collect();
        let wdisambig = [WORD_DISAMBIG.to_string()];

        for (name, labels) in [
            ("silence", &silence[..]),
            ("nonsilence", &nonsilence[..]),
            ("optional_silence", &optional[..]),
            ("context_indep", &silence[..]),
            ("disambig", &disambig[..]),
        ] {
            self.write_listing(name, labels, &phone_ids, &first, &phones_dir)?;
            write_csl(&phones_dir.join(format!("{name}.csl")), labels, &lexicon.phones)?;
        }

        write_lines(&phones_dir.join("wdisambig.txt"), &wdisambig)?;
        write_remapped(
            &phones_dir.join("wdisambig_phones.int"),
            &wdisambig,
            &phone_ids,
            &first,
        )?;
        write_remapped(
            &phones_dir.join("wdisambig_words.int"),
            &wdisambig,
            &word_ids,
            &first,
        )?;

        let boundaries = &lexicon.word_boundaries;
        write_file(&phones_dir.join("word_boundary.txt"), |w| boundaries.write_text(w))?;
        write_file(&phones_dir.join("word_boundary.int"), |w| boundaries.write_int(w))?;
        write_file(&self.word_boundary_int(), |w| boundaries.write_int(w))?;

        self.write_align_lexicon(lexicon, &phone_ids, &word_ids)?;

        if let Some(transcription) = transcription {
            let encoded = lexicon.encode_transcription(transcription)?;
            write_file(&self.trans_int(), |w| encoded.write_to(w))?;
        }

        log::info!("Wrote language directory {}", self.root.display());
        Ok(())
    }

    fn write_listing(
        &self,
        name: &str,
        labels: &[String],
        ids: &FieldRemapper,
        selector: &FieldSelector,
        dir: &Path,
    ) -> Result<(), LexiconError> {
        write_lines(&dir.join(format!("{name}.txt")), labels)?;
        write_remapped(&dir.join(format!("{name}.int")), labels, ids, selector)
    }

    /// `word word phones`, closed by an epsilon entry for optional silence.
    fn write_align_lexicon(
        &self,
        lexicon: &CompiledLexicon,
        phone_ids: &FieldRemapper,
        word_ids: &FieldRemapper,
    ) -> Result<(), LexiconError> {
        let mut records: Vec<String> = lexicon
            .entries
            .iter()
            .map(|e| {
                let mut fields = vec![e.word.as_str(), e.word.as_str()];
                fields.extend(real_phones(&e.phones));
                fields.join(" ")
            })
            .collect();
        records.push(format!(
            "{EPSILON} {EPSILON} {}",
            lexicon.phone_set.optional_silence()
        ));

        let phones_dir = self.phones_dir();
        write_lines(&phones_dir.join("align_lexicon.txt"), &records)?;

        let phone_fields: FieldSelector = "2-".parse()?;
        let word_fields: FieldSelector = "0,1".parse()?;
        let path = phones_dir.join("align_lexicon.int");
        write_file(&path, |w| {
            for record in &records {
                let with_phones = phone_ids
                    .remap_record(record, &phone_fields)
                    .map_err(std::io::Error::other)?;
                let encoded = word_ids
                    .remap_record(&with_phones, &word_fields)
                    .map_err(std::io::Error::other)?;
                writeln!(w, "{encoded}")?;
            }
            Ok(())
        })
    }
}

fn real_phones(phones: &[String]) -> impl Iterator<Item = &str> {
    phones
        .iter()
        .map(String::as_str)
        .filter(|p| !is_disambiguation_symbol(p))
}

fn remapper(table: &SymbolTable) -> FieldRemapper {
    FieldRemapper::from_pairs(
        table.iter().map(|(label, id)| (label.to_string(), id.to_string())),
        false,
    )
}

fn write_file<F>(path: &Path, body: F) -> Result<(), LexiconError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).map_err(|e| LexiconError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    body(&mut writer)
        .and_then(|()| writer.flush())
        .map_err(|e| LexiconError::io(path, e))
}

fn write_lines(path: &Path, lines: &[String]) -> Result<(), LexiconError> {
    write_file(path, |w| {
        for line in lines {
            writeln!(w, "{line}")?;
        }
        Ok(())
    })
}

fn write_remapped(
    path: &Path,
    lines: &[String],
    ids: &FieldRemapper,
    selector: &FieldSelector,
) -> Result<(), LexiconError> {
    let encoded = lines
        .iter()
        .map(|line| ids.remap_record(line, selector))
        .collect::<Result<Vec<_>, _>>()?;
    write_lines(path, &encoded)
}

/// Colon-separated ids on a single line.
fn write_csl(path: &Path, labels: &[String], phones: &SymbolTable) -> Result<(), LexiconError> {
    let ids = labels
        .iter()
        .map(|label| {
            phones
                .id(label)
                .map(|id| id.to_string())
                .ok_or_else(|| LexiconError::InvalidPhoneSet {
                    reason: format!("{label} is missing from the phone table"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    write_lines(path, &[ids.join(":")])
}
