use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::lexicon::domain::fst_materializer::FstMaterializer;
use crate::lexicon::domain::lexicon_error::LexiconError;
use crate::lexicon::domain::lexicon_fst::LexiconFst;
use crate::lexicon::domain::symbol_table::SymbolTable;
use crate::shared::constants::{FSTARCSORT_PROGRAM, FSTCOMPILE_PROGRAM};
use crate::shared::external_program::{run_checked, run_with_input};

/// Compiles the text transducer with OpenFst's `fstcompile` and sorts its
/// arcs by output label with `fstarcsort`.
pub struct KaldiFstMaterializer {
    fstcompile: PathBuf,
    fstarcsort: PathBuf,
}

impl KaldiFstMaterializer {
    pub fn new(fstcompile: &Path, fstarcsort: &Path) -> Self {
        Self {
            fstcompile: fstcompile.to_path_buf(),
            fstarcsort: fstarcsort.to_path_buf(),
        }
    }

    fn compile_command(&self, isymbols: &Path, osymbols: &Path, unsorted: &Path) -> Command {
        let mut cmd = Command::new(&self.fstcompile);
        cmd.arg(format!("--isymbols={}", isymbols.display()))
            .arg(format!("--osymbols={}", osymbols.display()))
            .arg("--keep_isymbols=false")
            .arg("--keep_osymbols=false")
            .arg("-")
            .arg(unsorted);
        cmd
    }

    fn sort_command(&self, unsorted: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.fstarcsort);
        cmd.arg("--sort_type=olabel").arg(unsorted).arg(output);
        cmd
    }
}

impl FstMaterializer for KaldiFstMaterializer {
    fn materialize(
        &self,
        fst: &LexiconFst<'_>,
        phones: &SymbolTable,
        words: &SymbolTable,
        output: &Path,
    ) -> Result<(), LexiconError> {
        let isymbols = sibling(output, ".isyms");
        let osymbols = sibling(output, ".osyms");
        let unsorted = sibling(output, ".unsorted");
        let temporaries = [&isymbols, &osymbols, &unsorted];

        let result = (|| -> Result<(), LexiconError> {
            fs::write(&isymbols, phones.to_text()).map_err(|e| LexiconError::io(&isymbols, e))?;
            fs::write(&osymbols, words.to_text()).map_err(|e| LexiconError::io(&osymbols, e))?;

            let text = fst.to_text();
            run_with_input(
                FSTCOMPILE_PROGRAM,
                &mut self.compile_command(&isymbols, &osymbols, &unsorted),
                Some(text.into_bytes()),
            )?;
            run_checked(FSTARCSORT_PROGRAM, &mut self.sort_command(&unsorted, output))?;
            Ok(())
        })();

        for path in temporaries {
            if let Err(e) = fs::remove_file(path) {
                log::debug!("Could not remove {}: {e}", path.display());
            }
        }

        if result.is_ok() {
            log::info!("Wrote {}", output.display());
        }
        result
    }
}

/// `output` with `suffix` appended to its file name.
fn sibling(output: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = output.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    output.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::domain::lexicon_entry::LexiconEntry;

    #[test]
    fn test_sibling_appends_suffix() {
        assert_eq!(
            sibling(Path::new("/lang/L.fst"), ".unsorted"),
            PathBuf::from("/lang/L.fst.unsorted")
        );
    }

    #[test]
    fn test_compile_command_line() {
        let m = KaldiFstMaterializer::new(Path::new("fstcompile"), Path::new("fstarcsort"));
        let cmd = m.compile_command(Path::new("p.txt"), Path::new("w.txt"), Path::new("L.u"));
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "--isymbols=p.txt",
                "--osymbols=w.txt",
                "--keep_isymbols=false",
                "--keep_osymbols=false",
                "-",
                "L.u"
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_materialize_pipes_text_and_cleans_up() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let compile = dir.path().join("fake-fstcompile");
        let sort = dir.path().join("fake-fstarcsort");
        fs::write(&compile, "#!/bin/sh\ncat > \"$6\"\n").unwrap();
        fs::write(&sort, "#!/bin/sh\ncp \"$2\" \"$3\"\n").unwrap();
        for script in [&compile, &sort] {
            fs::set_permissions(script, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let entries = [LexiconEntry::new("a", vec!["a_S".to_string()])];
        let fst = LexiconFst::new(&entries, 0.5, "sil").unwrap();
        let mut phones = SymbolTable::with_epsilon();
        phones.push("a_S").unwrap();
        let mut words = SymbolTable::with_epsilon();
        words.push("a").unwrap();

        let output = dir.path().join("L.fst");
        KaldiFstMaterializer::new(&compile, &sort)
            .materialize(&fst, &phones, &words, &output)
            .unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), fst.to_text());
        assert!(!sibling(&output, ".unsorted").exists());
        assert!(!sibling(&output, ".isyms").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_compiler_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let compile = dir.path().join("fake-fstcompile");
        fs::write(&compile, "#!/bin/sh\ncat >/dev/null\necho bad symbol >&2\nexit 1\n").unwrap();
        fs::set_permissions(&compile, fs::Permissions::from_mode(0o755)).unwrap();

        let fst = LexiconFst::new(&[], 0.5, "sil").unwrap();
        let err = KaldiFstMaterializer::new(&compile, Path::new("/nonexistent"))
            .materialize(
                &fst,
                &SymbolTable::with_epsilon(),
                &SymbolTable::with_epsilon(),
                &dir.path().join("L.fst"),
            )
            .unwrap_err();
        assert!(matches!(err, LexiconError::Process(_)));
    }
}
