use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::lexicon::domain::g2p_oracle::{G2pOracle, G2pPredictions};
use crate::lexicon::domain::lexicon_error::LexiconError;
use crate::shared::constants::G2P_PROGRAM;
use crate::shared::external_program::run_checked;
use crate::shared::settings::G2pSettings;

const WORDLIST_FILE: &str = "wordlist";

/// G2P oracle backed by `phonetisaurus-g2pfst`.
pub struct PhonetisaurusG2p {
    program: PathBuf,
    model: PathBuf,
    work_dir: PathBuf,
    nbest: u32,
    pmass: f64,
}

impl PhonetisaurusG2p {
    /// `work_dir` receives the word list handed to the tool.
    pub fn new(program: &Path, model: &Path, work_dir: &Path, settings: &G2pSettings) -> Self {
        Self {
            program: program.to_path_buf(),
            model: model.to_path_buf(),
            work_dir: work_dir.to_path_buf(),
            nbest: settings.nbest,
            pmass: settings.pmass,
        }
    }

    fn command(&self, wordlist: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(format!("--pmass={}", self.pmass))
            .arg(format!("--nbest={}", self.nbest))
            .arg(format!("--model={}", self.model.display()))
            .arg(format!("--wordlist={}", wordlist.display()));
        cmd
    }
}

impl G2pOracle for PhonetisaurusG2p {
    fn predict(&self, words: &[String]) -> Result<G2pPredictions, LexiconError> {
        let wordlist = self.work_dir.join(WORDLIST_FILE);
        let mut contents = words.join("\n");
        contents.push('\n');
        fs::write(&wordlist, contents).map_err(|e| LexiconError::io(&wordlist, e))?;

        let stdout = run_checked(G2P_PROGRAM, &mut self.command(&wordlist))?;
        let predictions = parse_predictions(&String::from_utf8_lossy(&stdout))?;
        log::debug!(
            "G2P returned candidates for {} of {} words",
            predictions.len(),
            words.len()
        );
        Ok(predictions)
    }
}

/// Parse `word score phone...` lines; every line adds one candidate.
pub fn parse_predictions(output: &str) -> Result<G2pPredictions, LexiconError> {
    let mut predictions = G2pPredictions::new();
    for line in output.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] => continue,
            [word, _score, phones @ ..] => predictions
                .entry(word.to_string())
                .or_default()
                .push(phones.iter().map(|p| p.to_string()).collect()),
            _ => {
                return Err(LexiconError::MalformedOracleOutput {
                    line: line.to_string(),
                })
            }
        }
    }
    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accumulates_nbest_per_word() {
        let out = "kot\t2.5\tk o t\nkot\t4.1\tk o d\npies\t1.0\tp j e s\n\n";
        let p = parse_predictions(out).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p["kot"], [vec!["k", "o", "t"], vec!["k", "o", "d"]]);
        assert_eq!(p["pies"], [vec!["p", "j", "e", "s"]]);
    }

    #[test]
    fn test_parse_allows_empty_phone_sequence() {
        let p = parse_predictions("x 0.5\n").unwrap();
        assert_eq!(p["x"], [Vec::<String>::new()]);
    }

    #[test]
    fn test_parse_rejects_line_without_score() {
        let err = parse_predictions("lonely\n").unwrap_err();
        assert!(matches!(err, LexiconError::MalformedOracleOutput { ref line } if line == "lonely"));
    }

    #[test]
    fn test_command_line() {
        let g2p = PhonetisaurusG2p::new(
            Path::new("/opt/bin/phonetisaurus-g2pfst"),
            Path::new("/data/g2p/model.fst"),
            Path::new("/tmp/work"),
            &G2pSettings::default(),
        );
        let cmd = g2p.command(Path::new("/tmp/work/wordlist"));
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "--pmass=0.8",
                "--nbest=10",
                "--model=/data/g2p/model.fst",
                "--wordlist=/tmp/work/wordlist"
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_predict_runs_tool_over_wordlist() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-g2p");
        fs::write(
            &script,
            "#!/bin/sh\nfor a in \"$@\"; do case $a in --wordlist=*) f=${a#--wordlist=};; esac; done\n\
             while read w; do echo \"$w 1.5 a\"; done < \"$f\"\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let g2p = PhonetisaurusG2p::new(
            &script,
            Path::new("model.fst"),
            dir.path(),
            &G2pSettings::default(),
        );
        let words = vec!["ala".to_string(), "kot".to_string()];
        let p = g2p.predict(&words).unwrap();
        assert_eq!(p["ala"], [vec!["a"]]);
        assert_eq!(p["kot"], [vec!["a"]]);
    }
}
