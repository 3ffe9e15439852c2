use std::ffi::OsString;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

use crate::alignment::domain::alignment_result::AlignmentResult;
use crate::alignment::domain::alignment_session::AlignmentSession;
use crate::alignment::domain::segment_aligner::SegmentAligner;
use crate::alignment::domain::session_error::SessionError;
use crate::alignment::domain::session_state::SessionState;
use crate::lexicon::infrastructure::lang_directory::LangDirectory;
use crate::shared::constants::{ACOUSTIC_MODEL_FILE, ALIGN_PIPE_PROGRAM, LDA_MATRIX_FILE, TREE_FILE};
use crate::shared::external_program::{forward_lines, ProcessError};
use crate::shared::settings::AlignerSettings;

type PipeSession = AlignmentSession<BufWriter<ChildStdin>, BufReader<ChildStdout>>;

/// Files the aligner loads once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignerResources {
    pub tree: PathBuf,
    pub model: PathBuf,
    pub lda: PathBuf,
    pub lexicon_fst: PathBuf,
    pub words: PathBuf,
    pub phones: PathBuf,
    pub word_boundaries: PathBuf,
    pub disambig: PathBuf,
}

impl AlignerResources {
    pub fn new(model_dir: &Path, lang: &LangDirectory) -> Self {
        Self {
            tree: model_dir.join(TREE_FILE),
            model: model_dir.join(ACOUSTIC_MODEL_FILE),
            lda: model_dir.join(LDA_MATRIX_FILE),
            lexicon_fst: lang.lexicon_fst(),
            words: lang.words_table(),
            phones: lang.phones_table(),
            word_boundaries: lang.word_boundary_int(),
            disambig: lang.disambig_int(),
        }
    }

    /// Positional arguments in the order the aligner expects them.
    fn positional(&self) -> [&Path; 7] {
        [
            &self.tree,
            &self.model,
            &self.lda,
            &self.lexicon_fst,
            &self.words,
            &self.word_boundaries,
            &self.disambig,
        ]
    }

    pub fn verify(&self) -> Result<(), SessionError> {
        match self
            .positional()
            .into_iter()
            .chain([self.phones.as_path()])
            .find(|p| !p.exists())
        {
            Some(path) => Err(SessionError::MissingResource {
                path: path.to_path_buf(),
            }),
            None => Ok(()),
        }
    }
}

/// Options shared by the streaming and the batch aligner.
pub(crate) fn decoder_options(settings: &AlignerSettings) -> Vec<OsString> {
    vec![
        format!("--transition-scale={}", settings.transition_scale).into(),
        format!("--acoustic-scale={}", settings.acoustic_scale).into(),
        format!("--self-loop-scale={}", settings.self_loop_scale).into(),
        format!("--beam={}", settings.beam).into(),
        format!("--retry-beam={}", settings.retry_beam).into(),
        format!("--careful={}", settings.careful).into(),
    ]
}

/// `gmm-align-pipe` child process driven through an [`AlignmentSession`].
pub struct GmmAlignPipe {
    session: Option<PipeSession>,
    child: Option<Child>,
    stderr: Option<JoinHandle<()>>,
}

impl GmmAlignPipe {
    pub fn arguments(settings: &AlignerSettings, resources: &AlignerResources) -> Vec<OsString> {
        let mut args = decoder_options(settings);
        let mut phone_symbols = OsString::from("--phone-symbols=");
        phone_symbols.push(&resources.phones);
        args.push(phone_symbols);
        args.extend(resources.positional().iter().map(|p| p.as_os_str().to_owned()));
        args
    }

    /// Start the aligner and wait for its readiness token. The child is
    /// killed if it never becomes ready.
    pub fn spawn(
        program: &Path,
        settings: &AlignerSettings,
        resources: &AlignerResources,
    ) -> Result<Self, SessionError> {
        resources.verify()?;

        let mut child = Command::new(program)
            .args(Self::arguments(settings, resources))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ProcessError::Spawn {
                program: ALIGN_PIPE_PROGRAM.to_string(),
                source: e,
            })?;
        log::info!("Started {ALIGN_PIPE_PROGRAM} (pid {})", child.id());

        let stderr = child
            .stderr
            .take()
            .map(|s| forward_lines(ALIGN_PIPE_PROGRAM, s));

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            kill(&mut child);
            return Err(SessionError::Io(std::io::Error::other(
                "aligner pipes are not available",
            )));
        };

        match AlignmentSession::start(BufWriter::new(stdin), BufReader::new(stdout)) {
            Ok(session) => Ok(Self {
                session: Some(session),
                child: Some(child),
                stderr,
            }),
            Err(e) => {
                kill(&mut child);
                Err(e)
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Closed, |s| s.state())
    }
}

impl SegmentAligner for GmmAlignPipe {
    fn align(&mut self, samples: &[i16], transcript: &str) -> Result<AlignmentResult, SessionError> {
        match self.session.as_mut() {
            Some(session) => session.process_segment(samples, transcript),
            None => Err(SessionError::Unusable {
                state: SessionState::Closed,
            }),
        }
    }

    fn finish(mut self: Box<Self>) -> Result<(), SessionError> {
        let desynchronized = self.state() == SessionState::Desynchronized;
        let closed = match self.session.take() {
            Some(session) => session.close(),
            None => Ok(()),
        };

        if let Some(mut child) = self.child.take() {
            if desynchronized {
                kill(&mut child);
            } else {
                match child.wait() {
                    Ok(status) if status.success() => {
                        log::debug!("{ALIGN_PIPE_PROGRAM} exited cleanly")
                    }
                    Ok(status) => log::warn!("{ALIGN_PIPE_PROGRAM} exited with {status}"),
                    Err(e) => log::warn!("Could not reap {ALIGN_PIPE_PROGRAM}: {e}"),
                }
            }
        }
        if let Some(handle) = self.stderr.take() {
            let _ = handle.join();
        }
        closed
    }
}

impl Drop for GmmAlignPipe {
    fn drop(&mut self) {
        self.session.take();
        if let Some(mut child) = self.child.take() {
            kill(&mut child);
        }
    }
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("Could not kill {ALIGN_PIPE_PROGRAM}: {e}");
    }
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resources(root: &Path) -> AlignerResources {
        AlignerResources::new(&root.join("model"), &LangDirectory::new(&root.join("work")))
    }

    #[test]
    fn test_arguments_keep_scales_independent() {
        let settings = AlignerSettings {
            acoustic_scale: 0.083,
            self_loop_scale: 0.1,
            careful: true,
            ..AlignerSettings::default()
        };
        let args: Vec<String> = GmmAlignPipe::arguments(&settings, &resources(Path::new("/r")))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "--transition-scale=1",
                "--acoustic-scale=0.083",
                "--self-loop-scale=0.1",
                "--beam=20",
                "--retry-beam=300",
                "--careful=true",
                "--phone-symbols=/r/work/phones.txt",
                "/r/model/tree",
                "/r/model/final.mdl",
                "/r/model/final.mat",
                "/r/work/L.fst",
                "/r/work/words.txt",
                "/r/work/word_boundary.int",
                "/r/work/phones/disambig.int",
            ]
        );
    }

    #[test]
    fn test_verify_reports_first_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = resources(dir.path()).verify().unwrap_err();
        assert!(matches!(err, SessionError::MissingResource { ref path } if path.ends_with("model/tree")));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn touch_resources(root: &Path) -> AlignerResources {
            let res = resources(root);
            for path in res.positional().into_iter().chain([res.phones.as_path()]) {
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, "").unwrap();
            }
            res
        }

        fn script(root: &Path, body: &str) -> PathBuf {
            let path = root.join("fake-align-pipe");
            fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_round_trip_through_child_process() {
            let dir = tempfile::tempdir().unwrap();
            let res = touch_resources(dir.path());
            let program = script(
                dir.path(),
                "echo RDY\nhead -c 32017 >/dev/null\necho \"NW 1\"\necho \"W hello 0.00 1.00\"\ncat >/dev/null\n",
            );

            let mut pipe = GmmAlignPipe::spawn(&program, &AlignerSettings::default(), &res).unwrap();
            let result = pipe.align(&vec![0; 16000], "hello").unwrap();
            assert_eq!(result.words.len(), 1);
            assert_eq!(result.phones.len(), 0);
            Box::new(pipe).finish().unwrap();
        }

        #[test]
        fn test_child_that_never_gets_ready_is_reported() {
            let dir = tempfile::tempdir().unwrap();
            let res = touch_resources(dir.path());
            let program = script(dir.path(), "echo 'ERROR: cannot read model' >&2\nexit 1\n");

            let err = GmmAlignPipe::spawn(&program, &AlignerSettings::default(), &res)
                .err()
                .unwrap();
            assert!(matches!(
                err,
                SessionError::UnexpectedEof {
                    state: SessionState::Starting
                }
            ));
        }
    }
}
