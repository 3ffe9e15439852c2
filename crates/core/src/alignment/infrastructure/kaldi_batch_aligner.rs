use std::env;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::alignment::domain::batch_aligner::{BatchAligner, CtmFiles};
use crate::alignment::domain::session_error::SessionError;
use crate::lexicon::infrastructure::lang_directory::LangDirectory;
use crate::segmentation::domain::transcript_segment::TranscriptSegment;
use crate::shared::constants::{
    COMPUTE_CMVN_PROGRAM, COMPUTE_MFCC_PROGRAM, EXTRACT_SEGMENTS_PROGRAM, FRAME_SHIFT,
    GMM_ALIGN_PROGRAM, NBEST_TO_CTM_PROGRAM, PHONE_LATTICE_PROGRAM, PIPELINE_PROGRAMS,
};
use crate::shared::external_program::{run_checked, run_with_input, ProcessError};
use crate::shared::program_locator::ProgramLocator;
use crate::shared::settings::AlignerSettings;

use super::gmm_align_pipe::{decoder_options, AlignerResources};

const WAV_SCP_FILE: &str = "wav.scp";
const SEGMENTS_FILE: &str = "segments";
const FEATURES_FILE: &str = "mfcc";
const CMVN_FILE: &str = "cmvn";
const WORD_ALIGNMENT_FILE: &str = "nbest_ali";
const PHONE_ALIGNMENT_FILE: &str = "phone_ali";
const WORD_CTM_FILE: &str = "ctm.int";
const PHONE_CTM_FILE: &str = "phone_ctm.int";

/// Kaldi binaries of one batch run.
#[derive(Debug, Clone)]
pub struct BatchPrograms {
    pub extract_segments: PathBuf,
    pub compute_mfcc: PathBuf,
    pub compute_cmvn: PathBuf,
    pub gmm_align: PathBuf,
    pub nbest_to_ctm: PathBuf,
    pub phone_lattice: PathBuf,
    search_path: OsString,
}

impl BatchPrograms {
    /// Every tool is located up front. The folders holding them are put in
    /// front of `PATH` for the tools `gmm-align` starts on its own.
    pub fn locate(locator: &ProgramLocator) -> Result<Self, ProcessError> {
        let mut dirs = Vec::new();
        let mut programs = Self {
            extract_segments: locate_into(locator, EXTRACT_SEGMENTS_PROGRAM, &mut dirs)?,
            compute_mfcc: locate_into(locator, COMPUTE_MFCC_PROGRAM, &mut dirs)?,
            compute_cmvn: locate_into(locator, COMPUTE_CMVN_PROGRAM, &mut dirs)?,
            gmm_align: locate_into(locator, GMM_ALIGN_PROGRAM, &mut dirs)?,
            nbest_to_ctm: locate_into(locator, NBEST_TO_CTM_PROGRAM, &mut dirs)?,
            phone_lattice: locate_into(locator, PHONE_LATTICE_PROGRAM, &mut dirs)?,
            search_path: OsString::new(),
        };
        for program in PIPELINE_PROGRAMS {
            locate_into(locator, program, &mut dirs)?;
        }
        programs.search_path = search_path(dirs)?;
        Ok(programs)
    }

    pub fn search_path(&self) -> &OsString {
        &self.search_path
    }
}

fn locate_into(
    locator: &ProgramLocator,
    program: &str,
    dirs: &mut Vec<PathBuf>,
) -> Result<PathBuf, ProcessError> {
    let path = locator.locate(program)?;
    if let Some(dir) = path.parent() {
        if !dirs.iter().any(|d| d == dir) {
            dirs.push(dir.to_path_buf());
        }
    }
    Ok(path)
}

fn search_path(mut dirs: Vec<PathBuf>) -> Result<OsString, ProcessError> {
    if let Some(current) = env::var_os("PATH") {
        dirs.extend(env::split_paths(&current));
    }
    env::join_paths(dirs).map_err(|e| ProcessError::Io {
        program: GMM_ALIGN_PROGRAM.to_string(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })
}

/// Aligns all segments of a recording with one `gmm-align` run over
/// precomputed MFCC features, then writes word and phone CTMs.
///
/// Scratch files live in the language directory next to `trans.int`.
pub struct KaldiBatchAligner {
    programs: BatchPrograms,
    settings: AlignerSettings,
    resources: AlignerResources,
    work_dir: PathBuf,
    transcription: PathBuf,
}

impl KaldiBatchAligner {
    pub fn new(
        programs: BatchPrograms,
        settings: &AlignerSettings,
        resources: AlignerResources,
        lang: &LangDirectory,
    ) -> Self {
        Self {
            programs,
            settings: settings.clone(),
            resources,
            work_dir: lang.root().to_path_buf(),
            transcription: lang.trans_int(),
        }
    }

    fn work_file(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    fn command(&self, program: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.env("PATH", &self.programs.search_path);
        cmd
    }

    /// CMVN, frame splicing and the LDA transform, run by `gmm-align`.
    fn feature_pipeline(&self) -> String {
        format!(
            "ark,s,cs:apply-cmvn ark:\"{}\" ark:\"{}\" ark:- | \
             splice-feats --left-context=3 --right-context=3 ark:- ark:- | \
             transform-feats \"{}\" ark:- ark:- |",
            self.work_file(CMVN_FILE).display(),
            self.work_file(FEATURES_FILE).display(),
            self.resources.lda.display()
        )
    }

    /// Word-aligned best paths, written to the word alignment archive.
    fn output_pipeline(&self) -> String {
        format!(
            "ark:|linear-to-nbest ark:- ark:\"{}\" \"\" \"\" ark:- | \
             lattice-align-words \"{}\" \"{}\" ark:- ark:\"{}\"",
            self.transcription.display(),
            self.resources.word_boundaries.display(),
            self.resources.model.display(),
            self.work_file(WORD_ALIGNMENT_FILE).display()
        )
    }

    fn align_command(&self) -> Command {
        let mut cmd = self.command(&self.programs.gmm_align);
        cmd.args(decoder_options(&self.settings))
            .arg(&self.resources.tree)
            .arg(&self.resources.model)
            .arg(&self.resources.lexicon_fst)
            .arg(self.feature_pipeline())
            .arg(specifier("ark", &self.transcription))
            .arg(self.output_pipeline());
        cmd
    }

    fn ctm_command(&self, alignment: &Path, output: &Path) -> Command {
        let mut cmd = self.command(&self.programs.nbest_to_ctm);
        cmd.arg(format!("--frame-shift={FRAME_SHIFT}"))
            .arg("--print-silence=false")
            .arg(specifier("ark", alignment))
            .arg(output);
        cmd
    }

    fn compute_features(&self, audio: &Path, segments: &[TranscriptSegment]) -> Result<(), SessionError> {
        let wav_scp = self.work_file(WAV_SCP_FILE);
        write_lines(
            &wav_scp,
            recordings(segments).map(|id| format!("{id} {}", audio.display())),
        )?;
        let features = specifier("ark", &self.work_file(FEATURES_FILE));

        if needs_extraction(segments) {
            let segments_file = self.work_file(SEGMENTS_FILE);
            write_lines(
                &segments_file,
                segments
                    .iter()
                    .map(|s| format!("{} {} {} {}", s.id, s.recording, s.start, s.end)),
            )?;
            let samples = run_checked(
                EXTRACT_SEGMENTS_PROGRAM,
                self.command(&self.programs.extract_segments)
                    .arg(specifier("scp", &wav_scp))
                    .arg(&segments_file)
                    .arg("ark:-"),
            )?;
            run_with_input(
                COMPUTE_MFCC_PROGRAM,
                self.command(&self.programs.compute_mfcc)
                    .arg("ark:-")
                    .arg(&features),
                Some(samples),
            )?;
        } else {
            run_checked(
                COMPUTE_MFCC_PROGRAM,
                self.command(&self.programs.compute_mfcc)
                    .arg(specifier("scp", &wav_scp))
                    .arg(&features),
            )?;
        }

        run_checked(
            COMPUTE_CMVN_PROGRAM,
            self.command(&self.programs.compute_cmvn)
                .arg(&features)
                .arg(specifier("ark", &self.work_file(CMVN_FILE))),
        )?;
        Ok(())
    }
}

impl BatchAligner for KaldiBatchAligner {
    fn align(&self, audio: &Path, segments: &[TranscriptSegment]) -> Result<CtmFiles, SessionError> {
        self.resources.verify()?;
        self.compute_features(audio, segments)?;
        run_checked(GMM_ALIGN_PROGRAM, &mut self.align_command())?;

        let words = self.work_file(WORD_ALIGNMENT_FILE);
        let phones = self.work_file(PHONE_ALIGNMENT_FILE);
        let ctm = CtmFiles {
            words: self.work_file(WORD_CTM_FILE),
            phones: self.work_file(PHONE_CTM_FILE),
        };
        run_checked(NBEST_TO_CTM_PROGRAM, &mut self.ctm_command(&words, &ctm.words))?;
        run_checked(
            PHONE_LATTICE_PROGRAM,
            self.command(&self.programs.phone_lattice)
                .arg(&self.resources.model)
                .arg(specifier("ark", &words))
                .arg(specifier("ark", &phones)),
        )?;
        run_checked(NBEST_TO_CTM_PROGRAM, &mut self.ctm_command(&phones, &ctm.phones))?;
        log::info!("Batch alignment of {} segments finished", segments.len());
        Ok(ctm)
    }
}

fn specifier(kind: &str, path: &Path) -> OsString {
    let mut spec = OsString::from(kind);
    spec.push(":");
    spec.push(path);
    spec
}

/// Segments named after their recording span the whole file and are read
/// straight from `wav.scp`.
fn needs_extraction(segments: &[TranscriptSegment]) -> bool {
    segments.iter().any(|s| s.id != s.recording)
}

/// Distinct recording ids in first-seen order.
fn recordings(segments: &[TranscriptSegment]) -> impl Iterator<Item = &str> {
    let mut seen: Vec<&str> = Vec::new();
    for segment in segments {
        if !seen.contains(&segment.recording.as_str()) {
            seen.push(&segment.recording);
        }
    }
    seen.into_iter()
}

fn write_lines<I>(path: &Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = String>,
{
    let mut out = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
