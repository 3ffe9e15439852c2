use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use lexalign_core::alignment::infrastructure::gmm_align_pipe::{AlignerResources, GmmAlignPipe};
use lexalign_core::alignment::infrastructure::kaldi_batch_aligner::{BatchPrograms, KaldiBatchAligner};
use lexalign_core::audio::domain::audio_segment::AudioSegment;
use lexalign_core::audio::domain::audio_source::AudioSource;
use lexalign_core::audio::infrastructure::wav_audio_source::WavAudioSource;
use lexalign_core::ctm::domain::phone_label::PhoneLabelMap;
use lexalign_core::ctm::domain::segment_record::SegmentRegistry;
use lexalign_core::ctm::domain::time_base::TimeBaseReconstructor;
use lexalign_core::lexicon::domain::lexicon_compiler::LexiconCompiler;
use lexalign_core::lexicon::domain::phone_set::PhoneSet;
use lexalign_core::lexicon::domain::pronunciation_dictionary::PronunciationDictionary;
use lexalign_core::lexicon::domain::transcription::Transcription;
use lexalign_core::lexicon::infrastructure::kaldi_fst_materializer::KaldiFstMaterializer;
use lexalign_core::lexicon::infrastructure::lang_directory::LangDirectory;
use lexalign_core::lexicon::infrastructure::phonetisaurus_g2p::PhonetisaurusG2p;
use lexalign_core::mapping::domain::field_remapper::FieldRemapper;
use lexalign_core::mapping::domain::field_selector::FieldSelector;
use lexalign_core::pipeline::align_batch_use_case::AlignBatchUseCase;
use lexalign_core::pipeline::align_recording_use_case::{
    AlignRecordingUseCase, AlignedLabel, IntegerLabels,
};
use lexalign_core::pipeline::pipeline_logger::LogPipelineLogger;
use lexalign_core::pipeline::prepare_language_use_case::PrepareLanguageUseCase;
use lexalign_core::segmentation::domain::segmentation_provider::{self, SegmentationProvider};
use lexalign_core::segmentation::infrastructure::kaldi_segments_provider::KaldiSegmentsProvider;
use lexalign_core::segmentation::domain::transcript_segment::TranscriptSegment;
use lexalign_core::segmentation::infrastructure::single_utterance_provider::SingleUtteranceProvider;
use lexalign_core::shared::constants::{
    ALIGN_PIPE_PROGRAM, CUSTOM_PHONES_FILE, FSTARCSORT_PROGRAM, FSTCOMPILE_PROGRAM, G2P_DIR,
    G2P_LEXICON_FILE, G2P_MODEL_FILE, G2P_PROGRAM, MODEL_DIR,
};
use lexalign_core::shared::program_locator::ProgramLocator;
use lexalign_core::shared::settings::Settings;

/// Lexicon preparation and forced alignment, segment by segment or in one
/// batch run.
#[derive(Parser)]
#[command(name = "lexalign")]
struct Cli {
    /// Root folder searched recursively for the external binaries.
    #[arg(long, global = true, default_value = "bin")]
    bin_root: PathBuf,

    /// Folder holding `model/`, `g2p/` and `custom_phones.txt`.
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Scratch folder for the language directory and tool inputs.
    #[arg(long, global = true, default_value = "work")]
    work_dir: PathBuf,

    /// Settings file (JSON). Defaults to the platform config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a lexicon for the words of a Kaldi `text` file.
    PrepareLang {
        /// Utterance id followed by its words, one utterance per line.
        text: PathBuf,
        /// Language directory to write.
        out_dir: PathBuf,
    },

    /// Align a recording against its transcript.
    Align {
        /// 16 kHz, 16-bit, mono WAV file.
        audio: PathBuf,
        /// Kaldi `text` file, or plain text for `--type txt`.
        transcript: PathBuf,
        #[arg(long = "type", short = 't', value_enum, default_value = "txt")]
        kind: TranscriptKind,
        /// Kaldi `segments` file, required for `--type segments`.
        #[arg(long)]
        segments: Option<PathBuf>,
        /// Remove the work directory afterwards.
        #[arg(long)]
        cleanup: bool,
    },

    /// Align all segments in one batch run of the Kaldi command-line tools.
    AlignBatch {
        /// 16 kHz, 16-bit, mono WAV file.
        audio: PathBuf,
        /// Kaldi `text` file, or plain text for `--type txt`.
        transcript: PathBuf,
        #[arg(long = "type", short = 't', value_enum, default_value = "txt")]
        kind: TranscriptKind,
        /// Kaldi `segments` file, required for `--type segments`.
        #[arg(long)]
        segments: Option<PathBuf>,
        /// Remove the work directory afterwards.
        #[arg(long)]
        cleanup: bool,
    },

    /// Replace selected fields of each record through a two-column table.
    ApplyMap {
        /// Fields to map, e.g. `0`, `1,3`, `2-` or `1-4`.
        #[arg(short = 'f', default_value = "0-")]
        fields: FieldSelector,
        /// Use the table's second column as the key.
        #[arg(short = 'x')]
        flip: bool,
        /// Emit an empty field for unmapped values instead of failing.
        #[arg(short = 'b')]
        blank: bool,
        table: PathBuf,
        /// Input file, or `-` for stdin.
        input: String,
        /// Output file, or `-` for stdout.
        output: String,
    },

    /// Move segment-relative CTM times onto the recording time axis.
    FixCtm {
        ctm: PathBuf,
        segments: PathBuf,
        output: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TranscriptKind {
    /// Kaldi `segments` + `text`.
    Segments,
    /// First line of a plain text file covers the whole recording.
    Txt,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::PrepareLang { text, out_dir } => run_prepare_lang(&cli, text, out_dir),
        Command::Align {
            audio,
            transcript,
            kind,
            segments,
            cleanup,
        } => run_align(&cli, audio, transcript, *kind, segments.as_deref(), *cleanup),
        Command::AlignBatch {
            audio,
            transcript,
            kind,
            segments,
            cleanup,
        } => run_align_batch(&cli, audio, transcript, *kind, segments.as_deref(), *cleanup),
        Command::ApplyMap {
            fields,
            flip,
            blank,
            table,
            input,
            output,
        } => run_apply_map(fields, *flip, *blank, table, input, output),
        Command::FixCtm {
            ctm,
            segments,
            output,
        } => run_fix_ctm(ctm, segments, output),
    }
}

fn run_prepare_lang(
    cli: &Cli,
    text: &Path,
    out_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::resolve(cli.config.as_deref())?;
    let locator = ProgramLocator::new(&cli.bin_root);
    let mut use_case = build_prepare_language(cli, &locator, &settings)?;

    let transcription = Transcription::load(text)?;
    let words = transcription.word_list();
    use_case.execute(&words, Some(&transcription), &LangDirectory::new(out_dir))?;
    log::info!("Language directory written to {}", out_dir.display());
    Ok(())
}

fn run_align(
    cli: &Cli,
    audio_path: &Path,
    transcript: &Path,
    kind: TranscriptKind,
    segments_path: Option<&Path>,
    cleanup: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::resolve(cli.config.as_deref())?;
    let locator = ProgramLocator::new(&cli.bin_root);
    let align_program = locator.locate(ALIGN_PIPE_PROGRAM)?;
    let prepared = prepare_alignment(cli, &locator, &settings, audio_path, transcript, kind, segments_path)?;

    let resources = AlignerResources::new(&cli.data_dir.join(MODEL_DIR), &prepared.lang);
    let aligner = GmmAlignPipe::spawn(&align_program, &settings.aligner, &resources)?;

    let mut logger = LogPipelineLogger::default();
    logger.set_audio_seconds(prepared.audio.duration());
    let mut use_case =
        AlignRecordingUseCase::new(Box::new(aligner), load_phone_labels(cli)?, Box::new(logger));
    if settings.output.integer_labels {
        use_case = use_case.with_integer_labels(load_symbols(&prepared.lang)?);
    }
    let labels = use_case.execute(&prepared.audio, &prepared.segments)?;

    print_labels(&labels)?;
    finish_work_dir(cli, cleanup)
}

fn run_align_batch(
    cli: &Cli,
    audio_path: &Path,
    transcript: &Path,
    kind: TranscriptKind,
    segments_path: Option<&Path>,
    cleanup: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::resolve(cli.config.as_deref())?;
    let locator = ProgramLocator::new(&cli.bin_root);
    let programs = BatchPrograms::locate(&locator)?;
    let prepared = prepare_alignment(cli, &locator, &settings, audio_path, transcript, kind, segments_path)?;

    let resources = AlignerResources::new(&cli.data_dir.join(MODEL_DIR), &prepared.lang);
    let aligner = KaldiBatchAligner::new(programs, &settings.aligner, resources, &prepared.lang);

    let mut logger = LogPipelineLogger::default();
    logger.set_audio_seconds(prepared.audio.duration());
    let labels = AlignBatchUseCase::new(
        Box::new(aligner),
        load_symbols(&prepared.lang)?,
        load_phone_labels(cli)?,
        Box::new(logger),
    )
    .execute(audio_path, &prepared.segments)?;

    print_labels(&labels)?;
    finish_work_dir(cli, cleanup)
}

/// Inputs shared by both alignment modes.
struct PreparedAlignment {
    audio: AudioSegment,
    segments: Vec<TranscriptSegment>,
    lang: LangDirectory,
}

/// Read the recording and its segments, then compile the language
/// directory into the work folder.
fn prepare_alignment(
    cli: &Cli,
    locator: &ProgramLocator,
    settings: &Settings,
    audio_path: &Path,
    transcript: &Path,
    kind: TranscriptKind,
    segments_path: Option<&Path>,
) -> Result<PreparedAlignment, Box<dyn std::error::Error>> {
    let mut prepare = build_prepare_language(cli, locator, settings)?;

    let provider: Box<dyn SegmentationProvider> = match kind {
        TranscriptKind::Segments => {
            let segments_path =
                segments_path.ok_or("--segments is required for --type segments")?;
            Box::new(KaldiSegmentsProvider::new(segments_path, transcript))
        }
        TranscriptKind::Txt => Box::new(SingleUtteranceProvider::new(transcript)),
    };

    let audio = WavAudioSource::new().read(audio_path)?;
    let segments = provider.segments(audio.duration())?;
    log::info!(
        "Aligning {} segments over {:.2}s of audio",
        segments.len(),
        audio.duration()
    );

    let lang = LangDirectory::new(&cli.work_dir);
    let transcription = segmentation_provider::transcription(&segments);
    prepare.execute(&transcription.word_list(), Some(&transcription), &lang)?;
    Ok(PreparedAlignment {
        audio,
        segments,
        lang,
    })
}

fn load_phone_labels(cli: &Cli) -> Result<PhoneLabelMap, Box<dyn std::error::Error>> {
    let custom_phones = cli.data_dir.join(CUSTOM_PHONES_FILE);
    if custom_phones.exists() {
        Ok(PhoneLabelMap::load(&custom_phones)?)
    } else {
        Ok(PhoneLabelMap::new())
    }
}

/// Symbol tables keyed by id.
fn load_symbols(lang: &LangDirectory) -> Result<IntegerLabels, Box<dyn std::error::Error>> {
    Ok(IntegerLabels {
        words: FieldRemapper::load(&lang.words_table(), true)?,
        phones: FieldRemapper::load(&lang.phones_table(), true)?,
    })
}

fn print_labels(labels: &[AlignedLabel]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for label in labels {
        writeln!(out, "{label}")?;
    }
    out.flush()
}

fn finish_work_dir(cli: &Cli, cleanup: bool) -> Result<(), Box<dyn std::error::Error>> {
    if cleanup {
        fs::remove_dir_all(&cli.work_dir)?;
        log::info!("Removed {}", cli.work_dir.display());
    }
    Ok(())
}

fn run_apply_map(
    fields: &FieldSelector,
    flip: bool,
    blank: bool,
    table: &Path,
    input: &str,
    output: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let remapper = FieldRemapper::load(table, flip)?.with_blank_missing(blank);
    let count = remapper.remap_stream(open_input(input)?, open_output(output)?, fields)?;
    log::debug!("Remapped {count} records");
    Ok(())
}

fn run_fix_ctm(ctm: &Path, segments: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let registry = SegmentRegistry::load(segments)?;
    let reader = BufReader::new(File::open(ctm)?);
    let writer = BufWriter::new(File::create(output)?);
    let count = TimeBaseReconstructor::new(&registry).rebase_stream(reader, writer)?;
    log::info!("Wrote {count} records to {}", output.display());
    Ok(())
}

/// Compiler, G2P oracle and FST tools wired from the data layout. Every
/// program is located up front so a missing binary fails before any work.
fn build_prepare_language(
    cli: &Cli,
    locator: &ProgramLocator,
    settings: &Settings,
) -> Result<PrepareLanguageUseCase, Box<dyn std::error::Error>> {
    let g2p_program = locator.locate(G2P_PROGRAM)?;
    let fstcompile = locator.locate(FSTCOMPILE_PROGRAM)?;
    let fstarcsort = locator.locate(FSTARCSORT_PROGRAM)?;

    fs::create_dir_all(&cli.work_dir)?;
    let g2p_dir = cli.data_dir.join(G2P_DIR);
    let dictionary = PronunciationDictionary::load(&g2p_dir.join(G2P_LEXICON_FILE))?;
    let oracle = PhonetisaurusG2p::new(
        &g2p_program,
        &g2p_dir.join(G2P_MODEL_FILE),
        &cli.work_dir,
        &settings.g2p,
    );
    let compiler = LexiconCompiler::new(
        PhoneSet::polish_sampa(),
        dictionary,
        Box::new(oracle),
        settings.lexicon.oov_word.clone(),
    );
    Ok(PrepareLanguageUseCase::new(
        compiler,
        Box::new(KaldiFstMaterializer::new(&fstcompile, &fstarcsort)),
        settings.lexicon.silence_probability,
        Box::new(LogPipelineLogger::default()),
    ))
}

fn open_input(path: &str) -> io::Result<Box<dyn BufRead>> {
    if path == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

fn open_output(path: &str) -> io::Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}
