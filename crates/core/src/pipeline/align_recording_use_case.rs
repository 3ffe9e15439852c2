use std::fmt;
use std::time::Instant;

use crate::alignment::domain::alignment_result::TimedLabel;
use crate::alignment::domain::segment_aligner::SegmentAligner;
use crate::audio::domain::audio_segment::AudioSegment;
use crate::ctm::domain::ctm_record::CtmRecord;
use crate::ctm::domain::phone_label::PhoneLabelMap;
use crate::ctm::domain::time_base::TimeBaseReconstructor;
use crate::mapping::domain::field_remapper::FieldRemapper;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::segmentation::domain::segmentation_provider::segment_registry;
use crate::segmentation::domain::transcript_segment::TranscriptSegment;
use crate::shared::constants::CTM_CHANNEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Word,
    Phone,
}

impl LabelKind {
    pub fn tag(self) -> &'static str {
        match self {
            LabelKind::Word => "w",
            LabelKind::Phone => "p",
        }
    }
}

/// One word or phone on the recording's time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedLabel {
    pub kind: LabelKind,
    pub start: f64,
    pub duration: f64,
    pub label: String,
}

impl fmt::Display for AlignedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{:.2}\t{:.2}\t{}",
            self.kind.tag(),
            self.start,
            self.duration,
            self.label
        )
    }
}

/// Decoders for aligners that report symbol ids instead of labels.
#[derive(Debug, Clone)]
pub struct IntegerLabels {
    pub words: FieldRemapper,
    pub phones: FieldRemapper,
}

/// Streams every segment of a recording through a `SegmentAligner` and
/// collects the results in absolute time.
pub struct AlignRecordingUseCase {
    aligner: Box<dyn SegmentAligner>,
    phone_labels: PhoneLabelMap,
    integer_labels: Option<IntegerLabels>,
    logger: Box<dyn PipelineLogger>,
}

impl AlignRecordingUseCase {
    pub fn new(
        aligner: Box<dyn SegmentAligner>,
        phone_labels: PhoneLabelMap,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            aligner,
            phone_labels,
            integer_labels: None,
            logger,
        }
    }

    pub fn with_integer_labels(mut self, labels: IntegerLabels) -> Self {
        self.integer_labels = Some(labels);
        self
    }

    /// Words of all segments come first, then phones, each in segment order.
    /// The aligner is finished even when a segment fails.
    pub fn execute(
        self,
        audio: &AudioSegment,
        segments: &[TranscriptSegment],
    ) -> Result<Vec<AlignedLabel>, Box<dyn std::error::Error>> {
        let Self {
            mut aligner,
            phone_labels,
            integer_labels,
            mut logger,
        } = self;

        let outcome = align_all(
            aligner.as_mut(),
            logger.as_mut(),
            audio,
            segments,
        );
        let finished = aligner.finish();
        let (words, phones) = outcome?;
        finished?;

        let registry = segment_registry(segments);
        let reconstructor = TimeBaseReconstructor::new(&registry);
        let t0 = Instant::now();
        let mut labels = Vec::with_capacity(words.len() + phones.len());
        for (segment_id, word) in &words {
            let label = decode(integer_labels.as_ref().map(|l| &l.words), &word.label)?;
            let rebased = reconstructor.rebase(&ctm_record(segment_id, word, label))?;
            labels.push(aligned(LabelKind::Word, rebased));
        }
        for (segment_id, phone) in &phones {
            let label = decode(integer_labels.as_ref().map(|l| &l.phones), &phone.label)?;
            let Some(label) = phone_labels.normalize(&label) else {
                continue;
            };
            let rebased = reconstructor.rebase(&ctm_record(segment_id, phone, label))?;
            labels.push(aligned(LabelKind::Phone, rebased));
        }
        logger.timing("rebase", t0.elapsed().as_secs_f64() * 1000.0);

        logger.info(&format!(
            "Aligned {} words and {} phones",
            words.len(),
            phones.len()
        ));
        logger.summary();
        Ok(labels)
    }
}

type SegmentLabels = Vec<(String, TimedLabel)>;

fn align_all(
    aligner: &mut dyn SegmentAligner,
    logger: &mut dyn PipelineLogger,
    audio: &AudioSegment,
    segments: &[TranscriptSegment],
) -> Result<(SegmentLabels, SegmentLabels), Box<dyn std::error::Error>> {
    let mut words = Vec::new();
    let mut phones = Vec::new();
    let total = segments.len();

    for (i, segment) in segments.iter().enumerate() {
        let transcript = segment.words().collect::<Vec<_>>().join(" ");
        if transcript.is_empty() {
            log::warn!("Segment {} has no words, skipping", segment.id);
            logger.progress(i + 1, total);
            continue;
        }

        let samples = audio.slice(segment.start, segment.end);
        let t0 = Instant::now();
        let result = aligner.align(samples, &transcript)?;
        logger.timing("align", t0.elapsed().as_secs_f64() * 1000.0);
        logger.metric("words", result.words.len() as f64);
        logger.progress(i + 1, total);

        words.extend(result.words.into_iter().map(|w| (segment.id.clone(), w)));
        phones.extend(result.phones.into_iter().map(|p| (segment.id.clone(), p)));
    }
    Ok((words, phones))
}

fn decode(table: Option<&FieldRemapper>, label: &str) -> Result<String, Box<dyn std::error::Error>> {
    match table {
        None => Ok(label.to_string()),
        Some(table) => table
            .lookup(label)
            .map(String::from)
            .ok_or_else(|| format!("symbol id {label} is not in the symbol table").into()),
    }
}

fn ctm_record(segment_id: &str, timed: &TimedLabel, label: String) -> CtmRecord {
    CtmRecord {
        id: segment_id.to_string(),
        channel: CTM_CHANNEL.to_string(),
        start: timed.start,
        duration: timed.duration,
        label: Some(label),
    }
}

pub(crate) fn aligned(kind: LabelKind, record: CtmRecord) -> AlignedLabel {
    AlignedLabel {
        kind,
        start: record.start,
        duration: record.duration,
        label: record.label.unwrap_or_default(),
    }
}
