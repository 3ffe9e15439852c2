use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;
use std::time::Instant;

use crate::alignment::domain::batch_aligner::BatchAligner;
use crate::ctm::domain::ctm_error::CtmError;
use crate::ctm::domain::ctm_record::CtmRecord;
use crate::ctm::domain::phone_label::PhoneLabelMap;
use crate::ctm::domain::time_base::TimeBaseReconstructor;
use crate::mapping::domain::field_remapper::FieldRemapper;
use crate::mapping::domain::field_selector::FieldSelector;
use crate::pipeline::align_recording_use_case::{aligned, AlignedLabel, IntegerLabels, LabelKind};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::segmentation::domain::segmentation_provider::segment_registry;
use crate::segmentation::domain::transcript_segment::TranscriptSegment;

/// Label column of a CTM line.
const LABEL_FIELD: usize = 4;

/// Aligns a whole recording in one run of a `BatchAligner` and reads its
/// integer CTMs back as labels on the recording's time axis.
pub struct AlignBatchUseCase {
    aligner: Box<dyn BatchAligner>,
    symbols: IntegerLabels,
    phone_labels: PhoneLabelMap,
    logger: Box<dyn PipelineLogger>,
}

impl AlignBatchUseCase {
    /// `symbols` decode the ids the aligner writes; both tables are keyed
    /// by id.
    pub fn new(
        aligner: Box<dyn BatchAligner>,
        symbols: IntegerLabels,
        phone_labels: PhoneLabelMap,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            aligner,
            symbols,
            phone_labels,
            logger,
        }
    }

    /// Words come first, then phones, each in the order the aligner wrote
    /// them.
    pub fn execute(
        mut self,
        audio: &Path,
        segments: &[TranscriptSegment],
    ) -> Result<Vec<AlignedLabel>, Box<dyn std::error::Error>> {
        if segments.is_empty() {
            return Err("no segments to align".into());
        }

        let t0 = Instant::now();
        let ctm = self.aligner.align(audio, segments)?;
        self.logger
            .timing("align", t0.elapsed().as_secs_f64() * 1000.0);
        self.logger.progress(segments.len(), segments.len());

        let registry = segment_registry(segments);
        let reconstructor = TimeBaseReconstructor::new(&registry);
        let t0 = Instant::now();
        let words = read_ctm(&ctm.words, &self.symbols.words, &reconstructor)?;
        let phones = read_ctm(&ctm.phones, &self.symbols.phones, &reconstructor)?;
        self.logger
            .timing("rebase", t0.elapsed().as_secs_f64() * 1000.0);

        let (word_count, phone_count) = (words.len(), phones.len());
        let mut labels: Vec<AlignedLabel> = words
            .into_iter()
            .map(|record| aligned(LabelKind::Word, record))
            .collect();
        for mut record in phones {
            let Some(label) = record
                .label
                .as_deref()
                .and_then(|l| self.phone_labels.normalize(l))
            else {
                continue;
            };
            record.label = Some(label);
            labels.push(aligned(LabelKind::Phone, record));
        }

        self.logger.info(&format!(
            "Aligned {word_count} words and {phone_count} phones"
        ));
        self.logger.summary();
        Ok(labels)
    }
}

/// Symbol ids in the label column become labels, then segment times move
/// onto the recording axis.
fn read_ctm(
    path: &Path,
    symbols: &FieldRemapper,
    reconstructor: &TimeBaseReconstructor<'_>,
) -> Result<Vec<CtmRecord>, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| CtmError::file(path, e))?;
    let mut labelled = Vec::new();
    symbols.remap_stream(
        BufReader::new(file),
        &mut labelled,
        &FieldSelector::Indices(vec![LABEL_FIELD]),
    )?;

    let mut rebased = Vec::new();
    reconstructor.rebase_stream(Cursor::new(labelled), &mut rebased)?;
    Ok(String::from_utf8_lossy(&rebased)
        .lines()
        .filter_map(CtmRecord::parse)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::domain::batch_aligner::CtmFiles;
    use crate::alignment::domain::session_error::SessionError;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use approx::assert_relative_eq;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    // ─── Stubs ───

    /// Writes fixed integer CTMs and remembers which segments it was given.
    struct StubBatchAligner {
        dir: PathBuf,
        words: &'static str,
        phones: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl BatchAligner for StubBatchAligner {
        fn align(&self, _audio: &Path, segments: &[TranscriptSegment]) -> Result<CtmFiles, SessionError> {
            self.seen
                .lock()
                .unwrap()
                .extend(segments.iter().map(|s| s.id.clone()));
            let ctm = CtmFiles {
                words: self.dir.join("ctm.int"),
                phones: self.dir.join("phone_ctm.int"),
            };
            fs::write(&ctm.words, self.words)?;
            fs::write(&ctm.phones, self.phones)?;
            Ok(ctm)
        }
    }

    fn segment(id: &str, start: f64, end: f64) -> TranscriptSegment {
        TranscriptSegment {
            id: id.to_string(),
            recording: "rec".to_string(),
            text: "ala ma kota".to_string(),
            start,
            end,
        }
    }

    fn symbols() -> IntegerLabels {
        IntegerLabels {
            words: FieldRemapper::from_pairs(
                [("<eps>", "0"), ("ala", "1"), ("kota", "2"), ("ma", "3")],
                true,
            ),
            phones: FieldRemapper::from_pairs(
                [("sil", "1"), ("a_B", "2"), ("l_I", "3"), ("tS_E", "4")],
                true,
            ),
        }
    }

    fn use_case(
        dir: &Path,
        words: &'static str,
        phones: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    ) -> AlignBatchUseCase {
        let phone_labels = PhoneLabelMap::from_reader(Cursor::new("sil\ntS ts'\n")).unwrap();
        AlignBatchUseCase::new(
            Box::new(StubBatchAligner {
                dir: dir.to_path_buf(),
                words,
                phones,
                seen,
            }),
            symbols(),
            phone_labels,
            Box::new(NullPipelineLogger),
        )
    }

    #[test]
    fn test_ids_are_decoded_and_rebased() {
        let tmp = tempfile::tempdir().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let segments = [segment("s1", 1.5, 3.0), segment("s2", 4.0, 5.0)];

        let labels = use_case(
            tmp.path(),
            "s1 1 0.10 0.30 1\ns1 1 0.40 0.20 3\ns2 1 0.05 0.50 2\n",
            "s1 1 0.00 0.10 1\ns1 1 0.10 0.15 2\ns1 1 0.25 0.05 3\ns2 1 0.05 0.125 4\n",
            seen.clone(),
        )
        .execute(Path::new("rec.wav"), &segments)
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), ["s1", "s2"]);
        let rendered: Vec<String> = labels.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "w\t1.60\t0.30\tala",
                "w\t1.90\t0.20\tma",
                "w\t4.05\t0.50\tkota",
                "p\t1.60\t0.15\ta",
                "p\t1.75\t0.05\tl",
                "p\t4.05\t0.12\tts'",
            ]
        );
        assert_relative_eq!(labels[2].start, 4.05);
    }

    #[test]
    fn test_unknown_symbol_id_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = use_case(
            tmp.path(),
            "s1 1 0.10 0.30 9\n",
            "",
            Arc::new(Mutex::new(Vec::new())),
        )
        .execute(Path::new("rec.wav"), &[segment("s1", 0.0, 1.0)])
        .unwrap_err();
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn test_ctm_for_unknown_segment_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = use_case(
            tmp.path(),
            "s7 1 0.10 0.30 1\n",
            "",
            Arc::new(Mutex::new(Vec::new())),
        )
        .execute(Path::new("rec.wav"), &[segment("s1", 0.0, 1.0)])
        .unwrap_err();
        assert!(err.to_string().contains("s7"));
    }

    #[test]
    fn test_no_segments_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let result = use_case(tmp.path(), "", "", seen.clone()).execute(Path::new("rec.wav"), &[]);
        assert!(result.is_err());
        assert!(seen.lock().unwrap().is_empty());
    }
}
