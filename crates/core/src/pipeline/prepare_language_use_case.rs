use std::time::Instant;

use crate::lexicon::domain::disambiguator::disambiguation_symbol;
use crate::lexicon::domain::fst_materializer::FstMaterializer;
use crate::lexicon::domain::lexicon_compiler::{CompiledLexicon, LexiconCompiler};
use crate::lexicon::domain::lexicon_fst::LexiconFst;
use crate::lexicon::domain::transcription::Transcription;
use crate::lexicon::infrastructure::lang_directory::LangDirectory;
use crate::pipeline::pipeline_logger::PipelineLogger;

/// Compiles a word list into a complete language directory, including the
/// two lexicon transducers.
pub struct PrepareLanguageUseCase {
    compiler: LexiconCompiler,
    materializer: Box<dyn FstMaterializer>,
    silence_probability: f64,
    logger: Box<dyn PipelineLogger>,
}

impl PrepareLanguageUseCase {
    pub fn new(
        compiler: LexiconCompiler,
        materializer: Box<dyn FstMaterializer>,
        silence_probability: f64,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            compiler,
            materializer,
            silence_probability,
            logger,
        }
    }

    /// `words` need not be sorted or unique. When `transcription` is given
    /// its integer form is written as `trans.int`.
    pub fn execute(
        &mut self,
        words: &[String],
        transcription: Option<&Transcription>,
        lang: &LangDirectory,
    ) -> Result<CompiledLexicon, Box<dyn std::error::Error>> {
        let t0 = Instant::now();
        let lexicon = self.compiler.compile(words)?;
        self.logger
            .timing("compile", t0.elapsed().as_secs_f64() * 1000.0);
        self.logger.info(&format!(
            "Compiled {} pronunciations for {} words",
            lexicon.entries.len(),
            lexicon.words.len()
        ));

        let optional_silence = lexicon.phone_set.optional_silence();
        let fst = LexiconFst::new(&lexicon.entries, self.silence_probability, optional_silence)?;

        let t0 = Instant::now();
        lang.write(&lexicon, transcription)?;
        self.logger
            .timing("write", t0.elapsed().as_secs_f64() * 1000.0);

        let t0 = Instant::now();
        self.materializer
            .materialize(&fst, &lexicon.phones, &lexicon.words, &lang.lexicon_fst())?;

        let silence_symbol = disambiguation_symbol(lexicon.disambiguation.silence_symbol);
        let fst = fst.with_silence_disambig(silence_symbol);
        self.materializer.materialize(
            &fst,
            &lexicon.phones,
            &lexicon.words,
            &lang.lexicon_disambig_fst(),
        )?;
        self.logger
            .timing("materialize", t0.elapsed().as_secs_f64() * 1000.0);

        self.logger.info(&format!(
            "Language directory written to {}",
            lang.root().display()
        ));
        self.logger.summary();
        Ok(lexicon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::domain::g2p_oracle::{G2pOracle, G2pPredictions};
    use crate::lexicon::domain::lexicon_error::LexiconError;
    use crate::lexicon::domain::phone_set::PhoneSet;
    use crate::lexicon::domain::pronunciation_dictionary::PronunciationDictionary;
    use crate::lexicon::domain::symbol_table::SymbolTable;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    // ─── Stubs ───

    struct StubOracle;

    impl G2pOracle for StubOracle {
        fn predict(&self, words: &[String]) -> Result<G2pPredictions, LexiconError> {
            Ok(words
                .iter()
                .map(|w| (w.clone(), vec![vec!["m".to_string(), "a".to_string()]]))
                .collect())
        }
    }

    /// Writes the transducer text so tests can inspect it.
    struct TextMaterializer {
        outputs: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl FstMaterializer for TextMaterializer {
        fn materialize(
            &self,
            fst: &LexiconFst<'_>,
            _phones: &SymbolTable,
            _words: &SymbolTable,
            output: &Path,
        ) -> Result<(), LexiconError> {
            fs::write(output, fst.to_text()).map_err(|e| LexiconError::io(output, e))?;
            self.outputs.lock().unwrap().push(output.to_path_buf());
            Ok(())
        }
    }

    fn use_case(outputs: Arc<Mutex<Vec<PathBuf>>>, silence_probability: f64) -> PrepareLanguageUseCase {
        let phone_set = PhoneSet::new(["sil", "spn"], ["a", "l", "m"], "sil", "spn").unwrap();
        let mut dict = PronunciationDictionary::new();
        dict.insert("ala", vec!["a".into(), "l".into(), "a".into()]);
        let compiler = LexiconCompiler::new(phone_set, dict, Box::new(StubOracle), "<unk>");
        PrepareLanguageUseCase::new(
            compiler,
            Box::new(TextMaterializer { outputs }),
            silence_probability,
            Box::new(NullPipelineLogger),
        )
    }

    #[test]
    fn test_writes_directory_and_both_transducers() {
        let tmp = tempfile::tempdir().unwrap();
        let lang = LangDirectory::new(tmp.path());
        let outputs = Arc::new(Mutex::new(Vec::new()));
        let mut uc = use_case(outputs.clone(), 0.5);

        let mut transcription = Transcription::new();
        transcription.insert("input", vec!["ma".into(), "ala".into()]);
        let words = transcription.word_list();
        let lexicon = uc.execute(&words, Some(&transcription), &lang).unwrap();

        assert_eq!(lexicon.words.id("ma"), Some(3));
        assert_eq!(
            *outputs.lock().unwrap(),
            vec![lang.lexicon_fst(), lang.lexicon_disambig_fst()]
        );
        assert!(lang.phones_table().exists());
        assert_eq!(fs::read_to_string(lang.trans_int()).unwrap(), "input 3 2\n");

        let plain = fs::read_to_string(lang.lexicon_fst()).unwrap();
        let disambig = fs::read_to_string(lang.lexicon_disambig_fst()).unwrap();
        let silence_symbol = disambiguation_symbol(lexicon.disambiguation.silence_symbol);
        assert!(!plain.contains(&silence_symbol));
        assert!(disambig.contains(&format!("\t{silence_symbol}\t<eps>\t")));
    }

    #[test]
    fn test_invalid_silence_probability_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let lang = LangDirectory::new(tmp.path());
        let outputs = Arc::new(Mutex::new(Vec::new()));
        let mut uc = use_case(outputs.clone(), 1.0);

        let err = uc
            .execute(&["ala".to_string()], None, &lang)
            .unwrap_err();
        assert!(err.to_string().contains("silence probability"));
        assert!(outputs.lock().unwrap().is_empty());
        assert!(!lang.phones_table().exists());
    }
}
