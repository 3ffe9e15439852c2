pub mod kaldi_segments_provider;
pub mod single_utterance_provider;
