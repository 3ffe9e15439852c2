pub mod gmm_align_pipe;
pub mod kaldi_batch_aligner;
