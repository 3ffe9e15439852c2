pub mod kaldi_fst_materializer;
pub mod lang_directory;
pub mod phonetisaurus_g2p;
