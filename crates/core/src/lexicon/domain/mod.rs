pub mod disambiguator;
pub mod fst_materializer;
pub mod g2p_oracle;
pub mod lexicon_compiler;
pub mod lexicon_entry;
pub mod lexicon_error;
pub mod lexicon_fst;
pub mod phone_inventory;
pub mod phone_set;
pub mod positional_tagger;
pub mod pronunciation_dictionary;
pub mod symbol_table;
pub mod transcription;
pub mod word_boundary;
