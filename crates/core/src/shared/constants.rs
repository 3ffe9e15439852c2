/// Audio format the acoustic model was trained on.
pub const SAMPLE_RATE: u32 = 16000;
pub const BITS_PER_SAMPLE: u16 = 16;
pub const CHANNELS: u16 = 1;

pub const DEFAULT_OOV_WORD: &str = "<unk>";
pub const EPSILON: &str = "<eps>";
pub const WORD_DISAMBIG: &str = "#0";
pub const SENTENCE_START: &str = "<s>";
pub const SENTENCE_END: &str = "</s>";

/// Polish SAMPA inventory.
pub const NONSILENCE_PHONES: &[&str] = &[
    "I", "S", "Z", "a", "b", "d", "dZ", "dz", "dzi", "e", "en", "f", "g", "i", "j", "k", "l", "m",
    "n", "ni", "o", "on", "p", "r", "s", "si", "t", "tS", "ts", "tsi", "u", "v", "w", "x", "z",
    "zi",
];
pub const SILENCE_PHONES: &[&str] = &["sil", "spn"];
pub const OPTIONAL_SILENCE: &str = "sil";
/// Pronunciation given to the OOV placeholder word.
pub const SPOKEN_NOISE: &str = "spn";

pub const DEFAULT_SILENCE_PROBABILITY: f64 = 0.5;
pub const DEFAULT_G2P_NBEST: u32 = 10;
pub const DEFAULT_G2P_PMASS: f64 = 0.8;

pub const G2P_PROGRAM: &str = "phonetisaurus-g2pfst";
pub const FSTCOMPILE_PROGRAM: &str = "fstcompile";
pub const FSTARCSORT_PROGRAM: &str = "fstarcsort";
pub const ALIGN_PIPE_PROGRAM: &str = "gmm-align-pipe";

pub const EXTRACT_SEGMENTS_PROGRAM: &str = "extract-segments";
pub const COMPUTE_MFCC_PROGRAM: &str = "compute-mfcc-feats";
pub const COMPUTE_CMVN_PROGRAM: &str = "compute-cmvn-stats";
pub const GMM_ALIGN_PROGRAM: &str = "gmm-align";
pub const NBEST_TO_CTM_PROGRAM: &str = "nbest-to-ctm";
pub const PHONE_LATTICE_PROGRAM: &str = "lattice-to-phone-lattice";
/// Started by `gmm-align` from its feature and output pipelines, so they
/// are resolved through `PATH`.
pub const PIPELINE_PROGRAMS: &[&str] = &[
    "apply-cmvn",
    "splice-feats",
    "transform-feats",
    "linear-to-nbest",
    "lattice-align-words",
];
/// Seconds per feature frame.
pub const FRAME_SHIFT: f64 = 0.01;

/// First line the aligner prints once its models are loaded.
pub const READY_TOKEN: &str = "RDY";

pub const MODEL_DIR: &str = "model";
pub const LDA_MATRIX_FILE: &str = "final.mat";
pub const ACOUSTIC_MODEL_FILE: &str = "final.mdl";
pub const TREE_FILE: &str = "tree";
pub const G2P_DIR: &str = "g2p";
pub const G2P_MODEL_FILE: &str = "model.fst";
pub const G2P_LEXICON_FILE: &str = "lexicon.txt";
pub const CUSTOM_PHONES_FILE: &str = "custom_phones.txt";

/// Recording name used when a whole file is aligned as one utterance.
pub const DEFAULT_RECORDING: &str = "input";
pub const CTM_CHANNEL: &str = "1";
