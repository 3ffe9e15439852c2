use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    DEFAULT_G2P_NBEST, DEFAULT_G2P_PMASS, DEFAULT_OOV_WORD, DEFAULT_SILENCE_PROBABILITY,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Decoder parameters passed to the aligner at startup.
///
/// `self_loop_scale` is independent of `acoustic_scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerSettings {
    pub transition_scale: f64,
    pub acoustic_scale: f64,
    pub self_loop_scale: f64,
    pub beam: u32,
    pub retry_beam: u32,
    pub careful: bool,
}

impl Default for AlignerSettings {
    fn default() -> Self {
        Self {
            transition_scale: 1.0,
            acoustic_scale: 0.1,
            self_loop_scale: 0.1,
            beam: 20,
            retry_beam: 300,
            careful: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct G2pSettings {
    pub nbest: u32,
    pub pmass: f64,
}

impl Default for G2pSettings {
    fn default() -> Self {
        Self {
            nbest: DEFAULT_G2P_NBEST,
            pmass: DEFAULT_G2P_PMASS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconSettings {
    pub oov_word: String,
    pub silence_probability: f64,
}

impl Default for LexiconSettings {
    fn default() -> Self {
        Self {
            oov_word: DEFAULT_OOV_WORD.to_string(),
            silence_probability: DEFAULT_SILENCE_PROBABILITY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// The aligner reports symbol ids instead of labels.
    pub integer_labels: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub aligner: AlignerSettings,
    pub g2p: G2pSettings,
    pub lexicon: LexiconSettings,
    pub output: OutputSettings,
}

impl Settings {
    /// `<config dir>/lexalign/settings.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lexalign").join("settings.json"))
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// An explicit path must load; the platform default is used only if it exists.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}
