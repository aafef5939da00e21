//! Engine configuration
//!
//! Every section falls back to defaults that match the markup convention of
//! the annotated corpus, so an empty YAML file is a valid configuration.

use crate::error::PlayResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the engine, adapters and batch driver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub markup: MarkupRules,
    pub plain_text: PlainTextConfig,
    pub tei: TeiConfig,
    pub metrics: MetricsConfig,
    pub batch: BatchConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> PlayResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> PlayResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Resolve configuration: explicit path, then the user config file, then defaults
    pub fn load(explicit: Option<&Path>) -> PlayResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading user config");
                Self::from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// `<config_dir>/iarkho/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("iarkho").join("config.yaml"))
}

/// Token-level markup conventions shared by both source families
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupRules {
    /// Lines or tokens that carry no information
    pub noise_tokens: Vec<String>,
    /// Symbols trimmed from the edges of character tokens
    pub decorative_symbols: Vec<char>,
    /// Suffix flagging a declared character as silent
    pub non_speaking_marker: String,
    /// Symbol following a scene number when the cast is carried over
    pub no_change_symbol: char,
}

impl Default for MarkupRules {
    fn default() -> Self {
        Self {
            noise_tokens: ["", " ", "\u{a0}", "-", "–", "/"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            decorative_symbols: vec!['-', '–', '*', '/', '#'],
            non_speaking_marker: "NON_SPEAKING".to_string(),
            no_change_symbol: '*',
        }
    }
}

/// Structural keywords of the plain-text family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainTextConfig {
    pub cast_heading: String,
    pub act_marker: String,
    pub scene_marker: String,
}

impl Default for PlainTextConfig {
    fn default() -> Self {
        Self {
            cast_heading: "DRAMATIC CHARACTERS".to_string(),
            act_marker: "ACT".to_string(),
            scene_marker: "SCENE".to_string(),
        }
    }
}

/// Element conventions of the TEI family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeiConfig {
    /// `type` attribute of the `stage` element listing a scene's cast
    pub cast_stage_type: String,
    /// Separator between a cast name and its disambiguating suffix in `xml:id`
    pub id_separator: char,
}

impl Default for TeiConfig {
    fn default() -> Self {
        Self {
            cast_stage_type: "cast".to_string(),
            id_separator: '_',
        }
    }
}

/// Rounding applied to reported statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub percentage_decimals: u32,
    pub sigma_decimals: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            percentage_decimals: 1,
            sigma_decimals: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Plays processed concurrently by the batch driver
    pub max_concurrent_plays: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_plays: 4,
        }
    }
}
