//! Scene-level types shared by the format adapters and the engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a scene relates to the published scene division
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneStatus {
    /// As published
    Regular,
    /// Carries over the previous scene's cast unchanged
    NoChange,
    /// Inserted to mark an entrance or exit inside a published scene
    Extra,
}

impl SceneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::NoChange => "no_change",
            Self::Extra => "extra",
        }
    }
}

impl fmt::Display for SceneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a scene within its act
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SceneOrdinal {
    /// Regular and no-change scenes share one counter per act
    Numbered(u32),
    /// Inserted scene `anchor.index`, anchored to the preceding numbered scene
    Inserted { anchor: u32, index: u32 },
}

impl fmt::Display for SceneOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numbered(n) => write!(f, "{}", n),
            Self::Inserted { anchor, index } => write!(f, "{}.{}", anchor, index),
        }
    }
}

/// Classification hint attached to a scene unit by its adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneHint {
    /// Leading boundary marker of a plain-text unit (`"3"`, `"3*"`, `"–"`, `""`)
    Marker(String),
    /// Explicit scene-type attribute of a TEI unit (`"scene"`, `"extra_scene"`)
    Typed(String),
}

/// What a unit records about who speaks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechRecord {
    /// Raw speaker references, one per utterance, in order of occurrence
    Utterances(Vec<String>),
    /// Speaking state is carried on the declared-cast tokens; no utterance counts
    CastMarked,
}

/// A scene-sized unit isolated by a format adapter, not yet classified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneUnit {
    pub hint: SceneHint,
    /// Declared cast tokens, speaking or not
    pub cast: Vec<String>,
    pub speech: SpeechRecord,
}

impl SceneUnit {
    pub fn new(hint: SceneHint, cast: Vec<String>, speech: SpeechRecord) -> Self {
        Self { hint, cast, speech }
    }
}

/// An act as a sequence of scene units
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActUnit {
    pub scenes: Vec<SceneUnit>,
}

impl ActUnit {
    pub fn new(scenes: Vec<SceneUnit>) -> Self {
        Self { scenes }
    }
}

/// A classified and numbered scene, still holding raw tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub ordinal: SceneOrdinal,
    pub status: SceneStatus,
    pub cast: Vec<String>,
    pub speech: SpeechRecord,
}

impl Scene {
    /// Output key, e.g. `"3_regular"`, `"2.1_extra"`
    pub fn key(&self) -> String {
        scene_key(self.ordinal, self.status)
    }
}

pub fn scene_key(ordinal: SceneOrdinal, status: SceneStatus) -> String {
    format!("{}_{}", ordinal, status)
}
