//! The structural model of a processed play and its output shape
//!
//! Serialization keeps source order everywhere (cast list, acts, scenes,
//! characters within a scene) so identical input yields identical bytes.

use crate::cast::CharacterRegistry;
use crate::diagnostics::Diagnostic;
use crate::error::PlayResult;
use crate::iarkho::IarkhoStats;
use crate::scene::{scene_key, SceneOrdinal, SceneStatus};
use crate::tally::SceneTally;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Descriptive metadata passed through from the source or a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creation_date: Option<String>,
}

impl PlayMetadata {
    /// Fill fields from `other` where it has a value
    pub fn overridden_by(mut self, other: &PlayMetadata) -> Self {
        if other.title.is_some() {
            self.title = other.title.clone();
        }
        if other.author.is_some() {
            self.author = other.author.clone();
        }
        if other.creation_date.is_some() {
            self.creation_date = other.creation_date.clone();
        }
        self
    }
}

/// A tallied scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRecord {
    pub ordinal: SceneOrdinal,
    pub status: SceneStatus,
    pub tally: SceneTally,
}

impl SceneRecord {
    pub fn key(&self) -> String {
        scene_key(self.ordinal, self.status)
    }
}

/// An act: 1-based number and its tallied scenes in order
#[derive(Debug, Clone, PartialEq)]
pub struct Act {
    pub number: usize,
    pub scenes: Vec<SceneRecord>,
}

/// A fully processed play
#[derive(Debug, Clone)]
pub struct Play {
    pub metadata: PlayMetadata,
    pub registry: CharacterRegistry,
    pub acts: Vec<Act>,
    pub stats: IarkhoStats,
    pub diagnostics: Vec<Diagnostic>,
}

impl Play {
    /// All scenes in play order with their act number
    pub fn scenes(&self) -> impl Iterator<Item = (usize, &SceneRecord)> {
        self.acts
            .iter()
            .flat_map(|act| act.scenes.iter().map(move |s| (act.number, s)))
    }

    pub fn to_json_pretty(&self) -> PlayResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for Play {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry("title", &self.metadata.title)?;
        map.serialize_entry("author", &self.metadata.author)?;
        map.serialize_entry("creation_date", &self.metadata.creation_date)?;
        map.serialize_entry("characters", &CharactersView(&self.registry))?;
        map.serialize_entry(
            "play_summary",
            &SummaryView {
                acts: &self.acts,
                registry: &self.registry,
            },
        )?;
        map.serialize_entry("metadata", &self.stats)?;
        map.serialize_entry("warnings", &self.diagnostics)?;
        map.end()
    }
}

#[derive(Serialize)]
struct CharacterView {
    collective_number: Option<u32>,
}

struct CharactersView<'a>(&'a CharacterRegistry);

impl Serialize for CharactersView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (_, character) in self.0.iter() {
            map.serialize_entry(
                &character.name,
                &CharacterView {
                    collective_number: character.collective_number,
                },
            )?;
        }
        map.end()
    }
}

struct SummaryView<'a> {
    acts: &'a [Act],
    registry: &'a CharacterRegistry,
}

impl Serialize for SummaryView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.acts.len()))?;
        for act in self.acts {
            map.serialize_entry(
                &format!("act_{}", act.number),
                &ActView {
                    act,
                    registry: self.registry,
                },
            )?;
        }
        map.end()
    }
}

struct ActView<'a> {
    act: &'a Act,
    registry: &'a CharacterRegistry,
}

impl Serialize for ActView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.act.scenes.len()))?;
        for scene in &self.act.scenes {
            map.serialize_entry(
                &scene.key(),
                &SceneView {
                    tally: &scene.tally,
                    registry: self.registry,
                },
            )?;
        }
        map.end()
    }
}

struct SceneView<'a> {
    tally: &'a SceneTally,
    registry: &'a CharacterRegistry,
}

impl Serialize for SceneView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tally.entries.len() + 3))?;
        for entry in &self.tally.entries {
            map.serialize_entry(self.registry.name(entry.character), &entry.state)?;
        }
        map.serialize_entry("num_speakers", &self.tally.num_speakers)?;
        map.serialize_entry("perc_non_speakers", &self.tally.perc_non_speakers)?;
        map.serialize_entry("num_utterances", &self.tally.num_utterances)?;
        map.end()
    }
}
