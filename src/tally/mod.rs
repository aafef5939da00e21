//! Per-scene tallies: who is on stage, who speaks, and how often
//!
//! - [`SpeakerResolver`] maps raw tokens to characters and counts utterances
//! - [`statistics`] derives speaker counts and the non-speaker percentage,
//!   and reclassifies scenes whose cast carries over unchanged

mod resolver;
pub mod statistics;

pub use resolver::SpeakerResolver;

use crate::cast::CharacterId;
use crate::metric::Metric;
use serde::Serialize;
use std::collections::BTreeSet;

/// Whether a present character speaks in a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakingState {
    Speaking,
    NonSpeaking,
}

/// One present character in a scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyEntry {
    pub character: CharacterId,
    pub state: SpeakingState,
    /// `None` when the source does not record individual utterances
    pub utterances: Option<usize>,
}

/// Derived counts for one scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTally {
    /// Present characters: declared cast first, then undeclared speakers
    pub entries: Vec<TallyEntry>,
    pub num_speakers: usize,
    pub num_utterances: Option<usize>,
    /// Rounded for reporting
    pub perc_non_speakers: Metric,
    /// Speakers missing from a non-empty declared cast, in order of first utterance
    pub undeclared: Vec<CharacterId>,
}

impl SceneTally {
    pub fn present_count(&self) -> usize {
        self.entries.len()
    }

    pub fn non_speaker_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state == SpeakingState::NonSpeaking)
            .count()
    }

    /// Unrounded non-speaker percentage
    pub fn raw_perc_non_speakers(&self) -> Metric {
        Metric::percentage(self.non_speaker_count(), self.present_count())
    }

    pub fn present_set(&self) -> BTreeSet<CharacterId> {
        self.entries.iter().map(|e| e.character).collect()
    }

    pub fn state_of(&self, character: CharacterId) -> Option<SpeakingState> {
        self.entries
            .iter()
            .find(|e| e.character == character)
            .map(|e| e.state)
    }

    pub fn utterances_of(&self, character: CharacterId) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.character == character)
            .and_then(|e| e.utterances)
    }
}
