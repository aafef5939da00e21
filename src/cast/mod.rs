//! Cast resolver: the canonical character registry of a play
//!
//! The registry is built once from the cast list and only read afterwards.
//! Characters live in an arena indexed by [`CharacterId`]; every raw token
//! that may name a character (canonical name, the label as printed, any
//! alternative id) maps to one id.

use crate::error::{PlayError, PlayResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a character in its play's registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(usize);

impl CharacterId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One line of the raw cast list, as produced by a format adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastEntry {
    /// Name as printed; a trailing digit run denotes a collective role
    pub name: String,
    /// Other ids the markup uses for this character
    #[serde(default)]
    pub alternative_ids: Vec<String>,
}

impl CastEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alternative_ids: Vec::new(),
        }
    }

    pub fn with_alternative_id(mut self, id: impl Into<String>) -> Self {
        self.alternative_ids.push(id.into());
        self
    }
}

/// A canonical character
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    pub name: String,
    /// Number of people behind a collective role ("three murderers")
    pub collective_number: Option<u32>,
    #[serde(skip)]
    pub alternative_ids: Vec<String>,
}

/// Split a printed cast name into the canonical name and its collective number
///
/// `"KING3"` becomes `("KING", Some(3))`, `"GUARDS 2"` becomes `("GUARDS", Some(2))`.
pub fn split_collective(label: &str) -> PlayResult<(String, Option<u32>)> {
    let label = label.trim();
    let digits_start = label
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    let Some(start) = digits_start else {
        return Ok((label.to_string(), None));
    };

    let name = label[..start].trim();
    if name.is_empty() {
        return Err(PlayError::data_format(format!(
            "cast entry '{}' has no name",
            label
        )));
    }
    let number: u32 = label[start..].parse().map_err(|_| {
        PlayError::data_format(format!("collective number of '{}' is out of range", label))
    })?;
    if number == 0 {
        return Err(PlayError::data_format(format!(
            "collective number of '{}' must be positive",
            label
        )));
    }

    Ok((name.to_string(), Some(number)))
}

/// Immutable lookup table from raw tokens to canonical characters
#[derive(Debug, Clone, Default)]
pub struct CharacterRegistry {
    characters: Vec<Character>,
    by_token: HashMap<String, CharacterId>,
    /// Lower-cased tokens; `None` when two characters fold to the same key
    by_folded: HashMap<String, Option<CharacterId>>,
}

impl CharacterRegistry {
    /// Build the registry from a cast list
    ///
    /// Entries sharing a canonical name are merged; they must agree on the
    /// collective number.
    pub fn from_cast(entries: &[CastEntry]) -> PlayResult<Self> {
        let mut registry = Self::default();
        let mut by_name: HashMap<String, CharacterId> = HashMap::new();

        for entry in entries {
            let (name, collective_number) = split_collective(&entry.name)?;

            let id = match by_name.get(&name) {
                Some(&id) => {
                    let existing = &mut registry.characters[id.0];
                    if existing.collective_number != collective_number {
                        return Err(PlayError::data_format(format!(
                            "character '{}' listed with conflicting collective numbers {:?} and {:?}",
                            name, existing.collective_number, collective_number
                        )));
                    }
                    for alt in &entry.alternative_ids {
                        if !existing.alternative_ids.contains(alt) {
                            existing.alternative_ids.push(alt.clone());
                        }
                    }
                    id
                }
                None => {
                    let id = CharacterId(registry.characters.len());
                    registry.characters.push(Character {
                        name: name.clone(),
                        collective_number,
                        alternative_ids: entry.alternative_ids.clone(),
                    });
                    by_name.insert(name.clone(), id);
                    id
                }
            };

            registry.bind(&name, id)?;
            registry.bind(entry.name.trim(), id)?;
            for alt in &entry.alternative_ids {
                registry.bind(alt, id)?;
            }
        }

        Ok(registry)
    }

    /// Build the registry from bare printed labels
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> PlayResult<Self> {
        let entries: Vec<CastEntry> = labels.iter().map(|l| CastEntry::new(l.as_ref())).collect();
        Self::from_cast(&entries)
    }

    fn bind(&mut self, token: &str, id: CharacterId) -> PlayResult<()> {
        if let Some(&other) = self.by_token.get(token) {
            if other != id {
                return Err(PlayError::data_format(format!(
                    "token '{}' names both '{}' and '{}'",
                    token, self.characters[other.0].name, self.characters[id.0].name
                )));
            }
            return Ok(());
        }
        self.by_token.insert(token.to_string(), id);

        self.by_folded
            .entry(token.to_lowercase())
            .and_modify(|slot| {
                if *slot != Some(id) {
                    *slot = None;
                }
            })
            .or_insert(Some(id));
        Ok(())
    }

    /// Resolve a raw token: exact match first, then case-insensitive
    pub fn resolve(&self, token: &str) -> Option<CharacterId> {
        self.by_token
            .get(token)
            .copied()
            .or_else(|| self.by_folded.get(&token.to_lowercase()).copied().flatten())
    }

    pub fn get(&self, id: CharacterId) -> &Character {
        &self.characters[id.0]
    }

    pub fn name(&self, id: CharacterId) -> &str {
        &self.characters[id.0].name
    }

    /// Characters in cast-list order
    pub fn iter(&self) -> impl Iterator<Item = (CharacterId, &Character)> {
        self.characters
            .iter()
            .enumerate()
            .map(|(i, c)| (CharacterId(i), c))
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        id.0 < self.characters.len()
    }
}
