//! Speaker resolver and utterance counter

use super::statistics::build_tally;
use super::{SceneTally, SpeakingState, TallyEntry};
use crate::cast::{CharacterId, CharacterRegistry};
use crate::config::{MarkupRules, MetricsConfig};
use crate::error::{PlayError, PlayResult};
use crate::scene::{Scene, SpeechRecord};
use crate::token::{split_compound, Token};
use std::collections::HashMap;

/// Resolves a scene's raw tokens against the registry and tallies utterances
pub struct SpeakerResolver<'a> {
    registry: &'a CharacterRegistry,
    rules: &'a MarkupRules,
    metrics: &'a MetricsConfig,
}

/// A declared cast member after normalization
#[derive(Debug, Clone, Copy)]
struct Declared {
    character: CharacterId,
    silent: bool,
}

impl<'a> SpeakerResolver<'a> {
    pub fn new(
        registry: &'a CharacterRegistry,
        rules: &'a MarkupRules,
        metrics: &'a MetricsConfig,
    ) -> Self {
        Self {
            registry,
            rules,
            metrics,
        }
    }

    fn resolve(&self, name: &str, location: &str) -> PlayResult<CharacterId> {
        self.registry
            .resolve(name)
            .ok_or_else(|| PlayError::unresolved(name, location))
    }

    /// Declared cast in listing order, duplicates merged (speaking wins)
    fn declared_cast(&self, scene: &Scene, location: &str) -> PlayResult<Vec<Declared>> {
        let mut declared: Vec<Declared> = Vec::new();
        for raw in &scene.cast {
            let Token::Reference { name, silent } = self.rules.classify_cast_line(raw) else {
                continue;
            };
            let character = self.resolve(&name, location)?;
            match declared.iter_mut().find(|d| d.character == character) {
                Some(existing) => existing.silent &= silent,
                None => declared.push(Declared { character, silent }),
            }
        }
        Ok(declared)
    }

    /// Tally one scene of act `act`
    ///
    /// Fails on the first token that names no registered character.
    /// Speakers missing from a non-empty declared cast are still counted as
    /// present and listed in [`SceneTally::undeclared`].
    pub fn tally(&self, act: usize, scene: &Scene) -> PlayResult<SceneTally> {
        let location = format!("act {} scene {}", act, scene.key());
        let declared = self.declared_cast(scene, &location)?;
        let mut undeclared = Vec::new();

        let (entries, num_utterances) = match &scene.speech {
            SpeechRecord::CastMarked => {
                let entries = declared
                    .iter()
                    .map(|d| TallyEntry {
                        character: d.character,
                        state: if d.silent {
                            SpeakingState::NonSpeaking
                        } else {
                            SpeakingState::Speaking
                        },
                        utterances: None,
                    })
                    .collect();
                (entries, None)
            }
            SpeechRecord::Utterances(references) => {
                let mut counts: HashMap<CharacterId, usize> = HashMap::new();
                let mut first_seen: Vec<CharacterId> = Vec::new();
                let mut total = 0;

                for reference in references {
                    for part in split_compound(reference) {
                        let Token::Reference { name, .. } = self.rules.classify_speaker(part) else {
                            continue;
                        };
                        let character = self.resolve(&name, &location)?;
                        let count = counts.entry(character).or_insert(0);
                        if *count == 0 {
                            first_seen.push(character);
                        }
                        *count += 1;
                        total += 1;
                    }
                }

                let mut entries: Vec<TallyEntry> = declared
                    .iter()
                    .map(|d| {
                        let utterances = counts.get(&d.character).copied().unwrap_or(0);
                        TallyEntry {
                            character: d.character,
                            state: if utterances > 0 {
                                SpeakingState::Speaking
                            } else {
                                SpeakingState::NonSpeaking
                            },
                            utterances: Some(utterances),
                        }
                    })
                    .collect();

                for character in first_seen {
                    if declared.iter().any(|d| d.character == character) {
                        continue;
                    }
                    if declared.is_empty() {
                        tracing::debug!(
                            %location,
                            character = self.registry.name(character),
                            "no declared cast, speaker inferred"
                        );
                    } else {
                        undeclared.push(character);
                    }
                    entries.push(TallyEntry {
                        character,
                        state: SpeakingState::Speaking,
                        utterances: counts.get(&character).copied(),
                    });
                }

                (entries, Some(total))
            }
        };

        let mut tally = build_tally(entries, num_utterances, self.metrics);
        tally.undeclared = undeclared;
        Ok(tally)
    }
}
