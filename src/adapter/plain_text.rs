//! Plain-text adapter: manually annotated word-processor exports
//!
//! Layout of the source text:
//!
//! ```text
//! Le Menteur
//! DRAMATIC CHARACTERS
//! DORANTE
//! GUARDS3
//! ACT 1
//! SCENE 1
//! DORANTE
//! GUARDS NON_SPEAKING
//! SCENE 2*
//! ...
//! ```
//!
//! Speaking state is carried on the cast lines of each scene, so scene units
//! are produced with [`SpeechRecord::CastMarked`].

use super::traits::{AdapterInput, FormatAdapter, PlaySource};
use crate::cast::CastEntry;
use crate::config::{MarkupRules, PlainTextConfig};
use crate::error::{PlayError, PlayResult};
use crate::play::PlayMetadata;
use crate::scene::{ActUnit, SceneHint, SceneUnit, SpeechRecord};

pub const PLAIN_TEXT_KIND: &str = "plain_text";

pub struct PlainTextAdapter {
    config: PlainTextConfig,
    rules: MarkupRules,
}

impl PlainTextAdapter {
    pub fn new(config: PlainTextConfig, rules: MarkupRules) -> Self {
        Self { config, rules }
    }

    fn starts_with_keyword(line: &str, keyword: &str) -> bool {
        line.split_whitespace().next() == Some(keyword)
    }

    fn is_act_line(&self, line: &str) -> bool {
        Self::starts_with_keyword(line, &self.config.act_marker)
    }

    fn is_scene_line(&self, line: &str) -> bool {
        Self::starts_with_keyword(line, &self.config.scene_marker)
    }

    /// Extract the play from the raw text
    pub fn parse_text(&self, text: &str) -> PlayResult<PlaySource> {
        let lines: Vec<&str> = text.lines().collect();
        let heading = lines
            .iter()
            .position(|l| l.trim() == self.config.cast_heading)
            .ok_or_else(|| {
                PlayError::data_format(format!("missing cast heading '{}'", self.config.cast_heading))
            })?;

        let title = lines[..heading]
            .iter()
            .find(|l| !self.rules.is_noise(l))
            .map(|l| l.trim().to_string());

        let first_act = lines[heading + 1..]
            .iter()
            .position(|l| self.is_act_line(l))
            .map(|offset| heading + 1 + offset)
            .unwrap_or(lines.len());

        let cast = lines[heading + 1..first_act]
            .iter()
            .filter(|l| !self.rules.is_noise(l))
            .map(|l| self.rules.strip_decorations(l))
            .filter(|name| !name.is_empty())
            .map(CastEntry::new)
            .collect();

        let mut acts: Vec<ActUnit> = Vec::new();
        let mut act_lines: Vec<&str> = Vec::new();
        for line in &lines[first_act..] {
            if self.is_act_line(line) {
                if !act_lines.is_empty() || !acts.is_empty() {
                    acts.push(self.parse_act(&act_lines));
                }
                act_lines.clear();
            } else {
                act_lines.push(line);
            }
        }
        if first_act < lines.len() {
            acts.push(self.parse_act(&act_lines));
        }

        tracing::debug!(acts = acts.len(), "plain-text play split into acts");

        Ok(PlaySource {
            metadata: PlayMetadata {
                title,
                ..Default::default()
            },
            cast,
            acts,
        })
    }

    /// Split one act into scene units; lines before the first scene line are dropped
    fn parse_act(&self, lines: &[&str]) -> ActUnit {
        let mut scenes = Vec::new();
        let mut current: Option<(String, Vec<String>)> = None;
        let mut awaiting_marker = false;

        for line in lines {
            if self.is_scene_line(line) {
                if let Some((marker, cast)) = current.take() {
                    scenes.push(self.unit(marker, cast));
                }
                let marker = line.trim_start()[self.config.scene_marker.len()..].trim();
                awaiting_marker = marker.is_empty();
                current = Some((marker.to_string(), Vec::new()));
                continue;
            }

            let Some((marker, cast)) = current.as_mut() else {
                continue;
            };
            if self.rules.is_noise(line) {
                continue;
            }
            if awaiting_marker {
                awaiting_marker = false;
                if self.rules.numeric_marker(line).is_some() {
                    *marker = line.trim().to_string();
                    continue;
                }
            }
            cast.push(line.trim().to_string());
        }

        if let Some((marker, cast)) = current {
            scenes.push(self.unit(marker, cast));
        }
        ActUnit::new(scenes)
    }

    fn unit(&self, marker: String, cast: Vec<String>) -> SceneUnit {
        SceneUnit::new(SceneHint::Marker(marker), cast, SpeechRecord::CastMarked)
    }
}

impl Default for PlainTextAdapter {
    fn default() -> Self {
        Self::new(PlainTextConfig::default(), MarkupRules::default())
    }
}

impl FormatAdapter for PlainTextAdapter {
    fn id(&self) -> &str {
        "plain-text-adapter"
    }

    fn input_kind(&self) -> &str {
        PLAIN_TEXT_KIND
    }

    fn file_extension(&self) -> &str {
        "txt"
    }

    fn load(&self, content: String, source_id: &str) -> PlayResult<AdapterInput> {
        Ok(AdapterInput::new(PLAIN_TEXT_KIND, content, source_id))
    }

    fn parse(&self, input: &AdapterInput) -> PlayResult<PlaySource> {
        let text = input
            .downcast_data::<String>()
            .ok_or_else(|| PlayError::InvalidInput("plain-text adapter expects a String payload".into()))?;
        self.parse_text(text)
    }
}
