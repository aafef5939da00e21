//! Scene segmenter and classifier
//!
//! Turns an act's scene units into numbered scenes with an initial status.
//! Regular and no-change scenes advance one counter; inserted scenes are
//! numbered `<last numbered>.<index>`, the index restarting after every
//! numbered scene. An act's opening scene is never no-change.

use super::types::{ActUnit, Scene, SceneHint, SceneOrdinal, SceneStatus, SceneUnit, SpeechRecord};
use crate::config::MarkupRules;
use crate::error::{PlayError, PlayResult};
use crate::token::{split_compound, SceneMarker, Token};

/// TEI scene-type attribute values
pub const TEI_SCENE: &str = "scene";
pub const TEI_EXTRA_SCENE: &str = "extra_scene";

pub struct SceneSegmenter<'a> {
    rules: &'a MarkupRules,
}

impl<'a> SceneSegmenter<'a> {
    pub fn new(rules: &'a MarkupRules) -> Self {
        Self { rules }
    }

    /// Initial status from the unit's hint
    pub fn classify(&self, hint: &SceneHint) -> PlayResult<SceneStatus> {
        match hint {
            SceneHint::Marker(marker) => Ok(match self.rules.classify_marker(marker) {
                SceneMarker::Numbered(_) => SceneStatus::Regular,
                SceneMarker::Unchanged(_) => SceneStatus::NoChange,
                SceneMarker::Inserted => SceneStatus::Extra,
            }),
            SceneHint::Typed(kind) if kind.eq_ignore_ascii_case(TEI_SCENE) => {
                Ok(SceneStatus::Regular)
            }
            SceneHint::Typed(kind) if kind.eq_ignore_ascii_case(TEI_EXTRA_SCENE) => {
                Ok(SceneStatus::Extra)
            }
            SceneHint::Typed(kind) => Err(PlayError::data_format(format!(
                "unknown scene type '{}'",
                kind
            ))),
        }
    }

    /// True if the unit has nothing but noise in it
    pub fn is_empty_unit(&self, unit: &SceneUnit) -> bool {
        let cast_empty = unit
            .cast
            .iter()
            .all(|t| self.rules.classify_cast_line(t) == Token::Noise);
        let speech_empty = match &unit.speech {
            SpeechRecord::CastMarked => true,
            SpeechRecord::Utterances(refs) => refs
                .iter()
                .flat_map(|r| split_compound(r))
                .all(|t| self.rules.classify_speaker(t) == Token::Noise),
        };
        cast_empty && speech_empty
    }

    /// Classify and number the units of one act
    pub fn segment(&self, act_number: usize, act: &ActUnit) -> PlayResult<Vec<Scene>> {
        let mut scenes = Vec::with_capacity(act.scenes.len());
        let mut numbered: u32 = 0;
        let mut extra_index: u32 = 0;

        for unit in &act.scenes {
            if self.is_empty_unit(unit) {
                tracing::debug!(act = act_number, hint = ?unit.hint, "discarding empty scene unit");
                continue;
            }

            let mut status = self.classify(&unit.hint)?;
            if status == SceneStatus::NoChange && scenes.is_empty() {
                tracing::debug!(act = act_number, hint = ?unit.hint, "opening scene has nothing to continue, marking regular");
                status = SceneStatus::Regular;
            }
            let ordinal = match status {
                SceneStatus::Regular | SceneStatus::NoChange => {
                    numbered += 1;
                    extra_index = 0;
                    if let SceneHint::Marker(marker) = &unit.hint {
                        if let Some(SceneMarker::Numbered(printed) | SceneMarker::Unchanged(printed)) =
                            self.rules.numeric_marker(marker)
                        {
                            if printed != numbered {
                                tracing::debug!(
                                    act = act_number,
                                    printed,
                                    assigned = numbered,
                                    "printed scene number differs from position"
                                );
                            }
                        }
                    }
                    SceneOrdinal::Numbered(numbered)
                }
                SceneStatus::Extra => {
                    extra_index += 1;
                    SceneOrdinal::Inserted {
                        anchor: numbered,
                        index: extra_index,
                    }
                }
            };

            scenes.push(Scene {
                ordinal,
                status,
                cast: unit.cast.clone(),
                speech: unit.speech.clone(),
            });
        }

        Ok(scenes)
    }
}
