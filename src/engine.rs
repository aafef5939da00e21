//! Play engine: runs a parsed source through the analysis pipeline
//!
//! registry → segmenter → speaker resolver → no-change overrides → aggregator

use crate::adapter::{AdapterInput, InputRouter, PlaySource};
use crate::cast::CharacterRegistry;
use crate::config::EngineConfig;
use crate::diagnostics::Diagnostic;
use crate::error::PlayResult;
use crate::iarkho::IarkhoAggregator;
use crate::play::{Act, Play, PlayMetadata, SceneRecord};
use crate::scene::SceneSegmenter;
use crate::tally::statistics::apply_no_change_overrides;
use crate::tally::SpeakerResolver;
use tracing::instrument;

/// Stateless processor; one instance can analyze any number of plays.
#[derive(Debug, Clone, Default)]
pub struct PlayEngine {
    config: EngineConfig,
}

impl PlayEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Router with the built-in format adapters for this configuration
    pub fn router(&self) -> InputRouter {
        InputRouter::with_builtin_adapters(&self.config)
    }

    /// Parse an input envelope with the matching adapter and analyze it
    pub fn process(&self, router: &InputRouter, input: &AdapterInput) -> PlayResult<Play> {
        let source = router.parse(input)?;
        self.analyze(&source)
    }

    /// Analyze a parsed play
    ///
    /// Fails on malformed structure or an unresolvable character token;
    /// everything else is reported through the play's diagnostics.
    #[instrument(skip(self, source), fields(title = source.metadata.title.as_deref().unwrap_or("")))]
    pub fn analyze(&self, source: &PlaySource) -> PlayResult<Play> {
        let registry = CharacterRegistry::from_cast(&source.cast)?;
        tracing::debug!(characters = registry.len(), acts = source.acts.len(), "cast registered");

        let segmenter = SceneSegmenter::new(&self.config.markup);
        let resolver = SpeakerResolver::new(&registry, &self.config.markup, &self.config.metrics);

        let mut acts = Vec::with_capacity(source.acts.len());

        for (index, unit) in source.acts.iter().enumerate() {
            let number = index + 1;
            let mut scenes = Vec::new();
            for scene in segmenter.segment(number, unit)? {
                let tally = resolver.tally(number, &scene)?;
                scenes.push(SceneRecord {
                    ordinal: scene.ordinal,
                    status: scene.status,
                    tally,
                });
            }
            acts.push(Act { number, scenes });
        }

        let overridden = apply_no_change_overrides(&mut acts);
        if overridden > 0 {
            tracing::debug!(overridden, "scenes reclassified as no_change");
        }

        let mut diagnostics = scene_diagnostics(&acts, &registry);

        let (stats, play_diagnostics) =
            IarkhoAggregator::new(&self.config.metrics).aggregate(&acts, &registry);
        diagnostics.extend(play_diagnostics);

        tracing::info!(
            scenes = stats.num_scenes_text,
            iarkho_scenes = stats.num_scenes_iarkho,
            warnings = diagnostics.len(),
            "play analyzed"
        );

        Ok(Play {
            metadata: source.metadata.clone(),
            registry,
            acts,
            stats,
            diagnostics,
        })
    }

    /// Analyze with catalog metadata taking precedence over extracted metadata
    pub fn analyze_with_metadata(
        &self,
        source: &PlaySource,
        overrides: Option<&PlayMetadata>,
    ) -> PlayResult<Play> {
        let mut play = self.analyze(source)?;
        if let Some(overrides) = overrides {
            play.metadata = play.metadata.overridden_by(overrides);
        }
        Ok(play)
    }
}

/// Per-scene findings, keyed by each scene's final status
fn scene_diagnostics(acts: &[Act], registry: &CharacterRegistry) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for act in acts {
        for scene in &act.scenes {
            let key = scene.key();
            for &character in &scene.tally.undeclared {
                let name = registry.name(character);
                tracing::warn!(
                    act = act.number,
                    scene = %key,
                    character = name,
                    "speaker missing from declared cast"
                );
                diagnostics.push(Diagnostic::undeclared_speaker(act.number, key.as_str(), name));
            }
            if !scene.tally.perc_non_speakers.is_defined() {
                diagnostics.push(Diagnostic::undefined(
                    format!("act {} scene {}", act.number, key),
                    "perc_non_speakers",
                ));
            }
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::CastEntry;
    use crate::error::PlayError;
    use crate::metric::Metric;
    use crate::scene::{ActUnit, SceneHint, SceneStatus, SceneUnit, SpeechRecord};

    fn unit(marker: &str, cast: &[&str], speakers: &[&str]) -> SceneUnit {
        SceneUnit::new(
            SceneHint::Marker(marker.to_string()),
            cast.iter().map(|s| s.to_string()).collect(),
            SpeechRecord::Utterances(speakers.iter().map(|s| s.to_string()).collect()),
        )
    }

    fn source(acts: Vec<ActUnit>) -> PlaySource {
        PlaySource {
            metadata: PlayMetadata {
                title: Some("Test".into()),
                ..Default::default()
            },
            cast: ["A", "B", "C"].iter().map(|n| CastEntry::new(*n)).collect(),
            acts,
        }
    }

    #[test]
    fn analyzes_a_small_play() {
        let play = PlayEngine::default()
            .analyze(&source(vec![ActUnit::new(vec![
                unit("1", &["A", "B"], &["A", "B"]),
                unit("2", &["A", "B"], &["A"]),
                unit("-", &["A", "B", "C"], &["C"]),
            ])]))
            .unwrap();

        let keys: Vec<String> = play.scenes().map(|(_, s)| s.key()).collect();
        assert_eq!(keys, vec!["1_regular", "2_no_change", "2.1_extra"]);
        assert_eq!(play.stats.num_scenes_text, 3);
        assert_eq!(play.stats.num_scenes_iarkho, 2);
        assert_eq!(play.stats.percentage_monologues, Metric::Defined(66.7));
        assert!(play.diagnostics.is_empty());
    }

    #[test]
    fn warnings_name_the_reclassified_scene() {
        let play = PlayEngine::default()
            .analyze(&source(vec![ActUnit::new(vec![
                unit("1", &["A", "B"], &["A", "B"]),
                unit("-", &["A"], &["A", "B"]),
            ])]))
            .unwrap();

        let keys: Vec<String> = play.scenes().map(|(_, s)| s.key()).collect();
        assert_eq!(keys, vec!["1_regular", "1.1_no_change"]);
        assert_eq!(
            play.diagnostics,
            vec![Diagnostic::undeclared_speaker(1, "1.1_no_change", "B")]
        );
    }

    #[test]
    fn unresolved_token_aborts_the_play() {
        let result = PlayEngine::default().analyze(&source(vec![ActUnit::new(vec![unit(
            "1",
            &["A"],
            &["Z"],
        )])]));
        assert!(matches!(result, Err(PlayError::UnresolvedReference { .. })));
    }

    #[test]
    fn scene_numbering_restarts_per_act() {
        let play = PlayEngine::default()
            .analyze(&source(vec![
                ActUnit::new(vec![unit("1", &["A"], &["A"])]),
                ActUnit::new(vec![unit("1", &["B"], &["B"]), unit("2", &["C"], &["C"])]),
            ]))
            .unwrap();
        assert_eq!(play.acts[1].number, 2);
        assert_eq!(play.acts[1].scenes[0].key(), "1_regular");
        assert_eq!(play.acts[1].scenes[0].status, SceneStatus::Regular);
    }

    #[test]
    fn catalog_metadata_overrides_extracted() {
        let overrides = PlayMetadata {
            author: Some("Jean Racine".into()),
            ..Default::default()
        };
        let play = PlayEngine::default()
            .analyze_with_metadata(
                &source(vec![ActUnit::new(vec![unit("1", &["A"], &["A"])])]),
                Some(&overrides),
            )
            .unwrap();
        assert_eq!(play.metadata.title.as_deref(), Some("Test"));
        assert_eq!(play.metadata.author.as_deref(), Some("Jean Racine"));
    }
}
