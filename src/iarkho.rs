//! Iarkho aggregator: play-level dramaturgy statistics
//!
//! Consumes the complete per-act, per-scene table of a play. Scene
//! adjacency for the discontinuity measure runs across act boundaries.

use crate::cast::{CharacterId, CharacterRegistry};
use crate::config::MetricsConfig;
use crate::diagnostics::Diagnostic;
use crate::metric::Metric;
use crate::play::{Act, SceneRecord};
use crate::scene::SceneStatus;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Play-level statistics, serialized under the `metadata` key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IarkhoStats {
    /// Cast members who appear in at least one scene
    pub num_present_characters: usize,
    /// Every scene entry, extras and no-change scenes included
    pub num_scenes_text: usize,
    /// Scenes after folding no-change scenes into their predecessor
    pub num_scenes_iarkho: usize,
    /// `(num_speakers, num_scenes)` pairs, ascending by speaker count
    pub speech_distribution: Vec<(usize, usize)>,
    pub percentage_monologues: Metric,
    pub percentage_duologues: Metric,
    pub percentage_non_duologues: Metric,
    pub percentage_over_two_speakers: Metric,
    pub av_percentage_non_speakers: Metric,
    /// Weighted standard deviation of speaker counts
    pub sigma: Metric,
    /// Adjacent scene pairs sharing no present character
    pub percentage_of_scenes_discont_change: Metric,
}

impl IarkhoStats {
    fn metrics(&self) -> [(&'static str, Metric); 7] {
        [
            ("percentage_monologues", self.percentage_monologues),
            ("percentage_duologues", self.percentage_duologues),
            ("percentage_non_duologues", self.percentage_non_duologues),
            ("percentage_over_two_speakers", self.percentage_over_two_speakers),
            ("av_percentage_non_speakers", self.av_percentage_non_speakers),
            ("sigma", self.sigma),
            (
                "percentage_of_scenes_discont_change",
                self.percentage_of_scenes_discont_change,
            ),
        ]
    }
}

pub struct IarkhoAggregator<'a> {
    metrics: &'a MetricsConfig,
}

impl<'a> IarkhoAggregator<'a> {
    pub fn new(metrics: &'a MetricsConfig) -> Self {
        Self { metrics }
    }

    pub fn aggregate(
        &self,
        acts: &[Act],
        registry: &CharacterRegistry,
    ) -> (IarkhoStats, Vec<Diagnostic>) {
        let scenes: Vec<&SceneRecord> = acts.iter().flat_map(|a| a.scenes.iter()).collect();
        let decimals = self.metrics.percentage_decimals;
        let total = scenes.len();

        let present_sets: Vec<BTreeSet<CharacterId>> =
            scenes.iter().map(|s| s.tally.present_set()).collect();
        let staged: BTreeSet<CharacterId> = present_sets.iter().flatten().copied().collect();
        let num_present_characters = staged.iter().filter(|id| registry.contains(**id)).count();

        let speech_distribution = speech_distribution(scenes.iter().map(|s| s.tally.num_speakers));
        let share = |pred: fn(usize) -> bool| {
            let matching = scenes.iter().filter(|s| pred(s.tally.num_speakers)).count();
            Metric::percentage(matching, total).rounded(decimals)
        };

        let stats = IarkhoStats {
            num_present_characters,
            num_scenes_text: total,
            num_scenes_iarkho: iarkho_scene_count(acts),
            percentage_monologues: share(|n| n == 1),
            percentage_duologues: share(|n| n == 2),
            percentage_non_duologues: share(|n| n != 2),
            percentage_over_two_speakers: share(|n| n > 2),
            av_percentage_non_speakers: Metric::mean_of(
                scenes.iter().map(|s| s.tally.raw_perc_non_speakers()),
            )
            .rounded(decimals),
            sigma: sigma(&speech_distribution).rounded(self.metrics.sigma_decimals),
            percentage_of_scenes_discont_change: discontinuity(&present_sets).rounded(decimals),
            speech_distribution,
        };

        let diagnostics = stats
            .metrics()
            .iter()
            .filter(|(_, m)| !m.is_defined())
            .map(|(name, _)| Diagnostic::undefined("play", *name))
            .collect();

        (stats, diagnostics)
    }
}

/// Histogram of speaker counts, ascending
pub fn speech_distribution<I: IntoIterator<Item = usize>>(speaker_counts: I) -> Vec<(usize, usize)> {
    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
    for n in speaker_counts {
        *histogram.entry(n).or_insert(0) += 1;
    }
    histogram.into_iter().collect()
}

/// A no-change scene folds into its predecessor in the same act
fn iarkho_scene_count(acts: &[Act]) -> usize {
    acts.iter()
        .map(|act| {
            act.scenes
                .iter()
                .enumerate()
                .filter(|(i, s)| *i == 0 || s.status != SceneStatus::NoChange)
                .count()
        })
        .sum()
}

/// Population standard deviation of speaker counts weighted by scene counts
pub fn sigma(distribution: &[(usize, usize)]) -> Metric {
    let total: usize = distribution.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return Metric::Undefined;
    }
    let total = total as f64;
    let mean = distribution
        .iter()
        .map(|&(n, c)| n as f64 * c as f64)
        .sum::<f64>()
        / total;
    let variance = distribution
        .iter()
        .map(|&(n, c)| c as f64 * (n as f64 - mean).powi(2))
        .sum::<f64>()
        / total;
    Metric::Defined(variance.sqrt())
}

/// Percentage of adjacent scene pairs with disjoint present casts
fn discontinuity(present_sets: &[BTreeSet<CharacterId>]) -> Metric {
    let pairs = present_sets.len().saturating_sub(1);
    let disjoint = present_sets
        .windows(2)
        .filter(|w| w[0].is_disjoint(&w[1]))
        .count();
    Metric::percentage(disjoint, pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::play::SceneRecord;
    use crate::scene::SceneOrdinal;
    use crate::tally::statistics::build_tally;
    use crate::tally::{SpeakingState, TallyEntry};

    struct Fixture {
        registry: CharacterRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: CharacterRegistry::from_labels(&["A", "B", "C", "D", "E"]).unwrap(),
            }
        }

        /// Scene where the first `speakers` names speak and the rest are silent
        fn scene(&self, n: u32, status: SceneStatus, names: &[&str], speakers: usize) -> SceneRecord {
            let entries = names
                .iter()
                .enumerate()
                .map(|(i, name)| TallyEntry {
                    character: self.registry.resolve(name).unwrap(),
                    state: if i < speakers {
                        SpeakingState::Speaking
                    } else {
                        SpeakingState::NonSpeaking
                    },
                    utterances: None,
                })
                .collect();
            SceneRecord {
                ordinal: SceneOrdinal::Numbered(n),
                status,
                tally: build_tally(entries, None, &MetricsConfig::default()),
            }
        }
    }

    #[test]
    fn distribution_and_shares() {
        let f = Fixture::new();
        let acts = vec![Act {
            number: 1,
            scenes: vec![
                f.scene(1, SceneStatus::Regular, &["A"], 1),
                f.scene(2, SceneStatus::Regular, &["B"], 1),
                f.scene(3, SceneStatus::Regular, &["A", "B"], 2),
                f.scene(4, SceneStatus::Regular, &["A", "B", "C"], 3),
            ],
        }];

        let metrics = MetricsConfig::default();
        let (stats, diagnostics) = IarkhoAggregator::new(&metrics).aggregate(&acts, &f.registry);

        assert_eq!(stats.speech_distribution, vec![(1, 2), (2, 1), (3, 1)]);
        assert_eq!(stats.percentage_monologues, Metric::Defined(50.0));
        assert_eq!(stats.percentage_duologues, Metric::Defined(25.0));
        assert_eq!(stats.percentage_non_duologues, Metric::Defined(75.0));
        assert_eq!(stats.percentage_over_two_speakers, Metric::Defined(25.0));
        assert_eq!(stats.sigma, Metric::Defined(0.829));
        assert_eq!(stats.num_present_characters, 3);
        assert_eq!(stats.num_scenes_text, 4);
        assert_eq!(stats.num_scenes_iarkho, 4);
        assert_eq!(stats.av_percentage_non_speakers, Metric::Defined(0.0));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn no_change_scenes_fold_into_predecessor() {
        let f = Fixture::new();
        let acts = vec![
            Act {
                number: 1,
                scenes: vec![
                    f.scene(1, SceneStatus::Regular, &["A", "B"], 2),
                    f.scene(2, SceneStatus::NoChange, &["A", "B"], 2),
                    f.scene(3, SceneStatus::NoChange, &["A", "B"], 1),
                ],
            },
            Act {
                number: 2,
                scenes: vec![f.scene(1, SceneStatus::Regular, &["C"], 1)],
            },
        ];
        let metrics = MetricsConfig::default();
        let (stats, _) = IarkhoAggregator::new(&metrics).aggregate(&acts, &f.registry);
        assert_eq!(stats.num_scenes_text, 4);
        assert_eq!(stats.num_scenes_iarkho, 2);
    }

    #[test]
    fn no_change_never_folds_across_acts() {
        let f = Fixture::new();
        let acts = vec![
            Act {
                number: 1,
                scenes: vec![
                    f.scene(1, SceneStatus::NoChange, &["A", "B"], 2),
                    f.scene(2, SceneStatus::Regular, &["A"], 1),
                ],
            },
            Act {
                number: 2,
                scenes: vec![
                    f.scene(1, SceneStatus::NoChange, &["A"], 1),
                    f.scene(2, SceneStatus::NoChange, &["A"], 1),
                ],
            },
        ];
        let metrics = MetricsConfig::default();
        let (stats, _) = IarkhoAggregator::new(&metrics).aggregate(&acts, &f.registry);
        assert_eq!(stats.num_scenes_text, 4);
        assert_eq!(stats.num_scenes_iarkho, 3);
    }

    #[test]
    fn discontinuity_spans_act_boundaries() {
        let f = Fixture::new();
        let acts = vec![
            Act {
                number: 1,
                scenes: vec![
                    f.scene(1, SceneStatus::Regular, &["A", "B"], 2),
                    f.scene(2, SceneStatus::Regular, &["B", "C"], 2),
                ],
            },
            Act {
                number: 2,
                scenes: vec![
                    f.scene(1, SceneStatus::Regular, &["D"], 1),
                    f.scene(2, SceneStatus::Regular, &["D", "E"], 2),
                ],
            },
        ];
        let metrics = MetricsConfig::default();
        let (stats, _) = IarkhoAggregator::new(&metrics).aggregate(&acts, &f.registry);
        // pairs: AB|BC shared, BC|D disjoint, D|DE shared
        assert_eq!(stats.percentage_of_scenes_discont_change, Metric::Defined(33.3));
    }

    #[test]
    fn average_non_speaker_percentage() {
        let f = Fixture::new();
        let acts = vec![Act {
            number: 1,
            scenes: vec![
                f.scene(1, SceneStatus::Regular, &["A", "B"], 1),
                f.scene(2, SceneStatus::Regular, &["A", "B", "C", "D"], 3),
            ],
        }];
        let metrics = MetricsConfig::default();
        let (stats, _) = IarkhoAggregator::new(&metrics).aggregate(&acts, &f.registry);
        // (50 + 25) / 2
        assert_eq!(stats.av_percentage_non_speakers, Metric::Defined(37.5));
    }

    #[test]
    fn empty_play_reports_undefined_metrics() {
        let f = Fixture::new();
        let metrics = MetricsConfig::default();
        let (stats, diagnostics) = IarkhoAggregator::new(&metrics).aggregate(&[], &f.registry);
        assert_eq!(stats.num_scenes_text, 0);
        assert!(stats.speech_distribution.is_empty());
        assert_eq!(stats.sigma, Metric::Undefined);
        assert_eq!(stats.percentage_monologues, Metric::Undefined);
        assert_eq!(diagnostics.len(), 7);
        assert!(diagnostics.contains(&Diagnostic::undefined("play", "sigma")));
    }

    #[test]
    fn single_scene_has_undefined_discontinuity() {
        let f = Fixture::new();
        let acts = vec![Act {
            number: 1,
            scenes: vec![f.scene(1, SceneStatus::Regular, &["A"], 1)],
        }];
        let metrics = MetricsConfig::default();
        let (stats, diagnostics) = IarkhoAggregator::new(&metrics).aggregate(&acts, &f.registry);
        assert_eq!(stats.percentage_of_scenes_discont_change, Metric::Undefined);
        assert_eq!(stats.sigma, Metric::Defined(0.0));
        assert_eq!(
            diagnostics,
            vec![Diagnostic::undefined("play", "percentage_of_scenes_discont_change")]
        );
    }

    #[test]
    fn sigma_of_uniform_distribution_is_zero() {
        assert_eq!(sigma(&[(2, 5)]), Metric::Defined(0.0));
        assert_eq!(sigma(&[]), Metric::Undefined);
    }
}
