//! Scene statistics calculator
//!
//! Builds a [`SceneTally`] from resolved entries and, once every scene of
//! the play is tallied, marks scenes whose present cast equals their
//! predecessor's as no-change.

use super::{SceneTally, SpeakingState, TallyEntry};
use crate::config::MetricsConfig;
use crate::metric::Metric;
use crate::play::Act;
use crate::scene::SceneStatus;

/// Derive speaker count and non-speaker percentage from a scene's entries
pub fn build_tally(
    entries: Vec<TallyEntry>,
    num_utterances: Option<usize>,
    metrics: &MetricsConfig,
) -> SceneTally {
    let num_speakers = entries
        .iter()
        .filter(|e| e.state == SpeakingState::Speaking)
        .count();
    let non_speakers = entries.len() - num_speakers;
    let perc_non_speakers =
        Metric::percentage(non_speakers, entries.len()).rounded(metrics.percentage_decimals);

    SceneTally {
        entries,
        num_speakers,
        num_utterances,
        perc_non_speakers,
        undeclared: Vec::new(),
    }
}

/// Reclassify every scene whose present cast equals the previous scene's
///
/// Comparison is by identity, within an act; the first scene of an act
/// keeps its status. Returns the number of scenes whose status changed.
pub fn apply_no_change_overrides(acts: &mut [Act]) -> usize {
    let mut changed = 0;

    for act in acts.iter_mut() {
        let mut previous = None;
        for scene in act.scenes.iter_mut() {
            let present = scene.tally.present_set();
            if previous.as_ref() == Some(&present) && scene.status != SceneStatus::NoChange {
                tracing::debug!(
                    act = act.number,
                    scene = %scene.key(),
                    "cast unchanged from previous scene, marking no_change"
                );
                scene.status = SceneStatus::NoChange;
                changed += 1;
            }
            previous = Some(present);
        }
    }

    changed
}
