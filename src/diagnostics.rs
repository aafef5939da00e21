//! Non-fatal conditions attached to a play's result

use serde::Serialize;
use std::fmt;

/// A non-fatal finding; processing continues past it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A character speaks in a scene whose declared cast does not list them
    ConsistencyWarning {
        act: usize,
        scene: String,
        character: String,
    },
    /// A metric could not be computed for a scene or for the play
    UndefinedMetric { scope: String, metric: String },
}

impl Diagnostic {
    pub fn undeclared_speaker(act: usize, scene: impl Into<String>, character: impl Into<String>) -> Self {
        Self::ConsistencyWarning {
            act,
            scene: scene.into(),
            character: character.into(),
        }
    }

    pub fn undefined(scope: impl Into<String>, metric: impl Into<String>) -> Self {
        Self::UndefinedMetric {
            scope: scope.into(),
            metric: metric.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConsistencyWarning {
                act,
                scene,
                character,
            } => write!(
                f,
                "act {} scene {}: '{}' speaks but is not in the declared cast",
                act, scene, character
            ),
            Self::UndefinedMetric { scope, metric } => {
                write!(f, "{}: {} is undefined", scope, metric)
            }
        }
    }
}
