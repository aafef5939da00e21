//! Fatal per-play errors
//!
//! Any of these aborts processing of the play it occurred in. A batch run
//! records the failure and moves on to the next play.

use thiserror::Error;

/// Errors that abort processing of a single play
#[derive(Debug, Error)]
pub enum PlayError {
    /// The cast list or a scene's structure is internally inconsistent
    #[error("data format error: {0}")]
    DataFormat(String),

    /// A speaker or cast token names no registered character
    #[error("unresolved reference '{token}' in {location}")]
    UnresolvedReference { token: String, location: String },

    /// An adapter received a payload it cannot handle
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
}

impl PlayError {
    pub fn data_format(msg: impl Into<String>) -> Self {
        Self::DataFormat(msg.into())
    }

    pub fn unresolved(token: impl Into<String>, location: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            token: token.into(),
            location: location.into(),
        }
    }
}

/// Result type for play processing
pub type PlayResult<T> = Result<T, PlayError>;
