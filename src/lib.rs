//! Iarkho: scene-level dramaturgy statistics for annotated plays
//!
//! Turns a play marked up in one of two source families (annotated plain
//! text, TEI) into a per-act, per-scene account of who is on stage and who
//! speaks, plus the play-level statistics of Boris Iarkho's method.
//!
//! # Pipeline
//!
//! - **Adapters** extract metadata, the cast list and scene units
//! - **Cast resolver** builds the canonical character registry
//! - **Segmenter** classifies and numbers scenes
//! - **Speaker resolver** tallies presence, speaking state and utterances
//! - **Aggregator** derives play-level statistics
//!
//! # Example
//!
//! ```
//! use iarkho::{AdapterInput, PlayEngine, PLAIN_TEXT_KIND};
//!
//! let text = "Title\nDRAMATIC CHARACTERS\nA\nB\nACT 1\nSCENE 1\nA\nB NON_SPEAKING\n";
//! let engine = PlayEngine::default();
//! let input = AdapterInput::new(PLAIN_TEXT_KIND, text.to_string(), "example");
//! let play = engine.process(&engine.router(), &input).unwrap();
//! assert_eq!(play.stats.num_scenes_text, 1);
//! ```

pub mod adapter;
pub mod batch;
pub mod cast;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod engine;
mod error;
pub mod iarkho;
pub mod metric;
pub mod play;
pub mod scene;
pub mod tally;
pub mod token;

pub use adapter::{
    AdapterInput, FormatAdapter, InputRouter, PlainTextAdapter, PlaySource, TeiAdapter, TeiElement,
    PLAIN_TEXT_KIND, TEI_KIND,
};
pub use batch::{analyze_file, BatchDriver, BatchFailure, BatchOutput, BatchSummary};
pub use cast::{CastEntry, Character, CharacterId, CharacterRegistry};
pub use catalog::{Catalog, CatalogEntry};
pub use config::EngineConfig;
pub use diagnostics::Diagnostic;
pub use engine::PlayEngine;
pub use error::{PlayError, PlayResult};
pub use iarkho::IarkhoStats;
pub use metric::Metric;
pub use play::{Act, Play, PlayMetadata, SceneRecord};
pub use scene::{SceneOrdinal, SceneStatus};
pub use tally::{SceneTally, SpeakingState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
