//! Scene units, classification and numbering

mod segmenter;
mod types;

pub use segmenter::{SceneSegmenter, TEI_EXTRA_SCENE, TEI_SCENE};
pub use types::{
    scene_key, ActUnit, Scene, SceneHint, SceneOrdinal, SceneStatus, SceneUnit, SpeechRecord,
};
