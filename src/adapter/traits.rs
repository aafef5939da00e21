//! Format adapter trait: the contract every source family implements
//!
//! An adapter turns one source family's parsed input into a [`PlaySource`]:
//! descriptive metadata, the cast list and the acts as unclassified scene
//! units. Everything downstream is format-independent.

use crate::cast::CastEntry;
use crate::error::PlayResult;
use crate::play::PlayMetadata;
use crate::scene::ActUnit;
use std::any::Any;

/// A play as extracted by a format adapter, before analysis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaySource {
    pub metadata: PlayMetadata,
    /// Cast list in document order
    pub cast: Vec<CastEntry>,
    pub acts: Vec<ActUnit>,
}

/// The input envelope handed to an adapter.
#[derive(Debug)]
pub struct AdapterInput {
    /// The kind of input (matched by router)
    pub kind: String,
    /// Opaque payload; the adapter downcasts internally
    pub data: Box<dyn Any + Send + Sync>,
    /// Where the input came from, for log context
    pub source_id: String,
}

impl AdapterInput {
    pub fn new(
        kind: impl Into<String>,
        data: impl Any + Send + Sync + 'static,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            data: Box::new(data),
            source_id: source_id.into(),
        }
    }

    /// Attempt to downcast the data payload to a specific type.
    pub fn downcast_data<T: 'static>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }
}

/// The contract format adapters implement.
pub trait FormatAdapter: Send + Sync {
    /// Unique identifier for this adapter
    fn id(&self) -> &str;

    /// What kind of input this adapter consumes (matched by router)
    fn input_kind(&self) -> &str;

    /// File extension of sources this adapter reads from disk
    fn file_extension(&self) -> &str;

    /// Decode raw file content into this adapter's payload envelope
    fn load(&self, content: String, source_id: &str) -> PlayResult<AdapterInput>;

    /// Extract the play from `input`.
    ///
    /// The adapter downcasts `input.data` internally. If the downcast fails,
    /// return `Err(PlayError::InvalidInput)`.
    fn parse(&self, input: &AdapterInput) -> PlayResult<PlaySource>;
}
