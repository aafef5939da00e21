//! Input router: dispatches input to the adapter for its kind
//!
//! The router never inspects the opaque payload; kind matching is exact.

use super::plain_text::PlainTextAdapter;
use super::tei::TeiAdapter;
use super::traits::{AdapterInput, FormatAdapter, PlaySource};
use crate::config::EngineConfig;
use crate::error::{PlayError, PlayResult};
use std::sync::Arc;

/// Dispatches input to the adapter whose `input_kind()` matches.
#[derive(Clone)]
pub struct InputRouter {
    adapters: Vec<Arc<dyn FormatAdapter>>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Router with the plain-text and TEI adapters registered
    pub fn with_builtin_adapters(config: &EngineConfig) -> Self {
        let mut router = Self::new();
        router.register(Arc::new(PlainTextAdapter::new(
            config.plain_text.clone(),
            config.markup.clone(),
        )));
        router.register(Arc::new(TeiAdapter::new(config.tei.clone())));
        router
    }

    /// Register an adapter; a later registration for the same kind replaces the earlier one
    pub fn register(&mut self, adapter: Arc<dyn FormatAdapter>) {
        self.adapters.retain(|a| a.input_kind() != adapter.input_kind());
        self.adapters.push(adapter);
    }

    pub fn adapter_for(&self, kind: &str) -> PlayResult<&Arc<dyn FormatAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.input_kind() == kind)
            .ok_or_else(|| PlayError::InvalidInput(format!("no adapter for input kind '{}'", kind)))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.adapters.iter().map(|a| a.input_kind())
    }

    /// Route input to the matching adapter and return the extracted play.
    pub fn parse(&self, input: &AdapterInput) -> PlayResult<PlaySource> {
        let adapter = self.adapter_for(&input.kind)?;
        tracing::debug!(adapter = adapter.id(), source = %input.source_id, "routing input");
        adapter.parse(input)
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::play::PlayMetadata;
    use std::sync::Mutex;

    struct TestAdapter {
        id: String,
        input_kind: String,
        invoked: Arc<Mutex<bool>>,
    }

    impl TestAdapter {
        fn new(id: &str, input_kind: &str) -> (Self, Arc<Mutex<bool>>) {
            let invoked = Arc::new(Mutex::new(false));
            (
                Self {
                    id: id.to_string(),
                    input_kind: input_kind.to_string(),
                    invoked: invoked.clone(),
                },
                invoked,
            )
        }
    }

    impl FormatAdapter for TestAdapter {
        fn id(&self) -> &str {
            &self.id
        }
        fn input_kind(&self) -> &str {
            &self.input_kind
        }
        fn file_extension(&self) -> &str {
            "test"
        }
        fn load(&self, content: String, source_id: &str) -> PlayResult<AdapterInput> {
            Ok(AdapterInput::new(self.input_kind.clone(), content, source_id))
        }
        fn parse(&self, input: &AdapterInput) -> PlayResult<PlaySource> {
            *self.invoked.lock().unwrap() = true;
            let title = input
                .downcast_data::<String>()
                .ok_or_else(|| PlayError::InvalidInput("expected string payload".into()))?;
            Ok(PlaySource {
                metadata: PlayMetadata {
                    title: Some(title.clone()),
                    ..Default::default()
                },
                ..Default::default()
            })
        }
    }

    #[test]
    fn input_routed_to_matching_adapter() {
        let mut router = InputRouter::new();
        let (text, text_invoked) = TestAdapter::new("text-adapter", "plain_text");
        let (tei, tei_invoked) = TestAdapter::new("tei-adapter", "tei");
        router.register(Arc::new(text));
        router.register(Arc::new(tei));

        let input = AdapterInput::new("plain_text", "Le Cid".to_string(), "cid.txt");
        let source = router.parse(&input).unwrap();

        assert_eq!(source.metadata.title.as_deref(), Some("Le Cid"));
        assert!(*text_invoked.lock().unwrap());
        assert!(!*tei_invoked.lock().unwrap());
    }

    #[test]
    fn unknown_kind_is_invalid_input() {
        let router = InputRouter::new();
        let input = AdapterInput::new("docx", String::new(), "x.docx");
        assert!(matches!(router.parse(&input), Err(PlayError::InvalidInput(_))));
    }

    #[test]
    fn wrong_payload_type_is_invalid_input() {
        let mut router = InputRouter::new();
        let (adapter, _) = TestAdapter::new("text-adapter", "plain_text");
        router.register(Arc::new(adapter));

        let input = AdapterInput::new("plain_text", 42u64, "x.txt");
        assert!(matches!(router.parse(&input), Err(PlayError::InvalidInput(_))));
    }

    #[test]
    fn builtin_router_knows_both_families() {
        let router = InputRouter::with_builtin_adapters(&EngineConfig::default());
        let kinds: Vec<&str> = router.kinds().collect();
        assert_eq!(kinds, vec!["plain_text", "tei"]);
    }
}
