//! TEI adapter: plays encoded in TEI XML
//!
//! Documents are read into a namespace-free [`TeiElement`] tree; the
//! `xml:` prefix is kept on attributes from the XML namespace. A tree
//! already serialized as JSON loads too. Element and attribute names match
//! case-insensitively.

use super::traits::{AdapterInput, FormatAdapter, PlaySource};
use crate::cast::CastEntry;
use crate::config::TeiConfig;
use crate::error::{PlayError, PlayResult};
use crate::play::PlayMetadata;
use crate::scene::{ActUnit, SceneHint, SceneUnit, SpeechRecord, TEI_EXTRA_SCENE, TEI_SCENE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TEI_KIND: &str = "tei";

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// One element of a parsed TEI document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeiElement {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<TeiElement>,
}

impl TeiElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Read a TEI XML document; DTD declarations are accepted and ignored
    pub fn from_xml(content: &str) -> PlayResult<Self> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let document = roxmltree::Document::parse_with_options(content, options)?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .map(|attribute| {
                let key = match attribute.namespace() {
                    Some(XML_NAMESPACE) => format!("xml:{}", attribute.name()),
                    _ => attribute.name().to_string(),
                };
                (key, attribute.value().to_string())
            })
            .collect();
        let text: String = node
            .children()
            .filter(|child| child.is_text())
            .filter_map(|child| child.text())
            .collect();

        Self {
            name: node.tag_name().name().to_string(),
            attributes,
            text: if text.trim().is_empty() { None } else { Some(text) },
            children: node
                .children()
                .filter(|child| child.is_element())
                .map(Self::from_node)
                .collect(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: TeiElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    fn has_type(&self, value: &str) -> bool {
        self.attr("type").is_some_and(|t| t.eq_ignore_ascii_case(value))
    }

    /// Descendants in document order, excluding `self`
    pub fn descendants(&self) -> Vec<&TeiElement> {
        let mut out = Vec::new();
        let mut stack: Vec<&TeiElement> = self.children.iter().rev().collect();
        while let Some(element) = stack.pop() {
            out.push(element);
            stack.extend(element.children.iter().rev());
        }
        out
    }

    pub fn find_all(&self, name: &str) -> Vec<&TeiElement> {
        self.descendants().into_iter().filter(|e| e.is(name)).collect()
    }

    pub fn find_first(&self, name: &str) -> Option<&TeiElement> {
        self.descendants().into_iter().find(|e| e.is(name))
    }

    /// Concatenated text of this element and its descendants
    pub fn text_content(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(text) = &self.text {
            parts.push(text);
        }
        for element in self.descendants() {
            if let Some(text) = &element.text {
                parts.push(text);
            }
        }
        parts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct TeiAdapter {
    config: TeiConfig,
}

impl TeiAdapter {
    pub fn new(config: TeiConfig) -> Self {
        Self { config }
    }

    /// Extract the play from a parsed document
    pub fn parse_document(&self, root: &TeiElement) -> PlayResult<PlaySource> {
        let cast = self.cast(root)?;
        let metadata = self.metadata(root);

        let acts = root
            .descendants()
            .into_iter()
            .filter(|e| e.is("div") && e.has_type("act"))
            .enumerate()
            .map(|(index, act)| self.act(index + 1, act))
            .collect::<PlayResult<Vec<_>>>()?;

        tracing::debug!(characters = cast.len(), acts = acts.len(), "TEI play extracted");
        Ok(PlaySource {
            metadata,
            cast,
            acts,
        })
    }

    fn cast(&self, root: &TeiElement) -> PlayResult<Vec<CastEntry>> {
        root.descendants()
            .into_iter()
            .filter(|e| e.is("person") || e.is("personGrp"))
            .map(|person| -> PlayResult<CastEntry> {
                let id = person.attr("xml:id").ok_or_else(|| {
                    PlayError::data_format(format!("<{}> without xml:id", person.name))
                })?;
                let name = id.split(self.config.id_separator).next().unwrap_or(id);
                Ok(CastEntry::new(name).with_alternative_id(id))
            })
            .collect()
    }

    fn metadata(&self, root: &TeiElement) -> PlayMetadata {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        let title_stmt = root.find_first("titleStmt");
        let field = |name: &str| {
            title_stmt
                .and_then(|t| t.find_first(name))
                .and_then(|e| non_empty(e.text_content()))
        };

        let date = root
            .find_first("creation")
            .and_then(|c| c.find_first("date"))
            .or_else(|| root.find_first("teiHeader").and_then(|h| h.find_first("date")))
            .and_then(|d| match d.attr("when") {
                Some(when) if !when.trim().is_empty() => Some(when.trim().to_string()),
                _ => non_empty(d.text_content()),
            });

        PlayMetadata {
            title: field("title"),
            author: field("author"),
            creation_date: date,
        }
    }

    fn act(&self, number: usize, act: &TeiElement) -> PlayResult<ActUnit> {
        let scenes = act
            .descendants()
            .into_iter()
            .filter(|e| e.is("div") && (e.has_type(TEI_SCENE) || e.has_type(TEI_EXTRA_SCENE)))
            .enumerate()
            .map(|(index, scene)| self.scene(number, index + 1, scene))
            .collect::<PlayResult<Vec<_>>>()?;
        Ok(ActUnit::new(scenes))
    }

    fn scene(&self, act: usize, position: usize, scene: &TeiElement) -> PlayResult<SceneUnit> {
        let kind = scene.attr("type").unwrap_or(TEI_SCENE).to_string();

        let cast = scene
            .find_all("stage")
            .into_iter()
            .filter(|s| s.has_type(&self.config.cast_stage_type))
            .flat_map(|stage| {
                let ids = stage
                    .attr("who")
                    .map(str::to_string)
                    .unwrap_or_else(|| stage.text_content());
                ids.split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();

        let speakers = scene
            .find_all("sp")
            .into_iter()
            .map(|sp| {
                sp.attr("who").map(str::to_string).ok_or_else(|| {
                    PlayError::data_format(format!(
                        "<sp> without who attribute in act {} scene unit {}",
                        act, position
                    ))
                })
            })
            .collect::<PlayResult<Vec<_>>>()?;

        Ok(SceneUnit::new(
            SceneHint::Typed(kind),
            cast,
            SpeechRecord::Utterances(speakers),
        ))
    }
}

impl Default for TeiAdapter {
    fn default() -> Self {
        Self::new(TeiConfig::default())
    }
}

impl FormatAdapter for TeiAdapter {
    fn id(&self) -> &str {
        "tei-adapter"
    }

    fn input_kind(&self) -> &str {
        TEI_KIND
    }

    fn file_extension(&self) -> &str {
        "xml"
    }

    fn load(&self, content: String, source_id: &str) -> PlayResult<AdapterInput> {
        let body = content.trim_start_matches('\u{feff}').trim_start();
        let root = if body.starts_with('{') {
            serde_json::from_str::<TeiElement>(body)?
        } else {
            TeiElement::from_xml(body)?
        };
        Ok(AdapterInput::new(TEI_KIND, root, source_id))
    }

    fn parse(&self, input: &AdapterInput) -> PlayResult<PlaySource> {
        let root = input
            .downcast_data::<TeiElement>()
            .ok_or_else(|| PlayError::InvalidInput("TEI adapter expects a TeiElement payload".into()))?;
        self.parse_document(root)
    }
}
