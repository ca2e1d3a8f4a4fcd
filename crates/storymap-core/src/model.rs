use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One screenshot reference attached to an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Screenshot {
    pub file: String,
    #[serde(default)]
    pub alt: String,
}

/// Presentation payload for one diagram element (screenshots + narrative text).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
    #[serde(default)]
    pub story_text: String,
}

/// Ordered key -> entry table for one element kind.
///
/// Iteration order is the insertion order of the parsed JSON document; the loose label match
/// relies on it as a stable tie-break.
pub type Namespace = IndexMap<String, Entry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Edge,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Edge => "edge",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author-curated presentation data, split into disjoint node and edge namespaces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetadataMap {
    #[serde(default)]
    pub nodes: Namespace,
    #[serde(default)]
    pub edges: Namespace,
}

impl MetadataMap {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Strict parse of a `{ "nodes": {...}, "edges": {...} }` document.
    pub fn from_json_str(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses a metadata document, degrading to an empty map on malformed input.
    pub fn from_json_str_lenient(text: &str) -> Self {
        match Self::from_json_str(text) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(error = %err, "metadata map parse failed; using an empty map");
                Self::empty()
            }
        }
    }

    pub fn namespace(&self, kind: ElementKind) -> &Namespace {
        match kind {
            ElementKind::Node => &self.nodes,
            ElementKind::Edge => &self.edges,
        }
    }

    pub fn namespace_mut(&mut self, kind: ElementKind) -> &mut Namespace {
        match kind {
            ElementKind::Node => &mut self.nodes,
            ElementKind::Edge => &mut self.edges,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// One node or edge produced by the rendering engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedElement {
    /// Engine-assigned id (or the normalized label when the engine emitted none).
    pub generated_id: String,
    pub label: String,
    pub kind: ElementKind,
}

impl RenderedElement {
    pub fn new(
        kind: ElementKind,
        generated_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            generated_id: generated_id.into(),
            label: label.into(),
            kind,
        }
    }
}

/// Which reconciliation step produced an element's entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The generated id is itself a key of the working map.
    Exact,
    /// A `W<n>_<id>` token embedded in the generated id.
    Token,
    /// The generated id with the engine prefix and ordinal suffix removed.
    Stripped,
    /// A key whose spaced form occurs in the label text.
    Label,
    /// No provided entry matched; derived from the label.
    Synthesized,
}

impl Resolution {
    pub fn is_provided(self) -> bool {
        !matches!(self, Resolution::Synthesized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledElement {
    pub generated_id: String,
    pub kind: ElementKind,
    pub label: String,
    pub entry: Entry,
    pub resolution: Resolution,
}
