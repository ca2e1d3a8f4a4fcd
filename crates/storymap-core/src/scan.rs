//! Collects node/edge groups from rendered SVG.

use crate::label::normalize_id;
use crate::model::{ElementKind, RenderedElement};

/// A node/edge group found in the rendered SVG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedGroup {
    pub element: RenderedElement,
    /// Whether the engine emitted an `id` attribute (otherwise the id is the normalized label).
    pub has_engine_id: bool,
    /// Position among all scanned groups, in document order.
    pub ordinal: usize,
}

pub(crate) fn has_class_token(class_attr: Option<&str>, token: &str) -> bool {
    class_attr.is_some_and(|c| c.split_whitespace().any(|t| t == token))
}

/// Classifies a `<g>` by its `class` attribute. `node` wins when both tokens are present.
pub(crate) fn group_kind(class_attr: Option<&str>) -> Option<ElementKind> {
    if has_class_token(class_attr, "node") {
        Some(ElementKind::Node)
    } else if has_class_token(class_attr, "edge") {
        Some(ElementKind::Edge)
    } else {
        None
    }
}

fn text_content(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|d| d.is_text())
        .filter_map(|d| d.text())
        .collect()
}

fn first_descendant<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|d| d.is_element() && d.tag_name().name() == local_name)
}

fn node_label(group: roxmltree::Node<'_, '_>) -> String {
    if let Some(text) = first_descendant(group, "text") {
        return text_content(text);
    }
    // HTML labels render inside `<foreignObject>` instead of `<text>`.
    first_descendant(group, "foreignObject")
        .map(text_content)
        .unwrap_or_default()
}

fn edge_label(group: roxmltree::Node<'_, '_>) -> String {
    if let Some(title) = first_descendant(group, "title") {
        let text = text_content(title);
        if !text.is_empty() {
            return text;
        }
    }
    first_descendant(group, "text")
        .map(text_content)
        .unwrap_or_default()
}

/// Parses `svg` and returns every `g.node` / `g.edge` in document order.
pub fn scan_svg(svg: &str) -> crate::Result<Vec<ScannedGroup>> {
    let opts = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(svg, opts)?;

    let mut out = Vec::new();
    for node in doc.descendants() {
        if !node.is_element() || node.tag_name().name() != "g" {
            continue;
        }
        let Some(kind) = group_kind(node.attribute("class")) else {
            continue;
        };

        let label = match kind {
            ElementKind::Node => node_label(node),
            ElementKind::Edge => edge_label(node),
        };
        let engine_id = node.attribute("id").filter(|id| !id.is_empty());
        let generated_id = match engine_id {
            Some(id) => id.to_string(),
            None => normalize_id(&label),
        };

        out.push(ScannedGroup {
            element: RenderedElement::new(kind, generated_id, label),
            has_engine_id: engine_id.is_some(),
            ordinal: out.len(),
        });
    }
    Ok(out)
}
