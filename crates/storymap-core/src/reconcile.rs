//! Identifier reconciliation between engine-generated element ids and the authored metadata map.
//!
//! The rendering engine names elements however it likes (`flowchart-W0_S1-3`), while the
//! metadata map uses author-chosen keys (`w0_s1`). Each element is resolved by an ordered
//! cascade of pure matchers; the first hit wins, and an element nothing matches gets an entry
//! synthesized from its own label. Node and edge namespaces never mix.

use crate::label::synthesize_entry;
use crate::model::{
    ElementKind, Entry, MetadataMap, Namespace, ReconciledElement, RenderedElement, Resolution,
};
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::OnceLock;

fn step_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)W\d+_[A-Z0-9]+").expect("valid regex"))
}

fn engine_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^flowchart[-_]").expect("valid regex"))
}

fn ordinal_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-\d+$").expect("valid regex"))
}

/// Lower-cased key -> first authored key with that spelling.
#[derive(Debug, Clone, Default)]
pub struct FoldedKeys(FxHashMap<String, String>);

impl FoldedKeys {
    pub fn build(namespace: &Namespace) -> Self {
        let mut out = FxHashMap::default();
        for key in namespace.keys() {
            out.entry(key.to_lowercase()).or_insert_with(|| key.clone());
        }
        Self(out)
    }

    fn insert(&mut self, key: &str) {
        self.0
            .entry(key.to_lowercase())
            .or_insert_with(|| key.to_string());
    }

    fn lookup<'n>(&self, namespace: &'n Namespace, candidate: &str) -> Option<&'n Entry> {
        let key = self.0.get(&candidate.to_lowercase())?;
        namespace.get(key)
    }

    /// The key of `namespace` that `candidate` names: the literal key if present, otherwise the
    /// first authored spelling that folds to the same lower-case form.
    fn resolve_key<'n>(&'n self, namespace: &'n Namespace, candidate: &str) -> Option<&'n str> {
        if let Some((key, _)) = namespace.get_key_value(candidate) {
            return Some(key);
        }
        let key = self.0.get(&candidate.to_lowercase())?;
        namespace.contains_key(key).then_some(key.as_str())
    }
}

/// What a matcher sees: the provided namespace for the element's kind, and the working
/// namespace of the current pass (provided entries plus aliases added so far), each with its
/// case-folded key index.
pub struct MatchContext<'a> {
    pub provided: &'a Namespace,
    pub working: &'a Namespace,
    pub folded: &'a FoldedKeys,
    pub working_folded: &'a FoldedKeys,
}

pub type Matcher = fn(&RenderedElement, &MatchContext<'_>) -> Option<Entry>;

/// The ordered cascade, excluding the synthesis fallback.
pub const CASCADE: [(Resolution, Matcher); 4] = [
    (Resolution::Exact, match_exact),
    (Resolution::Token, match_step_token),
    (Resolution::Stripped, match_stripped_id),
    (Resolution::Label, match_label_substring),
];

pub fn match_exact(element: &RenderedElement, ctx: &MatchContext<'_>) -> Option<Entry> {
    let key = ctx
        .working_folded
        .resolve_key(ctx.working, &element.generated_id)?;
    ctx.working.get(key).cloned()
}

pub fn match_step_token(element: &RenderedElement, ctx: &MatchContext<'_>) -> Option<Entry> {
    let token = step_token_regex().find(&element.generated_id)?;
    ctx.folded.lookup(ctx.provided, token.as_str()).cloned()
}

pub fn match_stripped_id(element: &RenderedElement, ctx: &MatchContext<'_>) -> Option<Entry> {
    let base = strip_engine_decorations(&element.generated_id);
    ctx.folded.lookup(ctx.provided, &base).cloned()
}

pub fn match_label_substring(element: &RenderedElement, ctx: &MatchContext<'_>) -> Option<Entry> {
    let label = element.label.to_lowercase();
    ctx.provided.iter().find_map(|(key, entry)| {
        let spaced = key.to_lowercase().replace('_', " ");
        (!spaced.is_empty() && label.contains(&spaced)).then(|| entry.clone())
    })
}

/// Removes a leading `flowchart-`/`flowchart_` and one trailing `-<digits>`, then lower-cases.
pub fn strip_engine_decorations(generated_id: &str) -> String {
    let without_prefix = engine_prefix_regex().replace(generated_id, "");
    ordinal_suffix_regex()
        .replace(&without_prefix, "")
        .to_lowercase()
}

/// Resolves one element against a provided map without any pass state.
pub fn reconcile_element(
    element: &RenderedElement,
    provided: &MetadataMap,
    screenshot_dir: &str,
) -> (Entry, Resolution) {
    let namespace = provided.namespace(element.kind);
    let folded = FoldedKeys::build(namespace);
    let ctx = MatchContext {
        provided: namespace,
        working: namespace,
        folded: &folded,
        working_folded: &folded,
    };
    resolve(element, &ctx, screenshot_dir)
}

fn resolve(
    element: &RenderedElement,
    ctx: &MatchContext<'_>,
    screenshot_dir: &str,
) -> (Entry, Resolution) {
    for (resolution, matcher) in CASCADE {
        if let Some(entry) = matcher(element, ctx) {
            return (entry, resolution);
        }
    }
    (
        synthesize_entry(&element.label, &element.generated_id, screenshot_dir),
        Resolution::Synthesized,
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NamespaceStats {
    pub provided: usize,
    pub mapped: usize,
    pub synthesized: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub nodes: NamespaceStats,
    pub edges: NamespaceStats,
}

impl ReconcileStats {
    fn of_kind_mut(&mut self, kind: ElementKind) -> &mut NamespaceStats {
        match kind {
            ElementKind::Node => &mut self.nodes,
            ElementKind::Edge => &mut self.edges,
        }
    }
}

/// Result of reconciling one render pass.
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub elements: Vec<ReconciledElement>,
    /// Provided entries plus every element's entry under its generated id.
    pub map: MetadataMap,
    pub stats: ReconcileStats,
}

impl Reconciliation {
    pub fn get(&self, kind: ElementKind, generated_id: &str) -> Option<&ReconciledElement> {
        self.elements
            .iter()
            .find(|e| e.kind == kind && e.generated_id == generated_id)
    }
}

/// Reconciles a full render pass.
///
/// The provided map is never mutated: entries are added to a working copy, and only under
/// generated ids that are not already keys of that copy.
pub struct Reconciler<'a> {
    provided: &'a MetadataMap,
    screenshot_dir: &'a str,
    node_keys: FoldedKeys,
    edge_keys: FoldedKeys,
}

impl<'a> Reconciler<'a> {
    pub fn new(provided: &'a MetadataMap, screenshot_dir: &'a str) -> Self {
        Self {
            provided,
            screenshot_dir,
            node_keys: FoldedKeys::build(&provided.nodes),
            edge_keys: FoldedKeys::build(&provided.edges),
        }
    }

    /// Resolves every element in order.
    ///
    /// An exact hit on an alias added earlier in the pass reports the resolution that produced
    /// the alias, so only provided keys ever count as mapped.
    pub fn reconcile<'e, I>(&self, elements: I) -> Reconciliation
    where
        I: IntoIterator<Item = &'e RenderedElement>,
    {
        let mut working = self.provided.clone();
        let mut working_nodes = self.node_keys.clone();
        let mut working_edges = self.edge_keys.clone();
        let mut aliases: FxHashMap<(ElementKind, String), Resolution> = FxHashMap::default();
        let mut stats = ReconcileStats::default();
        stats.nodes.provided = self.provided.nodes.len();
        stats.edges.provided = self.provided.edges.len();

        let mut out = Vec::new();
        for element in elements {
            let (folded, working_folded) = match element.kind {
                ElementKind::Node => (&self.node_keys, &mut working_nodes),
                ElementKind::Edge => (&self.edge_keys, &mut working_edges),
            };
            let (entry, resolution) = {
                let ctx = MatchContext {
                    provided: self.provided.namespace(element.kind),
                    working: working.namespace(element.kind),
                    folded,
                    working_folded: &*working_folded,
                };
                resolve(element, &ctx, self.screenshot_dir)
            };

            let resolution = match resolution {
                Resolution::Exact => working_folded
                    .resolve_key(working.namespace(element.kind), &element.generated_id)
                    .and_then(|key| aliases.get(&(element.kind, key.to_string())))
                    .copied()
                    .unwrap_or(Resolution::Exact),
                other => {
                    let ns = working.namespace_mut(element.kind);
                    if !ns.contains_key(&element.generated_id) {
                        ns.insert(element.generated_id.clone(), entry.clone());
                        working_folded.insert(&element.generated_id);
                        aliases.insert((element.kind, element.generated_id.clone()), other);
                    }
                    other
                }
            };

            let kind_stats = stats.of_kind_mut(element.kind);
            if resolution.is_provided() {
                kind_stats.mapped += 1;
            } else {
                kind_stats.synthesized += 1;
            }

            out.push(ReconciledElement {
                generated_id: element.generated_id.clone(),
                kind: element.kind,
                label: element.label.clone(),
                entry,
                resolution,
            });
        }

        tracing::debug!(
            provided_nodes = stats.nodes.provided,
            mapped_nodes = stats.nodes.mapped,
            synthesized_nodes = stats.nodes.synthesized,
            provided_edges = stats.edges.provided,
            mapped_edges = stats.edges.mapped,
            synthesized_edges = stats.edges.synthesized,
            "reconciled diagram elements"
        );

        Reconciliation {
            elements: out,
            map: working,
            stats,
        }
    }
}
