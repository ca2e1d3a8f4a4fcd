use std::path::{Path, PathBuf};
use storymap_core::{
    ElementKind, Entry, MetadataMap, Reconciler, RenderedElement, Resolution, Screenshot,
    enrich_svg, reconcile_element, scan_svg,
};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(rel: &str) -> String {
    let path = repo_root().join("fixtures").join(rel);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()))
}

fn entry(story: &str) -> Entry {
    Entry {
        screenshots: Vec::new(),
        story_text: story.to_string(),
    }
}

fn map_with_nodes(keys: &[(&str, &str)]) -> MetadataMap {
    let mut map = MetadataMap::empty();
    for (k, story) in keys {
        map.nodes.insert((*k).to_string(), entry(story));
    }
    map
}

const DIR: &str = "assets/screenshots/";

#[test]
fn step_token_matches_regardless_of_case_and_noise() {
    let map = map_with_nodes(&[("w3_s12", "step twelve")]);
    for id in ["flowchart-W3_S12-7", "x-w3_s12-y", "prefixW3_s12"] {
        let el = RenderedElement::new(ElementKind::Node, id, "irrelevant");
        let (got, how) = reconcile_element(&el, &map, DIR);
        assert_eq!(got.story_text, "step twelve", "id {id}");
        assert_eq!(how, Resolution::Token, "id {id}");
    }
}

#[test]
fn stripped_id_matches_prefixed_engine_ids() {
    let map = map_with_nodes(&[("mynode", "mine")]);
    let el = RenderedElement::new(ElementKind::Node, "flowchart-mynode-2", "");
    let (got, how) = reconcile_element(&el, &map, DIR);
    assert_eq!(got.story_text, "mine");
    assert_eq!(how, Resolution::Stripped);
}

#[test]
fn label_substring_matches_spaced_key() {
    let map = map_with_nodes(&[("checkout", "no"), ("logs_in", "login story")]);
    let el = RenderedElement::new(
        ElementKind::Node,
        "flowchart-A-3",
        "User logs in to dashboard",
    );
    let (got, how) = reconcile_element(&el, &map, DIR);
    assert_eq!(got.story_text, "login story");
    assert_eq!(how, Resolution::Label);
}

#[test]
fn label_substring_prefers_first_key_in_author_order() {
    let map = MetadataMap::from_json_str(
        r#"{ "nodes": { "zeta_step": { "story_text": "zeta" }, "logs": { "story_text": "logs" } } }"#,
    )
    .expect("parse");
    let el = RenderedElement::new(ElementKind::Node, "n1", "logs of zeta step");
    let (got, _) = reconcile_element(&el, &map, DIR);
    assert_eq!(got.story_text, "zeta");
}

#[test]
fn synthesis_extracts_screenshot_and_story() {
    let el = RenderedElement::new(
        ElementKind::Node,
        "flowchart-B-4",
        "See screenshot login.png for details",
    );
    let (got, how) = reconcile_element(&el, &MetadataMap::empty(), DIR);
    assert_eq!(how, Resolution::Synthesized);
    assert_eq!(
        got,
        Entry {
            screenshots: vec![Screenshot {
                file: "assets/screenshots/login.png".to_string(),
                alt: "See screenshot for details".to_string(),
            }],
            story_text: "See screenshot for details".to_string(),
        }
    );
}

#[test]
fn empty_label_synthesizes_generated_id() {
    let el = RenderedElement::new(ElementKind::Edge, "L-x-y-0", "");
    let (got, how) = reconcile_element(&el, &MetadataMap::empty(), DIR);
    assert_eq!(how, Resolution::Synthesized);
    assert!(got.screenshots.is_empty());
    assert_eq!(got.story_text, "L-x-y-0");
}

#[test]
fn node_ids_never_resolve_against_edge_keys() {
    let mut map = MetadataMap::empty();
    map.edges.insert("shared".to_string(), entry("edge story"));
    let el = RenderedElement::new(ElementKind::Node, "shared", "shared");
    let (got, how) = reconcile_element(&el, &map, DIR);
    assert_eq!(how, Resolution::Synthesized);
    assert_eq!(got.story_text, "shared");
}

#[test]
fn malformed_map_degrades_to_synthesis() {
    let map = MetadataMap::from_json_str_lenient("{ nodes: nope");
    assert!(map.is_empty());

    let elements = [
        RenderedElement::new(ElementKind::Node, "flowchart-a-1", "Alpha"),
        RenderedElement::new(ElementKind::Edge, "L-a-b-0", ""),
    ];
    let out = Reconciler::new(&map, DIR).reconcile(&elements);
    assert_eq!(out.elements.len(), 2);
    assert!(
        out.elements
            .iter()
            .all(|e| e.resolution == Resolution::Synthesized)
    );
    assert_eq!(out.stats.nodes.synthesized, 1);
    assert_eq!(out.stats.edges.synthesized, 1);
}

#[test]
fn pass_aliases_generated_ids_without_touching_provided_keys() {
    let map = map_with_nodes(&[("mynode", "mine")]);
    let elements = [
        RenderedElement::new(ElementKind::Node, "flowchart-mynode-2", ""),
        RenderedElement::new(ElementKind::Node, "mynode", "something else"),
    ];
    let out = Reconciler::new(&map, DIR).reconcile(&elements);

    assert_eq!(out.elements[0].resolution, Resolution::Stripped);
    assert_eq!(out.elements[1].resolution, Resolution::Exact);
    assert_eq!(out.map.nodes["mynode"], entry("mine"));
    assert_eq!(out.map.nodes["flowchart-mynode-2"], entry("mine"));
    // the caller's map is untouched
    assert_eq!(map.nodes.len(), 1);
}

#[test]
fn repeated_generated_id_inherits_synthesized_resolution() {
    let map = MetadataMap::empty();
    let elements = [
        RenderedElement::new(ElementKind::Node, "publish_report", "Publish Report"),
        RenderedElement::new(ElementKind::Node, "publish_report", "Publish Report"),
    ];
    let out = Reconciler::new(&map, DIR).reconcile(&elements);

    assert_eq!(out.elements[0].resolution, Resolution::Synthesized);
    assert_eq!(out.elements[1].resolution, Resolution::Synthesized);
    assert_eq!(out.stats.nodes.mapped, 0);
    assert_eq!(out.stats.nodes.synthesized, 2);
}

#[test]
fn repeated_generated_id_inherits_provided_resolution() {
    let map = map_with_nodes(&[("mynode", "mine")]);
    let elements = [
        RenderedElement::new(ElementKind::Node, "flowchart-mynode-2", ""),
        RenderedElement::new(ElementKind::Node, "flowchart-mynode-2", ""),
    ];
    let out = Reconciler::new(&map, DIR).reconcile(&elements);

    assert_eq!(out.elements[1].resolution, Resolution::Stripped);
    assert_eq!(out.elements[1].entry, entry("mine"));
    assert_eq!(out.stats.nodes.mapped, 2);
}

#[test]
fn exact_step_folds_case() {
    let map = map_with_nodes(&[("Flowchart-A-1", "cased key")]);
    let el = RenderedElement::new(ElementKind::Node, "flowchart-a-1", "");
    let (got, how) = reconcile_element(&el, &map, DIR);
    assert_eq!(how, Resolution::Exact);
    assert_eq!(got.story_text, "cased key");

    let out = Reconciler::new(&map, DIR).reconcile([&el]);
    assert_eq!(out.elements[0].resolution, Resolution::Exact);
    assert_eq!(out.stats.nodes.mapped, 1);
    assert!(!out.map.nodes.contains_key("flowchart-a-1"));
}

#[test]
fn exact_step_folds_case_against_pass_aliases() {
    let map = MetadataMap::empty();
    let elements = [
        RenderedElement::new(ElementKind::Node, "Login", "Login page.png"),
        RenderedElement::new(ElementKind::Node, "login", "Other"),
    ];
    let out = Reconciler::new(&map, DIR).reconcile(&elements);

    assert_eq!(out.elements[1].resolution, Resolution::Synthesized);
    assert_eq!(out.elements[1].entry, out.elements[0].entry);
    assert_eq!(out.stats.nodes.synthesized, 2);
}

#[test]
fn fixture_svg_scans_in_document_order() {
    let svg = fixture("svg/story.svg");
    let groups = scan_svg(&svg).expect("scan");
    let summary: Vec<(ElementKind, &str, &str)> = groups
        .iter()
        .map(|g| {
            (
                g.element.kind,
                g.element.generated_id.as_str(),
                g.element.label.as_str(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (ElementKind::Node, "flowchart-W1_S2-0", "Open the workspace"),
            (ElementKind::Node, "flowchart-mynode-2", "Custom node"),
            (ElementKind::Node, "flowchart-A-3", "User logs in to dashboard"),
            (
                ElementKind::Node,
                "flowchart-B-4",
                "See screenshot login.png for details"
            ),
            (ElementKind::Node, "publish_report", "Publish Report"),
            (ElementKind::Edge, "L-W1_S2-mynode-0", "Configure"),
            (ElementKind::Edge, "L-A-B-0", "Approve publish.gif"),
        ]
    );
    assert!(!groups[4].has_engine_id);
}

#[test]
fn fixture_svg_enriches_every_element() {
    let svg = fixture("svg/story.svg");
    let map = MetadataMap::from_json_str(&fixture("site/assets/data/mermaid-map.json"))
        .expect("map");
    let enriched = enrich_svg(&svg, &map, DIR).expect("enrich");

    let resolutions: Vec<(&str, Resolution)> = enriched
        .reconciliation
        .elements
        .iter()
        .map(|e| (e.generated_id.as_str(), e.resolution))
        .collect();
    assert_eq!(
        resolutions,
        vec![
            ("flowchart-W1_S2-0", Resolution::Token),
            ("flowchart-mynode-2", Resolution::Stripped),
            ("flowchart-A-3", Resolution::Label),
            ("flowchart-B-4", Resolution::Synthesized),
            ("publish_report", Resolution::Synthesized),
            ("L-W1_S2-mynode-0", Resolution::Token),
            ("L-A-B-0", Resolution::Synthesized),
        ]
    );

    for e in &enriched.reconciliation.elements {
        assert!(!e.entry.story_text.is_empty(), "{}", e.generated_id);
        let needle = format!(r#"data-mid="{}""#, e.generated_id);
        assert!(enriched.svg.contains(&needle), "missing {needle}");
    }
    assert_eq!(enriched.svg.matches(r#"tabindex="0""#).count(), 7);

    let edge = enriched
        .reconciliation
        .get(ElementKind::Edge, "L-A-B-0")
        .expect("edge");
    assert_eq!(edge.entry.story_text, "Approve");
    assert_eq!(
        edge.entry.screenshots[0].file,
        "assets/screenshots/publish.gif"
    );
}
