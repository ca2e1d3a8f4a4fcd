use futures::executor::block_on;
use std::path::{Path, PathBuf};
use storymap_core::SiteConfig;
use storymap_render::{FsSource, MemorySource};
use storymap_visuals::{VisualsFragment, init_visuals, inject_visuals, load_visuals};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture_site() -> FsSource {
    FsSource::new(repo_root().join("fixtures/site"))
}

fn fixture_page() -> String {
    std::fs::read_to_string(repo_root().join("fixtures/site/index.html")).expect("fixture page")
}

fn fragment() -> VisualsFragment {
    block_on(init_visuals(&fixture_site(), &SiteConfig::defaults())).expect("visuals")
}

#[test]
fn load_visuals_reads_both_documents() {
    let data = block_on(load_visuals(&fixture_site(), &SiteConfig::defaults())).expect("load");
    assert_eq!(data.hotspots.images.len(), 2);
    assert_eq!(data.personas.personas.len(), 2);
    let helper = data.hotspots.image("integration-helper").expect("image");
    assert_eq!(helper.hotspots[1].docs, None);
}

#[test]
fn personas_default_alt_texts_and_first_tab_is_active() {
    let html = fragment().html;
    assert!(html.contains(r#"alt="Data steward hero""#), "{html}");
    assert!(html.contains(r#"alt="Data engineer visual""#), "{html}");
    assert!(html.contains(r#"alt="Quality dashboard""#), "{html}");
    assert!(html.contains(r#"class="tab-pane fade show active" id="persona-engineer""#));
    assert!(html.contains(r#"class="tab-pane fade" id="persona-steward""#));
}

#[test]
fn integration_image_is_rendered_into_the_panel() {
    let html = fragment().html;
    assert!(html.contains("/dc43-website/assets/img/integration-helper.png"));
    assert!(!html.contains("/dc43-website/assets/img/other.png"));
    assert_eq!(html.matches("hotspot pulse").count(), 2);
    assert!(html.contains(r#"data-docs="/docs/contracts""#));
    assert!(html.contains(r##"data-docs="#""##));
    assert!(html.contains("Labels: 1. Contract \u{2014} 2. Enforce"));
}

#[test]
fn missing_personas_skips_the_feature() {
    let hotspots = std::fs::read_to_string(
        repo_root().join("fixtures/site/dc43-website/assets/data/hotspots.json"),
    )
    .expect("hotspots");
    let source =
        MemorySource::new().with_file("/dc43-website/assets/data/hotspots.json", hotspots);
    assert!(block_on(init_visuals(&source, &SiteConfig::defaults())).is_none());
}

#[test]
fn malformed_hotspots_skips_the_feature() {
    let source = MemorySource::new()
        .with_file("/dc43-website/assets/data/hotspots.json", "{ nope")
        .with_file("/dc43-website/assets/data/personas.json", r#"{"personas": []}"#);
    assert!(block_on(init_visuals(&source, &SiteConfig::defaults())).is_none());
}

#[test]
fn inject_fills_root_and_adds_modal_once() {
    let page = fixture_page();
    let frag = fragment();
    let out = inject_visuals(&page, &frag).expect("inject").expect("root present");
    assert!(out.contains(r#"<div id="visuals-root"><ul class="nav nav-pills mb-3""#), "{out}");
    assert_eq!(out.matches(r#"id="shotModal""#).count(), 1);

    let again = inject_visuals(&out, &frag).expect("inject").expect("root present");
    assert_eq!(again.matches(r#"id="shotModal""#).count(), 1);
}

#[test]
fn inject_without_root_leaves_page_untouched() {
    let page = "<html><body><main></main></body></html>";
    assert_eq!(inject_visuals(page, &fragment()).expect("inject"), None);
}
