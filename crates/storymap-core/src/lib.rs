#![forbid(unsafe_code)]

//! Metadata model + identifier reconciliation for annotated diagram elements.
//!
//! A rendered diagram names its elements with engine-generated ids; authors describe those
//! elements in a separate metadata map keyed by ids of their own choosing. This crate:
//! - scans rendered SVG for node/edge groups ([`scan`])
//! - resolves every group to exactly one [`Entry`], provided or synthesized ([`reconcile`])
//! - tags the SVG so a presentation layer can find each element again ([`annotate`])

pub mod annotate;
pub mod config;
pub mod error;
pub mod label;
pub mod model;
pub mod reconcile;
pub mod scan;

pub use config::SiteConfig;
pub use error::{Error, Result};
pub use model::{
    ElementKind, Entry, MetadataMap, Namespace, ReconciledElement, RenderedElement, Resolution,
    Screenshot,
};
pub use reconcile::{Reconciler, Reconciliation, reconcile_element};
pub use scan::{ScannedGroup, scan_svg};

/// Scans, reconciles and annotates one rendered SVG.
#[derive(Debug, Clone)]
pub struct EnrichedSvg {
    pub svg: String,
    pub reconciliation: Reconciliation,
}

pub fn enrich_svg(svg: &str, map: &MetadataMap, screenshot_dir: &str) -> Result<EnrichedSvg> {
    let groups = scan_svg(svg)?;
    let reconciliation =
        Reconciler::new(map, screenshot_dir).reconcile(groups.iter().map(|g| &g.element));
    let svg = annotate::annotate_svg(svg, &groups)?;
    Ok(EnrichedSvg {
        svg,
        reconciliation,
    })
}
