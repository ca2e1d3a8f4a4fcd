#![forbid(unsafe_code)]

//! Headless story-diagram pipeline: fetch the diagram source and metadata map, render through an
//! external engine, reconcile and annotate the SVG, and describe the tooltip/pan-zoom widgets
//! the page should attach.

pub mod controller;
pub mod engine;
pub mod html;
pub mod page;
pub mod source;
pub mod tooltip;
pub mod widgets;

pub use controller::{
    DownloadArtifact, RenderController, RenderFailure, RenderOutcome, RenderedDiagram,
};
pub use engine::{
    CommandRenderer, DiagramRenderer, EngineConfig, PrerenderedRenderer, RenderError,
};
pub use page::{PageView, render_page_fragment};
pub use source::{AssetSource, FetchError, FsSource, MemorySource};
pub use widgets::{
    PanZoomOptions, StaticHost, TooltipSpec, WidgetError, WidgetHandle, WidgetHost,
    WidgetSession,
};

#[cfg(feature = "http")]
pub use source::HttpSource;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] storymap_core::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("payload JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
