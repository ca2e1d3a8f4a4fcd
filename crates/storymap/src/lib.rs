#![forbid(unsafe_code)]

//! `storymap` turns a rendered story diagram into an interactive page section.
//!
//! Authors keep a metadata map (screenshots and story text per node/edge) next to the diagram
//! source. The rendering engine assigns its own element ids; `storymap` reconciles the two so
//! every element gets exactly one tooltip entry, provided or synthesized from its label.
//!
//! # Features
//!
//! - `render`: fetch/render/enhance controller and page fragment (`storymap::render`)
//! - `visuals`: persona tabs and hotspot-annotated screenshots (`storymap::visuals`)
//! - `http`: fetch site assets over HTTP

pub use storymap_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use storymap_render::controller::{
        DownloadArtifact, RenderController, RenderFailure, RenderOutcome, RenderedDiagram,
    };
    pub use storymap_render::engine::{
        CommandRenderer, DiagramRenderer, EngineConfig, PrerenderedRenderer, RenderError,
    };
    pub use storymap_render::page::{PageView, WidgetPayload, render_page_fragment};
    pub use storymap_render::source::{AssetSource, FetchError, FsSource, MemorySource};
    pub use storymap_render::widgets::{
        PanZoomOptions, StaticHost, TooltipSpec, WidgetError, WidgetHandle, WidgetHost,
        WidgetSession,
    };

    #[cfg(feature = "http")]
    pub use storymap_render::source::HttpSource;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Core(#[from] storymap_core::Error),
        #[error(transparent)]
        Render(#[from] storymap_render::Error),
        #[error("payload JSON error: {0}")]
        Json(#[from] serde_json::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// One page render: the controller state after rendering plus the HTML fragment.
    #[derive(Debug, Clone)]
    pub struct StoryPage {
        pub outcome: RenderOutcome,
        /// Warning raised while fetching the initial source, if any.
        pub fetch_warning: Option<String>,
        pub error_text: String,
        pub fragment: String,
        /// The widget payload embedded in `fragment`, pretty-printed.
        pub payload_json: String,
    }

    /// Fetches the initial source and map, renders once, and builds the page fragment.
    ///
    /// `source_override` replaces the fetched diagram source, as if the user had edited it.
    pub async fn render_story<S, R>(
        config: storymap_core::SiteConfig,
        source: S,
        renderer: R,
        source_override: Option<String>,
    ) -> Result<StoryPage>
    where
        S: AssetSource,
        R: DiagramRenderer,
    {
        let mut ctl = RenderController::new(config, source, renderer, StaticHost::new());
        ctl.fetch_initial().await;
        let fetch_warning = Some(ctl.error_text().to_string()).filter(|w| !w.is_empty());
        if let Some(text) = source_override {
            ctl.set_source(text);
        }
        let outcome = ctl.render();
        let fragment = ctl.page_fragment(&outcome)?;
        let payload_json = serde_json::to_string_pretty(&ctl.page_view(&outcome).payload())?;
        Ok(StoryPage {
            fetch_warning,
            error_text: ctl.error_text().to_string(),
            outcome,
            fragment,
            payload_json,
        })
    }

    /// Synchronous [`render_story`] (executor-free).
    pub fn render_story_sync<S, R>(
        config: storymap_core::SiteConfig,
        source: S,
        renderer: R,
        source_override: Option<String>,
    ) -> Result<StoryPage>
    where
        S: AssetSource,
        R: DiagramRenderer,
    {
        futures::executor::block_on(render_story(config, source, renderer, source_override))
    }
}

#[cfg(feature = "visuals")]
pub mod visuals {
    pub use storymap_visuals::*;

    /// Synchronous [`init_visuals`] (executor-free).
    pub fn init_visuals_sync<S: storymap_render::AssetSource>(
        source: &S,
        config: &storymap_core::SiteConfig,
    ) -> Option<VisualsFragment> {
        futures::executor::block_on(init_visuals(source, config))
    }
}

#[cfg(all(test, feature = "render"))]
mod tests {
    use super::render::*;
    use super::*;

    #[test]
    fn render_story_sync_reports_empty_source() {
        let page = render_story_sync(
            SiteConfig::defaults(),
            MemorySource::new(),
            PrerenderedRenderer::new("<svg></svg>"),
            Some(String::new()),
        )
        .expect("page");
        assert!(matches!(page.outcome, RenderOutcome::Empty));
        assert!(page.fragment.contains("No Mermaid source to render."));
        assert_eq!(page.error_text, "");
        assert!(page.fetch_warning.is_some());
    }

    #[test]
    fn render_story_sync_warns_about_missing_source() {
        let page = render_story_sync(
            SiteConfig::defaults(),
            MemorySource::new(),
            PrerenderedRenderer::new("<svg></svg>"),
            None,
        )
        .expect("page");
        assert_eq!(
            page.fetch_warning.as_deref(),
            Some("Warning: could not fetch /assets/data/story.mmd")
        );
        assert!(matches!(page.outcome, RenderOutcome::Rendered(_)));
        assert!(page.payload_json.contains("\"diagramId\""));
    }
}
