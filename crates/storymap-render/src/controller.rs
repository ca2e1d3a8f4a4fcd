use crate::engine::{DiagramRenderer, EngineConfig, next_diagram_id};
use crate::source::AssetSource;
use crate::widgets::{PanZoomOptions, WidgetHost, WidgetSession};
use storymap_core::reconcile::Reconciliation;
use storymap_core::{MetadataMap, SiteConfig, enrich_svg};

pub const EMPTY_SOURCE_MESSAGE: &str = "No Mermaid source to render.";

/// Result of one render pass, as shown in the diagram area.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// The editor holds no source.
    Empty,
    Rendered(RenderedDiagram),
    /// The engine rejected the source; the diagram area shows the detail instead.
    Failed(RenderFailure),
}

#[derive(Debug, Clone)]
pub struct RenderedDiagram {
    pub diagram_id: String,
    /// Annotated SVG, or the raw engine output when enhancement failed.
    pub svg: String,
    pub reconciliation: Option<Reconciliation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    pub message: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Owns the editable diagram source, the loaded metadata map, and the widget session of the
/// most recent render.
pub struct RenderController<S, R, H> {
    config: SiteConfig,
    source: S,
    renderer: R,
    host: H,
    editor_text: String,
    map: MetadataMap,
    error_text: String,
    session: Option<WidgetSession>,
}

impl<S, R, H> RenderController<S, R, H>
where
    S: AssetSource,
    R: DiagramRenderer,
    H: WidgetHost,
{
    pub fn new(config: SiteConfig, source: S, renderer: R, host: H) -> Self {
        Self {
            config,
            source,
            renderer,
            host,
            editor_text: String::new(),
            map: MetadataMap::empty(),
            error_text: String::new(),
            session: None,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn source_text(&self) -> &str {
        &self.editor_text
    }

    pub fn set_source(&mut self, text: impl Into<String>) {
        self.editor_text = text.into();
    }

    pub fn map(&self) -> &MetadataMap {
        &self.map
    }

    pub fn set_map(&mut self, map: MetadataMap) {
        self.map = map;
    }

    /// Visible warning/error line; empty when there is nothing to report.
    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn session(&self) -> Option<&WidgetSession> {
        self.session.as_ref()
    }

    /// Loads the diagram source and metadata map concurrently.
    ///
    /// Neither failure is an error: a missing source becomes a placeholder comment plus a
    /// visible warning; a missing or malformed map becomes an empty map.
    pub async fn fetch_initial(&mut self) {
        self.error_text.clear();
        let diagram_path = self.config.diagram_path().to_string();
        let map_path = self.config.map_path().to_string();

        let (src, map_text) = futures::join!(
            self.source.fetch_text(&diagram_path),
            self.source.fetch_text(&map_path)
        );

        let src = src.unwrap_or_else(|err| {
            tracing::warn!(path = %diagram_path, error = %err, "diagram source fetch failed");
            None
        });
        match src {
            Some(text) => self.editor_text = text,
            None => {
                self.editor_text = format!("// Could not fetch {diagram_path}");
                self.error_text = format!("Warning: could not fetch {diagram_path}");
            }
        }

        let map_text = map_text.unwrap_or_else(|err| {
            tracing::warn!(path = %map_path, error = %err, "metadata map fetch failed");
            None
        });
        self.map = match map_text {
            Some(text) => MetadataMap::from_json_str_lenient(&text),
            None => MetadataMap::empty(),
        };
    }

    /// Renders the current editor text and re-attaches widgets.
    ///
    /// The previous widget session is always torn down before a new one is created.
    pub fn render(&mut self) -> RenderOutcome {
        self.error_text.clear();
        if self.editor_text.trim().is_empty() {
            self.replace_session(None, None);
            return RenderOutcome::Empty;
        }

        let diagram_id = next_diagram_id();
        let engine = EngineConfig::from_site_config(&self.config);
        let svg = match self
            .renderer
            .render(&diagram_id, &self.editor_text, &engine)
        {
            Ok(svg) => svg,
            Err(err) => {
                tracing::error!(error = %err, "diagram render failed");
                self.error_text = format!("Render error: {err}");
                self.replace_session(None, None);
                return RenderOutcome::Failed(RenderFailure {
                    message: err.to_string(),
                    detail: err.detail(),
                });
            }
        };

        // The engine has returned, so layout is final; enhance immediately.
        let (svg, reconciliation) =
            match enrich_svg(&svg, &self.map, self.config.screenshot_dir()) {
                Ok(enriched) => (enriched.svg, Some(enriched.reconciliation)),
                Err(err) => {
                    tracing::warn!(error = %err, "tooltip enhancement failed");
                    (svg, None)
                }
            };

        self.replace_session(Some(&diagram_id), reconciliation.as_ref());
        RenderOutcome::Rendered(RenderedDiagram {
            diagram_id,
            svg,
            reconciliation,
        })
    }

    fn replace_session(&mut self, svg_id: Option<&str>, reconciliation: Option<&Reconciliation>) {
        if let Some(previous) = self.session.take() {
            previous.teardown(&mut self.host);
        }
        if svg_id.is_none() && reconciliation.is_none() {
            return;
        }
        let pan_zoom = PanZoomOptions::from_site_config(&self.config);
        self.session = Some(WidgetSession::init(
            &mut self.host,
            svg_id,
            reconciliation,
            &pan_zoom,
        ));
    }

    /// The current editor text as a downloadable file.
    pub fn download(&self) -> DownloadArtifact {
        DownloadArtifact {
            file_name: self.config.download_name().to_string(),
            mime: "text/plain",
            bytes: self.editor_text.as_bytes().to_vec(),
        }
    }
}
