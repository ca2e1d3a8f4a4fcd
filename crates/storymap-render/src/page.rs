//! Static page fragment for the story diagram: editor, controls, diagram area, and the widget
//! payload consumed by the browser-side tooltip and pan/zoom libraries.

use crate::controller::{EMPTY_SOURCE_MESSAGE, RenderController, RenderOutcome};
use crate::engine::DiagramRenderer;
use crate::html;
use crate::source::AssetSource;
use crate::tooltip::image_modal_markup;
use crate::widgets::{PanZoomBinding, StaticHost, TooltipSpec};
use serde::Serialize;
use storymap_core::MetadataMap;

pub const PAYLOAD_SCRIPT_ID: &str = "storymap-widgets";
pub const CONTAINER_ID: &str = "mermaid-container";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadBinding<'a> {
    pub button: &'static str,
    pub file_name: &'a str,
    pub source_element: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPayload<'a> {
    pub diagram_id: Option<&'a str>,
    /// Delay before the browser attaches widgets to the inserted SVG.
    pub enhance_delay_ms: u64,
    pub pan_zoom: Option<&'a PanZoomBinding>,
    pub tooltips: Vec<&'a TooltipSpec>,
    /// Reconciled map (provided entries plus generated-id aliases).
    pub map: Option<&'a MetadataMap>,
    pub download: DownloadBinding<'a>,
}

pub struct PageView<'a> {
    pub source_text: &'a str,
    pub error_text: &'a str,
    pub outcome: &'a RenderOutcome,
    pub host: &'a StaticHost,
    pub enhance_delay_ms: u64,
    pub download_name: &'a str,
}

impl<'a> PageView<'a> {
    pub fn payload(&self) -> WidgetPayload<'a> {
        let (diagram_id, map) = match self.outcome {
            RenderOutcome::Rendered(d) => (
                Some(d.diagram_id.as_str()),
                d.reconciliation.as_ref().map(|r| &r.map),
            ),
            _ => (None, None),
        };
        WidgetPayload {
            diagram_id,
            enhance_delay_ms: self.enhance_delay_ms,
            pan_zoom: self.host.pan_zoom(),
            tooltips: self.host.tooltips().collect(),
            map,
            download: DownloadBinding {
                button: "btn-download",
                file_name: self.download_name,
                source_element: "source",
            },
        }
    }
}

fn diagram_area(outcome: &RenderOutcome) -> String {
    match outcome {
        RenderOutcome::Empty => format!(
            r#"<div style="color: #64748b;">{}</div>"#,
            html::text(EMPTY_SOURCE_MESSAGE)
        ),
        RenderOutcome::Rendered(d) => d.svg.clone(),
        RenderOutcome::Failed(f) => format!(
            r#"<pre style="color: #b91c1c;">{}</pre>"#,
            html::text(&f.detail)
        ),
    }
}

pub fn render_page_fragment(view: &PageView<'_>) -> crate::Result<String> {
    let payload = html::json_script_body(&view.payload())?;

    let mut out = String::new();
    out.push_str(r#"<div class="storymap">"#);
    out.push_str(r#"<div class="storymap-toolbar">"#);
    out.push_str(r#"<button id="btn-render" type="button">Render</button>"#);
    out.push_str(&format!(
        r#"<button id="btn-download" type="button" data-download-name="{}">Download</button>"#,
        html::attr(view.download_name)
    ));
    out.push_str(r#"<button id="btn-zoom-in" type="button" aria-label="Zoom in">+</button>"#);
    out.push_str(r#"<button id="btn-zoom-out" type="button" aria-label="Zoom out">-</button>"#);
    out.push_str(r#"<button id="btn-zoom-reset" type="button">Reset</button>"#);
    out.push_str("</div>");
    out.push_str(r#"<textarea id="source" spellcheck="false">"#);
    out.push_str(&html::text(view.source_text));
    out.push_str("</textarea>");
    out.push_str(r#"<div id="error" role="status">"#);
    out.push_str(&html::text(view.error_text));
    out.push_str("</div>");
    out.push_str(&format!(r#"<div id="{CONTAINER_ID}">"#));
    out.push_str(&diagram_area(view.outcome));
    out.push_str("</div>");
    out.push_str(&format!(
        r#"<script type="application/json" id="{PAYLOAD_SCRIPT_ID}">{payload}</script>"#
    ));
    out.push_str("</div>");
    out.push_str(&image_modal_markup());
    Ok(out)
}

impl<S, R> RenderController<S, R, StaticHost>
where
    S: AssetSource,
    R: DiagramRenderer,
{
    pub fn page_view<'a>(&'a self, outcome: &'a RenderOutcome) -> PageView<'a> {
        PageView {
            source_text: self.source_text(),
            error_text: self.error_text(),
            outcome,
            host: self.host(),
            enhance_delay_ms: self.config().enhance_delay_ms(),
            download_name: self.config().download_name(),
        }
    }

    pub fn page_fragment(&self, outcome: &RenderOutcome) -> crate::Result<String> {
        render_page_fragment(&self.page_view(outcome))
    }
}
