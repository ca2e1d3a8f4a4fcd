//! Interactive widget session for one rendered diagram.
//!
//! Tooltips and pan/zoom are provided by external browser libraries. A [`WidgetHost`] creates
//! and destroys their instances; a [`WidgetSession`] owns the instances of exactly one render
//! pass and is torn down before the next pass initializes its own.

use crate::tooltip::tooltip_content;
use serde::{Deserialize, Serialize};
use storymap_core::reconcile::Reconciliation;
use storymap_core::{ElementKind, SiteConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanZoomOptions {
    pub zoom_enabled: bool,
    pub control_icons_enabled: bool,
    pub fit: bool,
    pub center: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_scale_sensitivity: f64,
    pub dbl_click_zoom_enabled: bool,
    pub pan_enabled: bool,
}

impl Default for PanZoomOptions {
    fn default() -> Self {
        Self {
            zoom_enabled: true,
            control_icons_enabled: false,
            fit: true,
            center: true,
            min_zoom: 0.25,
            max_zoom: 6.0,
            zoom_scale_sensitivity: 0.2,
            dbl_click_zoom_enabled: false,
            pan_enabled: true,
        }
    }
}

impl PanZoomOptions {
    pub fn from_site_config(cfg: &SiteConfig) -> Self {
        let Some(value) = cfg.get_value("panZoom") else {
            return Self::default();
        };
        match serde_json::from_value(value.clone()) {
            Ok(opts) => opts,
            Err(err) => {
                tracing::warn!(error = %err, "invalid panZoom config; using defaults");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), WidgetError> {
        let ok = self.min_zoom.is_finite()
            && self.max_zoom.is_finite()
            && self.min_zoom > 0.0
            && self.max_zoom >= self.min_zoom
            && self.zoom_scale_sensitivity.is_finite()
            && self.zoom_scale_sensitivity > 0.0;
        if ok {
            Ok(())
        } else {
            Err(WidgetError::InvalidPanZoom {
                min_zoom: self.min_zoom,
                max_zoom: self.max_zoom,
            })
        }
    }
}

/// Page buttons wired to pan/zoom operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomControls {
    pub zoom_in: ZoomButton,
    pub zoom_out: ZoomButton,
    pub reset: ZoomButton,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoomButton {
    pub button: &'static str,
    /// Widget methods invoked in order on click.
    pub calls: &'static [&'static str],
}

impl Default for ZoomControls {
    fn default() -> Self {
        Self {
            zoom_in: ZoomButton {
                button: "btn-zoom-in",
                calls: &["zoomIn"],
            },
            zoom_out: ZoomButton {
                button: "btn-zoom-out",
                calls: &["zoomOut"],
            },
            reset: ZoomButton {
                button: "btn-zoom-reset",
                calls: &["resetZoom", "fit", "center"],
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Right,
    Top,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOptions {
    pub allow_html: bool,
    pub interactive: bool,
    pub append_to: &'static str,
    pub placement: Placement,
    pub delay: [u32; 2],
    pub hide_on_click: bool,
    pub z_index: u32,
}

impl TooltipOptions {
    pub fn for_kind(kind: ElementKind) -> Self {
        Self {
            allow_html: true,
            interactive: true,
            append_to: "body",
            placement: match kind {
                ElementKind::Node => Placement::Right,
                ElementKind::Edge => Placement::Top,
            },
            delay: [80, 40],
            hide_on_click: false,
            z_index: 999_999,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipSpec {
    /// `data-mid` of the target group.
    pub target: String,
    pub kind: ElementKind,
    pub content: String,
    pub options: TooltipOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WidgetHandle(pub u64);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WidgetError {
    #[error("pan/zoom widget unavailable")]
    PanZoomUnavailable,
    #[error("invalid pan/zoom zoom range {min_zoom}..{max_zoom}")]
    InvalidPanZoom { min_zoom: f64, max_zoom: f64 },
    #[error("tooltip widget failed for {target}: {message}")]
    Tooltip { target: String, message: String },
}

/// Creates and destroys widget instances on behalf of a [`WidgetSession`].
pub trait WidgetHost {
    fn create_pan_zoom(
        &mut self,
        svg_id: &str,
        options: &PanZoomOptions,
        controls: &ZoomControls,
    ) -> Result<WidgetHandle, WidgetError>;

    fn create_tooltip(&mut self, spec: &TooltipSpec) -> Result<WidgetHandle, WidgetError>;

    fn destroy(&mut self, handle: WidgetHandle);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanZoomBinding {
    pub svg_id: String,
    pub options: PanZoomOptions,
    pub controls: ZoomControls,
}

/// Records live widget instances so they can be serialized into the page for the browser-side
/// libraries to instantiate.
#[derive(Debug, Default)]
pub struct StaticHost {
    next: u64,
    pan_zoom: Option<(WidgetHandle, PanZoomBinding)>,
    tooltips: Vec<(WidgetHandle, TooltipSpec)>,
}

impl StaticHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> WidgetHandle {
        self.next += 1;
        WidgetHandle(self.next)
    }

    pub fn pan_zoom(&self) -> Option<&PanZoomBinding> {
        self.pan_zoom.as_ref().map(|(_, b)| b)
    }

    pub fn tooltips(&self) -> impl Iterator<Item = &TooltipSpec> {
        self.tooltips.iter().map(|(_, spec)| spec)
    }

    pub fn live_count(&self) -> usize {
        self.tooltips.len() + usize::from(self.pan_zoom.is_some())
    }
}

impl WidgetHost for StaticHost {
    fn create_pan_zoom(
        &mut self,
        svg_id: &str,
        options: &PanZoomOptions,
        controls: &ZoomControls,
    ) -> Result<WidgetHandle, WidgetError> {
        options.validate()?;
        let handle = self.allocate();
        self.pan_zoom = Some((
            handle,
            PanZoomBinding {
                svg_id: svg_id.to_string(),
                options: options.clone(),
                controls: controls.clone(),
            },
        ));
        Ok(handle)
    }

    fn create_tooltip(&mut self, spec: &TooltipSpec) -> Result<WidgetHandle, WidgetError> {
        let handle = self.allocate();
        self.tooltips.push((handle, spec.clone()));
        Ok(handle)
    }

    fn destroy(&mut self, handle: WidgetHandle) {
        if self.pan_zoom.as_ref().is_some_and(|(h, _)| *h == handle) {
            self.pan_zoom = None;
        }
        self.tooltips.retain(|(h, _)| *h != handle);
    }
}

pub fn tooltip_specs(reconciliation: &Reconciliation) -> Vec<TooltipSpec> {
    reconciliation
        .elements
        .iter()
        .map(|el| TooltipSpec {
            target: el.generated_id.clone(),
            kind: el.kind,
            content: tooltip_content(el.kind, &el.generated_id, &el.entry),
            options: TooltipOptions::for_kind(el.kind),
        })
        .collect()
}

/// Widget instances created for one render pass.
#[derive(Debug, Default)]
pub struct WidgetSession {
    pan_zoom: Option<WidgetHandle>,
    tooltips: Vec<WidgetHandle>,
}

impl WidgetSession {
    /// Creates tooltips for every reconciled element and pan/zoom for the SVG root.
    ///
    /// Failures are logged and leave that widget out; the session is always returned.
    pub fn init<H: WidgetHost + ?Sized>(
        host: &mut H,
        svg_id: Option<&str>,
        reconciliation: Option<&Reconciliation>,
        pan_zoom: &PanZoomOptions,
    ) -> Self {
        let mut session = Self::default();

        if let Some(reconciliation) = reconciliation {
            for spec in tooltip_specs(reconciliation) {
                match host.create_tooltip(&spec) {
                    Ok(handle) => session.tooltips.push(handle),
                    Err(err) => {
                        tracing::warn!(target_mid = %spec.target, error = %err, "tooltip init failed");
                    }
                }
            }
        }

        if let Some(svg_id) = svg_id {
            match host.create_pan_zoom(svg_id, pan_zoom, &ZoomControls::default()) {
                Ok(handle) => session.pan_zoom = Some(handle),
                Err(err) => {
                    tracing::warn!(error = %err, "pan/zoom init failed; skipping pan/zoom");
                }
            }
        }

        session
    }

    pub fn teardown<H: WidgetHost + ?Sized>(self, host: &mut H) {
        if let Some(handle) = self.pan_zoom {
            host.destroy(handle);
        }
        for handle in self.tooltips {
            host.destroy(handle);
        }
    }

    pub fn has_pan_zoom(&self) -> bool {
        self.pan_zoom.is_some()
    }

    pub fn tooltip_count(&self) -> usize {
        self.tooltips.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pan_zoom_defaults_serialize_with_library_names() {
        let v = serde_json::to_value(PanZoomOptions::default()).expect("json");
        assert_eq!(v["minZoom"], json!(0.25));
        assert_eq!(v["maxZoom"], json!(6.0));
        assert_eq!(v["dblClickZoomEnabled"], json!(false));
        assert_eq!(v["controlIconsEnabled"], json!(false));
    }

    #[test]
    fn pan_zoom_config_overrides_merge_with_defaults() {
        let cfg = SiteConfig::with_overrides(&json!({ "panZoom": { "maxZoom": 3.0 } }));
        let opts = PanZoomOptions::from_site_config(&cfg);
        assert_eq!(opts.max_zoom, 3.0);
        assert_eq!(opts.min_zoom, 0.25);
    }

    #[test]
    fn inverted_zoom_range_is_rejected() {
        let opts = PanZoomOptions {
            min_zoom: 4.0,
            max_zoom: 1.0,
            ..PanZoomOptions::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn static_host_destroy_removes_only_that_instance() {
        let mut host = StaticHost::new();
        let pz = host
            .create_pan_zoom("svg", &PanZoomOptions::default(), &ZoomControls::default())
            .expect("pan zoom");
        let spec = TooltipSpec {
            target: "n".to_string(),
            kind: ElementKind::Node,
            content: String::new(),
            options: TooltipOptions::for_kind(ElementKind::Node),
        };
        let t = host.create_tooltip(&spec).expect("tooltip");
        assert_eq!(host.live_count(), 2);
        host.destroy(pz);
        assert!(host.pan_zoom().is_none());
        assert_eq!(host.live_count(), 1);
        host.destroy(t);
        assert_eq!(host.live_count(), 0);
    }
}
