#![forbid(unsafe_code)]

//! Persona tabs, the integration helper panel, and hotspot-annotated screenshots, rendered to
//! static HTML and injected into a site page.

pub mod hotspots;
pub mod model;
pub mod panel;
pub mod personas;

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use storymap_core::SiteConfig;
use storymap_render::{AssetSource, FetchError};

pub use hotspots::render_annotated_image;
pub use model::{AnnotatedImage, Cta, Hotspot, HotspotsData, ImageRef, Persona, PersonasData};
pub use panel::{PanelOptions, SHOT_MODAL_ID, integration_helper_panel, shot_modal_markup};
pub use personas::render_persona_tabs;

pub const DEFAULT_IMAGE_ID: &str = "integration-helper";
pub const DEFAULT_ROOT_ID: &str = "visuals-root";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path} is not available")]
    Missing { path: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("page rewrite failed: {message}")]
    Rewrite { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisualsData {
    pub hotspots: HotspotsData,
    pub personas: PersonasData,
}

/// Rendered visuals: the content for the root element plus the modal the hotspots open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualsFragment {
    pub root_id: String,
    pub html: String,
    pub modal: String,
}

async fn fetch_json<S, T>(source: &S, path: &str) -> Result<T>
where
    S: AssetSource,
    T: serde::de::DeserializeOwned,
{
    let text = source
        .fetch_text(path)
        .await?
        .ok_or_else(|| Error::Missing {
            path: path.to_string(),
        })?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_string(),
        source,
    })
}

/// Fetches `hotspots.json` and `personas.json`. Both are required.
pub async fn load_visuals<S: AssetSource>(source: &S, config: &SiteConfig) -> Result<VisualsData> {
    let (hotspots, personas) = futures::join!(
        fetch_json::<_, HotspotsData>(source, config.hotspots_path()),
        fetch_json::<_, PersonasData>(source, config.personas_path())
    );
    Ok(VisualsData {
        hotspots: hotspots?,
        personas: personas?,
    })
}

pub fn render_visuals(data: &VisualsData, config: &SiteConfig) -> VisualsFragment {
    let image_id = config.get_str("visuals.imageId").unwrap_or(DEFAULT_IMAGE_ID);
    let image_html = data.hotspots.image(image_id).map(render_annotated_image);

    let mut html = render_persona_tabs(&data.personas.personas);
    html.push_str(&integration_helper_panel(
        &PanelOptions::from_site_config(config),
        image_html.as_deref(),
    ));

    VisualsFragment {
        root_id: config
            .get_str("visuals.rootId")
            .unwrap_or(DEFAULT_ROOT_ID)
            .to_string(),
        html,
        modal: shot_modal_markup(),
    }
}

/// Loads and renders the visuals. A failure to load either document is logged and the feature
/// is skipped.
pub async fn init_visuals<S: AssetSource>(
    source: &S,
    config: &SiteConfig,
) -> Option<VisualsFragment> {
    match load_visuals(source, config).await {
        Ok(data) => Some(render_visuals(&data, config)),
        Err(err) => {
            tracing::error!(error = %err, "visuals init error");
            None
        }
    }
}

fn rewrite(page: &str, settings: RewriteStrSettings<'_, '_>) -> Result<String> {
    rewrite_str(page, settings).map_err(|err| Error::Rewrite {
        message: err.to_string(),
    })
}

/// Appends `fragment` to the page element whose id is `fragment.root_id`.
///
/// Returns `Ok(None)` when the page has no such element. The shot modal is appended to `<body>`
/// (or to the root when there is no body) unless the page already carries one.
pub fn inject_visuals(page: &str, fragment: &VisualsFragment) -> Result<Option<String>> {
    let mut has_root = false;
    let mut has_modal = false;
    let mut has_body = false;
    rewrite(
        page,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("[id]", |el| {
                    match el.get_attribute("id").as_deref() {
                        Some(id) if id == fragment.root_id => has_root = true,
                        Some(SHOT_MODAL_ID) => has_modal = true,
                        _ => {}
                    }
                    Ok(())
                }),
                element!("body", |_el| {
                    has_body = true;
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )?;

    if !has_root {
        tracing::debug!(root = %fragment.root_id, "page has no visuals root");
        return Ok(None);
    }

    let modal_in_body = !has_modal && has_body;
    let modal_in_root = !has_modal && !has_body;
    let mut injected = false;
    let out = rewrite(
        page,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("[id]", |el| {
                    let is_root =
                        el.get_attribute("id").as_deref() == Some(fragment.root_id.as_str());
                    if injected || !is_root {
                        return Ok(());
                    }
                    injected = true;
                    el.append(&fragment.html, ContentType::Html);
                    if modal_in_root {
                        el.append(&fragment.modal, ContentType::Html);
                    }
                    Ok(())
                }),
                element!("body", |el| {
                    if modal_in_body {
                        el.append(&fragment.modal, ContentType::Html);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )?;
    Ok(Some(out))
}
