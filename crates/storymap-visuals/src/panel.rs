use htmlize::{escape_attribute as attr, escape_text as text};
use storymap_core::SiteConfig;

pub const SHOT_MODAL_ID: &str = "shotModal";
pub const IMAGE_CONTAINER_ID: &str = "integration-image-container";

pub const DEFAULT_SNIPPET: &str = "from dc43 import write_with_governance\nwrite_with_governance(df, contract=\"bronze/orders\", enforce=True, workspace=\"myws\")";
pub const DEFAULT_DOCS_HREF: &str =
    "https://github.com/NextLab-SRL/dc43/tree/main/examples/databricks";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelOptions {
    pub snippet: String,
    pub docs_href: String,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            snippet: DEFAULT_SNIPPET.to_string(),
            docs_href: DEFAULT_DOCS_HREF.to_string(),
        }
    }
}

impl PanelOptions {
    pub fn from_site_config(config: &SiteConfig) -> Self {
        let defaults = Self::default();
        Self {
            snippet: config
                .get_str("visuals.snippet")
                .map(str::to_string)
                .unwrap_or(defaults.snippet),
            docs_href: config
                .get_str("visuals.docsHref")
                .map(str::to_string)
                .unwrap_or(defaults.docs_href),
        }
    }
}

/// Integration helper card: the adapter snippet with a copy button, a docs link, and the slot
/// the annotated screenshot is rendered into.
pub fn integration_helper_panel(options: &PanelOptions, image_html: Option<&str>) -> String {
    let mut out = String::from(r#"<div class="card mt-4"><div class="card-body">"#);
    out.push_str(r#"<h5 class="card-title">Integration helper</h5>"#);
    out.push_str(r#"<div class="position-relative">"#);
    out.push_str(&format!(
        r#"<pre class="code-snippet"><code id="integration-snippet">{}</code></pre>"#,
        text(options.snippet.as_str())
    ));
    out.push_str(
        r##"<button type="button" class="btn btn-sm btn-outline-secondary copy-btn" data-copy-target="#integration-snippet">Copy</button>"##,
    );
    out.push_str("</div>");
    out.push_str(&format!(
        r#"<a class="btn btn-primary mt-2" href="{}" target="_blank" rel="noopener">Open in Databricks</a>"#,
        attr(options.docs_href.as_str())
    ));
    out.push_str(&format!(r#"<div id="{IMAGE_CONTAINER_ID}" class="mt-3">"#));
    if let Some(image_html) = image_html {
        out.push_str(image_html);
    }
    out.push_str("</div>");
    out.push_str("</div></div>");
    out
}

/// Bootstrap modal opened by hotspot buttons.
pub fn shot_modal_markup() -> String {
    format!(
        r##"<div class="modal fade" id="{SHOT_MODAL_ID}" tabindex="-1" aria-hidden="true"><div class="modal-dialog modal-dialog-centered modal-lg"><div class="modal-content"><div class="modal-header"><h5 class="modal-title" id="shotModalTitle"></h5><button type="button" class="btn-close" data-bs-dismiss="modal" aria-label="Close"></button></div><div class="modal-body"><p id="shotModalBody"></p><pre class="code-snippet"><code id="shotModalCode"></code></pre></div><div class="modal-footer"><a id="shotModalDocs" class="btn btn-outline-primary" href="#" target="_blank" rel="noopener">Docs</a></div></div></div></div>"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn panel_shows_snippet_and_hosts_image() {
        let html = integration_helper_panel(&PanelOptions::default(), Some("<img/>"));
        assert!(html.contains("from dc43 import write_with_governance\n"));
        assert!(html.contains("bronze/orders"));
        assert!(html.contains(r#"<div id="integration-image-container" class="mt-3"><img/></div>"#));
        assert!(html.contains(DEFAULT_DOCS_HREF));
    }

    #[test]
    fn panel_options_follow_config() {
        let cfg = SiteConfig::with_overrides(&json!({
            "visuals": { "docsHref": "https://example.org/x" }
        }));
        let opts = PanelOptions::from_site_config(&cfg);
        assert_eq!(opts.docs_href, "https://example.org/x");
        assert_eq!(opts.snippet, DEFAULT_SNIPPET);
    }
}
