use crate::model::{AnnotatedImage, Hotspot};
use htmlize::{escape_attribute as attr, escape_text as text};

fn aria_label(hs: &Hotspot) -> String {
    format!("{}. {}", hs.label, hs.title)
}

pub fn hotspot_button(hs: &Hotspot) -> String {
    format!(
        r#"<button type="button" class="btn btn-sm hotspot pulse" style="position: absolute; left: {x}%; top: {y}%; transform: translate(-50%, -50%);" data-title="{title}" data-body="{body}" data-code="{code}" data-docs="{docs}" aria-label="{aria}">{label}</button>"#,
        x = hs.x,
        y = hs.y,
        title = attr(hs.title.as_str()),
        body = attr(hs.body.as_str()),
        code = attr(hs.code.as_str()),
        docs = attr(hs.docs.as_deref().filter(|d| !d.is_empty()).unwrap_or("#")),
        aria = attr(aria_label(hs)),
        label = text(hs.label.as_str()),
    )
}

/// Screenshot with absolutely positioned hotspot buttons, followed by a text transcript of the
/// markers.
pub fn render_annotated_image(image: &AnnotatedImage) -> String {
    let mut out = String::from(r#"<div class="screenshot-wrap" style="position: relative;">"#);
    out.push_str(&format!(
        r#"<img class="screenshot-img" src="{}" alt="{}" loading="lazy"/>"#,
        attr(image.file.as_str()),
        attr(image.alt.as_str())
    ));
    for hs in &image.hotspots {
        out.push_str(&hotspot_button(hs));
    }
    out.push_str("</div>");

    let transcript = image
        .hotspots
        .iter()
        .map(aria_label)
        .collect::<Vec<_>>()
        .join(" \u{2014} ");
    out.push_str(&format!(
        r#"<div class="mt-2 muted small" aria-hidden="false">Labels: {}</div>"#,
        text(transcript)
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hs(label: &str, title: &str) -> Hotspot {
        Hotspot {
            x: 12.5,
            y: 30.0,
            label: label.to_string(),
            title: title.to_string(),
            body: String::new(),
            code: r#"contract="bronze/orders""#.to_string(),
            docs: None,
        }
    }

    #[test]
    fn hotspot_button_positions_in_percent_and_defaults_docs() {
        let html = hotspot_button(&hs("1", "Contract"));
        assert!(html.contains("left: 12.5%; top: 30%;"), "{html}");
        assert!(html.contains(r##"data-docs="#""##), "{html}");
        assert!(html.contains(r#"aria-label="1. Contract""#), "{html}");
        assert!(html.contains("data-code=\"contract=&quot;bronze/orders&quot;\""), "{html}");
    }

    #[test]
    fn transcript_lists_every_hotspot() {
        let image = AnnotatedImage {
            id: "x".to_string(),
            file: "/x.png".to_string(),
            alt: String::new(),
            hotspots: vec![hs("1", "Contract"), hs("2", "Enforce")],
        };
        let html = render_annotated_image(&image);
        assert!(html.contains("Labels: 1. Contract \u{2014} 2. Enforce"), "{html}");
        assert_eq!(html.matches("hotspot pulse").count(), 2);
    }
}
