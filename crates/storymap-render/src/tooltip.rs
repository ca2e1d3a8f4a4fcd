//! Popup content for reconciled diagram elements.

use crate::html;
use storymap_core::{ElementKind, Entry};

pub const NODE_MAX_WIDTH_PX: u32 = 380;
pub const EDGE_MAX_WIDTH_PX: u32 = 320;
pub const IMAGE_MODAL_ID: &str = "story-image-modal";

fn push_thumbnail(out: &mut String, entry: &Entry, label_text: &str) {
    let Some(shot) = entry.screenshots.first() else {
        return;
    };
    let caption = if shot.alt.is_empty() {
        label_text
    } else {
        shot.alt.as_str()
    };
    out.push_str(&format!(
        r#"<img src="{src}" alt="{alt}" class="mermaid-popup-img" loading="lazy" style="cursor: zoom-in;" data-modal-src="{src}" data-modal-caption="{caption}"/>"#,
        src = html::attr(&shot.file),
        alt = html::attr(&shot.alt),
        caption = html::attr(caption),
    ));
}

/// Tooltip body for one element. Nodes show the thumbnail only; edges add the story text.
pub fn tooltip_content(kind: ElementKind, generated_id: &str, entry: &Entry) -> String {
    let label_text = if entry.story_text.is_empty() {
        generated_id
    } else {
        entry.story_text.as_str()
    };
    let max_width = match kind {
        ElementKind::Node => NODE_MAX_WIDTH_PX,
        ElementKind::Edge => EDGE_MAX_WIDTH_PX,
    };

    let mut out = format!(r#"<div style="max-width: {max_width}px; font-size: 0.95rem;">"#);
    push_thumbnail(&mut out, entry, label_text);
    if kind == ElementKind::Edge {
        out.push_str(r#"<div style="margin-top: 6px;">"#);
        out.push_str(&html::text(label_text));
        out.push_str("</div>");
    }
    out.push_str("</div>");
    out
}

/// Full-size screenshot dialog opened from tooltip thumbnails. Emitted once per page.
pub fn image_modal_markup() -> String {
    format!(
        r#"<div id="{IMAGE_MODAL_ID}" style="position: fixed; left: 0; top: 0; right: 0; bottom: 0; background: rgba(0,0,0,0.6); display: none; align-items: center; justify-content: center; z-index: 999999;"><div style="max-width: 90%; max-height: 90%; background: #fff; padding: 12px; border-radius: 8px; box-shadow: 0 6px 20px rgba(2,6,23,0.4);"><img id="modal-img" src="" alt="" style="max-width: 100%; max-height: 70vh; display: block; border-radius: 6px;"/><div id="modal-caption" style="margin-top: 8px; color: #111;"></div><div style="margin-top: 8px; text-align: right;"><button id="modal-close" type="button">Close</button></div></div></div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use storymap_core::Screenshot;

    fn shot_entry(alt: &str) -> Entry {
        Entry {
            screenshots: vec![Screenshot {
                file: "assets/screenshots/a&b.png".to_string(),
                alt: alt.to_string(),
            }],
            story_text: "Story <1>".to_string(),
        }
    }

    #[test]
    fn node_tooltip_has_thumbnail_without_text_block() {
        let html = tooltip_content(ElementKind::Node, "n1", &shot_entry("Alt"));
        assert!(html.contains("max-width: 380px"));
        assert!(html.contains(r#"src="assets/screenshots/a&amp;b.png""#), "{html}");
        assert!(html.contains(r#"loading="lazy""#));
        assert!(!html.contains("margin-top: 6px"));
    }

    #[test]
    fn edge_tooltip_escapes_story_and_captions_with_story_when_alt_missing() {
        let html = tooltip_content(ElementKind::Edge, "e1", &shot_entry(""));
        assert!(html.contains("max-width: 320px"));
        assert!(html.contains("Story &lt;1&gt;"), "{html}");
        assert!(html.contains(r#"data-modal-caption="Story &lt;1&gt;""#), "{html}");
    }

    #[test]
    fn empty_story_falls_back_to_generated_id() {
        let html = tooltip_content(ElementKind::Edge, "L-a-b-0", &Entry::default());
        assert!(html.contains(">L-a-b-0</div>"), "{html}");
    }
}
