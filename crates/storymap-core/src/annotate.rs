use crate::scan::{ScannedGroup, group_kind};
use lol_html::{RewriteStrSettings, element, rewrite_str};

pub const MID_ATTR: &str = "data-mid";
pub const KIND_ATTR: &str = "data-kind";

/// Tags every scanned group in `svg` with its resolved id and makes it keyboard focusable.
///
/// Groups are matched to `groups` by document-order ordinal, using the same classification as
/// [`crate::scan::scan_svg`].
pub fn annotate_svg(svg: &str, groups: &[ScannedGroup]) -> crate::Result<String> {
    if groups.is_empty() {
        return Ok(svg.to_string());
    }

    let mut ordinal = 0usize;
    let handlers = vec![element!("g", |el| {
        let class = el.get_attribute("class");
        if group_kind(class.as_deref()).is_none() {
            return Ok(());
        }
        let Some(group) = groups.get(ordinal) else {
            return Ok(());
        };
        ordinal += 1;

        el.set_attribute(MID_ATTR, &group.element.generated_id)?;
        el.set_attribute(KIND_ATTR, group.element.kind.as_str())?;
        el.set_attribute("tabindex", "0")?;
        Ok(())
    })];

    rewrite_str(
        svg,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| crate::Error::Rewrite {
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan_svg;

    #[test]
    fn annotate_is_identity_without_groups() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect/></svg>"#;
        assert_eq!(annotate_svg(svg, &[]).expect("annotate"), svg);
    }

    #[test]
    fn annotate_tags_id_less_groups_with_normalized_label() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><g class="node"><text>Log In</text></g></svg>"#;
        let groups = scan_svg(svg).expect("scan");
        let out = annotate_svg(svg, &groups).expect("annotate");
        assert!(out.contains(r#"data-mid="log_in""#), "{out}");
        assert!(out.contains(r#"data-kind="node""#), "{out}");
        assert!(out.contains(r#"tabindex="0""#), "{out}");
    }
}
