use std::borrow::Cow;

pub fn text(s: &str) -> Cow<'_, str> {
    htmlize::escape_text(s)
}

pub fn attr(s: &str) -> Cow<'_, str> {
    htmlize::escape_attribute(s)
}

/// Serializes `value` for embedding in a `<script type="application/json">` element.
///
/// `</` is written as `<\/` so the payload can never close the surrounding script element.
pub fn json_script_body(value: &impl serde::Serialize) -> serde_json::Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_script_body_cannot_close_script() {
        let body = json_script_body(&serde_json::json!({ "t": "</script><b>" })).expect("json");
        assert!(!body.contains("</script>"));
        let back: serde_json::Value = serde_json::from_str(&body).expect("valid json");
        assert_eq!(back["t"], "</script><b>");
    }
}
