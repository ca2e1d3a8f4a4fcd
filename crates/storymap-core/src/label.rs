//! Label text helpers: id normalization and screenshot/story extraction.

use crate::model::{Entry, Screenshot};
use regex::Regex;
use std::sync::OnceLock;

fn non_alnum_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"))
}

fn screenshot_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b[\w\-.]+?\.(?:png|jpg|jpeg|gif)\b").expect("valid regex")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
}

fn whitespace_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Lower-cases `raw`, collapses every run of characters outside `[a-z0-9]` into `_`, and trims
/// leading/trailing underscores.
///
/// Used as the generated id of groups the rendering engine left without an `id` attribute.
pub fn normalize_id(raw: &str) -> String {
    let lower = raw.to_lowercase();
    non_alnum_run_regex()
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedLabel {
    /// Filename-like tokens in order of appearance.
    pub files: Vec<String>,
    /// Remaining text with filenames and markup removed and whitespace collapsed.
    pub text: String,
}

pub fn parse_label(raw: &str) -> ParsedLabel {
    if raw.is_empty() {
        return ParsedLabel::default();
    }

    let files: Vec<String> = screenshot_file_regex()
        .find_iter(raw)
        .map(|m| m.as_str().trim().to_string())
        .collect();

    let mut text = raw.to_string();
    for file in &files {
        let Ok(re) = Regex::new(&format!("(?i){}", regex::escape(file))) else {
            continue;
        };
        text = re.replace_all(&text, "").into_owned();
    }
    let text = tag_regex().replace_all(&text, " ");
    let text = whitespace_run_regex().replace_all(&text, " ");

    ParsedLabel {
        files,
        text: text.trim().to_string(),
    }
}

/// Resolves a screenshot filename against `screenshot_dir` unless it is already absolute.
pub fn resolve_screenshot_path(file: &str, screenshot_dir: &str) -> String {
    if file.starts_with('/') || screenshot_dir.is_empty() {
        return file.to_string();
    }
    if screenshot_dir.ends_with('/') {
        format!("{screenshot_dir}{file}")
    } else {
        format!("{screenshot_dir}/{file}")
    }
}

/// Derives an entry from an element's own label.
///
/// Story text falls back to the raw label and then to `generated_id`, so the result is never
/// empty unless `generated_id` is.
pub fn synthesize_entry(label: &str, generated_id: &str, screenshot_dir: &str) -> Entry {
    let parsed = parse_label(label);
    let screenshots = parsed
        .files
        .iter()
        .map(|file| Screenshot {
            file: resolve_screenshot_path(file, screenshot_dir),
            alt: parsed.text.clone(),
        })
        .collect();

    let story_text = if !parsed.text.is_empty() {
        parsed.text
    } else if !label.trim().is_empty() {
        label.to_string()
    } else {
        generated_id.to_string()
    };

    Entry {
        screenshots,
        story_text,
    }
}
