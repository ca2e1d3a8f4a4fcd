use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct HotspotsData {
    #[serde(default)]
    pub images: Vec<AnnotatedImage>,
}

impl HotspotsData {
    pub fn image(&self, id: &str) -> Option<&AnnotatedImage> {
        self.images.iter().find(|i| i.id == id)
    }
}

/// A screenshot with numbered hotspot markers positioned in percent of the image size.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnnotatedImage {
    pub id: String,
    pub file: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
    pub label: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PersonasData {
    #[serde(default)]
    pub personas: Vec<Persona>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Persona {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub hero: Option<ImageRef>,
    /// Authored HTML.
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub ctas: Vec<Cta>,
}

/// Either a bare URL or `{ "src": ..., "alt": ... }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    Detailed {
        src: String,
        #[serde(default)]
        alt: Option<String>,
    },
}

impl ImageRef {
    pub fn src(&self) -> &str {
        match self {
            ImageRef::Url(src) => src,
            ImageRef::Detailed { src, .. } => src,
        }
    }

    /// The authored alt text, or `fallback` when none was given.
    pub fn alt_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            ImageRef::Detailed {
                alt: Some(alt), ..
            } if !alt.is_empty() => alt,
            _ => fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cta {
    pub label: String,
    pub href: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_refs_accept_strings_and_objects() {
        let refs: Vec<ImageRef> =
            serde_json::from_str(r#"["/a.png", { "src": "/b.png", "alt": "B" }, { "src": "/c.png" }]"#)
                .expect("json");
        assert_eq!(refs[0].src(), "/a.png");
        assert_eq!(refs[0].alt_or("fallback"), "fallback");
        assert_eq!(refs[1].alt_or("fallback"), "B");
        assert_eq!(refs[2].alt_or("fallback"), "fallback");
    }
}
