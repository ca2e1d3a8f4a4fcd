use serde_json::{Map, Value, json};
use std::path::Path;

pub const DEFAULT_DIAGRAM_PATH: &str = "/assets/data/story.mmd";
pub const DEFAULT_MAP_PATH: &str = "/assets/data/mermaid-map.json";
pub const DEFAULT_HOTSPOTS_PATH: &str = "/dc43-website/assets/data/hotspots.json";
pub const DEFAULT_PERSONAS_PATH: &str = "/dc43-website/assets/data/personas.json";
pub const DEFAULT_SCREENSHOT_DIR: &str = "assets/screenshots/";
pub const DEFAULT_DOWNLOAD_NAME: &str = "story.mmd";
/// Browser-side settle delay before tooltips and pan/zoom attach to a freshly inserted SVG.
pub const DEFAULT_ENHANCE_DELAY_MS: u64 = 80;

/// Site configuration backed by a JSON object.
///
/// Lookups use dotted paths (`paths.diagram`, `panZoom.maxZoom`). User overrides are deep-merged
/// onto [`SiteConfig::defaults`], so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig(Value);

impl Default for SiteConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl SiteConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn defaults() -> Self {
        Self(json!({
            "paths": {
                "diagram": DEFAULT_DIAGRAM_PATH,
                "map": DEFAULT_MAP_PATH,
                "hotspots": DEFAULT_HOTSPOTS_PATH,
                "personas": DEFAULT_PERSONAS_PATH,
            },
            "screenshotDir": DEFAULT_SCREENSHOT_DIR,
            "downloadName": DEFAULT_DOWNLOAD_NAME,
            "enhanceDelayMs": DEFAULT_ENHANCE_DELAY_MS,
            "engine": {
                "startOnLoad": false,
                "theme": "default",
                "command": ["merman-cli", "render", "--id", "{id}", "-"],
            },
            "panZoom": {
                "zoomEnabled": true,
                "controlIconsEnabled": false,
                "fit": true,
                "center": true,
                "minZoom": 0.25,
                "maxZoom": 6.0,
                "zoomScaleSensitivity": 0.2,
                "dblClickZoomEnabled": false,
                "panEnabled": true,
            },
            "visuals": {
                "imageId": "integration-helper",
                "rootId": "visuals-root",
            },
        }))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Defaults with `overrides` merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut cfg = Self::defaults();
        cfg.deep_merge(overrides);
        cfg
    }

    /// Loads overrides from a `.json`, `.json5`, `.yaml` or `.yml` file and merges them onto the
    /// defaults.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let config_err = |message: String| crate::Error::Config {
            path: path.display().to_string(),
            message,
        };
        let overrides: Value = match ext.as_str() {
            "json" => serde_json::from_str(&text).map_err(|e| config_err(e.to_string()))?,
            "json5" => json5::from_str(&text).map_err(|e| config_err(e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&text).map_err(|e| config_err(e.to_string()))?
            }
            _ => {
                return Err(crate::Error::UnsupportedConfigFormat {
                    path: path.display().to_string(),
                });
            }
        };
        if !overrides.is_object() && !overrides.is_null() {
            return Err(config_err("top-level value must be a mapping".to_string()));
        }
        Ok(Self::with_overrides(&overrides))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get_value(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get_value(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.get_value(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get_value(dotted_path)?.as_f64()
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.get_value(dotted_path)?.as_u64()
    }

    /// Applies one `--set dotted.key=<json>` override. Intermediate keys become objects,
    /// replacing whatever scalar held them. A `null` value leaves the key unchanged, as it does
    /// in a config file.
    pub fn apply_override(&mut self, dotted_key: &str, value: Value) {
        let nested = dotted_key
            .rsplit('.')
            .fold(value, |inner, segment| {
                Value::Object(Map::from_iter([(segment.to_string(), inner)]))
            });
        self.deep_merge(&nested);
    }

    /// Merges an override object onto this config. Objects merge key by key and anything else
    /// replaces the existing value; `null` is skipped.
    pub fn deep_merge(&mut self, overrides: &Value) {
        let Value::Object(overrides) = overrides else {
            return;
        };
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Value::Object(base) = &mut self.0 {
            merge_objects(base, overrides);
        }
    }

    pub fn diagram_path(&self) -> &str {
        self.get_str("paths.diagram").unwrap_or(DEFAULT_DIAGRAM_PATH)
    }

    pub fn map_path(&self) -> &str {
        self.get_str("paths.map").unwrap_or(DEFAULT_MAP_PATH)
    }

    pub fn hotspots_path(&self) -> &str {
        self.get_str("paths.hotspots").unwrap_or(DEFAULT_HOTSPOTS_PATH)
    }

    pub fn personas_path(&self) -> &str {
        self.get_str("paths.personas").unwrap_or(DEFAULT_PERSONAS_PATH)
    }

    pub fn screenshot_dir(&self) -> &str {
        self.get_str("screenshotDir").unwrap_or(DEFAULT_SCREENSHOT_DIR)
    }

    pub fn download_name(&self) -> &str {
        self.get_str("downloadName").unwrap_or(DEFAULT_DOWNLOAD_NAME)
    }

    pub fn enhance_delay_ms(&self) -> u64 {
        self.get_u64("enhanceDelayMs")
            .unwrap_or(DEFAULT_ENHANCE_DELAY_MS)
    }
}

fn merge_objects(base: &mut Map<String, Value>, overrides: &Map<String, Value>) {
    for (key, incoming) in overrides.iter().filter(|(_, v)| !v.is_null()) {
        match (base.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                merge_objects(existing, nested)
            }
            _ => {
                base.insert(key.clone(), incoming.clone());
            }
        }
    }
}
