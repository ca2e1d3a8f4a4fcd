//! Adapters around the external diagram rendering engine.

use serde::Serialize;
use std::io::Write;
use std::process::{Command, Stdio};
use storymap_core::SiteConfig;

/// Configuration handed to the rendering engine on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub start_on_load: bool,
    pub theme: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_on_load: false,
            theme: "default".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_site_config(cfg: &SiteConfig) -> Self {
        let defaults = Self::default();
        Self {
            start_on_load: cfg
                .get_bool("engine.startOnLoad")
                .unwrap_or(defaults.start_on_load),
            theme: cfg
                .get_str("engine.theme")
                .map(str::to_string)
                .unwrap_or(defaults.theme),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to start renderer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("renderer I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("renderer exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("renderer output is not SVG")]
    NotSvg,
    #[error("renderer command is empty")]
    NoCommand,
}

impl RenderError {
    /// Technical detail shown under the one-line error message.
    pub fn detail(&self) -> String {
        match self {
            RenderError::Exit { status, stderr } => {
                format!("renderer exited with {status}\n{}", stderr.trim_end())
            }
            other => format!("{other:?}"),
        }
    }
}

/// Turns diagram source text into SVG markup.
pub trait DiagramRenderer {
    fn render(
        &self,
        diagram_id: &str,
        source: &str,
        config: &EngineConfig,
    ) -> Result<String, RenderError>;
}

impl<T: DiagramRenderer + ?Sized> DiagramRenderer for &T {
    fn render(
        &self,
        diagram_id: &str,
        source: &str,
        config: &EngineConfig,
    ) -> Result<String, RenderError> {
        (**self).render(diagram_id, source, config)
    }
}

impl<T: DiagramRenderer + ?Sized> DiagramRenderer for Box<T> {
    fn render(
        &self,
        diagram_id: &str,
        source: &str,
        config: &EngineConfig,
    ) -> Result<String, RenderError> {
        (**self).render(diagram_id, source, config)
    }
}

/// Fresh id for one render pass (`mmd_<unix millis>`).
pub fn next_diagram_id() -> String {
    format!("mmd_{}", chrono::Utc::now().timestamp_millis())
}

fn ensure_svg(markup: String) -> Result<String, RenderError> {
    if markup.contains("<svg") {
        Ok(markup)
    } else {
        Err(RenderError::NotSvg)
    }
}

/// Runs an external renderer process: source on stdin, SVG on stdout.
///
/// Arguments may contain `{id}` and `{theme}` placeholders.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds the renderer from `engine.command` (`["program", "arg", ...]`).
    pub fn from_site_config(cfg: &SiteConfig) -> Result<Self, RenderError> {
        let parts: Vec<String> = cfg
            .get_value("engine.command")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let mut parts = parts.into_iter();
        let program = parts.next().ok_or(RenderError::NoCommand)?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn expanded_args(&self, diagram_id: &str, config: &EngineConfig) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.replace("{id}", diagram_id).replace("{theme}", &config.theme))
            .collect()
    }
}

impl DiagramRenderer for CommandRenderer {
    fn render(
        &self,
        diagram_id: &str,
        source: &str,
        config: &EngineConfig,
    ) -> Result<String, RenderError> {
        let mut child = Command::new(&self.program)
            .args(self.expanded_args(diagram_id, config))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from a separate thread so a large SVG on stdout cannot deadlock us.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.to_string();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });
        let output = child.wait_with_output()?;
        let written = match writer.map(|handle| handle.join()) {
            None | Some(Ok(Ok(()))) => Ok(()),
            Some(Ok(Err(err))) => Err(RenderError::Io(err)),
            Some(Err(_)) => Err(RenderError::Io(std::io::Error::other(
                "renderer stdin writer panicked",
            ))),
        };

        // A renderer that exits early closes stdin; its exit status is the better report.
        if !output.status.success() {
            return Err(RenderError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        written?;
        ensure_svg(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Returns SVG that was rendered ahead of time (e.g. by a separate build step).
#[derive(Debug, Clone)]
pub struct PrerenderedRenderer {
    svg: String,
}

impl PrerenderedRenderer {
    pub fn new(svg: impl Into<String>) -> Self {
        Self { svg: svg.into() }
    }
}

impl DiagramRenderer for PrerenderedRenderer {
    fn render(
        &self,
        _diagram_id: &str,
        _source: &str,
        _config: &EngineConfig,
    ) -> Result<String, RenderError> {
        ensure_svg(self.svg.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_renderer_reads_site_config() {
        let cfg = SiteConfig::with_overrides(&json!({
            "engine": { "command": ["mmdc", "-i", "-", "-t", "{theme}", "--id", "{id}"], "theme": "dark" }
        }));
        let r = CommandRenderer::from_site_config(&cfg).expect("renderer");
        assert_eq!(r.program(), "mmdc");
        let engine = EngineConfig::from_site_config(&cfg);
        assert_eq!(
            r.expanded_args("mmd_1", &engine),
            vec!["-i", "-", "-t", "dark", "--id", "mmd_1"]
        );
    }

    #[test]
    fn command_renderer_requires_a_program() {
        let cfg = SiteConfig::with_overrides(&json!({ "engine": { "command": [] } }));
        assert!(matches!(
            CommandRenderer::from_site_config(&cfg),
            Err(RenderError::NoCommand)
        ));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let r = CommandRenderer::new("storymap-definitely-missing-renderer", Vec::new());
        let err = r
            .render("mmd_1", "flowchart LR\n", &EngineConfig::default())
            .expect_err("spawn should fail");
        assert!(matches!(err, RenderError::Spawn { .. }), "{err:?}");
    }

    #[test]
    fn prerendered_output_must_be_svg() {
        let ok = PrerenderedRenderer::new("<svg></svg>");
        assert!(ok.render("id", "", &EngineConfig::default()).is_ok());
        let bad = PrerenderedRenderer::new("<html></html>");
        assert!(matches!(
            bad.render("id", "", &EngineConfig::default()),
            Err(RenderError::NotSvg)
        ));
    }

    #[test]
    fn diagram_ids_use_the_mmd_prefix() {
        let id = next_diagram_id();
        let millis = id.strip_prefix("mmd_").expect("prefix");
        assert!(millis.parse::<i64>().is_ok(), "{id}");
    }
}
