//! Where the diagram source, metadata map, and visuals data come from.
//!
//! Paths are site paths (`/assets/data/story.mmd`). A missing file or non-2xx response is
//! `Ok(None)`; `Err` is reserved for transport failures. Callers decide how to degrade.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request for {path} failed: {message}")]
    Transport { path: String, message: String },
    #[error("invalid site path: {path}")]
    InvalidPath { path: String },
}

pub type FetchResult = Result<Option<String>, FetchError>;

pub trait AssetSource {
    fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, FetchResult>;
}

impl<T: AssetSource + ?Sized> AssetSource for &T {
    fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, FetchResult> {
        (**self).fetch_text(path)
    }
}

/// Serves site paths from a directory on disk (a built static site or its source tree).
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a site path onto the root directory; `..` segments are rejected.
    pub fn resolve(&self, site_path: &str) -> Option<PathBuf> {
        let mut out = self.root.clone();
        for segment in site_path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            if segment == ".." {
                return None;
            }
            out.push(segment);
        }
        Some(out)
    }
}

impl AssetSource for FsSource {
    fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, FetchResult> {
        async move {
            let Some(file) = self.resolve(path) else {
                return Err(FetchError::InvalidPath {
                    path: path.to_string(),
                });
            };
            match std::fs::read_to_string(&file) {
                Ok(text) => Ok(Some(text)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(source) => Err(FetchError::Io {
                    path: path.to_string(),
                    source,
                }),
            }
        }
        .boxed()
    }
}

/// In-memory site, keyed by site path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: indexmap::IndexMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl AssetSource for MemorySource {
    fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, FetchResult> {
        futures::future::ready(Ok(self.files.get(path).cloned())).boxed()
    }
}

#[cfg(feature = "http")]
pub use http::HttpSource;

#[cfg(feature = "http")]
mod http {
    use super::{AssetSource, FetchError, FetchResult};
    use futures::FutureExt;
    use futures::future::BoxFuture;

    /// Fetches site paths over HTTP, resolving them against `base` the way a browser resolves
    /// `fetch(path)` against the page URL.
    #[derive(Debug, Clone)]
    pub struct HttpSource {
        base: url::Url,
        client: reqwest::Client,
    }

    impl HttpSource {
        pub fn new(base: url::Url) -> Self {
            Self {
                base,
                client: reqwest::Client::new(),
            }
        }

        pub fn parse(base: &str) -> Result<Self, url::ParseError> {
            Ok(Self::new(url::Url::parse(base)?))
        }
    }

    impl AssetSource for HttpSource {
        fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, FetchResult> {
            async move {
                let transport = |message: String| FetchError::Transport {
                    path: path.to_string(),
                    message,
                };
                let url = self.base.join(path).map_err(|e| transport(e.to_string()))?;
                let resp = self
                    .client
                    .get(url)
                    .header(reqwest::header::CACHE_CONTROL, "no-store")
                    .send()
                    .await
                    .map_err(|e| transport(e.to_string()))?;
                if !resp.status().is_success() {
                    tracing::debug!(path, status = %resp.status(), "non-success response");
                    return Ok(None);
                }
                let text = resp.text().await.map_err(|e| transport(e.to_string()))?;
                Ok(Some(text))
            }
            .boxed()
        }
    }
}
