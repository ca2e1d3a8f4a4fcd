pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("metadata JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed SVG: {0}")]
    Svg(#[from] roxmltree::Error),

    #[error("SVG rewrite failed: {message}")]
    Rewrite { message: String },

    #[error("config file {path}: {message}")]
    Config { path: String, message: String },

    #[error("unsupported config file extension: {path}")]
    UnsupportedConfigFormat { path: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
