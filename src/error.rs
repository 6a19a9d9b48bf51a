use thiserror::Error;

/// Result type alias for hexmap operations.
pub type Result<T> = std::result::Result<T, HexError>;

/// Collection-level failures. Per-feature problems never surface here;
/// malformed features are skipped where they are encountered.
#[derive(Error, Debug)]
pub enum HexError {
    /// The requested CRS (or CRS pair) has no transform.
    #[error("unsupported projection: {0}")]
    UnsupportedProjection(String),

    /// proj4rs rejected a definition or a coordinate.
    #[error("projection error: {0}")]
    Projection(String),

    /// The geometry source could not be read or parsed.
    #[error("failed to load geometry source: {0}")]
    SourceLoad(String),

    /// Invalid configuration value or file.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
