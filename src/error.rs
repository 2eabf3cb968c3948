//! Error types for nano-explainers.

use thiserror::Error;

/// Result type alias for nano-explainers operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nano-explainers.
#[derive(Error, Debug)]
pub enum Error {
    /// A host element the widget needs is absent. Fatal to initialization.
    #[error("required anchor `{0}` not found")]
    MissingAnchor(&'static str),

    /// A step's visual panel could not be drawn. Recoverable.
    #[error("visual render failed: {0}")]
    Render(String),

    /// A deck was built without any steps.
    #[error("deck `{0}` has no steps")]
    EmptyDeck(&'static str),

    /// No deck with the requested name.
    #[error("unknown deck `{0}`")]
    UnknownDeck(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a visual render failure.
    pub fn render(msg: impl Into<String>) -> Self {
        Error::Render(msg.into())
    }
}
