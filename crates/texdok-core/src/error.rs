//! Error types for rendering

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that abort a render outright
///
/// Everything recoverable (missing images, unbalanced math) is reported as a
/// [`Warning`](crate::Warning) instead.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The document tree is structurally invalid
    #[error("Malformed document tree at {location}: {message}")]
    MalformedTree {
        /// Block path, e.g. `block 3 > item 1 > block 2 (table)`
        location: String,
        /// What is wrong with the node
        message: String,
    },

    /// The configuration cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub(crate) fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        RenderError::MalformedTree {
            location: location.into(),
            message: message.into(),
        }
    }
}
