//! Error types for image conversion

use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors from a single conversion attempt
///
/// None of these abort a render: the pipeline turns them into a skipped
/// image and moves on to the next strategy.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The strategy cannot read this source format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The tool is not installed or failed its probe
    #[error("Strategy unavailable: {0}")]
    Unavailable(String),

    /// The source could not be parsed
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// The tool ran but did not produce an image
    #[error("{tool} failed: {message}")]
    ConversionFailed { tool: String, message: String },

    /// The tool exceeded the conversion timeout and was killed
    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
