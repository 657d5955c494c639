//! Error types for PDF generation

use serde::Serialize;
use thiserror::Error;

/// Result type for compile operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors that prevent a compile from being attempted at all
///
/// A compile that runs and fails is not an error: it is a
/// [`CompileResult`](crate::CompileResult) with status `Failed` and a
/// [`CompileFailure`].
#[derive(Error, Debug)]
pub enum CompileError {
    /// The job name cannot be used as a file name
    #[error("Invalid job name: {0}")]
    InvalidJobName(String),

    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    Config(#[from] texdok_core::RenderError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a compile ended in `Failed`
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompileFailure {
    /// A pass exceeded the compile timeout and was killed
    #[error("pass {pass} timed out after {secs}s")]
    Timeout { pass: u32, secs: u64 },

    /// The log contains a fatal error marker
    #[error("fatal LaTeX error")]
    FatalError { excerpt: String },

    /// The engine finished without writing the PDF
    #[error("no PDF was produced")]
    NoArtifact,

    /// The engine executable could not be started
    #[error("engine '{engine}' unavailable: {reason}")]
    EngineUnavailable { engine: String, reason: String },
}
