//! Render report and recoverable warnings

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// A recoverable problem found while rendering
///
/// Warnings never abort a render; the affected node is omitted or degraded
/// and the warning is returned to the caller in the [`RenderReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The image source is missing, remote or otherwise unreadable
    UnresolvableImage { src: String, reason: String },
    /// The image exists but no conversion strategy produced a usable file
    ImageConversionFailed { src: String, reason: String },
    /// Math failed the delimiter-balance check and was emitted as text
    UnbalancedMath { content: String, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnresolvableImage { src, reason } => {
                write!(f, "image '{}' omitted: {}", src, reason)
            }
            Warning::ImageConversionFailed { src, reason } => {
                write!(f, "image '{}' could not be converted: {}", src, reason)
            }
            Warning::UnbalancedMath { content, reason } => {
                write!(f, "math '{}' emitted as text: {}", content, reason)
            }
        }
    }
}

/// Result of a successful render
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    /// LaTeX body, without preamble
    pub body: String,
    /// Recoverable problems, in document order
    pub warnings: Vec<Warning>,
    /// Every `\label` emitted
    pub labels: BTreeSet<String>,
    /// Deepest heading depth seen (0 when there are no headings)
    pub deepest_heading: u32,
}

impl RenderReport {
    /// Whether the render produced no warnings
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
