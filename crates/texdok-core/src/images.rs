//! Image resolution seam
//!
//! The renderer never converts images itself. It hands every existing local
//! image to an [`ImageResolver`], which either returns the file to include or
//! a reason for skipping it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::is_native_format;

/// Outcome of resolving one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Include this file with `\includegraphics`
    Emitted(PathBuf),
    /// Omit the image, with a human-readable reason
    Skipped(String),
}

/// Turns an image source file into something the engine can include
pub trait ImageResolver: Send + Sync {
    /// Resolver name for diagnostics
    fn name(&self) -> &str;

    /// Resolve one existing source file
    fn resolve(&self, source: &Path) -> ImageOutcome;

    /// Warm up ahead of a render; resolvers may convert concurrently here
    fn prefetch(&self, _sources: &[PathBuf]) {}
}

/// Resolver that accepts native formats only and never converts
#[derive(Debug, Clone)]
pub struct PassthroughResolver {
    native_formats: BTreeSet<String>,
}

impl PassthroughResolver {
    /// Create a resolver accepting the given extensions
    pub fn new(native_formats: BTreeSet<String>) -> Self {
        Self { native_formats }
    }
}

impl ImageResolver for PassthroughResolver {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn resolve(&self, source: &Path) -> ImageOutcome {
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if is_native_format(&self.native_formats, extension) {
            ImageOutcome::Emitted(source.to_path_buf())
        } else {
            ImageOutcome::Skipped("no conversion strategy available".to_string())
        }
    }
}
