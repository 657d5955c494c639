//! Image pipeline with strategy fallback chain
//!
//! ```text
//! source ──► native format? ──yes──► Emitted(source)
//!              │ no
//!              ▼
//!        sha256(content) ──► cached / already on disk? ──yes──► Emitted(png)
//!              │ no
//!              ▼
//!        strategy 1 ─fail─► strategy 2 ─fail─► … ──► Skipped(reason)
//!              │ ok
//!              ▼
//!        unique temp file ──rename──► converted-assets/<stem>-<hash>.png
//! ```
//!
//! Writers are serialized per target path across every pipeline in the
//! process, so concurrent documents sharing an output directory never race
//! on the same converted file.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tempfile::TempPath;
use texdok_core::config::is_native_format;
use texdok_core::{Config, ImageOutcome, ImageResolver};

use crate::error::ImageError;
use crate::strategy::{ConversionRequest, ConversionStrategy, Tool, ToolStrategy};

/// Directory under the output directory that receives converted images
pub const CONVERTED_DIR: &str = "converted-assets";

/// Hex digits of the content hash used in file names
const HASH_PREFIX_LEN: usize = 16;

/// One lock per converted file, shared by all pipelines
static TARGET_LOCKS: Lazy<DashMap<PathBuf, Arc<Mutex<()>>>> = Lazy::new(DashMap::new);

/// Converts images the engine cannot include into PNG files
pub struct ImagePipeline {
    strategies: Vec<Box<dyn ConversionStrategy>>,
    native_formats: BTreeSet<String>,
    converted_dir: PathBuf,
    max_dimension: u32,
    timeout: Duration,
    workers: usize,
    /// Outcomes by content hash
    cache: DashMap<String, ImageOutcome>,
}

impl ImagePipeline {
    /// Pipeline writing to `<output_dir>/converted-assets` with every
    /// strategy compiled in
    pub fn new(config: &Config, output_dir: impl AsRef<Path>) -> Self {
        Self::with_strategies(config, output_dir, default_strategies())
    }

    /// Pipeline with an explicit strategy chain, tried in order
    pub fn with_strategies(
        config: &Config,
        output_dir: impl AsRef<Path>,
        strategies: Vec<Box<dyn ConversionStrategy>>,
    ) -> Self {
        Self {
            strategies,
            native_formats: config.native_image_formats.clone(),
            converted_dir: output_dir.as_ref().join(CONVERTED_DIR),
            max_dimension: config.max_image_dimension,
            timeout: config.conversion_timeout(),
            workers: config.image_workers.max(1),
            cache: DashMap::new(),
        }
    }

    /// Names of registered strategies, in priority order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Names of strategies that can run in this process
    pub fn available_strategies(&self) -> Vec<&'static str> {
        self.strategies
            .iter()
            .filter(|s| s.is_available())
            .map(|s| s.name())
            .collect()
    }

    /// Directory converted images are written to
    pub fn converted_dir(&self) -> &Path {
        &self.converted_dir
    }

    /// Resolve one source file to something the engine can include
    pub fn resolve_and_emit(&self, source: &Path) -> ImageOutcome {
        let extension = extension_of(source);
        if is_native_format(&self.native_formats, &extension) {
            return ImageOutcome::Emitted(source.to_path_buf());
        }

        let bytes = match fs::read(source) {
            Ok(bytes) => bytes,
            Err(e) => return ImageOutcome::Skipped(format!("cannot read source: {}", e)),
        };
        let hash = content_hash(&bytes);
        if let Some(outcome) = self.cache.get(&hash) {
            return outcome.clone();
        }

        let target = self.target_path(source, &hash);
        let lock = TARGET_LOCKS
            .entry(target.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // Identical content under another name may have finished meanwhile
        if let Some(outcome) = self.cache.get(&hash) {
            return outcome.clone();
        }

        let outcome = self.convert_uncached(source, &extension, target);
        self.cache.insert(hash, outcome.clone());
        outcome
    }

    /// Runs with the target's lock held
    fn convert_uncached(&self, source: &Path, extension: &str, target: PathBuf) -> ImageOutcome {
        if target.is_file() {
            log::debug!("reusing {}", target.display());
            return ImageOutcome::Emitted(target);
        }

        let candidates: Vec<&dyn ConversionStrategy> = self
            .strategies
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| s.supports(extension) && s.is_available())
            .collect();
        if candidates.is_empty() {
            return ImageOutcome::Skipped(format!(
                "no conversion strategy available for .{}",
                extension
            ));
        }

        if let Err(e) = fs::create_dir_all(&self.converted_dir) {
            return ImageOutcome::Skipped(format!(
                "cannot create {}: {}",
                self.converted_dir.display(),
                e
            ));
        }

        let mut last_error: Option<ImageError> = None;
        for strategy in candidates {
            let result = temp_sibling(&target, strategy.name()).and_then(|temp| {
                let request = ConversionRequest {
                    source,
                    target: &temp,
                    max_dimension: self.max_dimension,
                    timeout: self.timeout,
                };
                strategy.convert(&request)?;
                temp.persist(&target).map_err(|e| ImageError::from(e.error))
            });
            match result {
                Ok(()) => {
                    log::debug!(
                        "converted {} with {} -> {}",
                        source.display(),
                        strategy.name(),
                        target.display()
                    );
                    return ImageOutcome::Emitted(target);
                }
                Err(e) => {
                    log::warn!("{} could not convert {}: {}", strategy.name(), source.display(), e);
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "conversion failed".to_string());
        ImageOutcome::Skipped(format!("all conversion strategies failed, last: {}", reason))
    }

    fn target_path(&self, source: &Path, hash: &str) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let stem: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.converted_dir
            .join(format!("{}-{}.png", stem, &hash[..HASH_PREFIX_LEN]))
    }

    /// Convert several images on the bounded worker pool
    pub fn convert_all(&self, sources: &[PathBuf]) -> Vec<ImageOutcome> {
        if sources.len() <= 1 || self.workers == 1 {
            return sources.iter().map(|s| self.resolve_and_emit(s)).collect();
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("texdok-image-{}", i))
            .build()
        {
            Ok(pool) => pool.install(|| {
                sources
                    .par_iter()
                    .map(|s| self.resolve_and_emit(s))
                    .collect()
            }),
            Err(e) => {
                log::warn!("image worker pool unavailable, converting serially: {}", e);
                sources.iter().map(|s| self.resolve_and_emit(s)).collect()
            }
        }
    }
}

impl ImageResolver for ImagePipeline {
    fn name(&self) -> &str {
        "image-pipeline"
    }

    fn resolve(&self, source: &Path) -> ImageOutcome {
        self.resolve_and_emit(source)
    }

    fn prefetch(&self, sources: &[PathBuf]) {
        let pending: Vec<PathBuf> = sources
            .iter()
            .filter(|s| !is_native_format(&self.native_formats, &extension_of(s)))
            .cloned()
            .collect();
        if !pending.is_empty() {
            self.convert_all(&pending);
        }
    }
}

/// Resolve a single image with a one-off pipeline
pub fn resolve_and_emit(
    source: &Path,
    output_dir: &Path,
    native_formats: &BTreeSet<String>,
    timeout: Duration,
) -> ImageOutcome {
    let config = Config {
        native_image_formats: native_formats.clone(),
        conversion_timeout_secs: timeout.as_secs().max(1),
        ..Config::default()
    };
    ImagePipeline::new(&config, output_dir).resolve_and_emit(source)
}

/// Every strategy compiled into this build, in priority order
pub fn default_strategies() -> Vec<Box<dyn ConversionStrategy>> {
    let mut strategies: Vec<Box<dyn ConversionStrategy>> = Vec::new();

    #[cfg(feature = "native")]
    strategies.push(Box::new(crate::native::NativeSvgStrategy::new()));

    for tool in Tool::ALL {
        strategies.push(Box::new(ToolStrategy::new(tool)));
    }
    strategies
}

/// Hex SHA-256 of file content
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Fresh temporary file next to `target`, removed on drop unless persisted.
/// Keeps the `.png` extension so tools pick the right output format.
fn temp_sibling(target: &Path, strategy: &str) -> crate::error::Result<TempPath> {
    let name = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let file = tempfile::Builder::new()
        .prefix(&format!(".{}.{}.", name, strategy))
        .suffix(".tmp.png")
        .tempfile_in(dir)?;
    Ok(file.into_temp_path())
}
