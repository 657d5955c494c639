//! texdok-images - Image conversion for LaTeX output
//!
//! LaTeX engines include only a handful of formats (PNG, JPEG, PDF). This
//! crate converts everything else to PNG through an ordered chain of
//! strategies and plugs into the renderer as an
//! [`ImageResolver`](texdok_core::ImageResolver).
//!
//! # Example
//!
//! ```no_run
//! use texdok_core::{Config, Renderer};
//! use texdok_images::ImagePipeline;
//!
//! let config = Config::default();
//! let pipeline = ImagePipeline::new(&config, "build");
//! let tree = vec![texdok_ast::Block::image("Overview", "overview.svg")];
//! let _report = Renderer::new(&config)
//!     .with_images(&pipeline)
//!     .with_output_dir("build")
//!     .render(&tree)?;
//! # Ok::<(), texdok_core::RenderError>(())
//! ```

pub mod error;
#[cfg(feature = "native")]
pub mod native;
pub mod pipeline;
pub mod strategy;

pub use error::{ImageError, Result};
#[cfg(feature = "native")]
pub use native::NativeSvgStrategy;
pub use pipeline::{
    content_hash, default_strategies, resolve_and_emit, ImagePipeline, CONVERTED_DIR,
};
pub use strategy::{tool_available, ConversionRequest, ConversionStrategy, Tool, ToolStrategy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
