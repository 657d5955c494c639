//! texdok-core - Document trees to LaTeX
//!
//! Core library for texdok: renders a parsed document tree into a LaTeX
//! body and binds it into a complete, compilable document.
//!
//! # Example
//!
//! ```
//! use texdok_ast::{Block, Inline};
//! use texdok_core::{bind, render, Config};
//!
//! let tree = vec![
//!     Block::heading(1, "Hello"),
//!     Block::paragraph(vec![Inline::text("Costs 5$ & up")]),
//! ];
//!
//! let config = Config::default();
//! let report = render(&tree, &config).unwrap();
//! assert!(report.body.contains("\\section{Hello}"));
//! assert!(report.body.contains("Costs 5\\$ \\& up"));
//!
//! let source = bind(&report.body, &config);
//! assert!(source.ends_with("\\end{document}\n"));
//! ```

pub mod config;
pub mod error;
pub mod escape;
pub mod exec;
pub mod images;
pub mod labels;
pub mod language;
pub mod math;
pub mod renderer;
pub mod report;
pub mod table;
pub mod template;

// Re-export main types and functions
pub use config::{Config, ConfigProfile, TemplateName};
pub use error::{RenderError, Result};
pub use images::{ImageOutcome, ImageResolver, PassthroughResolver};
pub use language::Grammar;
pub use renderer::{render, Renderer};
pub use report::{RenderReport, Warning};
pub use template::bind;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
