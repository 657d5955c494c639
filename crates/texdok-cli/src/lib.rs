//! texdok CLI - Command-line interface library
//!
//! This library provides the CLI functionality for texdok, including:
//! - Render: Convert JSON document trees to LaTeX sources
//! - Build: Render and compile to PDF, several documents at a time
//! - Status: Report available engines and image converters
//! - Languages: Show how code-fence tags map to `listings` grammars
//!
//! # Library Usage
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use texdok_cli::{process_documents, ConfigArgs};
//!
//! let inputs = vec![PathBuf::from("report.json")];
//! let outcomes = process_documents(&inputs, Path::new("build"), &ConfigArgs::default(), 2, true)?;
//! assert!(outcomes.iter().all(|o| o.succeeded()));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Render a tree to build/report.tex
//! texdok render report.json
//!
//! # Build several documents to PDF, two at a time
//! texdok build a.json b.json --jobs 2 --template book
//!
//! # Inspect the toolchain
//! texdok status --format json
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{
    language_mappings, languages_command, load_config, load_tree, process_document,
    process_documents, status_command, status_report,
};
pub use app::{run_cli, ConfigArgs, DocumentOutcome, LanguageMapping, OutputFormat, StatusReport};
