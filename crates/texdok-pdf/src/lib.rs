//! texdok-pdf - PDF generation via an external LaTeX engine
//!
//! Runs `xelatex` (or any configured engine) over a bound LaTeX source
//! as many times as cross-references need, then decides from the log
//! whether the run succeeded.
//!
//! # Architecture
//!
//! 1. **Compiler** - writes `<job>.tex`, runs engine passes, cleans up
//! 2. **Logfile** - classifies fatal errors, rerun requests and warnings
//!
//! # Example
//!
//! ```no_run
//! use texdok_core::{bind, render, Config};
//! use texdok_pdf::{Compiler, CompileStatus};
//!
//! let config = Config::default();
//! let tree = vec![texdok_ast::Block::heading(1, "Hello")];
//! let report = render(&tree, &config)?;
//! let source = bind(&report.body, &config);
//!
//! let result = Compiler::new(config).compile(&source, "build".as_ref(), "hello")?;
//! if result.status == CompileStatus::Failed {
//!     eprintln!("{}", result.diagnostics.unwrap_or_default());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compiler;
pub mod error;
pub mod logfile;

pub use compiler::{
    clean_auxiliary, compile_document, CompileResult, CompileState, CompileStatus, Compiler,
    EngineRunner, PassOutput, PassRequest, ProcessRunner, AUXILIARY_EXTENSIONS,
};
pub use error::{CompileError, CompileFailure, Result};
pub use logfile::{analyze, LogAnalysis};

/// Version banner of `engine`, if it can be started
pub fn engine_version(engine: &str) -> Option<String> {
    ProcessRunner.version(engine)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
