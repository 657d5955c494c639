//! texdok-ast - Document tree definitions
//!
//! This crate provides the tree types handed to the texdok renderer by an
//! upstream markup parser. The tree is plain data: it derives serde so a
//! parser written in any language can hand it over as JSON.
//!
//! # Example
//!
//! ```
//! use texdok_ast::{Block, Document, Inline};
//!
//! let mut doc = Document::new();
//! doc.push(Block::heading(1, "Introduction"));
//! doc.push(Block::paragraph(vec![Inline::text("Hello, world.")]));
//! assert_eq!(doc.len(), 2);
//! ```

pub mod block;
pub mod document;
pub mod inline;

pub use block::{
    Alignment, Block, Blockquote, Cell, CodeBlock, Heading, Image, List, ListItem, MathBlock,
    Paragraph, Table,
};
pub use document::{Document, DocumentMeta};
pub use inline::{plain_text, Inline, Link};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
