//! Block-level elements for document structure
//!
//! This module defines the closed set of block constructs the renderer
//! understands: headings, paragraphs, lists, tables, code blocks, images,
//! math, blockquotes and thematic breaks.

use serde::{Deserialize, Serialize};

use crate::inline::Inline;

/// Block-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    /// A section heading of any depth
    Heading(Heading),
    /// A paragraph of text
    Paragraph(Paragraph),
    /// An ordered or unordered list
    List(List),
    /// A pipe table
    Table(Table),
    /// A fenced or indented code block
    CodeBlock(CodeBlock),
    /// A standalone image
    Image(Image),
    /// A math block
    Math(MathBlock),
    /// A blockquote containing nested blocks
    Blockquote(Blockquote),
    /// A horizontal rule
    ThematicBreak,
}

/// A section heading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading depth, 1 is the outermost. Unbounded above.
    pub depth: u32,
    /// Heading text content
    pub content: Vec<Inline>,
}

/// A paragraph block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline content within the paragraph
    pub content: Vec<Inline>,
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    /// Whether items are numbered
    #[serde(default)]
    pub ordered: bool,
    /// List items
    pub items: Vec<ListItem>,
}

/// A single list item
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListItem {
    /// Item content (can contain nested blocks, including lists)
    pub content: Vec<Block>,
}

/// Inline content of one table cell
pub type Cell = Vec<Inline>;

/// A table
///
/// A well-formed table has one alignment per header cell and every body row
/// has exactly as many cells as the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Per-column alignment, in source column order
    #[serde(default)]
    pub alignments: Vec<Alignment>,
    /// Header row cells
    pub header: Vec<Cell>,
    /// Body rows
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

/// Column alignment taken from the table separator row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// `:---`
    Left,
    /// `:---:`
    Center,
    /// `---:`
    Right,
    /// `---`
    #[default]
    Default,
}

/// A code block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Info-string language tag, as written in the source
    #[serde(default)]
    pub language: Option<String>,
    /// The raw code
    pub content: String,
}

/// A block image reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Alternative text, used as the figure caption
    #[serde(default)]
    pub alt: String,
    /// Image path, relative to the source document's directory
    pub src: String,
}

/// A math block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathBlock {
    /// Raw math source without delimiters
    pub content: String,
    /// `$...$` when true, display math otherwise
    #[serde(default)]
    pub inline: bool,
}

/// A blockquote
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Blockquote {
    /// Quoted blocks
    pub children: Vec<Block>,
}

impl Block {
    /// Heading with plain text content
    pub fn heading(depth: u32, text: impl Into<String>) -> Self {
        Block::Heading(Heading {
            depth,
            content: vec![Inline::Text(text.into())],
        })
    }

    /// Paragraph from inline content
    pub fn paragraph(content: Vec<Inline>) -> Self {
        Block::Paragraph(Paragraph { content })
    }

    /// Code block with an optional language tag
    pub fn code(language: Option<&str>, content: impl Into<String>) -> Self {
        Block::CodeBlock(CodeBlock {
            language: language.map(str::to_string),
            content: content.into(),
        })
    }

    /// Block image
    pub fn image(alt: impl Into<String>, src: impl Into<String>) -> Self {
        Block::Image(Image {
            alt: alt.into(),
            src: src.into(),
        })
    }

    /// Display or inline math block
    pub fn math(content: impl Into<String>, inline: bool) -> Self {
        Block::Math(MathBlock {
            content: content.into(),
            inline,
        })
    }

    /// Short name of the block kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading(_) => "heading",
            Block::Paragraph(_) => "paragraph",
            Block::List(_) => "list",
            Block::Table(_) => "table",
            Block::CodeBlock(_) => "code block",
            Block::Image(_) => "image",
            Block::Math(_) => "math",
            Block::Blockquote(_) => "blockquote",
            Block::ThematicBreak => "thematic break",
        }
    }
}
