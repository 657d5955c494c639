//! Inline elements for document content
//!
//! This module defines inline-level elements that appear within blocks,
//! such as text, emphasis, code spans, links and inline math.

use serde::{Deserialize, Serialize};

/// Inline-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inline {
    /// Plain text content
    Text(String),
    /// Emphasized content
    Emphasis(Vec<Inline>),
    /// Strongly emphasized content
    Strong(Vec<Inline>),
    /// A code span
    Code(String),
    /// A hyperlink
    Link(Link),
    /// Inline math, without the `$` delimiters
    Math(String),
    /// A soft line break (rendered as a space)
    SoftBreak,
    /// A hard line break
    LineBreak,
}

/// A hyperlink element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// The URL target
    pub url: String,
    /// The link text (can contain nested inline elements)
    pub content: Vec<Inline>,
}

impl Inline {
    /// Plain text element
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(text.into())
    }

    /// Concatenated plain text of this element, without any markup
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text(text) | Inline::Code(text) | Inline::Math(text) => text.clone(),
            Inline::Emphasis(children) | Inline::Strong(children) => plain_text(children),
            Inline::Link(link) => plain_text(&link.content),
            Inline::SoftBreak | Inline::LineBreak => " ".to_string(),
        }
    }
}

/// Concatenated plain text of a run of inline elements
pub fn plain_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}
