//! Document root and metadata definitions

use serde::{Deserialize, Serialize};

use crate::block::Block;

/// A complete document as handed over by the parser
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (front matter)
    #[serde(default)]
    pub metadata: DocumentMeta,
    /// Document content blocks, in source order
    pub blocks: Vec<Block>,
}

/// Document metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMeta {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from a block sequence
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            metadata: DocumentMeta::default(),
            blocks,
        }
    }

    /// Add a block to the document
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Check if the document is empty (no blocks)
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get the number of top-level blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
    }

    #[test]
    fn test_metadata_defaults_when_missing() {
        let doc: Document = serde_json::from_str(r#"{"blocks": ["thematic_break"]}"#).unwrap();
        assert_eq!(doc.metadata, DocumentMeta::default());
        assert_eq!(doc.len(), 1);
    }
}
