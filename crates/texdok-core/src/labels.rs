//! Per-document label registry

use std::collections::BTreeSet;

/// Hands out `\label` keys that are unique within one document
///
/// Keys are derived from a human caption; a caption seen before gets an
/// incrementing numeric suffix.
#[derive(Debug, Default, Clone)]
pub struct LabelRegistry {
    used: BTreeSet<String>,
}

impl LabelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label for `caption` under `prefix` (e.g. `fig`)
    pub fn register(&mut self, prefix: &str, caption: &str) -> String {
        let base = format!("{}:{}", prefix, slugify(caption));
        let mut label = base.clone();
        let mut suffix = 1;
        while self.used.contains(&label) {
            label = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.used.insert(label.clone());
        label
    }

    /// Consume the registry, returning every issued label
    pub fn into_labels(self) -> BTreeSet<String> {
        self.used
    }
}

/// Derive a label slug: ASCII alphanumerics lowercased, everything else `_`
pub fn slugify(caption: &str) -> String {
    let slug: String = caption
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug
    }
}
