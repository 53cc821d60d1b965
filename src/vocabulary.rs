//! Filter vocabulary registry.
//!
//! Keyword (platform/technology) and subtrack labels are discovered
//! incrementally while records are normalized. The registry is owned by
//! whoever runs the pipeline and passed in explicitly; growth is reported
//! back through the return value of the `observe_*` methods so callers can
//! decide whether dependent views need a refresh.

use serde::Serialize;
use std::collections::BTreeSet;

/// Append-only, deduplicated sets of filter option labels.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VocabularyRegistry {
    keywords: BTreeSet<String>,
    subtracks: BTreeSet<String>,
}

impl VocabularyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a keyword label. Returns `true` if it was not known before.
    pub fn observe_keyword(&mut self, label: &str) -> bool {
        if label.is_empty() {
            return false;
        }
        self.keywords.insert(label.to_string())
    }

    /// Record a subtrack label. Returns `true` if it was not known before.
    pub fn observe_subtrack(&mut self, label: &str) -> bool {
        if label.is_empty() {
            return false;
        }
        self.subtracks.insert(label.to_string())
    }

    /// Known keyword labels, alphabetically sorted.
    pub fn keywords(&self) -> Vec<String> {
        self.keywords.iter().cloned().collect()
    }

    /// Known subtrack labels, alphabetically sorted.
    pub fn subtracks(&self) -> Vec<String> {
        self.subtracks.iter().cloned().collect()
    }

    /// Number of known keyword labels.
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// Number of known subtrack labels.
    pub fn subtrack_count(&self) -> usize {
        self.subtracks.len()
    }
}
