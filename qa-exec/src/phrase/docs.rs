use qa_core::vars::{capitalize, digest};
use serde::Serialize;

/// Documentation record shared by every phrase registered under the same tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialectDocs {
    pub tag: String,
    pub description: String,
    pub phrases: Vec<String>,
}

impl DialectDocs {
    pub fn new(tag: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            description: description.into(),
            phrases: Vec::new(),
        }
    }

    /// Derives a record from the first pattern of an undocumented phrase.
    pub fn synthesize(first_pattern: &str) -> Self {
        let stripped = first_pattern.strip_prefix("I ").unwrap_or(first_pattern);
        Self::new(digest(first_pattern), capitalize(stripped))
    }

    pub(crate) fn absorb(&mut self, patterns: impl IntoIterator<Item = String>) {
        for pattern in patterns {
            if !self.phrases.contains(&pattern) {
                self.phrases.push(pattern);
            }
        }
    }
}
