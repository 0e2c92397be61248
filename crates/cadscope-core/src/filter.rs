//! # Property Filter
//!
//! Case-insensitive text filter over extracted entries. Error entries take
//! part like any other entry.

use crate::property::PropertyEntry;

/// Entry filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    needle: Option<String>,
    errors_only: bool,
}

impl PropertyFilter {
    /// A filter that keeps everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep entries whose name, value or declared type contains `text`.
    /// Blank text matches everything.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        let trimmed = text.trim();
        self.needle = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        };
        self
    }

    /// Keep only error entries.
    #[must_use]
    pub fn errors_only(mut self, errors_only: bool) -> Self {
        self.errors_only = errors_only;
        self
    }

    #[must_use]
    pub fn matches(&self, entry: &PropertyEntry) -> bool {
        if self.errors_only && !entry.has_error {
            return false;
        }
        match &self.needle {
            None => true,
            Some(needle) => [&entry.name, &entry.formatted_value, &entry.declared_type]
                .iter()
                .any(|field| field.to_lowercase().contains(needle)),
        }
    }

    /// Matching entries, in their original order.
    #[must_use]
    pub fn apply<'e>(&self, entries: &'e [PropertyEntry]) -> Vec<&'e PropertyEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}
