//! # Property Comparison
//!
//! Name-keyed diff of two property-entry lists.
//!
//! ## Ordering
//!
//! Rows follow the first list's order, then the names only the second list
//! has, in the second list's order. Two extractions of the same class share
//! names and order, so same-class comparisons line up row for row.

use crate::host::{HostObject, HostScope};
use crate::property::PropertyEntry;
use crate::registry::CollectorRegistry;
use crate::CadscopeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Classification of one compared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DiffStatus {
    Same,
    Different,
    OnlyInFirst,
    OnlyInSecond,
}

impl DiffStatus {
    /// Short marker for text output.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            DiffStatus::Same => "=",
            DiffStatus::Different => "!",
            DiffStatus::OnlyInFirst => "<",
            DiffStatus::OnlyInSecond => ">",
        }
    }
}

/// What two entries are compared by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompareMode {
    /// Formatted text, so values equal at display precision compare equal.
    #[default]
    Formatted,
    /// Raw values. Error entries still compare by text.
    Raw,
}

/// One row of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRow {
    pub name: String,
    /// Formatted value on the first side.
    pub first: Option<String>,
    /// Formatted value on the second side.
    pub second: Option<String>,
    pub status: DiffStatus,
}

/// Row counts per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DiffSummary {
    pub same: usize,
    pub different: usize,
    pub only_in_first: usize,
    pub only_in_second: usize,
}

/// Result of comparing two property lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub rows: Vec<DiffRow>,
}

impl Comparison {
    #[must_use]
    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for row in &self.rows {
            match row.status {
                DiffStatus::Same => summary.same += 1,
                DiffStatus::Different => summary.different += 1,
                DiffStatus::OnlyInFirst => summary.only_in_first += 1,
                DiffStatus::OnlyInSecond => summary.only_in_second += 1,
            }
        }
        summary
    }

    /// Check if every row is `Same`.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.rows.iter().all(|r| r.status == DiffStatus::Same)
    }

    /// Rows that are not `Same`.
    pub fn changes(&self) -> impl Iterator<Item = &DiffRow> {
        self.rows.iter().filter(|r| r.status != DiffStatus::Same)
    }
}

fn entries_equal(a: &PropertyEntry, b: &PropertyEntry, mode: CompareMode) -> bool {
    match mode {
        CompareMode::Raw if !a.has_error && !b.has_error => a.raw_value == b.raw_value,
        _ => a.formatted_value == b.formatted_value,
    }
}

/// Diff two entry lists.
#[must_use]
pub fn compare(first: &[PropertyEntry], second: &[PropertyEntry], mode: CompareMode) -> Comparison {
    let mut lookup: BTreeMap<&str, &PropertyEntry> = BTreeMap::new();
    for entry in second {
        lookup.entry(entry.name.as_str()).or_insert(entry);
    }

    let mut rows = Vec::with_capacity(first.len().max(second.len()));
    for entry in first {
        let row = match lookup.remove(entry.name.as_str()) {
            Some(other) => DiffRow {
                name: entry.name.clone(),
                first: Some(entry.formatted_value.clone()),
                second: Some(other.formatted_value.clone()),
                status: if entries_equal(entry, other, mode) {
                    DiffStatus::Same
                } else {
                    DiffStatus::Different
                },
            },
            None => DiffRow {
                name: entry.name.clone(),
                first: Some(entry.formatted_value.clone()),
                second: None,
                status: DiffStatus::OnlyInFirst,
            },
        };
        rows.push(row);
    }

    for entry in second {
        if lookup.remove(entry.name.as_str()).is_some() {
            rows.push(DiffRow {
                name: entry.name.clone(),
                first: None,
                second: Some(entry.formatted_value.clone()),
                status: DiffStatus::OnlyInSecond,
            });
        }
    }

    Comparison { rows }
}

/// Extract both objects through the registry and diff the results.
pub fn compare_objects(
    registry: &CollectorRegistry,
    scope: &dyn HostScope,
    first: &dyn HostObject,
    second: &dyn HostObject,
    mode: CompareMode,
) -> Result<Comparison, CadscopeError> {
    let a = registry.extract(first, scope)?;
    let b = registry.extract(second, scope)?;
    tracing::debug!(first = %first.handle(), second = %second.handle(), "comparing objects");
    Ok(compare(&a, &b, mode))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::format::FormatOptions;
    use crate::{ObjectHandle, Value};

    fn entry(name: &str, value: &str) -> PropertyEntry {
        let options = FormatOptions::default();
        let mut sink = crate::property::EntrySink::new(&options);
        sink.push_value(name, "String", "Test", Value::Text(value.to_string()));
        sink.finish().remove(0)
    }

    #[test]
    fn rows_follow_first_then_leftovers() {
        let first = vec![entry("A", "1"), entry("B", "2"), entry("C", "3")];
        let second = vec![entry("D", "4"), entry("B", "2"), entry("A", "9")];

        let comparison = compare(&first, &second, CompareMode::Formatted);
        let rows: Vec<(&str, DiffStatus)> = comparison
            .rows
            .iter()
            .map(|r| (r.name.as_str(), r.status))
            .collect();

        assert_eq!(
            rows,
            vec![
                ("A", DiffStatus::Different),
                ("B", DiffStatus::Same),
                ("C", DiffStatus::OnlyInFirst),
                ("D", DiffStatus::OnlyInSecond),
            ]
        );
        let summary = comparison.summary();
        assert_eq!(summary.same, 1);
        assert_eq!(summary.different, 1);
    }

    #[test]
    fn raw_mode_sees_sub_precision_differences() {
        let options = FormatOptions::default();
        let mut sink = crate::property::EntrySink::new(&options);
        sink.push_value("X", "Double", "Test", Value::Double(1.000_000_01));
        let first = sink.finish();
        let mut sink = crate::property::EntrySink::new(&options);
        sink.push_value("X", "Double", "Test", Value::Double(1.000_000_02));
        let second = sink.finish();

        assert!(compare(&first, &second, CompareMode::Formatted).is_identical());
        assert!(!compare(&first, &second, CompareMode::Raw).is_identical());
    }

    #[test]
    fn same_class_objects_line_up() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = CollectorRegistry::standard(FormatOptions::default());
        let walls = scope.resolve(ObjectHandle(0x31)).expect("walls");
        let doors = scope.resolve(ObjectHandle(0x32)).expect("doors");

        let comparison =
            compare_objects(&registry, &scope, walls, doors, CompareMode::Formatted).expect("diff");
        let summary = comparison.summary();
        assert_eq!(summary.only_in_first + summary.only_in_second, 0);

        let transparency = comparison
            .rows
            .iter()
            .find(|r| r.name == "Transparency")
            .expect("row");
        assert_eq!(transparency.status, DiffStatus::Different);
        let line_weight = comparison
            .rows
            .iter()
            .find(|r| r.name == "LineWeight")
            .expect("row");
        assert_eq!(line_weight.status, DiffStatus::Same);
    }
}
