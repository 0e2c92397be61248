//! # Property Entries
//!
//! The unit of every extraction result, and the sink strategies write into.
//!
//! [`EntrySink`] owns the per-entry failure policy: a failing getter becomes
//! an error entry and the pass continues, while a host-access failure ends
//! the pass with an error.

use crate::format::FormatOptions;
use crate::host::{MemberDescriptor, MemberShape};
use crate::lazy::{CollectionSource, LazyCollection};
use crate::{CadscopeError, MemberError, Value};
use serde::Serialize;
use std::collections::BTreeSet;

/// Classification of a member's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemberClass {
    /// Numeric, string, enum, date or boolean.
    Leaf,
    /// Point or vector.
    Geometric,
    /// Collection, deferred.
    Sequence,
    /// Nested host object.
    Complex,
}

impl From<MemberShape> for MemberClass {
    fn from(shape: MemberShape) -> Self {
        match shape {
            MemberShape::Scalar | MemberShape::Spatial => MemberClass::Leaf,
            MemberShape::Geometric => MemberClass::Geometric,
            MemberShape::Sequence => MemberClass::Sequence,
            MemberShape::Complex => MemberClass::Complex,
        }
    }
}

/// One named property of an inspected object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyEntry {
    /// Unique within one extraction pass; the diff key.
    pub name: String,
    pub declared_type: String,
    pub formatted_value: String,
    /// Snapshot of the host value. Nested objects stay handles.
    pub raw_value: Value,
    pub category: String,
    pub class: MemberClass,
    pub is_collection: bool,
    /// Deferred reference for sequence-typed entries.
    pub collection: Option<LazyCollection>,
    pub has_error: bool,
    pub error_message: Option<String>,
}

impl PropertyEntry {
    /// Build an error entry.
    #[must_use]
    pub fn error(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            formatted_value: format!("[error: {}]", message),
            raw_value: Value::Null,
            category: category.into(),
            class: MemberClass::Leaf,
            is_collection: false,
            collection: None,
            has_error: true,
            error_message: Some(message),
        }
    }
}

/// Collects the entries of one extraction pass.
#[derive(Debug)]
pub struct EntrySink<'a> {
    options: &'a FormatOptions,
    entries: Vec<PropertyEntry>,
    names: BTreeSet<String>,
}

impl<'a> EntrySink<'a> {
    /// Create an empty sink.
    #[must_use]
    pub fn new(options: &'a FormatOptions) -> Self {
        Self {
            options,
            entries: Vec::new(),
            names: BTreeSet::new(),
        }
    }

    /// Formatting options in effect for this pass.
    #[must_use]
    pub fn options(&self) -> &FormatOptions {
        self.options
    }

    /// Number of entries collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entry has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if an entry with this name was already collected.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Finish the pass.
    #[must_use]
    pub fn finish(self) -> Vec<PropertyEntry> {
        self.entries
    }

    /// Add an entry. Later entries with an already-used name are dropped.
    pub fn push(&mut self, entry: PropertyEntry) {
        if self.names.contains(&entry.name) {
            tracing::debug!(name = %entry.name, "duplicate property name dropped");
            return;
        }
        self.names.insert(entry.name.clone());
        self.entries.push(entry);
    }

    /// Add a plain value entry.
    pub fn push_value(
        &mut self,
        name: impl Into<String>,
        declared_type: impl Into<String>,
        category: impl Into<String>,
        value: Value,
    ) {
        let formatted_value = self.options.format_value(&value, false);
        let class = match value {
            Value::Point(_) | Value::Vector(_) => MemberClass::Geometric,
            Value::Object(_) => MemberClass::Complex,
            _ => MemberClass::Leaf,
        };
        self.push(PropertyEntry {
            name: name.into(),
            declared_type: declared_type.into(),
            formatted_value,
            raw_value: value,
            category: category.into(),
            class,
            is_collection: false,
            collection: None,
            has_error: false,
            error_message: None,
        });
    }

    /// Add a deferred collection entry. Its items are not read.
    pub fn push_collection(
        &mut self,
        name: impl Into<String>,
        declared_type: impl Into<String>,
        category: impl Into<String>,
        source: CollectionSource,
    ) {
        let declared_type = declared_type.into();
        self.push(PropertyEntry {
            name: name.into(),
            formatted_value: format!("[{}]", declared_type),
            declared_type,
            raw_value: Value::Null,
            category: category.into(),
            class: MemberClass::Sequence,
            is_collection: true,
            collection: Some(LazyCollection::unresolved(source)),
            has_error: false,
            error_message: None,
        });
    }

    /// Add an error entry.
    pub fn push_error(
        &mut self,
        name: impl Into<String>,
        declared_type: impl Into<String>,
        category: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(PropertyEntry::error(name, declared_type, category, message));
    }

    /// Add the result of reading one reflected member.
    ///
    /// A getter failure becomes an error entry. Only a host-access failure
    /// is returned, which ends the pass.
    pub fn push_member(
        &mut self,
        member: &MemberDescriptor,
        read: Result<Value, MemberError>,
    ) -> Result<(), CadscopeError> {
        match read {
            Ok(value) => {
                let spatial = member.shape == MemberShape::Spatial;
                let formatted_value = self.options.format_value(&value, spatial);
                self.push(PropertyEntry {
                    name: member.name.clone(),
                    declared_type: member.declared_type.clone(),
                    formatted_value,
                    raw_value: value,
                    category: member.category.clone(),
                    class: MemberClass::from(member.shape),
                    is_collection: false,
                    collection: None,
                    has_error: false,
                    error_message: None,
                });
                Ok(())
            }
            Err(MemberError::HostAccess(message)) => Err(CadscopeError::HostAccess(message)),
            Err(err) => {
                tracing::warn!(member = %member.name, "member read failed: {}", err);
                self.push_error(
                    member.name.clone(),
                    member.declared_type.clone(),
                    member.category.clone(),
                    err.to_string(),
                );
                Ok(())
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectHandle, Point3d};

    fn member(name: &str, shape: MemberShape) -> MemberDescriptor {
        MemberDescriptor::new(name, "Double", "Curve", shape)
    }

    #[test]
    fn spatial_members_use_spatial_precision() {
        let options = FormatOptions::default();
        let mut sink = EntrySink::new(&options);
        sink.push_member(&member("Length", MemberShape::Spatial), Ok(Value::Double(1.5)))
            .expect("push");
        sink.push_member(&member("Ratio", MemberShape::Scalar), Ok(Value::Double(1.5)))
            .expect("push");

        let entries = sink.finish();
        assert_eq!(entries[0].formatted_value, "1.5000");
        assert_eq!(entries[1].formatted_value, "1.500000");
    }

    #[test]
    fn getter_failure_becomes_error_entry() {
        let options = FormatOptions::default();
        let mut sink = EntrySink::new(&options);
        sink.push_member(
            &member("Broken", MemberShape::Scalar),
            Err(MemberError::Failed("eNotApplicable".into())),
        )
        .expect("recovered");

        let entries = sink.finish();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].has_error);
        assert_eq!(entries[0].error_message.as_deref(), Some("eNotApplicable"));
    }

    #[test]
    fn host_access_failure_propagates() {
        let options = FormatOptions::default();
        let mut sink = EntrySink::new(&options);
        let result = sink.push_member(
            &member("Any", MemberShape::Scalar),
            Err(MemberError::HostAccess("transaction ended".into())),
        );
        assert!(matches!(result, Err(CadscopeError::HostAccess(_))));
        assert!(sink.is_empty());
    }

    #[test]
    fn duplicate_names_keep_first() {
        let options = FormatOptions::default();
        let mut sink = EntrySink::new(&options);
        sink.push_value("Name", "String", "A", Value::Text("first".into()));
        sink.push_value("Name", "String", "B", Value::Text("second".into()));

        let entries = sink.finish();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].formatted_value, "first");
    }

    #[test]
    fn value_class_follows_value() {
        let options = FormatOptions::default();
        let mut sink = EntrySink::new(&options);
        sink.push_value("P", "Point3d", "X", Value::Point(Point3d::default()));
        let entries = sink.finish();
        assert_eq!(entries[0].class, MemberClass::Geometric);
    }

    #[test]
    fn collection_entries_stay_unresolved() {
        let options = FormatOptions::default();
        let mut sink = EntrySink::new(&options);
        sink.push_collection(
            "Vertices",
            "Point3d",
            "Polyline",
            CollectionSource::member(ObjectHandle(1), "Vertices"),
        );
        let entries = sink.finish();
        assert!(entries[0].is_collection);
        assert!(
            entries[0]
                .collection
                .as_ref()
                .is_some_and(|c| !c.is_resolved())
        );
    }
}
