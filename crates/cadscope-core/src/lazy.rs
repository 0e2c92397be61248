//! # Deferred Collections
//!
//! Sequence-typed members and extended data are never walked during
//! extraction. They are carried as a [`LazyCollection`] that starts
//! `Unresolved` and is resolved at most once, on demand, inside a scope.

use crate::format::FormatOptions;
use crate::host::HostScope;
use crate::typed_value::TypedValueCodec;
use crate::{CadscopeError, ObjectHandle, Value};
use serde::Serialize;

/// Where the items of a deferred collection come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollectionOrigin {
    /// A sequence-typed member, resolved through [`HostScope::member_items`].
    Member,
    /// The owner's extended data.
    XData,
}

/// Enough information to resolve a collection later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSource {
    /// Object the collection belongs to.
    pub owner: ObjectHandle,
    /// Member name (or `XData`).
    pub name: String,
    pub origin: CollectionOrigin,
}

impl CollectionSource {
    /// Source for a sequence-typed member.
    #[must_use]
    pub fn member(owner: ObjectHandle, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            origin: CollectionOrigin::Member,
        }
    }

    /// Source for an object's extended data.
    #[must_use]
    pub fn xdata(owner: ObjectHandle) -> Self {
        Self {
            owner,
            name: "XData".to_string(),
            origin: CollectionOrigin::XData,
        }
    }
}

/// One resolved item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionItem {
    /// Positional label (`[0]`, `[1] 1000`, ...).
    pub label: String,
    /// Raw item value.
    pub value: Value,
    /// Rendered item value.
    pub formatted: String,
}

/// A collection that is either still a reference or already materialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LazyCollection {
    Unresolved(CollectionSource),
    Resolved(Vec<CollectionItem>),
}

impl LazyCollection {
    /// Create an unresolved collection.
    #[must_use]
    pub fn unresolved(source: CollectionSource) -> Self {
        Self::Unresolved(source)
    }

    /// Check if the items have been materialized.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Items, if already resolved.
    #[must_use]
    pub fn items(&self) -> Option<&[CollectionItem]> {
        match self {
            Self::Resolved(items) => Some(items),
            Self::Unresolved(_) => None,
        }
    }

    /// Materialize the items. A second call returns the cached items without
    /// touching the scope.
    pub fn resolve(
        &mut self,
        scope: &dyn HostScope,
        options: &FormatOptions,
    ) -> Result<&[CollectionItem], CadscopeError> {
        if let Self::Unresolved(source) = self {
            let items = fetch(source, scope, options)?;
            *self = Self::Resolved(items);
        }

        match self {
            Self::Resolved(items) => Ok(items),
            Self::Unresolved(_) => Ok(&[]),
        }
    }
}

fn fetch(
    source: &CollectionSource,
    scope: &dyn HostScope,
    options: &FormatOptions,
) -> Result<Vec<CollectionItem>, CadscopeError> {
    scope.ensure_open()?;

    match source.origin {
        CollectionOrigin::Member => {
            let values = scope.member_items(source.owner, &source.name)?;
            Ok(values
                .into_iter()
                .enumerate()
                .map(|(i, value)| CollectionItem {
                    label: format!("[{}]", i),
                    formatted: options.format_value(&value, false),
                    value,
                })
                .collect())
        }
        CollectionOrigin::XData => {
            let owner = scope.resolve(source.owner)?;
            let records = owner.xdata().unwrap_or(&[]);
            let entries = TypedValueCodec::new(*options).decode(records);
            Ok(records
                .iter()
                .zip(entries)
                .map(|(record, entry)| CollectionItem {
                    label: format!("[{}] {}", entry.index, entry.code),
                    value: record.value.clone(),
                    formatted: entry.formatted_value,
                })
                .collect())
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn member_collection_resolves_once() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let options = FormatOptions::default();
        let mut vertices =
            LazyCollection::unresolved(CollectionSource::member(ObjectHandle(0x52), "Vertices"));
        assert!(vertices.items().is_none());

        let labels: Vec<String> = vertices
            .resolve(&scope, &options)
            .expect("resolve")
            .iter()
            .map(|i| i.label.clone())
            .collect();
        assert_eq!(labels, vec!["[0]", "[1]", "[2]"]);

        scope.close();
        let again = vertices.resolve(&scope, &options).expect("cached");
        assert_eq!(again.len(), 3);
    }

    #[test]
    fn xdata_collection_labels_codes() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let mut xdata = LazyCollection::unresolved(CollectionSource::xdata(ObjectHandle(0x53)));

        let items = xdata
            .resolve(&scope, &FormatOptions::default())
            .expect("resolve");
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].label, "[0] 1001");
        assert_eq!(items[0].formatted, "CADSCOPE");
        assert_eq!(items[3].formatted, "0.750000");
    }

    #[test]
    fn closed_scope_leaves_collection_unresolved() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        scope.close();
        let mut vertices =
            LazyCollection::unresolved(CollectionSource::member(ObjectHandle(0x52), "Vertices"));

        let result = vertices.resolve(&scope, &FormatOptions::default());
        assert!(matches!(result, Err(CadscopeError::HostAccess(_))));
        assert!(!vertices.is_resolved());
    }
}
