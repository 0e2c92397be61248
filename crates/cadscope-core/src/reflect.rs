//! # Reflective Extractor
//!
//! The generic fallback. Reads every publicly readable member of any
//! [`Reflect`] object into property entries.
//!
//! ## Ordering
//!
//! Members are sorted ordinally by name and de-duplicated with the first
//! declaration winning, so two objects of the same class always produce the
//! same names in the same order. The diff engine relies on that.

use crate::host::{HostObject, MemberDescriptor, MemberShape, Reflect};
use crate::lazy::{CollectionSource, LazyCollection};
use crate::property::EntrySink;
use crate::CadscopeError;
use std::collections::{BTreeMap, BTreeSet};

/// Name the extended-data collection is exposed under.
pub const XDATA_COLLECTION: &str = "XData";

/// Member descriptors in extraction order.
#[must_use]
pub fn ordered_members(object: &dyn Reflect) -> Vec<MemberDescriptor> {
    let mut members = object.members();
    // stable sort keeps declaration order among equal names
    members.sort_by(|a, b| a.name.cmp(&b.name));

    let mut seen = BTreeSet::new();
    members.retain(|m| seen.insert(m.name.clone()));
    members
}

/// Reflection-driven property extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflectiveExtractor;

impl ReflectiveExtractor {
    /// Write one entry per member into `sink`.
    ///
    /// Sequence members are not read; they become deferred collection
    /// entries. Getter failures become error entries.
    pub fn collect(
        &self,
        object: &dyn HostObject,
        sink: &mut EntrySink<'_>,
    ) -> Result<(), CadscopeError> {
        for member in ordered_members(object) {
            if member.shape == MemberShape::Sequence {
                sink.push_collection(
                    member.name.clone(),
                    member.declared_type.clone(),
                    member.category.clone(),
                    CollectionSource::member(object.handle(), member.name.clone()),
                );
                continue;
            }

            let read = object.read_member(&member.name);
            sink.push_member(&member, read)?;
        }
        Ok(())
    }

    /// Deferred collections of an object: its sequence members, plus its
    /// extended data when present.
    #[must_use]
    pub fn collections(&self, object: &dyn HostObject) -> BTreeMap<String, LazyCollection> {
        let mut collections: BTreeMap<String, LazyCollection> = ordered_members(object)
            .into_iter()
            .filter(|m| m.shape == MemberShape::Sequence)
            .map(|m| {
                let source = CollectionSource::member(object.handle(), m.name.clone());
                (m.name, LazyCollection::unresolved(source))
            })
            .collect();

        if object.xdata().is_some_and(|x| !x.is_empty()) {
            collections
                .entry(XDATA_COLLECTION.to_string())
                .or_insert_with(|| {
                    LazyCollection::unresolved(CollectionSource::xdata(object.handle()))
                });
        }
        collections
    }
}

// =============================================================================
// TESTS
// =============================================================================
