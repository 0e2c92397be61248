//! # Collector Registry
//!
//! Ordered dispatch from a host object to the extraction strategy that
//! handles it.
//!
//! ## Lifecycle
//!
//! 1. A [`RegistryBuilder`] accepts collectors in priority order.
//! 2. [`RegistryBuilder::build`] appends the reflective fallback and freezes
//!    the list into a [`CollectorRegistry`].
//! 3. The registry has no mutating methods; it is shared by reference with
//!    the navigator and the comparison engine.
//!
//! Selection evaluates predicates in registration order. First match wins.
//! The fallback accepts everything, so selection never fails.

use crate::collectors::BuiltinCollector;
use crate::format::FormatOptions;
use crate::host::{HostObject, HostScope};
use crate::lazy::LazyCollection;
use crate::property::{EntrySink, PropertyEntry};
use crate::reflect::ReflectiveExtractor;
use crate::CadscopeError;
use std::collections::BTreeMap;
use std::fmt;

/// Name reported by [`CollectorRegistry::select`] for the fallback.
pub const FALLBACK_NAME: &str = "Reflective";

// =============================================================================
// COLLECTOR TRAIT
// =============================================================================

/// A property-extraction strategy.
pub trait Collector {
    /// Diagnostic name.
    fn name(&self) -> &str;

    /// Check if this strategy handles `object`.
    fn accepts(&self, object: &dyn HostObject) -> bool;

    /// Write the object's entries into `sink`.
    ///
    /// Returning an error other than [`CadscopeError::HostAccess`] records
    /// one error entry; entries already written are kept.
    fn collect(
        &self,
        object: &dyn HostObject,
        scope: &dyn HostScope,
        sink: &mut EntrySink<'_>,
    ) -> Result<(), CadscopeError>;

    /// Named deferred collections of the object.
    fn collections(
        &self,
        object: &dyn HostObject,
        _scope: &dyn HostScope,
    ) -> Result<BTreeMap<String, LazyCollection>, CadscopeError> {
        Ok(ReflectiveExtractor.collections(object))
    }
}

/// The always-last fallback strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflectiveCollector;

impl Collector for ReflectiveCollector {
    fn name(&self) -> &str {
        FALLBACK_NAME
    }

    fn accepts(&self, _object: &dyn HostObject) -> bool {
        true
    }

    fn collect(
        &self,
        object: &dyn HostObject,
        _scope: &dyn HostScope,
        sink: &mut EntrySink<'_>,
    ) -> Result<(), CadscopeError> {
        ReflectiveExtractor.collect(object, sink)
    }
}

// =============================================================================
// DESCRIPTOR
// =============================================================================

/// A registered strategy and its priority.
pub struct CollectorDescriptor {
    /// Registration position. Lower runs first.
    pub order: usize,
    collector: Box<dyn Collector>,
}

impl CollectorDescriptor {
    /// Diagnostic name of the strategy.
    #[must_use]
    pub fn name(&self) -> &str {
        self.collector.name()
    }

    /// The strategy itself.
    #[must_use]
    pub fn collector(&self) -> &dyn Collector {
        self.collector.as_ref()
    }
}

impl fmt::Debug for CollectorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorDescriptor")
            .field("order", &self.order)
            .field("name", &self.name())
            .finish()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Startup-phase registry construction.
#[derive(Default)]
pub struct RegistryBuilder {
    options: FormatOptions,
    collectors: Vec<Box<dyn Collector>>,
}

impl RegistryBuilder {
    /// Create an empty builder with default formatting.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the formatting options used by every extraction.
    #[must_use]
    pub fn with_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    /// Append a strategy. Earlier registrations take priority.
    #[must_use]
    pub fn register(mut self, collector: impl Collector + 'static) -> Self {
        self.collectors.push(Box::new(collector));
        self
    }

    /// Register every built-in strategy, in their standard order.
    #[must_use]
    pub fn register_builtins(self) -> Self {
        BuiltinCollector::ALL
            .iter()
            .fold(self, |builder, builtin| builder.register(*builtin))
    }

    /// Freeze the registry. The reflective fallback is appended last.
    #[must_use]
    pub fn build(self) -> CollectorRegistry {
        let descriptors: Vec<CollectorDescriptor> = self
            .collectors
            .into_iter()
            .enumerate()
            .map(|(order, collector)| CollectorDescriptor { order, collector })
            .collect();

        let fallback = CollectorDescriptor {
            order: descriptors.len(),
            collector: Box::new(ReflectiveCollector),
        };

        CollectorRegistry {
            options: self.options,
            descriptors,
            fallback,
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Immutable, ordered strategy list.
pub struct CollectorRegistry {
    options: FormatOptions,
    descriptors: Vec<CollectorDescriptor>,
    fallback: CollectorDescriptor,
}

impl fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("options", &self.options)
            .field("descriptors", &self.descriptors)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl CollectorRegistry {
    /// Registry with the built-in strategies and the given formatting.
    #[must_use]
    pub fn standard(options: FormatOptions) -> Self {
        RegistryBuilder::new()
            .with_options(options)
            .register_builtins()
            .build()
    }

    /// Formatting options in effect.
    #[must_use]
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Registered strategies in priority order, fallback last.
    #[must_use]
    pub fn descriptors(&self) -> impl Iterator<Item = &CollectorDescriptor> {
        self.descriptors.iter().chain(std::iter::once(&self.fallback))
    }

    fn select_descriptor(&self, object: &dyn HostObject) -> &CollectorDescriptor {
        self.descriptors
            .iter()
            .find(|d| d.collector.accepts(object))
            .unwrap_or(&self.fallback)
    }

    /// Name of the strategy that would handle `object`.
    #[must_use]
    pub fn select(&self, object: &dyn HostObject) -> &str {
        self.select_descriptor(object).name()
    }

    /// Extract the ordered property entries of `object`.
    ///
    /// Only [`CadscopeError::HostAccess`] is returned; every other failure
    /// is recorded as an error entry.
    pub fn extract(
        &self,
        object: &dyn HostObject,
        scope: &dyn HostScope,
    ) -> Result<Vec<PropertyEntry>, CadscopeError> {
        scope.ensure_open()?;

        let descriptor = self.select_descriptor(object);
        tracing::debug!(
            handle = %object.handle(),
            class = object.class_name(),
            collector = descriptor.name(),
            "extracting properties"
        );

        let mut sink = EntrySink::new(&self.options);
        match descriptor.collector.collect(object, scope, &mut sink) {
            Ok(()) => {}
            Err(err) if err.is_host_access() => return Err(err),
            Err(err) => {
                tracing::warn!(collector = descriptor.name(), "collector failed: {}", err);
                sink.push_error(descriptor.name(), "Collector", "Errors", err.to_string());
            }
        }
        Ok(sink.finish())
    }

    /// Named deferred collections of `object`.
    ///
    /// A strategy that fails to enumerate its collections falls back to the
    /// reflected ones.
    pub fn collections(
        &self,
        object: &dyn HostObject,
        scope: &dyn HostScope,
    ) -> Result<BTreeMap<String, LazyCollection>, CadscopeError> {
        scope.ensure_open()?;

        let descriptor = self.select_descriptor(object);
        match descriptor.collector.collections(object, scope) {
            Ok(collections) => Ok(collections),
            Err(err) if err.is_host_access() => Err(err),
            Err(err) => {
                tracing::warn!(collector = descriptor.name(), "collections failed: {}", err);
                Ok(ReflectiveExtractor.collections(object))
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
    use crate::document::{Document, DocumentObject};
    use crate::{ObjectHandle, ObjectKind, Value};

    struct Tagged(&'static str);

    impl Collector for Tagged {
        fn name(&self) -> &str {
            self.0
        }

        fn accepts(&self, object: &dyn HostObject) -> bool {
            object.class_name() == "Line"
        }

        fn collect(
            &self,
            _object: &dyn HostObject,
            _scope: &dyn HostScope,
            sink: &mut EntrySink<'_>,
        ) -> Result<(), CadscopeError> {
            sink.push_value("Tag", "String", "Test", Value::Text(self.0.to_string()));
            Err(CadscopeError::ObjectNotFound(ObjectHandle(0xFF)))
        }
    }

    fn line_document() -> Document {
        let mut doc = Document::new(DocumentObject::new(
            ObjectHandle(1),
            "Line",
            ObjectKind::Entity,
        ));
        doc.insert(DocumentObject::new(ObjectHandle(2), "Arc", ObjectKind::Entity));
        doc
    }

    #[test]
    fn first_registered_match_wins() {
        let registry = RegistryBuilder::new()
            .register(Tagged("first"))
            .register(Tagged("second"))
            .build();
        let doc = line_document();
        let scope = doc.open_scope();
        let line = scope.resolve(ObjectHandle(1)).expect("resolve");

        assert_eq!(registry.select(line), "first");
    }

    #[test]
    fn fallback_is_always_last() {
        let registry = RegistryBuilder::new().register(Tagged("only")).build();
        let doc = line_document();
        let scope = doc.open_scope();
        let arc = scope.resolve(ObjectHandle(2)).expect("resolve");

        assert_eq!(registry.select(arc), FALLBACK_NAME);
        let last = registry.descriptors().last().expect("fallback");
        assert_eq!(last.name(), FALLBACK_NAME);
        assert_eq!(last.order, 1);
    }

    #[test]
    fn collector_failure_becomes_error_entry() {
        let registry = RegistryBuilder::new().register(Tagged("failing")).build();
        let doc = line_document();
        let scope = doc.open_scope();
        let line = scope.resolve(ObjectHandle(1)).expect("resolve");

        let entries = registry.extract(line, &scope).expect("extract");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Tag");
        assert!(entries[1].has_error);
    }

    #[test]
    fn closed_scope_is_fatal() {
        let registry = CollectorRegistry::standard(FormatOptions::default());
        let doc = line_document();
        let scope = doc.open_scope();
        let line = scope.resolve(ObjectHandle(1)).expect("resolve");
        scope.close();

        let result = registry.extract(line, &scope);
        assert!(matches!(result, Err(CadscopeError::HostAccess(_))));
    }
}
