//! # Built-in Collectors
//!
//! The closed set of specialized strategies registered ahead of the
//! reflective fallback. Each one matches a container kind, writes the
//! object's reflected members first and then its kind-specific entries.
//!
//! | Collector | Extra entries |
//! |-----------|---------------|
//! | `Database` | one reference per top-level table |
//! | `SymbolTable` | `RecordCount` |
//! | `Dictionary` | `EntryCount`, one reference per key |
//! | `EntityContainer` | `EntityCount` |
//! | `Xrecord` | `Data[i]` per typed value |
//! | `Entity` | deferred `XData` |

use crate::host::{HostObject, HostScope};
use crate::lazy::CollectionSource;
use crate::property::{EntrySink, MemberClass, PropertyEntry};
use crate::reflect::{ReflectiveExtractor, XDATA_COLLECTION};
use crate::registry::Collector;
use crate::typed_value::TypedValueCodec;
use crate::{CadscopeError, NamedRef, ObjectKind, ObjectRef, Value};

/// A built-in strategy, selected by container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinCollector {
    Database,
    SymbolTable,
    Dictionary,
    EntityContainer,
    Xrecord,
    Entity,
}

impl BuiltinCollector {
    /// Every built-in, in registration order.
    pub const ALL: [BuiltinCollector; 6] = [
        BuiltinCollector::Database,
        BuiltinCollector::SymbolTable,
        BuiltinCollector::Dictionary,
        BuiltinCollector::EntityContainer,
        BuiltinCollector::Xrecord,
        BuiltinCollector::Entity,
    ];

    fn kind(self) -> ObjectKind {
        match self {
            BuiltinCollector::Database => ObjectKind::Database,
            BuiltinCollector::SymbolTable => ObjectKind::SymbolTable,
            BuiltinCollector::Dictionary => ObjectKind::Dictionary,
            BuiltinCollector::EntityContainer => ObjectKind::EntityContainer,
            BuiltinCollector::Xrecord => ObjectKind::Xrecord,
            BuiltinCollector::Entity => ObjectKind::Entity,
        }
    }
}

impl Collector for BuiltinCollector {
    fn name(&self) -> &str {
        match self {
            BuiltinCollector::Database => "Database",
            BuiltinCollector::SymbolTable => "SymbolTable",
            BuiltinCollector::Dictionary => "Dictionary",
            BuiltinCollector::EntityContainer => "EntityContainer",
            BuiltinCollector::Xrecord => "Xrecord",
            BuiltinCollector::Entity => "Entity",
        }
    }

    fn accepts(&self, object: &dyn HostObject) -> bool {
        object.kind() == self.kind()
    }

    fn collect(
        &self,
        object: &dyn HostObject,
        scope: &dyn HostScope,
        sink: &mut EntrySink<'_>,
    ) -> Result<(), CadscopeError> {
        ReflectiveExtractor.collect(object, sink)?;

        match self {
            BuiltinCollector::Database => {
                let tables = scope.table_records(object.handle());
                references(scope, sink, "Tables", tables)
            }
            BuiltinCollector::SymbolTable => {
                let records = scope.table_records(object.handle()).map(|r| r.len());
                count(sink, "RecordCount", "Table", records)
            }
            BuiltinCollector::Dictionary => match scope.dictionary_entries(object.handle()) {
                Ok(entries) => {
                    count(sink, "EntryCount", "Dictionary", Ok(entries.len()))?;
                    references(scope, sink, "Entries", Ok(entries))
                }
                Err(err) => count(sink, "EntryCount", "Dictionary", Err(err)),
            },
            BuiltinCollector::EntityContainer => {
                let items = scope.container_items(object.handle()).map(|i| i.len());
                count(sink, "EntityCount", "Block", items)
            }
            BuiltinCollector::Xrecord => {
                typed_data(object, sink);
                Ok(())
            }
            BuiltinCollector::Entity => {
                if object.xdata().is_some_and(|x| !x.is_empty()) {
                    sink.push_collection(
                        XDATA_COLLECTION,
                        "TypedValue",
                        "Extended Data",
                        CollectionSource::xdata(object.handle()),
                    );
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// ENTRY HELPERS
// =============================================================================

/// Record a count, or an error entry if the host could not enumerate.
fn count(
    sink: &mut EntrySink<'_>,
    name: &str,
    category: &str,
    result: Result<usize, CadscopeError>,
) -> Result<(), CadscopeError> {
    match result {
        Ok(n) => {
            sink.push_value(name, "Int64", category, Value::Int64(n as i64));
            Ok(())
        }
        Err(err) if err.is_host_access() => Err(err),
        Err(err) => {
            tracing::warn!(entry = name, "enumeration failed: {}", err);
            sink.push_error(name, "Int64", category, err.to_string());
            Ok(())
        }
    }
}

/// Record one object reference per named child.
fn references(
    scope: &dyn HostScope,
    sink: &mut EntrySink<'_>,
    category: &str,
    result: Result<Vec<NamedRef>, CadscopeError>,
) -> Result<(), CadscopeError> {
    let named = match result {
        Ok(named) => named,
        Err(err) if err.is_host_access() => return Err(err),
        Err(err) => {
            sink.push_error(category, "NamedRef", category, err.to_string());
            return Ok(());
        }
    };

    for child in named {
        match scope.resolve(child.handle) {
            Ok(target) => {
                let reference = ObjectRef::new(child.handle, target.class_name());
                sink.push_value(child.name, target.class_name(), category, Value::Object(reference));
            }
            Err(err) if err.is_host_access() => return Err(err),
            Err(err) => sink.push_error(child.name, "Object", category, err.to_string()),
        }
    }
    Ok(())
}

/// Record one entry per typed value of an xrecord.
fn typed_data(object: &dyn HostObject, sink: &mut EntrySink<'_>) {
    let Some(records) = object.typed_data() else {
        return;
    };

    let codec = TypedValueCodec::new(*sink.options());
    for (record, entry) in records.iter().zip(codec.decode(records)) {
        let name = format!("Data[{}]", entry.index);
        let declared_type = format!("{} ({})", entry.kind.name(), entry.code);
        match entry.error {
            Some(message) => sink.push_error(name, declared_type, "Data", message),
            None => sink.push(PropertyEntry {
                name,
                declared_type,
                formatted_value: entry.formatted_value,
                raw_value: record.value.clone(),
                category: "Data".to_string(),
                class: match record.value {
                    Value::Point(_) | Value::Vector(_) => MemberClass::Geometric,
                    _ => MemberClass::Leaf,
                },
                is_collection: false,
                collection: None,
                has_error: false,
                error_message: None,
            }),
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
    use crate::format::FormatOptions;
    use crate::registry::CollectorRegistry;
    use crate::ObjectHandle;

    fn extract(handle: u64) -> Vec<crate::PropertyEntry> {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = CollectorRegistry::standard(FormatOptions::default());
        let object = scope.resolve(ObjectHandle(handle)).expect("resolve");
        registry.extract(object, &scope).expect("extract")
    }

    fn find<'a>(entries: &'a [crate::PropertyEntry], name: &str) -> &'a crate::PropertyEntry {
        entries
            .iter()
            .find(|e| e.name == name)
            .expect("entry present")
    }

    #[test]
    fn builtins_select_by_kind() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = CollectorRegistry::standard(FormatOptions::default());

        let root = scope.resolve(doc.root()).expect("root");
        assert_eq!(registry.select(root), "Database");
        let layer = scope.resolve(ObjectHandle(0x30)).expect("layer");
        assert_eq!(registry.select(layer), "Reflective");
    }

    #[test]
    fn symbol_table_reports_record_count() {
        let entries = extract(0x3);
        assert_eq!(find(&entries, "RecordCount").formatted_value, "3");
    }

    #[test]
    fn database_lists_tables() {
        let entries = extract(0x1);
        let layers = find(&entries, "LayerTable");
        assert_eq!(layers.formatted_value, "<LayerTable 3>");
        assert_eq!(layers.category, "Tables");
    }

    #[test]
    fn xrecord_decodes_each_value() {
        let entries = extract(0xE);
        let data: Vec<_> = entries.iter().filter(|e| e.category == "Data").collect();
        assert_eq!(data.len(), 6);
        assert_eq!(data[0].name, "Data[0]");
        assert_eq!(data[0].formatted_value, "grid");
        assert_eq!(data[4].formatted_value, "True");
    }

    #[test]
    fn entity_exposes_deferred_xdata() {
        let entries = extract(0x53);
        let xdata = find(&entries, "XData");
        assert!(xdata.is_collection);
        assert!(xdata.collection.as_ref().is_some_and(|c| !c.is_resolved()));

        let plain = extract(0x50);
        assert!(plain.iter().all(|e| e.name != "XData"));
    }
}
