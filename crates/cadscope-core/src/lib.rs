//! # cadscope-core
//!
//! The inspection engine for cadscope - THE LOGIC.
//!
//! This crate reads an externally hosted, dynamically typed CAD object graph
//! without knowing every object type in advance:
//! - `registry` / `collectors` pick an extraction strategy per object
//! - `reflect` is the generic fallback over any readable object
//! - `typed_value` decodes and encodes group-code tagged data
//! - `navigator` is a lazy, expand-once tree over the graph
//! - `compare` diffs two extracted property sets
//!
//! ## Architectural Constraints
//!
//! - Read-only: host objects are borrowed from a caller-held scope, never
//!   owned; the only write path is the typed-value edit
//! - Deterministic: member order is an ordinal sort, maps are `BTreeMap`
//! - Closed dispatch: the built-in collectors are a fixed set and the
//!   registry is frozen once built
//! - NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod collectors;
pub mod compare;
pub mod config;
pub mod document;
pub mod filter;
pub mod format;
pub mod formats;
pub mod host;
pub mod lazy;
pub mod navigator;
pub mod primitives;
pub mod property;
pub mod reflect;
pub mod registry;
pub mod typed_value;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CadscopeError, MemberError, NamedRef, ObjectHandle, ObjectKind, ObjectRef, Point3d,
    SequenceInfo, Value, Vector3d,
};

// =============================================================================
// RE-EXPORTS: Host Interface & Extraction
// =============================================================================

pub use collectors::BuiltinCollector;
pub use format::FormatOptions;
pub use host::{HostObject, HostScope, MemberDescriptor, MemberShape, Reflect};
pub use lazy::{CollectionItem, CollectionOrigin, CollectionSource, LazyCollection};
pub use property::{EntrySink, MemberClass, PropertyEntry};
pub use reflect::{ReflectiveExtractor, ordered_members};
pub use registry::{
    Collector, CollectorDescriptor, CollectorRegistry, ReflectiveCollector, RegistryBuilder,
};

// =============================================================================
// RE-EXPORTS: Codec, Navigation, Comparison
// =============================================================================

pub use compare::{
    CompareMode, Comparison, DiffRow, DiffStatus, DiffSummary, compare, compare_objects,
};
pub use filter::PropertyFilter;
pub use navigator::{
    CancelToken, Navigator, NavigatorConfig, NodeState, NodeTarget, ObjectNode, ObjectTree,
};
pub use typed_value::{TypedValue, TypedValueCodec, TypedValueEntry, TypedValueKind};

// =============================================================================
// RE-EXPORTS: Document, Config, Formats
// =============================================================================

pub use config::InspectorConfig;
pub use document::{Document, DocumentObject, DocumentScope, MemberSlot, TypedChannel};
pub use formats::{SnapshotHeader, document_from_bytes, document_to_bytes, is_snapshot};
