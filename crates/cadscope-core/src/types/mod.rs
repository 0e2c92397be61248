//! # Core Type Definitions
//!
//! This module contains the types shared by every inspection component:
//! - Host object identifiers (`ObjectHandle`, `ObjectRef`, `NamedRef`)
//! - Opaque host values (`Value`, `Point3d`, `Vector3d`, `SequenceInfo`)
//! - Container classification (`ObjectKind`)
//! - Error types (`CadscopeError`, `MemberError`)
//!
//! ## Ownership
//!
//! Nothing here owns a host object. Nested objects are referenced by handle
//! and resolved through the caller's [`crate::host::HostScope`] when needed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// OBJECT IDENTIFIERS
// =============================================================================

/// Stable per-object handle assigned by the host.
///
/// Handles are exchanged with operators as uppercase hexadecimal strings
/// (`"2A"`), which is also their serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectHandle(pub u64);

impl ObjectHandle {
    /// Create a handle from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Parse a hexadecimal handle literal. An optional `0x` prefix is accepted.
    pub fn parse(text: &str) -> Result<Self, CadscopeError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > 16 {
            return Err(CadscopeError::InvalidHandle(text.to_string()));
        }

        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| CadscopeError::InvalidHandle(text.to_string()))
    }

    /// Get the raw handle value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl TryFrom<String> for ObjectHandle {
    type Error = CadscopeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectHandle> for String {
    fn from(handle: ObjectHandle) -> Self {
        handle.to_string()
    }
}

/// A reference to a nested host object, as returned by a member getter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Handle of the referenced object.
    pub handle: ObjectHandle,
    /// Class name reported by the host for the referenced object.
    pub class_name: String,
}

impl ObjectRef {
    /// Create a new object reference.
    #[must_use]
    pub fn new(handle: ObjectHandle, class_name: impl Into<String>) -> Self {
        Self {
            handle,
            class_name: class_name.into(),
        }
    }
}

/// A named entry of a table or dictionary container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    /// Record name or dictionary key.
    pub name: String,
    /// Handle of the record or dictionary value.
    pub handle: ObjectHandle,
}

impl NamedRef {
    /// Create a new named reference.
    #[must_use]
    pub fn new(name: impl Into<String>, handle: ObjectHandle) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// A point in 3D model space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3d {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A direction or displacement in 3D model space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3d {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

// =============================================================================
// VALUE
// =============================================================================

/// Shape of a sequence-typed member, reported without walking its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceInfo {
    /// Declared element type, as named by the host.
    pub element_type: String,
    /// Item count, when the host can report it cheaply.
    pub count: Option<usize>,
}

/// An opaque host value.
///
/// This is a snapshot of what a getter or a typed-value record returned.
/// References to other host objects stay references (`Handle`, `Object`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Text(String),
    Date(NaiveDateTime),
    Enum { type_name: String, variant: String },
    Point(Point3d),
    Vector(Vector3d),
    Handle(ObjectHandle),
    Binary(Vec<u8>),
    Object(ObjectRef),
    Sequence(SequenceInfo),
}

impl Value {
    /// Runtime type name of the value, reported verbatim when no better
    /// classification exists.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Byte(_) => "Byte",
            Value::Int16(_) => "Int16",
            Value::Int32(_) => "Int32",
            Value::Int64(_) => "Int64",
            Value::Double(_) => "Double",
            Value::Text(_) => "String",
            Value::Date(_) => "DateTime",
            Value::Enum { .. } => "Enum",
            Value::Point(_) => "Point3d",
            Value::Vector(_) => "Vector3d",
            Value::Handle(_) => "Handle",
            Value::Binary(_) => "Binary",
            Value::Object(_) => "Object",
            Value::Sequence(_) => "Sequence",
        }
    }

    /// Check if this is the null value.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Widen any integer variant to `i64`.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Handle of the host object this value refers to, if any.
    #[must_use]
    pub fn referenced_handle(&self) -> Option<ObjectHandle> {
        match self {
            Value::Handle(h) => Some(*h),
            Value::Object(r) => Some(r.handle),
            _ => None,
        }
    }
}

// =============================================================================
// OBJECT KIND
// =============================================================================

/// Container kind of a host object.
///
/// The navigator dispatches on this; the built-in collectors use it as their
/// predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// The document root. Its named children are the top-level tables.
    Database,
    /// An ordered table of named records.
    SymbolTable,
    /// A keyed dictionary; values may be nested dictionaries.
    Dictionary,
    /// An indexed container of entities (a block definition).
    EntityContainer,
    /// A graphical entity.
    Entity,
    /// A non-graphical table record.
    Record,
    /// A record holding opaque typed-value data.
    Xrecord,
    /// Anything the navigator does not know how to expand.
    Other(String),
}

impl ObjectKind {
    /// Short name of the kind, used in informational output.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ObjectKind::Database => "Database",
            ObjectKind::SymbolTable => "SymbolTable",
            ObjectKind::Dictionary => "Dictionary",
            ObjectKind::EntityContainer => "EntityContainer",
            ObjectKind::Entity => "Entity",
            ObjectKind::Record => "Record",
            ObjectKind::Xrecord => "Xrecord",
            ObjectKind::Other(name) => name,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that abort an inspection operation.
///
/// Per-entry failures (a getter that fails, a typed value that cannot be
/// rendered) never surface here; they become error entries in the result.
#[derive(Debug, Error)]
pub enum CadscopeError {
    /// The access scope is closed or otherwise unusable.
    #[error("Host access failed: {0}")]
    HostAccess(String),

    /// No object with the given handle exists in the host graph.
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectHandle),

    /// A member could not be read as a collection. Recovered by the
    /// navigator as an informational leaf.
    #[error("Member {member:?} not readable: {message}")]
    MemberAccess { member: String, message: String },

    /// A handle literal could not be parsed.
    #[error("Invalid handle literal: {0:?}")]
    InvalidHandle(String),

    /// User text does not parse into the value a group code requires.
    #[error("Invalid value for group code {code}: {message}")]
    EncodeValidation { code: i16, message: String },

    /// A positional typed-value index is outside the record list.
    #[error("Typed value index {index} out of range ({len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    /// No tree node exists at the given child-index path.
    #[error("No node at path {0:?}")]
    InvalidPath(Vec<usize>),

    /// A navigator expansion was cancelled cooperatively.
    #[error("Expansion cancelled")]
    Cancelled,

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A configuration value is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CadscopeError {
    /// Check if this error means the access scope can no longer be used.
    #[must_use]
    pub fn is_host_access(&self) -> bool {
        matches!(self, CadscopeError::HostAccess(_))
    }
}

/// Failure of a single member getter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberError {
    /// The getter raised; the message is the host's.
    #[error("{0}")]
    Failed(String),

    /// The object does not expose a member with this name.
    #[error("No such member: {0}")]
    Missing(String),

    /// The getter failed because the access scope went away.
    /// This one is not recoverable and aborts the extraction.
    #[error("Host access failed: {0}")]
    HostAccess(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_parses_hex_case_insensitive() {
        assert_eq!(ObjectHandle::parse("2a").expect("parse"), ObjectHandle(42));
        assert_eq!(ObjectHandle::parse("2A").expect("parse"), ObjectHandle(42));
        assert_eq!(ObjectHandle::parse("0x2A").expect("parse"), ObjectHandle(42));
        assert_eq!(ObjectHandle::parse(" 1F ").expect("parse"), ObjectHandle(31));
    }

    #[test]
    fn handle_rejects_garbage() {
        assert!(ObjectHandle::parse("").is_err());
        assert!(ObjectHandle::parse("xyz").is_err());
        assert!(ObjectHandle::parse("11112222333344445").is_err());
    }

    #[test]
    fn handle_displays_uppercase_hex() {
        assert_eq!(ObjectHandle(0x1f).to_string(), "1F");
        assert_eq!(String::from(ObjectHandle(255)), "FF");
    }

    #[test]
    fn value_integer_widening() {
        assert_eq!(Value::Byte(7).as_integer(), Some(7));
        assert_eq!(Value::Int16(-3).as_integer(), Some(-3));
        assert_eq!(Value::Double(1.0).as_integer(), None);
    }

    #[test]
    fn value_referenced_handle() {
        let obj = Value::Object(ObjectRef::new(ObjectHandle(5), "Layer"));
        assert_eq!(obj.referenced_handle(), Some(ObjectHandle(5)));
        assert_eq!(Value::Handle(ObjectHandle(9)).referenced_handle(), Some(ObjectHandle(9)));
        assert_eq!(Value::Text("5".into()).referenced_handle(), None);
    }

    #[test]
    fn kind_names() {
        assert_eq!(ObjectKind::SymbolTable.name(), "SymbolTable");
        assert_eq!(ObjectKind::Other("Proxy".into()).name(), "Proxy");
    }
}
