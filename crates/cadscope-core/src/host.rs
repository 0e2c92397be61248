//! # Host Interface
//!
//! Traits the host application implements so cadscope can read its object
//! graph. cadscope never owns host objects: every reference handed out by a
//! [`HostScope`] borrows from that scope and dies with it.
//!
//! ## Extension Point
//!
//! - [`Reflect`] is the only open-ended introspection capability. It is
//!   consumed by the reflective extractor and nowhere else.
//! - [`HostObject`] adds identity and container classification.
//! - [`HostScope`] is the caller-held, time-bounded read window: root access,
//!   handle resolution, and the enumeration primitives the navigator needs.

use crate::typed_value::TypedValue;
use crate::{CadscopeError, MemberError, NamedRef, ObjectHandle, ObjectKind, Value};
use serde::{Deserialize, Serialize};

// =============================================================================
// REFLECTION
// =============================================================================

/// Declared shape of a member, as the host knows it from its type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberShape {
    /// Numeric, string, enum, date or boolean.
    Scalar,
    /// A floating scalar measured in drawing units (length, radius, area).
    Spatial,
    /// A point or vector.
    Geometric,
    /// A collection; never walked during extraction.
    Sequence,
    /// A nested host object.
    Complex,
}

/// Description of one publicly readable member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    /// Member name, unique per object after de-duplication.
    pub name: String,
    /// Declared type name, as the host spells it.
    pub declared_type: String,
    /// Grouping shown to operators (typically the declaring class).
    pub category: String,
    /// Declared shape.
    pub shape: MemberShape,
}

impl MemberDescriptor {
    /// Create a new member descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        category: impl Into<String>,
        shape: MemberShape,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            category: category.into(),
            shape,
        }
    }
}

/// Read access to an object's public members.
///
/// `members` may return descriptors in any order; the reflective extractor
/// imposes the stable order. `read_member` is the getter and may fail per
/// member.
pub trait Reflect {
    /// Class name of the object.
    fn class_name(&self) -> &str;

    /// Descriptors of every publicly readable member.
    fn members(&self) -> Vec<MemberDescriptor>;

    /// Read one member by name.
    fn read_member(&self, name: &str) -> Result<Value, MemberError>;
}

// =============================================================================
// HOST OBJECT
// =============================================================================

/// A live object of the host graph.
pub trait HostObject: Reflect {
    /// Stable handle of the object.
    fn handle(&self) -> ObjectHandle;

    /// Container kind, used for navigation and collector selection.
    fn kind(&self) -> ObjectKind;

    /// Opaque typed-value payload of an xrecord-like object.
    fn typed_data(&self) -> Option<&[TypedValue]> {
        None
    }

    /// Extended data attached to the object by applications.
    fn xdata(&self) -> Option<&[TypedValue]> {
        None
    }

    /// Label used when the object appears without a record name.
    fn display_name(&self) -> String {
        format!("{} ({})", self.class_name(), self.handle())
    }
}

// =============================================================================
// HOST SCOPE
// =============================================================================

/// Scoped read access to the host graph.
///
/// The surrounding application opens and closes the scope. Once closed,
/// every method fails with [`CadscopeError::HostAccess`].
pub trait HostScope {
    /// Check if the scope is still usable.
    fn is_open(&self) -> bool;

    /// Handle of the graph's root object.
    fn root(&self) -> Result<ObjectHandle, CadscopeError>;

    /// Resolve a handle to a live object.
    fn resolve(&self, handle: ObjectHandle) -> Result<&dyn HostObject, CadscopeError>;

    /// Named records of a table-like object, in table order.
    fn table_records(&self, table: ObjectHandle) -> Result<Vec<NamedRef>, CadscopeError>;

    /// Entries of a dictionary-like object, in key order.
    fn dictionary_entries(&self, dictionary: ObjectHandle)
    -> Result<Vec<NamedRef>, CadscopeError>;

    /// Entity handles of an indexed container, in container order.
    fn container_items(&self, container: ObjectHandle) -> Result<Vec<ObjectHandle>, CadscopeError>;

    /// Items of a sequence-typed member. Only called when a deferred
    /// collection is resolved.
    fn member_items(&self, owner: ObjectHandle, member: &str) -> Result<Vec<Value>, CadscopeError>;

    /// Fail with [`CadscopeError::HostAccess`] if the scope is closed.
    fn ensure_open(&self) -> Result<(), CadscopeError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CadscopeError::HostAccess(
                "access scope is closed".to_string(),
            ))
        }
    }

    /// Resolve a hexadecimal handle literal to a live object.
    fn resolve_hex(&self, text: &str) -> Result<&dyn HostObject, CadscopeError> {
        let handle = ObjectHandle::parse(text)?;
        self.resolve(handle)
    }
}
