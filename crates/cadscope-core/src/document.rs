//! # In-Memory Document
//!
//! A serializable host graph implementing the host traits. The CLI inspects
//! it, snapshots persist it, and the test suites build on it.
//!
//! ## Scope
//!
//! [`Document::open_scope`] hands out a [`DocumentScope`]. Objects resolved
//! through it borrow the document. Closing the scope makes every further
//! read fail with [`CadscopeError::HostAccess`], the way a host behaves once
//! its transaction has ended.

use crate::host::{HostObject, HostScope, MemberDescriptor, MemberShape, Reflect};
use crate::typed_value::{TypedValue, TypedValueCodec};
use crate::{
    CadscopeError, MemberError, NamedRef, ObjectHandle, ObjectKind, ObjectRef, Point3d,
    SequenceInfo, Value, Vector3d,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;

// =============================================================================
// MEMBERS
// =============================================================================

/// Storage behind one reflected member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberSlot {
    /// The getter returns this value.
    Value(Value),
    /// A sequence; the getter reports its shape, items resolve lazily.
    Items(Vec<Value>),
    /// The getter fails with this message.
    Fault(String),
}

/// A reflected member of a document object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMember {
    pub descriptor: MemberDescriptor,
    pub slot: MemberSlot,
}

/// Which typed-value list of an object an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypedChannel {
    /// The xrecord payload.
    Data,
    /// Application extended data.
    XData,
}

// =============================================================================
// OBJECTS
// =============================================================================

/// One object of the document graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentObject {
    pub handle: ObjectHandle,
    pub class_name: String,
    pub kind: ObjectKind,
    #[serde(default)]
    pub members: Vec<DocumentMember>,
    /// Named children of tables, the database and dictionaries.
    #[serde(default)]
    pub records: Vec<NamedRef>,
    /// Entities of a container, in container order.
    #[serde(default)]
    pub items: Vec<ObjectHandle>,
    /// Xrecord payload.
    #[serde(default)]
    pub data: Vec<TypedValue>,
    #[serde(default)]
    pub xdata: Vec<TypedValue>,
}

impl DocumentObject {
    /// Create an object with no members.
    #[must_use]
    pub fn new(handle: ObjectHandle, class_name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            handle,
            class_name: class_name.into(),
            kind,
            members: Vec::new(),
            records: Vec::new(),
            items: Vec::new(),
            data: Vec::new(),
            xdata: Vec::new(),
        }
    }

    /// Add a member with a plain value.
    #[must_use]
    pub fn member(
        mut self,
        name: &str,
        declared_type: &str,
        category: &str,
        shape: MemberShape,
        value: Value,
    ) -> Self {
        self.members.push(DocumentMember {
            descriptor: MemberDescriptor::new(name, declared_type, category, shape),
            slot: MemberSlot::Value(value),
        });
        self
    }

    /// Add a sequence member.
    #[must_use]
    pub fn sequence(mut self, name: &str, element_type: &str, category: &str, items: Vec<Value>) -> Self {
        self.members.push(DocumentMember {
            descriptor: MemberDescriptor::new(name, element_type, category, MemberShape::Sequence),
            slot: MemberSlot::Items(items),
        });
        self
    }

    /// Add a member whose getter fails.
    #[must_use]
    pub fn faulty(
        mut self,
        name: &str,
        declared_type: &str,
        category: &str,
        message: &str,
    ) -> Self {
        self.members.push(DocumentMember {
            descriptor: MemberDescriptor::new(name, declared_type, category, MemberShape::Scalar),
            slot: MemberSlot::Fault(message.to_string()),
        });
        self
    }

    /// Add a named child.
    #[must_use]
    pub fn record(mut self, name: &str, handle: ObjectHandle) -> Self {
        self.records.push(NamedRef::new(name, handle));
        self
    }

    /// Add a contained entity.
    #[must_use]
    pub fn item(mut self, handle: ObjectHandle) -> Self {
        self.items.push(handle);
        self
    }

    /// Set the xrecord payload.
    #[must_use]
    pub fn with_data(mut self, data: Vec<TypedValue>) -> Self {
        self.data = data;
        self
    }

    /// Set the extended data.
    #[must_use]
    pub fn with_xdata(mut self, xdata: Vec<TypedValue>) -> Self {
        self.xdata = xdata;
        self
    }

    fn find_member(&self, name: &str) -> Option<&DocumentMember> {
        self.members.iter().find(|m| m.descriptor.name == name)
    }

    fn channel_mut(&mut self, channel: TypedChannel) -> &mut Vec<TypedValue> {
        match channel {
            TypedChannel::Data => &mut self.data,
            TypedChannel::XData => &mut self.xdata,
        }
    }
}

impl Reflect for DocumentObject {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn members(&self) -> Vec<MemberDescriptor> {
        self.members.iter().map(|m| m.descriptor.clone()).collect()
    }

    fn read_member(&self, name: &str) -> Result<Value, MemberError> {
        let member = self
            .find_member(name)
            .ok_or_else(|| MemberError::Missing(name.to_string()))?;

        match &member.slot {
            MemberSlot::Value(value) => Ok(value.clone()),
            MemberSlot::Items(items) => Ok(Value::Sequence(SequenceInfo {
                element_type: member.descriptor.declared_type.clone(),
                count: Some(items.len()),
            })),
            MemberSlot::Fault(message) => Err(MemberError::Failed(message.clone())),
        }
    }
}

impl HostObject for DocumentObject {
    fn handle(&self) -> ObjectHandle {
        self.handle
    }

    fn kind(&self) -> ObjectKind {
        self.kind.clone()
    }

    fn typed_data(&self) -> Option<&[TypedValue]> {
        if self.kind == ObjectKind::Xrecord || !self.data.is_empty() {
            Some(&self.data)
        } else {
            None
        }
    }

    fn xdata(&self) -> Option<&[TypedValue]> {
        if self.xdata.is_empty() {
            None
        } else {
            Some(&self.xdata)
        }
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// Serialized form: a root handle plus a flat object list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentData {
    root: ObjectHandle,
    objects: Vec<DocumentObject>,
}

/// An in-memory object graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DocumentData", into = "DocumentData")]
pub struct Document {
    root: ObjectHandle,
    objects: BTreeMap<ObjectHandle, DocumentObject>,
}

impl TryFrom<DocumentData> for Document {
    type Error = CadscopeError;

    fn try_from(data: DocumentData) -> Result<Self, Self::Error> {
        let mut objects = BTreeMap::new();
        for object in data.objects {
            let handle = object.handle;
            if objects.insert(handle, object).is_some() {
                return Err(CadscopeError::DeserializationError(format!(
                    "duplicate object handle {}",
                    handle
                )));
            }
        }
        if !objects.contains_key(&data.root) {
            return Err(CadscopeError::DeserializationError(format!(
                "root object {} is missing",
                data.root
            )));
        }
        Ok(Self {
            root: data.root,
            objects,
        })
    }
}

impl From<Document> for DocumentData {
    fn from(document: Document) -> Self {
        Self {
            root: document.root,
            objects: document.objects.into_values().collect(),
        }
    }
}

impl Document {
    /// Create a document holding only its root object.
    #[must_use]
    pub fn new(root: DocumentObject) -> Self {
        let handle = root.handle;
        let mut objects = BTreeMap::new();
        objects.insert(handle, root);
        Self {
            root: handle,
            objects,
        }
    }

    /// Handle of the root object.
    #[must_use]
    pub fn root(&self) -> ObjectHandle {
        self.root
    }

    /// Insert or replace an object. Returns the replaced one.
    pub fn insert(&mut self, object: DocumentObject) -> Option<DocumentObject> {
        self.objects.insert(object.handle, object)
    }

    /// Look up an object.
    #[must_use]
    pub fn get(&self, handle: ObjectHandle) -> Option<&DocumentObject> {
        self.objects.get(&handle)
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the document is empty. A document always has its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in handle order.
    pub fn objects(&self) -> impl Iterator<Item = &DocumentObject> {
        self.objects.values()
    }

    /// Open a read scope over the document.
    #[must_use]
    pub fn open_scope(&self) -> DocumentScope<'_> {
        DocumentScope {
            document: self,
            open: Cell::new(true),
        }
    }

    /// Replace one typed value of an object with the encoding of `text`.
    ///
    /// Nothing changes unless the text encodes for the record's group code.
    pub fn edit_typed_value(
        &mut self,
        handle: ObjectHandle,
        channel: TypedChannel,
        index: usize,
        text: &str,
        codec: &TypedValueCodec,
    ) -> Result<(), CadscopeError> {
        let object = self
            .objects
            .get_mut(&handle)
            .ok_or(CadscopeError::ObjectNotFound(handle))?;
        codec.apply_edit(object.channel_mut(channel), index, text)?;
        tracing::info!(%handle, ?channel, index, "typed value edited");
        Ok(())
    }

    /// A small drawing exercising every container kind.
    ///
    /// | Handle | Object |
    /// |--------|--------|
    /// | `1` | database |
    /// | `2` | block table (`*Model_Space`, `*Paper_Space`) |
    /// | `3` | layer table (`0`, `Walls`, `Doors`) |
    /// | `C` | named-object dictionary |
    /// | `E` | settings xrecord |
    /// | `10` | model space: lines `50`, `53`, circle `51`, polyline `52` |
    #[must_use]
    pub fn sample() -> Self {
        let h = ObjectHandle::new;
        let text = |s: &str| Value::Text(s.to_string());
        let point = |x, y, z| Value::Point(Point3d::new(x, y, z));
        let layer_ref = |handle: u64| Value::Object(ObjectRef::new(h(handle), "LayerTableRecord"));
        let created = NaiveDate::from_ymd_opt(2024, 3, 18)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .map(Value::Date)
            .unwrap_or_default();

        let mut doc = Document::new(
            DocumentObject::new(h(0x1), "Database", ObjectKind::Database)
                .member("Filename", "String", "Database", MemberShape::Scalar, text("sample.dwg"))
                .member(
                    "Insunits",
                    "UnitsValue",
                    "Database",
                    MemberShape::Scalar,
                    Value::Enum {
                        type_name: "UnitsValue".into(),
                        variant: "Millimeters".into(),
                    },
                )
                .member("Ltscale", "Double", "Database", MemberShape::Scalar, Value::Double(1.0))
                .member("Extmin", "Point3d", "Database", MemberShape::Geometric, point(0.0, -25.0, 0.0))
                .member("Extmax", "Point3d", "Database", MemberShape::Geometric, point(175.0, 50.0, 0.0))
                .member("Tdcreate", "DateTime", "Database", MemberShape::Scalar, created)
                .record("BlockTable", h(0x2))
                .record("LayerTable", h(0x3))
                .record("NamedObjects", h(0xC)),
        );

        doc.insert(
            DocumentObject::new(h(0x2), "BlockTable", ObjectKind::SymbolTable)
                .member("IsDependent", "Boolean", "SymbolTable", MemberShape::Scalar, Value::Bool(false))
                .record("*Model_Space", h(0x10))
                .record("*Paper_Space", h(0x11)),
        );
        doc.insert(
            DocumentObject::new(h(0x3), "LayerTable", ObjectKind::SymbolTable)
                .member("IsDependent", "Boolean", "SymbolTable", MemberShape::Scalar, Value::Bool(false))
                .record("0", h(0x30))
                .record("Walls", h(0x31))
                .record("Doors", h(0x32)),
        );

        for (handle, name, color, description) in [
            (0x30, "0", 7, ""),
            (0x31, "Walls", 1, "Load-bearing walls"),
            (0x32, "Doors", 3, "Door swings"),
        ] {
            let mut layer = DocumentObject::new(h(handle), "LayerTableRecord", ObjectKind::Record)
                .member("Name", "String", "SymbolTableRecord", MemberShape::Scalar, text(name))
                .member("Color", "Int16", "LayerTableRecord", MemberShape::Scalar, Value::Int16(color))
                .member("Description", "String", "LayerTableRecord", MemberShape::Scalar, text(description))
                .member("IsFrozen", "Boolean", "LayerTableRecord", MemberShape::Scalar, Value::Bool(false))
                .member("LineWeight", "Double", "LayerTableRecord", MemberShape::Spatial, Value::Double(0.25));
            layer = if name == "Doors" {
                layer.faulty("Transparency", "Transparency", "LayerTableRecord", "eNotApplicable")
            } else {
                layer.member("Transparency", "Transparency", "LayerTableRecord", MemberShape::Scalar, Value::Byte(0))
            };
            doc.insert(layer);
        }

        doc.insert(
            DocumentObject::new(h(0x10), "BlockTableRecord", ObjectKind::EntityContainer)
                .member("Name", "String", "SymbolTableRecord", MemberShape::Scalar, text("*Model_Space"))
                .member("Origin", "Point3d", "BlockTableRecord", MemberShape::Geometric, point(0.0, 0.0, 0.0))
                .member("IsLayout", "Boolean", "BlockTableRecord", MemberShape::Scalar, Value::Bool(true))
                .item(h(0x50))
                .item(h(0x51))
                .item(h(0x52))
                .item(h(0x53)),
        );
        doc.insert(
            DocumentObject::new(h(0x11), "BlockTableRecord", ObjectKind::EntityContainer)
                .member("Name", "String", "SymbolTableRecord", MemberShape::Scalar, text("*Paper_Space"))
                .member("Origin", "Point3d", "BlockTableRecord", MemberShape::Geometric, point(0.0, 0.0, 0.0))
                .member("IsLayout", "Boolean", "BlockTableRecord", MemberShape::Scalar, Value::Bool(true)),
        );

        doc.insert(line(h(0x50), "Walls", 0x31, point(100.0, 0.0, 0.0), 100.0));
        doc.insert(
            line(h(0x53), "Doors", 0x32, point(100.0, 50.0, 0.0), 111.803_398_9).with_xdata(vec![
                TypedValue::new(1001, text("CADSCOPE")),
                TypedValue::new(1000, text("door-frame")),
                TypedValue::new(1070, Value::Int16(2)),
                TypedValue::new(1040, Value::Double(0.75)),
                TypedValue::new(1010, point(100.0, 50.0, 0.0)),
            ]),
        );
        doc.insert(
            DocumentObject::new(h(0x51), "Circle", ObjectKind::Entity)
                .member("Layer", "String", "Entity", MemberShape::Scalar, text("Walls"))
                .member("LayerId", "ObjectId", "Entity", MemberShape::Complex, layer_ref(0x31))
                .member("Center", "Point3d", "Circle", MemberShape::Geometric, point(150.0, 25.0, 0.0))
                .member("Radius", "Double", "Circle", MemberShape::Spatial, Value::Double(25.0))
                .member("Area", "Double", "Curve", MemberShape::Spatial, Value::Double(1963.495_408_5))
                .member("Normal", "Vector3d", "Circle", MemberShape::Geometric, Value::Vector(Vector3d::new(0.0, 0.0, 1.0))),
        );
        doc.insert(
            DocumentObject::new(h(0x52), "Polyline", ObjectKind::Entity)
                .member("Layer", "String", "Entity", MemberShape::Scalar, text("0"))
                .member("LayerId", "ObjectId", "Entity", MemberShape::Complex, layer_ref(0x30))
                .member("Closed", "Boolean", "Polyline", MemberShape::Scalar, Value::Bool(false))
                .member("Elevation", "Double", "Polyline", MemberShape::Spatial, Value::Double(0.0))
                .sequence(
                    "Vertices",
                    "Point3d",
                    "Polyline",
                    vec![
                        point(0.0, 0.0, 0.0),
                        point(50.0, 0.0, 0.0),
                        point(50.0, -25.0, 0.0),
                    ],
                ),
        );

        doc.insert(
            DocumentObject::new(h(0xC), "DBDictionary", ObjectKind::Dictionary)
                .member("TreatElementsAsHard", "Boolean", "DBDictionary", MemberShape::Scalar, Value::Bool(false))
                .record("CADSCOPE", h(0xD))
                .record("ACAD_PROXY", h(0xF)),
        );
        doc.insert(
            DocumentObject::new(h(0xD), "DBDictionary", ObjectKind::Dictionary)
                .member("TreatElementsAsHard", "Boolean", "DBDictionary", MemberShape::Scalar, Value::Bool(false))
                .record("SETTINGS", h(0xE)),
        );
        doc.insert(
            DocumentObject::new(h(0xE), "Xrecord", ObjectKind::Xrecord)
                .member("MergeStyle", "DuplicateRecordCloning", "Xrecord", MemberShape::Scalar, Value::Enum {
                    type_name: "DuplicateRecordCloning".into(),
                    variant: "Ignore".into(),
                })
                .with_data(vec![
                    TypedValue::new(1, text("grid")),
                    TypedValue::new(70, Value::Int16(10)),
                    TypedValue::new(40, Value::Double(2.5)),
                    TypedValue::new(10, point(0.0, 0.0, 0.0)),
                    TypedValue::new(290, Value::Bool(true)),
                    TypedValue::new(330, Value::Handle(h(0x50))),
                ]),
        );
        doc.insert(DocumentObject::new(
            h(0xF),
            "ProxyObject",
            ObjectKind::Other("Proxy".to_string()),
        ));

        doc
    }
}

fn line(
    handle: ObjectHandle,
    layer: &str,
    layer_handle: u64,
    end: Value,
    length: f64,
) -> DocumentObject {
    DocumentObject::new(handle, "Line", ObjectKind::Entity)
        .member("Layer", "String", "Entity", MemberShape::Scalar, Value::Text(layer.to_string()))
        .member(
            "LayerId",
            "ObjectId",
            "Entity",
            MemberShape::Complex,
            Value::Object(ObjectRef::new(ObjectHandle(layer_handle), "LayerTableRecord")),
        )
        .member("StartPoint", "Point3d", "Line", MemberShape::Geometric, Value::Point(Point3d::default()))
        .member("EndPoint", "Point3d", "Line", MemberShape::Geometric, end)
        .member("Length", "Double", "Curve", MemberShape::Spatial, Value::Double(length))
        .member("Thickness", "Double", "Line", MemberShape::Spatial, Value::Double(0.0))
}

// =============================================================================
// SCOPE
// =============================================================================

/// Read scope over a [`Document`].
#[derive(Debug)]
pub struct DocumentScope<'d> {
    document: &'d Document,
    open: Cell<bool>,
}

impl DocumentScope<'_> {
    /// End the scope. Further reads fail.
    pub fn close(&self) {
        self.open.set(false);
    }

    fn object(&self, handle: ObjectHandle) -> Result<&DocumentObject, CadscopeError> {
        self.ensure_open()?;
        self.document
            .get(handle)
            .ok_or(CadscopeError::ObjectNotFound(handle))
    }
}

impl HostScope for DocumentScope<'_> {
    fn is_open(&self) -> bool {
        self.open.get()
    }

    fn root(&self) -> Result<ObjectHandle, CadscopeError> {
        self.ensure_open()?;
        Ok(self.document.root)
    }

    fn resolve(&self, handle: ObjectHandle) -> Result<&dyn HostObject, CadscopeError> {
        let object: &dyn HostObject = self.object(handle)?;
        Ok(object)
    }

    fn table_records(&self, table: ObjectHandle) -> Result<Vec<NamedRef>, CadscopeError> {
        Ok(self.object(table)?.records.clone())
    }

    fn dictionary_entries(&self, dictionary: ObjectHandle) -> Result<Vec<NamedRef>, CadscopeError> {
        let mut entries = self.object(dictionary)?.records.clone();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn container_items(&self, container: ObjectHandle) -> Result<Vec<ObjectHandle>, CadscopeError> {
        Ok(self.object(container)?.items.clone())
    }

    fn member_items(&self, owner: ObjectHandle, member: &str) -> Result<Vec<Value>, CadscopeError> {
        let object = self.object(owner)?;
        let not_readable = |message: &str| CadscopeError::MemberAccess {
            member: member.to_string(),
            message: message.to_string(),
        };

        match object.find_member(member).map(|m| &m.slot) {
            Some(MemberSlot::Items(items)) => Ok(items.clone()),
            Some(MemberSlot::Fault(message)) => Err(not_readable(message)),
            Some(MemberSlot::Value(_)) => Err(not_readable("member is not a sequence")),
            None => Err(not_readable("no such member")),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
