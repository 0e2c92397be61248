//! # Typed-Value Codec
//!
//! Decoder and encoder for the host's tagged-value encoding, the
//! `(group code, value)` records applications use to store opaque data
//! (xrecord payloads, extended entity data).
//!
//! ## Code Ranges
//!
//! The code space is split into contiguous, non-overlapping ranges
//! ([`CODE_RANGES`]). Each range maps to exactly one [`TypedValueKind`]. The
//! 1000-1071 block mirrors the primary kinds for extended data.
//!
//! ## Decoding
//!
//! Decoding is a range lookup plus a per-kind formatter. The only state
//! carried between records is the positional index, which is what edits are
//! addressed by. A record that cannot be rendered becomes an error entry; the
//! remaining records still decode.
//!
//! ## Encoding
//!
//! [`TypedValueCodec::encode`] parses operator text into the value a code
//! requires and validates it completely before returning.
//! [`TypedValueCodec::apply_edit`] only writes after a successful encode.

use crate::format::{FormatOptions, format_bool, format_hex};
use crate::primitives::NULL_MARKER;
use crate::{CadscopeError, ObjectHandle, Point3d, Value};
use serde::{Deserialize, Serialize};

// =============================================================================
// TYPED VALUE
// =============================================================================

/// One `(code, value)` record of a typed-value list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    /// Group code.
    pub code: i16,
    /// Opaque value.
    pub value: Value,
}

impl TypedValue {
    /// Create a new typed value.
    #[must_use]
    pub fn new(code: i16, value: Value) -> Self {
        Self { code, value }
    }
}

// =============================================================================
// KINDS AND RANGES
// =============================================================================

/// Semantic type of a group code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypedValueKind {
    Text,
    Handle,
    Point3d,
    Double,
    Int16,
    Int32,
    Int64,
    Int8,
    Boolean,
    BinaryChunk,
    ExtendedText,
    ExtendedHandle,
    ExtendedPoint3d,
    ExtendedDouble,
    ExtendedInt16,
    ExtendedInt32,
    ExtendedBinaryChunk,
    /// The code belongs to no known range; carries the value's runtime type.
    Unmapped(&'static str),
}

impl TypedValueKind {
    /// Display name of the kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TypedValueKind::Text => "String",
            TypedValueKind::Handle => "Handle",
            TypedValueKind::Point3d => "Point3d",
            TypedValueKind::Double => "Double",
            TypedValueKind::Int16 => "Int16",
            TypedValueKind::Int32 => "Int32",
            TypedValueKind::Int64 => "Int64",
            TypedValueKind::Int8 => "Int8",
            TypedValueKind::Boolean => "Boolean",
            TypedValueKind::BinaryChunk => "BinaryChunk",
            TypedValueKind::ExtendedText => "ExtendedString",
            TypedValueKind::ExtendedHandle => "ExtendedHandle",
            TypedValueKind::ExtendedPoint3d => "ExtendedPoint3d",
            TypedValueKind::ExtendedDouble => "ExtendedDouble",
            TypedValueKind::ExtendedInt16 => "ExtendedInt16",
            TypedValueKind::ExtendedInt32 => "ExtendedInt32",
            TypedValueKind::ExtendedBinaryChunk => "ExtendedBinaryChunk",
            TypedValueKind::Unmapped(runtime) => runtime,
        }
    }

    /// The primary kind this kind mirrors. Primary kinds map to themselves.
    #[must_use]
    pub fn base(self) -> Self {
        match self {
            TypedValueKind::ExtendedText => TypedValueKind::Text,
            TypedValueKind::ExtendedHandle => TypedValueKind::Handle,
            TypedValueKind::ExtendedPoint3d => TypedValueKind::Point3d,
            TypedValueKind::ExtendedDouble => TypedValueKind::Double,
            TypedValueKind::ExtendedInt16 => TypedValueKind::Int16,
            TypedValueKind::ExtendedInt32 => TypedValueKind::Int32,
            TypedValueKind::ExtendedBinaryChunk => TypedValueKind::BinaryChunk,
            other => other,
        }
    }

    /// Check if the kind belongs to the extended-data channel.
    #[must_use]
    pub fn is_extended(self) -> bool {
        self.base() != self
    }
}

/// An inclusive range of group codes mapped to one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRange {
    pub start: i16,
    pub end: i16,
    pub kind: TypedValueKind,
}

const fn range(start: i16, end: i16, kind: TypedValueKind) -> CodeRange {
    CodeRange { start, end, kind }
}

/// Group code ranges, sorted by `start`, non-overlapping.
pub const CODE_RANGES: &[CodeRange] = &[
    range(-5, -5, TypedValueKind::Handle),
    range(-4, -4, TypedValueKind::Text),
    range(-2, -1, TypedValueKind::Handle),
    range(0, 4, TypedValueKind::Text),
    range(5, 5, TypedValueKind::Handle),
    range(6, 9, TypedValueKind::Text),
    range(10, 19, TypedValueKind::Point3d),
    range(20, 59, TypedValueKind::Double),
    range(60, 79, TypedValueKind::Int16),
    range(90, 99, TypedValueKind::Int32),
    range(100, 104, TypedValueKind::Text),
    range(105, 105, TypedValueKind::Handle),
    range(110, 119, TypedValueKind::Point3d),
    range(120, 149, TypedValueKind::Double),
    range(160, 169, TypedValueKind::Int64),
    range(170, 179, TypedValueKind::Int16),
    range(210, 219, TypedValueKind::Point3d),
    range(220, 239, TypedValueKind::Double),
    range(270, 279, TypedValueKind::Int16),
    range(280, 289, TypedValueKind::Int8),
    range(290, 299, TypedValueKind::Boolean),
    range(300, 309, TypedValueKind::Text),
    range(310, 319, TypedValueKind::BinaryChunk),
    range(320, 369, TypedValueKind::Handle),
    range(370, 389, TypedValueKind::Int16),
    range(390, 399, TypedValueKind::Handle),
    range(400, 409, TypedValueKind::Int16),
    range(410, 419, TypedValueKind::Text),
    range(420, 429, TypedValueKind::Int32),
    range(430, 439, TypedValueKind::Text),
    range(440, 459, TypedValueKind::Int32),
    range(460, 469, TypedValueKind::Double),
    range(470, 479, TypedValueKind::Text),
    range(480, 481, TypedValueKind::Handle),
    range(999, 999, TypedValueKind::Text),
    range(1000, 1003, TypedValueKind::ExtendedText),
    range(1004, 1004, TypedValueKind::ExtendedBinaryChunk),
    range(1005, 1005, TypedValueKind::ExtendedHandle),
    range(1006, 1009, TypedValueKind::ExtendedText),
    range(1010, 1019, TypedValueKind::ExtendedPoint3d),
    range(1020, 1059, TypedValueKind::ExtendedDouble),
    range(1060, 1070, TypedValueKind::ExtendedInt16),
    range(1071, 1071, TypedValueKind::ExtendedInt32),
];

/// Look up the kind of a group code.
#[must_use]
pub fn kind_for_code(code: i16) -> Option<TypedValueKind> {
    CODE_RANGES
        .binary_search_by(|r| {
            if r.end < code {
                std::cmp::Ordering::Less
            } else if r.start > code {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .ok()
        .map(|i| CODE_RANGES[i].kind)
}

// =============================================================================
// DECODED ENTRY
// =============================================================================

/// One decoded record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedValueEntry {
    /// Position in the source list (0..N-1).
    pub index: usize,
    /// Group code.
    pub code: i16,
    /// Decoded kind.
    pub kind: TypedValueKind,
    /// Rendered value, or a short error marker.
    pub formatted_value: String,
    /// Why the value could not be rendered.
    pub error: Option<String>,
}

impl TypedValueEntry {
    /// Check if the record failed to render.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Text that [`TypedValueCodec::encode`] accepts for this record.
    ///
    /// Identical to the formatted value except for booleans, which display
    /// as `True`/`False` but are edited as `0`/`1`.
    #[must_use]
    pub fn edit_text(&self) -> String {
        if self.kind == TypedValueKind::Boolean && !self.has_error() {
            match self.formatted_value.as_str() {
                "True" => return "1".to_string(),
                "False" => return "0".to_string(),
                _ => {}
            }
        }
        self.formatted_value.clone()
    }
}

// =============================================================================
// CODEC
// =============================================================================

/// Typed-value decoder/encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedValueCodec {
    options: FormatOptions,
}

impl TypedValueCodec {
    /// Create a codec with the given formatting options.
    #[must_use]
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Decode an ordered list of records.
    #[must_use]
    pub fn decode(&self, values: &[TypedValue]) -> Vec<TypedValueEntry> {
        values
            .iter()
            .enumerate()
            .map(|(index, tv)| self.decode_one(index, tv))
            .collect()
    }

    /// Decode a single record at a known position.
    #[must_use]
    pub fn decode_one(&self, index: usize, tv: &TypedValue) -> TypedValueEntry {
        let kind = kind_for_code(tv.code).unwrap_or(TypedValueKind::Unmapped(tv.value.type_name()));

        let rendered = if tv.value.is_null() {
            Ok(NULL_MARKER.to_string())
        } else {
            self.render(kind, &tv.value)
        };

        match rendered {
            Ok(formatted_value) => TypedValueEntry {
                index,
                code: tv.code,
                kind,
                formatted_value,
                error: None,
            },
            Err(message) => {
                tracing::warn!(index, code = tv.code, "typed value not renderable: {}", message);
                TypedValueEntry {
                    index,
                    code: tv.code,
                    kind,
                    formatted_value: format!("[error: {}]", message),
                    error: Some(message),
                }
            }
        }
    }

    fn render(&self, kind: TypedValueKind, value: &Value) -> Result<String, String> {
        let mismatch = || format!("expected {}, found {}", kind.base().name(), value.type_name());

        match kind.base() {
            TypedValueKind::Text => match value {
                Value::Text(s) => Ok(s.clone()),
                _ => Err(mismatch()),
            },
            TypedValueKind::Handle => value
                .referenced_handle()
                .map(|h| h.to_string())
                .ok_or_else(mismatch),
            TypedValueKind::Point3d => match value {
                Value::Point(p) => Ok(self.options.format_point(p)),
                Value::Vector(v) => Ok(self.options.format_vector(v)),
                _ => Err(mismatch()),
            },
            TypedValueKind::Double => match value {
                Value::Double(d) => Ok(self.options.format_double(*d, false)),
                other => other
                    .as_integer()
                    .map(|i| self.options.format_double(i as f64, false))
                    .ok_or_else(mismatch),
            },
            TypedValueKind::Int16
            | TypedValueKind::Int32
            | TypedValueKind::Int64
            | TypedValueKind::Int8 => value
                .as_integer()
                .map(|i| i.to_string())
                .ok_or_else(mismatch),
            TypedValueKind::Boolean => match value {
                Value::Bool(b) => Ok(format_bool(*b).to_string()),
                other => other
                    .as_integer()
                    .map(|i| format_bool(i != 0).to_string())
                    .ok_or_else(mismatch),
            },
            TypedValueKind::BinaryChunk => match value {
                Value::Binary(bytes) => Ok(format_hex(bytes)),
                _ => Err(mismatch()),
            },
            TypedValueKind::Unmapped(_) => Ok(self.options.format_value(value, false)),
            // base() never returns an extended kind
            _ => Err(mismatch()),
        }
    }

    /// Parse operator text into the value `code` requires.
    ///
    /// Nothing is returned unless the whole text validates.
    pub fn encode(&self, code: i16, text: &str) -> Result<Value, CadscopeError> {
        let invalid = |message: String| CadscopeError::EncodeValidation { code, message };

        let kind = kind_for_code(code)
            .ok_or_else(|| invalid("group code has no editable type".to_string()))?;
        let trimmed = text.trim();

        match kind.base() {
            TypedValueKind::Text => Ok(Value::Text(text.to_string())),
            TypedValueKind::Handle => ObjectHandle::parse(trimmed)
                .map(Value::Handle)
                .map_err(|_| invalid(format!("{:?} is not a hexadecimal handle", text))),
            TypedValueKind::Point3d => parse_point(trimmed).map(Value::Point).map_err(invalid),
            TypedValueKind::Double => parse_double(trimmed).map(Value::Double).map_err(invalid),
            TypedValueKind::Int16 => trimmed
                .parse::<i16>()
                .map(Value::Int16)
                .map_err(|_| invalid(format!("{:?} is not a 16-bit integer", text))),
            TypedValueKind::Int32 => trimmed
                .parse::<i32>()
                .map(Value::Int32)
                .map_err(|_| invalid(format!("{:?} is not a 32-bit integer", text))),
            TypedValueKind::Int64 => trimmed
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|_| invalid(format!("{:?} is not a 64-bit integer", text))),
            TypedValueKind::Int8 => trimmed
                .parse::<u8>()
                .map(Value::Byte)
                .map_err(|_| invalid(format!("{:?} is not an 8-bit integer", text))),
            TypedValueKind::Boolean => match trimmed {
                "0" => Ok(Value::Bool(false)),
                "1" => Ok(Value::Bool(true)),
                _ => Err(invalid(format!("{:?} is not 0 or 1", text))),
            },
            TypedValueKind::BinaryChunk => parse_hex(trimmed).map(Value::Binary).map_err(invalid),
            _ => Err(invalid("group code has no editable type".to_string())),
        }
    }

    /// Replace the value at `index` with the encoding of `text`.
    ///
    /// The list is left untouched if the index is out of range or the text
    /// does not encode.
    pub fn apply_edit(
        &self,
        values: &mut [TypedValue],
        index: usize,
        text: &str,
    ) -> Result<(), CadscopeError> {
        let len = values.len();
        let code = values
            .get(index)
            .map(|tv| tv.code)
            .ok_or(CadscopeError::IndexOutOfRange { index, len })?;

        let value = self.encode(code, text)?;

        if let Some(slot) = values.get_mut(index) {
            slot.value = value;
        }
        Ok(())
    }
}

// =============================================================================
// LITERAL PARSERS
// =============================================================================

fn parse_double(text: &str) -> Result<f64, String> {
    let value: f64 = text
        .parse()
        .map_err(|_| format!("{:?} is not a number", text))?;
    if !value.is_finite() {
        return Err(format!("{:?} is not a finite number", text));
    }
    Ok(value)
}

/// Parse `x,y,z`, optionally wrapped in parentheses.
fn parse_point(text: &str) -> Result<Point3d, String> {
    let inner = text
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(text);

    let parts: Vec<&str> = inner.split(',').collect();
    if parts.len() != 3 {
        return Err(format!(
            "{:?} is not a 3-component point (expected x,y,z)",
            text
        ));
    }

    let x = parse_double(parts[0].trim())?;
    let y = parse_double(parts[1].trim())?;
    let z = parse_double(parts[2].trim())?;
    Ok(Point3d::new(x, y, z))
}

fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    if text.len() % 2 != 0 {
        return Err(format!("{:?} has an odd number of hex digits", text));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("{:?} is not hexadecimal", text))
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector3d;

    fn codec() -> TypedValueCodec {
        TypedValueCodec::default()
    }

    #[test]
    fn ranges_sorted_and_disjoint() {
        for pair in CODE_RANGES.windows(2) {
            assert!(pair[0].start <= pair[0].end);
            assert!(
                pair[0].end < pair[1].start,
                "{:?} overlaps {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn every_range_boundary_resolves() {
        for r in CODE_RANGES {
            assert_eq!(kind_for_code(r.start), Some(r.kind));
            assert_eq!(kind_for_code(r.end), Some(r.kind));
        }
        assert_eq!(kind_for_code(80), None);
        assert_eq!(kind_for_code(2000), None);
    }

    #[test]
    fn decode_text() {
        let entry = codec().decode_one(0, &TypedValue::new(1, Value::Text("Hello".into())));
        assert_eq!(entry.kind, TypedValueKind::Text);
        assert_eq!(entry.kind.name(), "String");
        assert_eq!(entry.formatted_value, "Hello");
        assert!(!entry.has_error());
    }

    #[test]
    fn decode_point() {
        let tv = TypedValue::new(10, Value::Point(Point3d::new(100.0, 200.0, 0.0)));
        let entry = codec().decode_one(0, &tv);
        assert_eq!(entry.kind, TypedValueKind::Point3d);
        assert_eq!(entry.formatted_value, "(100.0000, 200.0000, 0.0000)");
    }

    #[test]
    fn decode_boolean_from_integer() {
        let entry = codec().decode_one(0, &TypedValue::new(290, Value::Int16(1)));
        assert_eq!(entry.kind, TypedValueKind::Boolean);
        assert_eq!(entry.formatted_value, "True");
        assert_eq!(entry.edit_text(), "1");
    }

    #[test]
    fn decode_extended_kinds() {
        let values = vec![
            TypedValue::new(1001, Value::Text("CADSCOPE".into())),
            TypedValue::new(1010, Value::Vector(Vector3d::new(1.0, 0.0, 0.0))),
            TypedValue::new(1040, Value::Double(0.5)),
            TypedValue::new(1070, Value::Int16(3)),
            TypedValue::new(1071, Value::Int32(70000)),
        ];
        let entries = codec().decode(&values);
        assert_eq!(entries[0].kind, TypedValueKind::ExtendedText);
        assert_eq!(entries[1].formatted_value, "(1.0000, 0.0000, 0.0000)");
        assert_eq!(entries[2].formatted_value, "0.500000");
        assert_eq!(entries[3].formatted_value, "3");
        assert_eq!(entries[4].kind.base(), TypedValueKind::Int32);
        assert!(entries.iter().all(|e| e.kind.is_extended()));
    }

    #[test]
    fn null_renders_marker_regardless_of_code() {
        for code in [1, 10, 40, 70, 290, 5000] {
            let entry = codec().decode_one(0, &TypedValue::new(code, Value::Null));
            assert_eq!(entry.formatted_value, "[null]");
            assert!(!entry.has_error());
        }
    }

    #[test]
    fn unmapped_code_reports_runtime_type() {
        let entry = codec().decode_one(0, &TypedValue::new(2000, Value::Int32(5)));
        assert_eq!(entry.kind, TypedValueKind::Unmapped("Int32"));
        assert_eq!(entry.kind.name(), "Int32");
        assert_eq!(entry.formatted_value, "5");
    }

    #[test]
    fn format_failure_is_isolated() {
        let values = vec![
            TypedValue::new(1, Value::Text("a".into())),
            TypedValue::new(10, Value::Text("not a point".into())),
            TypedValue::new(70, Value::Int16(4)),
        ];
        let entries = codec().decode(&values);
        assert_eq!(entries.len(), 3);
        assert!(!entries[0].has_error());
        assert!(entries[1].has_error());
        assert_eq!(entries[1].index, 1);
        assert_eq!(entries[2].formatted_value, "4");
    }

    #[test]
    fn encode_integer() {
        assert_eq!(codec().encode(70, "42").expect("encode"), Value::Int16(42));
        assert_eq!(codec().encode(90, "-7").expect("encode"), Value::Int32(-7));
        assert_eq!(codec().encode(280, "255").expect("encode"), Value::Byte(255));
    }

    #[test]
    fn encode_rejects_bad_integer() {
        let err = codec().encode(70, "abc").expect_err("must fail");
        assert!(matches!(err, CadscopeError::EncodeValidation { code: 70, .. }));
        assert!(codec().encode(70, "70000").is_err());
    }

    #[test]
    fn encode_boolean_is_strict() {
        assert_eq!(codec().encode(290, "1").expect("encode"), Value::Bool(true));
        assert_eq!(codec().encode(290, "0").expect("encode"), Value::Bool(false));
        assert!(codec().encode(290, "true").is_err());
        assert!(codec().encode(290, "2").is_err());
    }

    #[test]
    fn encode_point_accepts_parentheses() {
        let expected = Value::Point(Point3d::new(1.5, -2.0, 3.0));
        assert_eq!(codec().encode(10, "1.5,-2,3").expect("encode"), expected);
        assert_eq!(
            codec().encode(10, "(1.5000, -2.0000, 3.0000)").expect("encode"),
            expected
        );
        assert!(codec().encode(10, "1,2").is_err());
        assert!(codec().encode(10, "1,2,z").is_err());
    }

    #[test]
    fn encode_text_handle_and_binary() {
        assert_eq!(
            codec().encode(1000, " spaced ").expect("encode"),
            Value::Text(" spaced ".into())
        );
        assert_eq!(
            codec().encode(330, "1F").expect("encode"),
            Value::Handle(ObjectHandle(0x1F))
        );
        assert_eq!(
            codec().encode(310, "00ff").expect("encode"),
            Value::Binary(vec![0x00, 0xFF])
        );
        assert!(codec().encode(310, "abc").is_err());
    }

    #[test]
    fn encode_rejects_unmapped_code() {
        assert!(codec().encode(2000, "1").is_err());
    }

    #[test]
    fn apply_edit_replaces_by_index() {
        let mut values = vec![
            TypedValue::new(1, Value::Text("a".into())),
            TypedValue::new(70, Value::Int16(1)),
        ];
        codec().apply_edit(&mut values, 1, "9").expect("edit");
        assert_eq!(values[1].value, Value::Int16(9));
        assert_eq!(values[0].value, Value::Text("a".into()));
    }

    #[test]
    fn failed_edit_changes_nothing() {
        let mut values = vec![TypedValue::new(70, Value::Int16(1))];
        let before = values.clone();

        assert!(codec().apply_edit(&mut values, 0, "abc").is_err());
        assert_eq!(values, before);

        let err = codec()
            .apply_edit(&mut values, 3, "1")
            .expect_err("out of range");
        assert!(matches!(err, CadscopeError::IndexOutOfRange { index: 3, len: 1 }));
        assert_eq!(values, before);
    }
}
