//! # Value Formatting
//!
//! Text rendering of host values. Every component that shows a value to an
//! operator goes through [`FormatOptions`], so precision is configured in one
//! place.

use crate::primitives::{
    DEFAULT_SCALAR_PRECISION, DEFAULT_SPATIAL_PRECISION, MAX_PRECISION, NULL_MARKER,
};
use crate::{CadscopeError, Point3d, Value, Vector3d};
use serde::{Deserialize, Serialize};

/// Precision settings for floating values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Decimals for points, vectors and spatial scalars.
    pub spatial_precision: usize,
    /// Decimals for every other floating value.
    pub scalar_precision: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            spatial_precision: DEFAULT_SPATIAL_PRECISION,
            scalar_precision: DEFAULT_SCALAR_PRECISION,
        }
    }
}

impl FormatOptions {
    /// Create options with explicit precisions.
    #[must_use]
    pub const fn new(spatial_precision: usize, scalar_precision: usize) -> Self {
        Self {
            spatial_precision,
            scalar_precision,
        }
    }

    /// Reject precisions beyond what an `f64` can carry.
    pub fn validate(&self) -> Result<(), CadscopeError> {
        if self.spatial_precision > MAX_PRECISION || self.scalar_precision > MAX_PRECISION {
            return Err(CadscopeError::ConfigError(format!(
                "precision must be at most {} decimals (spatial {}, scalar {})",
                MAX_PRECISION, self.spatial_precision, self.scalar_precision
            )));
        }
        Ok(())
    }

    /// Render a floating value. `spatial` selects the spatial precision.
    #[must_use]
    pub fn format_double(&self, value: f64, spatial: bool) -> String {
        let precision = if spatial {
            self.spatial_precision
        } else {
            self.scalar_precision
        };
        format!("{:.*}", precision, value)
    }

    /// Render a point as `(x, y, z)`.
    #[must_use]
    pub fn format_point(&self, point: &Point3d) -> String {
        self.format_triple(point.x, point.y, point.z)
    }

    /// Render a vector as `(x, y, z)`.
    #[must_use]
    pub fn format_vector(&self, vector: &Vector3d) -> String {
        self.format_triple(vector.x, vector.y, vector.z)
    }

    fn format_triple(&self, x: f64, y: f64, z: f64) -> String {
        let p = self.spatial_precision;
        format!("({:.*}, {:.*}, {:.*})", p, x, p, y, p, z)
    }

    /// Render any value.
    ///
    /// `spatial` only affects `Double` values; points and vectors always use
    /// the spatial precision.
    #[must_use]
    pub fn format_value(&self, value: &Value, spatial: bool) -> String {
        match value {
            Value::Null => NULL_MARKER.to_string(),
            Value::Bool(b) => format_bool(*b).to_string(),
            Value::Byte(v) => v.to_string(),
            Value::Int16(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Double(v) => self.format_double(*v, spatial),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Enum { variant, .. } => variant.clone(),
            Value::Point(p) => self.format_point(p),
            Value::Vector(v) => self.format_vector(v),
            Value::Handle(h) => h.to_string(),
            Value::Binary(bytes) => format_hex(bytes),
            Value::Object(r) => format!("<{} {}>", r.class_name, r.handle),
            Value::Sequence(info) => match info.count {
                Some(count) => format!("[{} x {}]", count, info.element_type),
                None => format!("[{}]", info.element_type),
            },
        }
    }
}

/// Render a boolean the way the host displays it.
#[must_use]
pub fn format_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Render bytes as contiguous uppercase hex.
#[must_use]
pub fn format_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{:02X}", byte));
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectHandle, ObjectRef, SequenceInfo};

    #[test]
    fn null_renders_marker() {
        let options = FormatOptions::default();
        assert_eq!(options.format_value(&Value::Null, false), "[null]");
        assert_eq!(options.format_value(&Value::Null, true), "[null]");
    }

    #[test]
    fn doubles_use_configured_precision() {
        let options = FormatOptions::default();
        assert_eq!(options.format_value(&Value::Double(2.5), false), "2.500000");
        assert_eq!(options.format_value(&Value::Double(2.5), true), "2.5000");

        let coarse = FormatOptions::new(1, 2);
        assert_eq!(coarse.format_value(&Value::Double(2.5), false), "2.50");
        assert_eq!(coarse.format_value(&Value::Double(2.5), true), "2.5");
    }

    #[test]
    fn points_use_spatial_precision() {
        let options = FormatOptions::default();
        let point = Value::Point(Point3d::new(100.0, 200.0, 0.0));
        assert_eq!(
            options.format_value(&point, false),
            "(100.0000, 200.0000, 0.0000)"
        );
    }

    #[test]
    fn references_and_sequences() {
        let options = FormatOptions::default();
        let obj = Value::Object(ObjectRef::new(ObjectHandle(0x2A), "LayerTableRecord"));
        assert_eq!(options.format_value(&obj, false), "<LayerTableRecord 2A>");

        let seq = Value::Sequence(SequenceInfo {
            element_type: "Point3d".into(),
            count: Some(3),
        });
        assert_eq!(options.format_value(&seq, false), "[3 x Point3d]");
    }

    #[test]
    fn binary_renders_hex() {
        assert_eq!(format_hex(&[0x00, 0xAB, 0x10]), "00AB10");
    }

    #[test]
    fn validate_rejects_excessive_precision() {
        assert!(FormatOptions::new(4, 6).validate().is_ok());
        assert!(FormatOptions::new(40, 6).validate().is_err());
    }
}
