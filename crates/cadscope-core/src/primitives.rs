//! # Inspection Primitives
//!
//! Fixed constants shared by the extractors, the typed-value codec, the
//! navigator and the snapshot format.
//!
//! These values are compiled into the binary. Anything an operator may want
//! to tune (precision, child limits) lives in [`crate::config`] instead and
//! only defaults to the values below.

/// Marker rendered for a null host value.
///
/// Null is never rendered as an empty string, so an empty text value and a
/// missing value stay distinguishable in listings and diffs.
pub const NULL_MARKER: &str = "[null]";

/// Default number of decimals for spatial quantities (points, vectors,
/// lengths measured in drawing units).
pub const DEFAULT_SPATIAL_PRECISION: usize = 4;

/// Default number of decimals for every other floating value.
pub const DEFAULT_SCALAR_PRECISION: usize = 6;

/// Upper bound accepted for either precision setting.
///
/// An `f64` carries roughly 15-17 significant digits; anything beyond this
/// only prints noise.
pub const MAX_PRECISION: usize = 15;

/// Label of the synthetic child shown under a node that has not been
/// expanded yet.
pub const PLACEHOLDER_LABEL: &str = "...";

/// Maximum depth accepted by [`crate::navigator::ObjectTree::expand_to_depth`].
///
/// Navigation is lazy; bulk expansion is the only way to walk deep, so it is
/// bounded.
pub const MAX_EXPAND_DEPTH: usize = 64;

// =============================================================================
// SNAPSHOT FORMAT
// =============================================================================

/// Magic bytes for the cadscope binary snapshot header.
pub const MAGIC_BYTES: &[u8; 4] = b"CSCP";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the snapshot layout.
pub const FORMAT_VERSION: u8 = 1;

/// Maximum accepted snapshot size (256 MB).
///
/// Checked before any payload decoding is attempted.
pub const MAX_SNAPSHOT_SIZE: usize = 256 * 1024 * 1024;
