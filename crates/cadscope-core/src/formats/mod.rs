//! # Formats
//!
//! Byte-level encodings of inspectable documents. File I/O stays in the
//! app layer.

pub mod snapshot;

pub use snapshot::{SnapshotHeader, document_from_bytes, document_to_bytes, is_snapshot};
