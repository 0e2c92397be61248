//! # Snapshot Format
//!
//! Binary snapshot of a [`Document`].
//!
//! Format: header (5 bytes) + postcard-serialized document.
//! - 4 bytes: magic (`CSCP`)
//! - 1 byte: version
//!
//! ## Validation
//!
//! Size and header are checked before the payload is decoded, so a
//! truncated or oversized file is rejected without allocating for it.

use crate::document::Document;
use crate::primitives::{FORMAT_VERSION, MAGIC_BYTES, MAX_SNAPSHOT_SIZE};
use crate::CadscopeError;

/// Header length in bytes.
const HEADER_SIZE: usize = 5;

// =============================================================================
// HEADER
// =============================================================================

/// The header that precedes every snapshot payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Header for the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), CadscopeError> {
        if &self.magic != MAGIC_BYTES {
            return Err(CadscopeError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(CadscopeError::DeserializationError(format!(
                "Unsupported snapshot version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let [a, b, c, d] = self.magic;
        [a, b, c, d, self.version]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CadscopeError> {
        match bytes {
            [a, b, c, d, version, ..] => Ok(Self {
                magic: [*a, *b, *c, *d],
                version: *version,
            }),
            _ => Err(CadscopeError::DeserializationError(
                "Header too short".to_string(),
            )),
        }
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Check if `bytes` start with the snapshot magic.
#[must_use]
pub fn is_snapshot(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC_BYTES)
}

/// Serialize a document (header + payload).
pub fn document_to_bytes(document: &Document) -> Result<Vec<u8>, CadscopeError> {
    let payload = postcard::to_stdvec(document)
        .map_err(|e| CadscopeError::SerializationError(e.to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&SnapshotHeader::new().to_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Deserialize a document.
///
/// Rejects input that is shorter than the header, larger than
/// [`MAX_SNAPSHOT_SIZE`], or carries a foreign header, before decoding.
pub fn document_from_bytes(bytes: &[u8]) -> Result<Document, CadscopeError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(CadscopeError::DeserializationError(format!(
            "Snapshot size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }

    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = bytes.get(HEADER_SIZE..).unwrap_or_default();
    let document: Document = postcard::from_bytes(payload).map_err(|e| {
        CadscopeError::DeserializationError(format!("Failed to decode snapshot: {}", e))
    })?;

    tracing::debug!(objects = document.len(), "snapshot decoded");
    Ok(document)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let bytes = SnapshotHeader::new().to_bytes();
        let restored = SnapshotHeader::from_bytes(&bytes).expect("parse header");
        assert_eq!(restored, SnapshotHeader::new());
    }

    #[test]
    fn sample_snapshot_is_stable() {
        let document = Document::sample();
        let first = document_to_bytes(&document).expect("serialize");
        let restored = document_from_bytes(&first).expect("deserialize");
        let second = document_to_bytes(&restored).expect("reserialize");

        assert_eq!(restored, document);
        assert_eq!(first, second, "save -> load -> save must be bit-exact");
        assert!(is_snapshot(&first));
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = vec![0u8; 10];
        bytes[0..4].copy_from_slice(b"XXXX");
        assert!(document_from_bytes(&bytes).is_err());
    }

    #[test]
    fn wrong_version_rejected() {
        let mut bytes = document_to_bytes(&Document::sample()).expect("serialize");
        bytes[4] = FORMAT_VERSION + 1;
        let err = document_from_bytes(&bytes).expect_err("version");
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn truncated_input_rejected() {
        assert!(document_from_bytes(b"CSC").is_err());
        let bytes = document_to_bytes(&Document::sample()).expect("serialize");
        assert!(document_from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }
}
