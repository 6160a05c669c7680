//! Sketch record and its identifiers

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Authenticated identity that owns sketches and components
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub i64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque sketch identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SketchId(String);

impl SketchId {
    /// Mint a fresh random identifier (UUID v4)
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SketchId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SketchId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for SketchId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SketchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base64 (standard alphabet) image payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SketchPayload(String);

impl SketchPayload {
    /// Encode raw image bytes
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// Wrap text that is already base64
    #[inline]
    #[must_use]
    pub fn from_base64(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Base64 text
    #[inline]
    #[must_use]
    pub fn as_base64(&self) -> &str {
        &self.0
    }

    /// True when no image data is present
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// `data:` URI suitable for an image reference in a chat message
    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.0)
    }
}

/// Uploaded sketch
///
/// Built by the store on insertion and never mutated afterwards; a re-upload
/// produces a new id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sketch {
    id: SketchId,
    payload: SketchPayload,
    owner: OwnerId,
    expires_at: Option<DateTime<Utc>>,
}

impl Sketch {
    pub(crate) fn new(
        id: SketchId,
        payload: SketchPayload,
        owner: OwnerId,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            payload,
            owner,
            expires_at,
        }
    }

    /// Sketch identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &SketchId {
        &self.id
    }

    /// Image payload
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &SketchPayload {
        &self.payload
    }

    /// Uploading owner
    #[inline]
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Wall-clock expiry, `None` when the entry never expires
    #[inline]
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_encodes_standard_base64() {
        let payload = SketchPayload::from_bytes(b"hello");
        assert_eq!(payload.as_base64(), "aGVsbG8=");
        assert_eq!(payload.data_uri(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn empty_payload_detected() {
        assert!(SketchPayload::from_base64("").is_empty());
        assert!(SketchPayload::from_base64("  ").is_empty());
        assert!(!SketchPayload::from_bytes(&[0x89]).is_empty());
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = SketchId::generate();
        let b = SketchId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn sketch_id_display_matches_source() {
        let id = SketchId::from("abc-123");
        assert_eq!(id.to_string(), "abc-123");
        assert_eq!(OwnerId(42).to_string(), "42");
    }
}
