//! Sketch upload: image-signature check, encoding and registration

use crate::error::UploadError;
use crate::sketch::{OwnerId, Sketch, SketchId, SketchPayload};
use crate::store::SketchStore;
use std::sync::Arc;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8];
const BMP_SIGNATURE: &[u8] = b"BM";

/// Accepted image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG / JFIF
    Jpeg,
    /// Windows bitmap
    Bmp,
}

/// Identify the image format from its leading bytes
#[must_use]
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(PNG_SIGNATURE) {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(JPEG_SIGNATURE) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(BMP_SIGNATURE) {
        Some(ImageFormat::Bmp)
    } else {
        None
    }
}

impl SketchStore {
    /// Validate, encode and store an uploaded image under a fresh id
    ///
    /// Uses the configured upload TTL.
    ///
    /// # Errors
    /// - `UploadError::Empty` for zero-length input
    /// - `UploadError::NotAnImage` if no accepted signature matches
    pub async fn upload(&self, bytes: &[u8], owner: OwnerId) -> Result<Arc<Sketch>, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        let format = detect_image_format(bytes).ok_or(UploadError::NotAnImage)?;

        let id = SketchId::generate();
        let sketch = self
            .put(id, SketchPayload::from_bytes(bytes), owner, self.config().upload_ttl())
            .await;
        tracing::info!(
            sketch_id = %sketch.id(),
            owner = %owner,
            ?format,
            bytes = bytes.len(),
            "sketch uploaded"
        );
        Ok(sketch)
    }
}
