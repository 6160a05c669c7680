//! Error types for sketch uploads

/// Errors while accepting an uploaded sketch
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Upload carried no bytes
    #[error("no sketch file uploaded")]
    Empty,

    /// Header does not match any accepted image format
    #[error("uploaded file is not an image")]
    NotAnImage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_error_display() {
        assert_eq!(UploadError::Empty.to_string(), "no sketch file uploaded");
        assert_eq!(
            UploadError::NotAnImage.to_string(),
            "uploaded file is not an image"
        );
    }
}
