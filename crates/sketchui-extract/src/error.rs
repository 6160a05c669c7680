//! Error types for extraction

/// A draft with a missing or blank field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    /// Named field is absent or blank
    #[error("draft is missing a non-empty `{0}`")]
    MissingField(&'static str),
}

/// Model output that could not be decoded
///
/// Every variant keeps the cleaned text for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// Cleaned text is not valid JSON
    #[error("model output is not valid JSON: {source}")]
    InvalidJson {
        /// Parser error
        #[source]
        source: serde_json::Error,
        /// Text after cleaning
        cleaned: String,
    },

    /// Valid JSON, but not an object
    #[error("model output is not a JSON object")]
    NotAnObject {
        /// Text after cleaning
        cleaned: String,
    },

    /// Recognized keys hold values of the wrong type
    #[error("model output has malformed fields: {source}")]
    Malformed {
        /// Field decode error
        #[source]
        source: serde_json::Error,
        /// Text after cleaning
        cleaned: String,
    },
}

impl ExtractionError {
    /// Cleaned text the decode stage saw
    #[must_use]
    pub fn cleaned_text(&self) -> &str {
        match self {
            Self::InvalidJson { cleaned, .. }
            | Self::NotAnObject { cleaned }
            | Self::Malformed { cleaned, .. } => cleaned,
        }
    }
}
