//! Shape decode (stage 6)
//!
//! Maps a [`CleanedText`] onto one of the two result shapes. Generation
//! responses look like:
//!
//! ```json
//! {"components": [{"title": "...", "type": "...", "code": "..."}]}
//! {"failure response": "why the sketch could not be used"}
//! ```
//!
//! Refinement responses carry a single `component` and a
//! `failure_response`. Both spellings of the failure key are accepted for
//! either kind. Any other object is a failure with a generic reason; only
//! text that is not an object, or has mistyped fields, is an error.

use crate::draft::{ComponentDraft, DraftBatch, GenerationOutcome, RefinementOutcome};
use crate::error::ExtractionError;
use crate::stages::CleanedText;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Reason reported when the model yields no usable component
pub const GENERIC_FAILURE_REASON: &str = "Failed to generate UI components from the provided sketch";

/// Reason reported when a refinement yields no usable component
pub const GENERIC_REFINE_FAILURE_REASON: &str = "Failed to update the component with the provided instructions";

#[derive(Debug, Deserialize)]
struct RawDraft {
    title: Option<String>,
    #[serde(rename = "type", alias = "kind")]
    kind: Option<String>,
    code: Option<String>,
}

impl RawDraft {
    fn into_draft(self, index: usize) -> Option<ComponentDraft> {
        let draft = ComponentDraft::new(
            self.title.unwrap_or_default(),
            self.kind.unwrap_or_default(),
            self.code.unwrap_or_default(),
        );
        match draft {
            Ok(draft) => Some(draft),
            Err(err) => {
                warn!(index, error = %err, "dropping incomplete component draft");
                None
            }
        }
    }
}

/// Failure reason under either spelling the models use
///
/// Kept as two fields so an object carrying both keys still decodes.
#[derive(Debug, Default, Deserialize)]
struct RawFailure {
    #[serde(rename = "failure response")]
    spaced: Option<String>,
    #[serde(rename = "failure_response")]
    underscored: Option<String>,
}

impl RawFailure {
    /// First non-blank reason, spaced spelling first
    fn reason(self) -> Option<String> {
        [self.spaced, self.underscored]
            .into_iter()
            .flatten()
            .map(|r| r.trim().to_string())
            .find(|r| !r.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct RawGeneration {
    components: Option<Vec<RawDraft>>,
    #[serde(flatten)]
    failure: RawFailure,
}

#[derive(Debug, Deserialize)]
struct RawRefinement {
    component: Option<RawDraft>,
    #[serde(flatten)]
    failure: RawFailure,
}

fn decode_object<T: for<'de> Deserialize<'de>>(cleaned: CleanedText) -> Result<T, ExtractionError> {
    let (text, parsed) = cleaned.into_parts();
    let value = match parsed {
        Ok(value) => value,
        Err(source) => {
            return Err(ExtractionError::InvalidJson {
                source,
                cleaned: text,
            })
        }
    };
    if !matches!(value, Value::Object(_)) {
        return Err(ExtractionError::NotAnObject { cleaned: text });
    }
    serde_json::from_value::<T>(value).map_err(|source| ExtractionError::Malformed {
        source,
        cleaned: text,
    })
}

/// Decode a sketch-generation response
///
/// An object without usable components becomes
/// [`GenerationOutcome::Failure`], using the model's reason if it gave one
/// and [`GENERIC_FAILURE_REASON`] otherwise. This covers `{}`, unknown keys
/// and an empty or fully rejected component list.
///
/// # Errors
/// `ExtractionError` when the text is not a JSON object, or a recognized
/// key holds a value of the wrong type.
pub fn decode_generation(cleaned: CleanedText) -> Result<GenerationOutcome, ExtractionError> {
    let raw = decode_object::<RawGeneration>(cleaned)?;

    let drafts: Vec<ComponentDraft> = raw
        .components
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, draft)| draft.into_draft(index))
        .collect();

    Ok(match DraftBatch::new(drafts) {
        Some(drafts) => GenerationOutcome::Success { drafts },
        None => GenerationOutcome::Failure {
            reason: raw
                .failure
                .reason()
                .unwrap_or_else(|| GENERIC_FAILURE_REASON.to_string()),
        },
    })
}

/// Decode a code-refinement response
///
/// # Errors
/// `ExtractionError` when the text is not a JSON object, or a recognized
/// key holds a value of the wrong type.
pub fn decode_refinement(cleaned: CleanedText) -> Result<RefinementOutcome, ExtractionError> {
    let raw = decode_object::<RawRefinement>(cleaned)?;

    Ok(match raw.component.and_then(|component| component.into_draft(0)) {
        Some(draft) => RefinementOutcome::Updated { draft },
        None => RefinementOutcome::Declined {
            reason: raw
                .failure
                .reason()
                .unwrap_or_else(|| GENERIC_REFINE_FAILURE_REASON.to_string()),
        },
    })
}
