//! Response Extraction Pipeline
//!
//! Turns raw model output into a strict result shape. Model output nominally
//! carries one JSON object but often arrives wrapped in a markdown fence,
//! split across lines, or with re-escaped string contents.
//!
//! # Stages
//!
//! ```text
//! raw → trim → strip_fences → join_lines → repair_escapes → validate → decode
//!       \___________________ clean() never fails ___________/           |
//!                                                                       ↓
//!                                    GenerationOutcome | ExtractionError
//! ```
//!
//! Stages 1–5 are pure text transforms that degrade to best-effort text.
//! Only the decode stage produces a hard error, and only when the text is
//! not a JSON object or its known keys hold the wrong types. Any other
//! object without usable components becomes [`GenerationOutcome::Failure`].
//!
//! # Example
//!
//! ```rust
//! use sketchui_extract::{extract_generation, GenerationOutcome};
//!
//! let raw = "```json\n{\"components\":[{\"title\":\"Btn\",\"type\":\"button\",\"code\":\"<button>Hi</button>\"}]}\n```";
//! match extract_generation(raw).unwrap() {
//!     GenerationOutcome::Success { drafts } => assert_eq!(drafts.len(), 1),
//!     GenerationOutcome::Failure { reason } => panic!("{reason}"),
//! }
//! ```

#![warn(unreachable_pub)]

pub mod decode;
pub mod draft;
pub mod error;
pub mod stages;

pub use decode::{decode_generation, decode_refinement, GENERIC_FAILURE_REASON, GENERIC_REFINE_FAILURE_REASON};
pub use draft::{ComponentDraft, DraftBatch, GenerationOutcome, RefinementOutcome, MAX_TITLE_CHARS};
pub use error::{DraftError, ExtractionError};
pub use stages::{clean, CleanedText};

/// Run the full pipeline for a sketch-generation response
///
/// # Errors
/// `ExtractionError` when the cleaned output is not a well-typed JSON object.
pub fn extract_generation(raw: &str) -> Result<GenerationOutcome, ExtractionError> {
    decode_generation(clean(raw))
}

/// Run the full pipeline for a code-refinement response
///
/// # Errors
/// `ExtractionError` when the cleaned output is not a well-typed JSON object.
pub fn extract_refinement(raw: &str) -> Result<RefinementOutcome, ExtractionError> {
    decode_refinement(clean(raw))
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
