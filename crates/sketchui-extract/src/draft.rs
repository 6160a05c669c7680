//! Component drafts and extraction outcomes

use crate::error::DraftError;
use serde::Serialize;

/// Longest title a draft may carry, in characters
pub const MAX_TITLE_CHARS: usize = 20;

/// Candidate UI component produced by the model
///
/// All three fields are non-empty; overlong titles are cut to
/// [`MAX_TITLE_CHARS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDraft {
    title: String,
    kind: String,
    code: String,
}

impl ComponentDraft {
    /// Build a draft, rejecting blank fields
    ///
    /// # Errors
    /// `DraftError::MissingField` naming the first blank field.
    pub fn new(
        title: impl Into<String>,
        kind: impl Into<String>,
        code: impl Into<String>,
    ) -> Result<Self, DraftError> {
        let title = title.into();
        let kind = kind.into();
        let code = code.into();

        let title = title.trim();
        if title.is_empty() {
            return Err(DraftError::MissingField("title"));
        }
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(DraftError::MissingField("type"));
        }
        if code.trim().is_empty() {
            return Err(DraftError::MissingField("code"));
        }

        Ok(Self {
            title: title.chars().take(MAX_TITLE_CHARS).collect::<String>().trim_end().to_string(),
            kind: kind.to_string(),
            code,
        })
    }

    /// Component title
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Component kind (button, form, card, ...)
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Generated source
    #[inline]
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Split into `(title, kind, code)`
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (String, String, String) {
        (self.title, self.kind, self.code)
    }
}

/// Non-empty, ordered list of drafts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DraftBatch(Vec<ComponentDraft>);

impl DraftBatch {
    /// Wrap drafts; `None` for an empty list
    #[must_use]
    pub fn new(drafts: Vec<ComponentDraft>) -> Option<Self> {
        if drafts.is_empty() {
            None
        } else {
            Some(Self(drafts))
        }
    }

    /// Number of drafts (at least one)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the batch holds exactly one draft
    #[inline]
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.0.len() == 1
    }

    /// Drafts in model order
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[ComponentDraft] {
        &self.0
    }

    /// Iterate in model order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ComponentDraft> {
        self.0.iter()
    }
}

impl IntoIterator for DraftBatch {
    type Item = ComponentDraft;
    type IntoIter = std::vec::IntoIter<ComponentDraft>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DraftBatch {
    type Item = &'a ComponentDraft;
    type IntoIter = std::slice::Iter<'a, ComponentDraft>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of a sketch-generation extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// At least one usable draft
    Success {
        /// Usable drafts in model order
        drafts: DraftBatch,
    },
    /// Model declined, or produced nothing usable
    Failure {
        /// Model's reason, or a generic one
        reason: String,
    },
}

impl GenerationOutcome {
    /// Check for success
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Result of a code-refinement extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefinementOutcome {
    /// Replacement component
    Updated {
        /// New title, type and code
        draft: ComponentDraft,
    },
    /// Model declined the change
    Declined {
        /// Model's reason, or a generic one
        reason: String,
    },
}
