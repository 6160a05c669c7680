//! Core types: component records, requests, pages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sketchui_extract::ComponentDraft;
use sketchui_store::{OwnerId, SketchId};
use std::fmt;

/// Persisted component identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub i64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored UI component
///
/// Archival is a soft delete: `archived_at` is set and the row kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedComponent {
    /// Assigned by the repository
    pub id: ComponentId,
    /// Display title, at most 20 characters when model-generated
    pub title: String,
    /// Component category, e.g. `button`
    pub kind: String,
    /// Markup, stored verbatim
    pub code: String,
    /// Listed by `list_public`
    pub is_public: bool,
    /// Owning user
    pub owner_id: OwnerId,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Soft-delete time
    pub archived_at: Option<DateTime<Utc>>,
}

impl PersistedComponent {
    /// Check for soft deletion
    #[inline]
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Component about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComponent {
    /// Display title
    pub title: String,
    /// Component category
    pub kind: String,
    /// Markup
    pub code: String,
    /// Public visibility
    pub is_public: bool,
    /// Owning user
    pub owner_id: OwnerId,
}

impl NewComponent {
    /// Private component from a model draft
    #[must_use]
    pub fn from_draft(draft: ComponentDraft, owner_id: OwnerId) -> Self {
        let (title, kind, code) = draft.into_parts();
        Self {
            title,
            kind,
            code,
            is_public: false,
            owner_id,
        }
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Partial update; blank text fields are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ComponentPatch {
    /// New title
    pub title: Option<String>,
    /// New category
    pub kind: Option<String>,
    /// New markup
    pub code: Option<String>,
    /// New visibility
    pub is_public: Option<bool>,
}

impl ComponentPatch {
    /// Patch replacing title, kind and code from a draft
    #[must_use]
    pub fn from_draft(draft: ComponentDraft) -> Self {
        let (title, kind, code) = draft.into_parts();
        Self {
            title: Some(title),
            kind: Some(kind),
            code: Some(code),
            is_public: None,
        }
    }

    /// True when applying would change nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [&self.title, &self.kind, &self.code]
            .into_iter()
            .all(|field| non_blank(field.as_ref()).is_none())
            && self.is_public.is_none()
    }

    /// Apply the non-blank fields to `component`
    pub fn apply(&self, component: &mut PersistedComponent) {
        if let Some(title) = non_blank(self.title.as_ref()) {
            component.title = title.to_string();
        }
        if let Some(kind) = non_blank(self.kind.as_ref()) {
            component.kind = kind.to_string();
        }
        if let Some(code) = non_blank(self.code.as_ref()) {
            component.code = code.to_string();
        }
        if let Some(is_public) = self.is_public {
            component.is_public = is_public;
        }
    }
}

fn non_blank(field: Option<&String>) -> Option<&str> {
    field.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// One page of an owner's components, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentPage {
    /// Components on this page
    pub items: Vec<PersistedComponent>,
    /// Live components the owner has in total
    pub total: usize,
    /// Offset of the following page
    pub next_offset: usize,
    /// Components after this page
    pub remaining: usize,
}

/// Input to [`ComponentSynthesizer::synthesize`](crate::ComponentSynthesizer::synthesize)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Stored sketch to generate from
    pub sketch_id: SketchId,
    /// Replaces the default user prompt when non-blank
    pub prompt_override: Option<String>,
    /// Title for a single-draft result
    pub title_override: Option<String>,
    /// Owner of the created components
    pub owner_id: OwnerId,
}

impl SynthesisRequest {
    /// Request with the default prompt and model titles
    #[inline]
    #[must_use]
    pub fn new(sketch_id: impl Into<SketchId>, owner_id: OwnerId) -> Self {
        Self {
            sketch_id: sketch_id.into(),
            prompt_override: None,
            title_override: None,
            owner_id,
        }
    }

    /// With prompt override
    #[inline]
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt_override = Some(prompt.into());
        self
    }

    /// With title override
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title_override = Some(title.into());
        self
    }
}

/// Components created by one synthesis run, in model order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisReport {
    /// Created rows
    pub created: Vec<PersistedComponent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component() -> PersistedComponent {
        let now = Utc::now();
        PersistedComponent {
            id: ComponentId(1),
            title: "Btn".to_string(),
            kind: "button".to_string(),
            code: "<button/>".to_string(),
            is_public: false,
            owner_id: OwnerId(7),
            created_at: now,
            updated_at: now,
            archived_at: None,
        }
    }

    #[test]
    fn patch_skips_blank_fields() {
        let mut row = component();
        let patch = ComponentPatch {
            title: Some("  ".to_string()),
            kind: Some("link".to_string()),
            code: None,
            is_public: Some(true),
        };

        patch.apply(&mut row);

        assert_eq!(row.title, "Btn");
        assert_eq!(row.kind, "link");
        assert_eq!(row.code, "<button/>");
        assert!(row.is_public);
    }

    #[test]
    fn blank_patch_is_empty() {
        let patch = ComponentPatch {
            title: Some(String::new()),
            ..ComponentPatch::default()
        };
        assert!(patch.is_empty());
        assert!(!ComponentPatch::from_draft(ComponentDraft::new("a", "b", "c").unwrap()).is_empty());
    }

    #[test]
    fn new_component_from_draft_is_private() {
        let draft = ComponentDraft::new("Card", "card", "<div/>").unwrap();
        let new = NewComponent::from_draft(draft, OwnerId(3));
        assert!(!new.is_public);
        assert_eq!(new.owner_id, OwnerId(3));
        assert_eq!(new.title, "Card");
    }
}
