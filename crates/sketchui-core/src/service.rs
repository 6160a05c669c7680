//! Ownership-checked component management
//!
//! Every operation that touches a single component first loads it and
//! compares its owner with the caller, so callers only ever modify their own
//! rows. Refinement sends the current component and an instruction to the
//! gateway and writes the model's replacement back.

use crate::config::{SynthesisConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::ServiceError;
use crate::repository::ComponentRepository;
use crate::types::{ComponentId, ComponentPage, ComponentPatch, PersistedComponent};
use serde_json::json;
use sketchui_extract::{extract_refinement, RefinementOutcome, MAX_TITLE_CHARS};
use sketchui_gateway::{CancellationToken, ChatMessage, GatewayClient};
use sketchui_store::OwnerId;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Component CRUD and refinement for authenticated owners
pub struct ComponentService {
    repository: Arc<dyn ComponentRepository>,
    gateway: Arc<dyn GatewayClient>,
    config: SynthesisConfig,
}

impl std::fmt::Debug for ComponentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentService")
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl ComponentService {
    /// Create service over its collaborators
    #[must_use]
    pub fn new(
        repository: Arc<dyn ComponentRepository>,
        gateway: Arc<dyn GatewayClient>,
        config: SynthesisConfig,
    ) -> Self {
        Self {
            repository,
            gateway,
            config,
        }
    }

    /// Fetch a live component the caller owns
    ///
    /// # Errors
    /// `NotFound` if missing or archived, `Authorization` if owned by
    /// someone else.
    pub async fn get_owned(&self, owner: OwnerId, id: ComponentId) -> Result<PersistedComponent, ServiceError> {
        let component = self.repository.get(id).await?;
        if component.owner_id != owner {
            warn!(component_id = %id, caller = %owner, "ownership check failed");
            return Err(ServiceError::Authorization(format!(
                "component {id} belongs to another user"
            )));
        }
        Ok(component)
    }

    /// Apply the non-blank fields of `patch`
    ///
    /// # Errors
    /// Ownership errors as for [`get_owned`](Self::get_owned); `Validation`
    /// for an overlong title.
    pub async fn update(
        &self,
        owner: OwnerId,
        id: ComponentId,
        patch: ComponentPatch,
    ) -> Result<PersistedComponent, ServiceError> {
        let current = self.get_owned(owner, id).await?;
        if let Some(title) = &patch.title {
            if title.trim().chars().count() > MAX_TITLE_CHARS {
                return Err(ServiceError::Validation(format!(
                    "title must be at most {MAX_TITLE_CHARS} characters"
                )));
            }
        }
        if patch.is_empty() {
            return Ok(current);
        }

        let updated = self.repository.update(id, &patch).await?;
        info!(component_id = %id, "component updated");
        Ok(updated)
    }

    /// Soft-delete a component
    ///
    /// # Errors
    /// Ownership errors as for [`get_owned`](Self::get_owned); archiving
    /// twice reports `NotFound`.
    pub async fn archive(&self, owner: OwnerId, id: ComponentId) -> Result<(), ServiceError> {
        self.get_owned(owner, id).await?;
        self.repository.archive(id).await?;
        info!(component_id = %id, "component archived");
        Ok(())
    }

    /// Page through the caller's components, newest first
    ///
    /// A `limit` of zero or less means the default page size.
    ///
    /// # Errors
    /// `Validation` when `limit` exceeds the maximum page size.
    pub async fn list(&self, owner: OwnerId, limit: i64, offset: usize) -> Result<ComponentPage, ServiceError> {
        let limit = match usize::try_from(limit) {
            Ok(0) | Err(_) => DEFAULT_PAGE_SIZE,
            Ok(n) if n > MAX_PAGE_SIZE => {
                return Err(ServiceError::Validation(format!(
                    "limit must be at most {MAX_PAGE_SIZE}"
                )))
            }
            Ok(n) => n,
        };

        let (items, total) = self.repository.list_by_owner(owner, limit, offset).await?;
        let next_offset = offset + items.len();
        Ok(ComponentPage {
            items,
            total,
            next_offset,
            remaining: total.saturating_sub(next_offset),
        })
    }

    /// Every live public component, newest first
    ///
    /// # Errors
    /// `Persistence` when the repository fails.
    pub async fn list_public(&self) -> Result<Vec<PersistedComponent>, ServiceError> {
        Ok(self.repository.list_public().await?)
    }

    /// Ask the model to rework a component and store the result
    ///
    /// # Errors
    /// - ownership errors as for [`get_owned`](Self::get_owned)
    /// - `Validation` for a blank instruction
    /// - `Transport` / `Cancelled` from the gateway call
    /// - `ModelDeclined` or `Extraction` from the model's reply
    pub async fn refine(
        &self,
        owner: OwnerId,
        id: ComponentId,
        instruction: &str,
        cancel: &CancellationToken,
    ) -> Result<PersistedComponent, ServiceError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ServiceError::Validation("instruction must not be empty".to_string()));
        }
        let current = self.get_owned(owner, id).await?;

        let current_json = json!({
            "title": current.title,
            "type": current.kind,
            "code": current.code,
        });
        let prompt = format!(
            "{instruction}\n\nHere is the current component: {current_json}. Return the updated component in JSON format."
        );
        let messages = [
            ChatMessage::system(self.config.refine_system_prompt.as_str()),
            ChatMessage::user(prompt),
        ];

        info!(component_id = %id, "refining component");
        let raw = self
            .gateway
            .generate(cancel, &messages, &self.config.model)
            .await
            .map_err(|e| {
                error!(component_id = %id, error = %e, "gateway call failed");
                ServiceError::from(e)
            })?;

        match extract_refinement(&raw)? {
            RefinementOutcome::Updated { draft } => {
                let updated = self.repository.update(id, &ComponentPatch::from_draft(draft)).await?;
                info!(component_id = %id, "component refined");
                Ok(updated)
            }
            RefinementOutcome::Declined { reason } => {
                info!(component_id = %id, %reason, "model declined refinement");
                Err(ServiceError::ModelDeclined { reason })
            }
        }
    }
}
