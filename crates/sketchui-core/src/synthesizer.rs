//! Component Synthesis Orchestrator
//!
//! Drives one sketch through the pipeline:
//!
//! ```text
//! lookup ─┬─ missing ──────────────────────────────→ NotFound
//!         └─ generate ─┬─ transport/gateway ───────→ Transport | Cancelled
//!                      └─ extract ─┬─ undecodable ─→ Extraction
//!                                  ├─ failure ─────→ ModelDeclined
//!                                  └─ drafts ──→ persist each ─┬─→ SynthesisReport
//!                                                              └─→ Persistence { committed }
//! ```
//!
//! Each request is a single attempt. Rows written before a persistence
//! failure stay committed.

use crate::config::SynthesisConfig;
use crate::error::ServiceError;
use crate::repository::ComponentRepository;
use crate::types::{NewComponent, SynthesisReport, SynthesisRequest};
use sketchui_extract::{extract_generation, DraftBatch, GenerationOutcome, MAX_TITLE_CHARS};
use sketchui_gateway::{CancellationToken, ChatMessage, GatewayClient};
use sketchui_store::{OwnerId, SketchStore};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Turns stored sketches into persisted components
pub struct ComponentSynthesizer {
    store: Arc<SketchStore>,
    gateway: Arc<dyn GatewayClient>,
    repository: Arc<dyn ComponentRepository>,
    config: SynthesisConfig,
}

impl std::fmt::Debug for ComponentSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentSynthesizer")
            .field("store", &self.store)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl ComponentSynthesizer {
    /// Create synthesizer over its collaborators
    #[must_use]
    pub fn new(
        store: Arc<SketchStore>,
        gateway: Arc<dyn GatewayClient>,
        repository: Arc<dyn ComponentRepository>,
        config: SynthesisConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            repository,
            config,
        }
    }

    /// Synthesis settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Generate and persist components for one sketch
    ///
    /// The title override is applied only when the model produces exactly
    /// one draft. Cancellation is honoured up to the end of the gateway call;
    /// persistence, once started, runs to completion or first failure.
    ///
    /// # Errors
    /// - `Validation` for an overlong title override or an empty sketch
    /// - `NotFound` when the sketch is missing or expired (no gateway call)
    /// - `Transport` / `Cancelled` from the gateway call
    /// - `Extraction` for undecodable output, `ModelDeclined` for a refusal
    /// - `Persistence` with the rows committed before the failure
    pub async fn synthesize(
        &self,
        request: SynthesisRequest,
        cancel: &CancellationToken,
    ) -> Result<SynthesisReport, ServiceError> {
        let title_override = normalize_title_override(request.title_override)?;
        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        let sketch = self
            .store
            .get(request.sketch_id.as_str())
            .await
            .ok_or_else(|| {
                warn!(sketch_id = %request.sketch_id, "sketch not found");
                ServiceError::NotFound("Sketch not found".to_string())
            })?;
        if sketch.payload().is_empty() {
            return Err(ServiceError::Validation(
                "sketch does not have a valid image".to_string(),
            ));
        }

        let prompt = request
            .prompt_override
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| self.config.default_user_prompt.clone());
        let messages = [
            ChatMessage::system(self.config.system_prompt.as_str()),
            ChatMessage::user_with_image(prompt, sketch.payload().data_uri()),
        ];

        info!(sketch_id = %sketch.id(), owner = %request.owner_id, "generating components");
        let raw = self
            .gateway
            .generate(cancel, &messages, &self.config.model)
            .await
            .map_err(|e| {
                error!(sketch_id = %sketch.id(), error = %e, "gateway call failed");
                ServiceError::from(e)
            })?;

        let drafts = match extract_generation(&raw) {
            Ok(GenerationOutcome::Success { drafts }) => drafts,
            Ok(GenerationOutcome::Failure { reason }) => {
                info!(sketch_id = %sketch.id(), %reason, "model declined sketch");
                return Err(ServiceError::ModelDeclined { reason });
            }
            Err(e) => {
                error!(sketch_id = %sketch.id(), error = %e, "model output not decodable");
                return Err(e.into());
            }
        };

        self.persist(drafts, request.owner_id, title_override).await
    }

    async fn persist(
        &self,
        drafts: DraftBatch,
        owner: OwnerId,
        title_override: Option<String>,
    ) -> Result<SynthesisReport, ServiceError> {
        let title_override = if drafts.is_single() {
            title_override
        } else {
            if title_override.is_some() {
                debug!(drafts = drafts.len(), "title override ignored for multi-draft result");
            }
            None
        };

        let total = drafts.len();
        let mut created = Vec::with_capacity(total);
        for draft in drafts {
            let mut component = NewComponent::from_draft(draft, owner);
            if let Some(title) = &title_override {
                component = component.with_title(title.as_str());
            }

            match self.repository.create(component).await {
                Ok(row) => created.push(row),
                Err(source) => {
                    error!(
                        committed = created.len(),
                        total,
                        error = %source,
                        "component persistence failed"
                    );
                    return Err(ServiceError::Persistence {
                        committed: created.len(),
                        committed_ids: created.iter().map(|row| row.id).collect(),
                        source,
                    });
                }
            }
        }

        info!(owner = %owner, created = created.len(), "components persisted");
        Ok(SynthesisReport { created })
    }
}

/// Blank overrides count as absent; anything longer than a draft title is
/// rejected
fn normalize_title_override(title: Option<String>) -> Result<Option<String>, ServiceError> {
    let Some(title) = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ServiceError::Validation(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(Some(title))
}
