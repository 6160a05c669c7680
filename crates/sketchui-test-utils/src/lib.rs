//! Testing utilities for the sketchui workspace
//!
//! Shared doubles and fixtures:
//! - [`ScriptedGateway`]: replays queued replies and records every call
//! - [`FailingRepository`]: in-memory repository that fails the Nth create
//! - [`PNG_BYTES`] and [`test_store`]: a minimal upload and a store to hold it

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use sketchui_core::{
    ComponentId, ComponentPatch, ComponentRepository, InMemoryComponentRepository, NewComponent,
    PersistedComponent, RepositoryError,
};
use sketchui_gateway::{CancellationToken, ChatMessage, GatewayClient, GatewayError};
use sketchui_store::{OwnerId, SketchStore, StoreConfig};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 1x1 transparent PNG
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Store with a short sweep interval for tests
pub fn test_store() -> Arc<SketchStore> {
    Arc::new(SketchStore::new(
        StoreConfig::default().with_sweep_interval(Duration::from_millis(50)),
    ))
}

/// Gateway reply body for the given `(title, type, code)` triples
pub fn components_reply(components: &[(&str, &str, &str)]) -> String {
    let items: Vec<String> = components
        .iter()
        .map(|(title, kind, code)| {
            format!(r#"{{"title":"{title}","type":"{kind}","code":"{code}"}}"#)
        })
        .collect();
    format!(r#"{{"components":[{}]}}"#, items.join(","))
}

type Reply = Result<String, GatewayError>;

/// Gateway double replaying queued replies in order
///
/// When the queue runs dry every further call gets `EmptyResult`.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
    delay: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway answering once with `text`
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new().with_reply(text)
    }

    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().push_back(Ok(text.into()));
        self
    }

    pub fn with_error(self, error: GatewayError) -> Self {
        self.replies.lock().push_back(Err(error));
        self
    }

    /// Wait this long before answering, unless cancelled
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Messages sent on each call so far
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl GatewayClient for ScriptedGateway {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        messages: &[ChatMessage],
        _model: &str,
    ) -> Result<String, GatewayError> {
        self.calls.lock().push(messages.to_vec());

        if let Some(delay) = self.delay {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(GatewayError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        } else if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        let next = self.replies.lock().pop_front();
        next.unwrap_or(Err(GatewayError::EmptyResult))
    }
}

/// Repository whose `fail_on`-th create (1-based) fails with a storage error
#[derive(Debug)]
pub struct FailingRepository {
    inner: InMemoryComponentRepository,
    fail_on: usize,
    creates: AtomicUsize,
}

impl FailingRepository {
    pub fn failing_on(fail_on: usize) -> Self {
        Self {
            inner: InMemoryComponentRepository::new(),
            fail_on,
            creates: AtomicUsize::new(0),
        }
    }

    /// Rows that made it into storage
    pub fn stored(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl ComponentRepository for FailingRepository {
    async fn create(&self, component: NewComponent) -> Result<PersistedComponent, RepositoryError> {
        let attempt = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == self.fail_on {
            return Err(RepositoryError::Storage(format!("injected failure on create #{attempt}")));
        }
        self.inner.create(component).await
    }

    async fn get(&self, id: ComponentId) -> Result<PersistedComponent, RepositoryError> {
        self.inner.get(id).await
    }

    async fn update(&self, id: ComponentId, patch: &ComponentPatch) -> Result<PersistedComponent, RepositoryError> {
        self.inner.update(id, patch).await
    }

    async fn archive(&self, id: ComponentId) -> Result<(), RepositoryError> {
        self.inner.archive(id).await
    }

    async fn list_by_owner(
        &self,
        owner: OwnerId,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<PersistedComponent>, usize), RepositoryError> {
        self.inner.list_by_owner(owner, limit, offset).await
    }

    async fn list_public(&self) -> Result<Vec<PersistedComponent>, RepositoryError> {
        self.inner.list_public().await
    }
}
