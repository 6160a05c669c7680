//! Component persistence port
//!
//! [`ComponentRepository`] is the seam to whatever stores component rows.
//! [`InMemoryComponentRepository`] backs the CLI and the tests.

use crate::error::RepositoryError;
use crate::types::{ComponentId, ComponentPatch, NewComponent, PersistedComponent};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sketchui_store::OwnerId;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Storage for component rows
///
/// Reads and writes only see live rows; archived rows report
/// [`RepositoryError::NotFoundOrArchived`].
#[async_trait]
pub trait ComponentRepository: Send + Sync {
    /// Insert a row and return it with its id and timestamps
    async fn create(&self, component: NewComponent) -> Result<PersistedComponent, RepositoryError>;

    /// Fetch a live row
    async fn get(&self, id: ComponentId) -> Result<PersistedComponent, RepositoryError>;

    /// Apply `patch` to a live row
    async fn update(&self, id: ComponentId, patch: &ComponentPatch) -> Result<PersistedComponent, RepositoryError>;

    /// Soft-delete a live row
    async fn archive(&self, id: ComponentId) -> Result<(), RepositoryError>;

    /// One page of an owner's live rows, newest first, plus the owner's total
    async fn list_by_owner(
        &self,
        owner: OwnerId,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<PersistedComponent>, usize), RepositoryError>;

    /// Every live public row, newest first
    async fn list_public(&self) -> Result<Vec<PersistedComponent>, RepositoryError>;
}

#[async_trait]
impl<R: ComponentRepository + ?Sized> ComponentRepository for Arc<R> {
    async fn create(&self, component: NewComponent) -> Result<PersistedComponent, RepositoryError> {
        (**self).create(component).await
    }

    async fn get(&self, id: ComponentId) -> Result<PersistedComponent, RepositoryError> {
        (**self).get(id).await
    }

    async fn update(&self, id: ComponentId, patch: &ComponentPatch) -> Result<PersistedComponent, RepositoryError> {
        (**self).update(id, patch).await
    }

    async fn archive(&self, id: ComponentId) -> Result<(), RepositoryError> {
        (**self).archive(id).await
    }

    async fn list_by_owner(
        &self,
        owner: OwnerId,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<PersistedComponent>, usize), RepositoryError> {
        (**self).list_by_owner(owner, limit, offset).await
    }

    async fn list_public(&self) -> Result<Vec<PersistedComponent>, RepositoryError> {
        (**self).list_public().await
    }
}

/// Process-local repository over a [`DashMap`]
///
/// Ids come from a monotonic sequence, so id order is creation order.
#[derive(Debug)]
pub struct InMemoryComponentRepository {
    rows: DashMap<ComponentId, PersistedComponent>,
    next_id: AtomicI64,
}

impl InMemoryComponentRepository {
    /// Create empty repository
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Rows stored, archived included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if nothing was ever stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn live_sorted(&self, keep: impl Fn(&PersistedComponent) -> bool) -> Vec<PersistedComponent> {
        let mut rows: Vec<PersistedComponent> = self
            .rows
            .iter()
            .filter(|row| !row.is_archived() && keep(row.value()))
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        rows
    }
}

impl Default for InMemoryComponentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComponentRepository for InMemoryComponentRepository {
    async fn create(&self, component: NewComponent) -> Result<PersistedComponent, RepositoryError> {
        let id = ComponentId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let now = Utc::now();
        let row = PersistedComponent {
            id,
            title: component.title,
            kind: component.kind,
            code: component.code,
            is_public: component.is_public,
            owner_id: component.owner_id,
            created_at: now,
            updated_at: now,
            archived_at: None,
        };
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: ComponentId) -> Result<PersistedComponent, RepositoryError> {
        self.rows
            .get(&id)
            .filter(|row| !row.is_archived())
            .map(|row| row.value().clone())
            .ok_or(RepositoryError::NotFoundOrArchived(id))
    }

    async fn update(&self, id: ComponentId, patch: &ComponentPatch) -> Result<PersistedComponent, RepositoryError> {
        let mut row = self
            .rows
            .get_mut(&id)
            .filter(|row| !row.is_archived())
            .ok_or(RepositoryError::NotFoundOrArchived(id))?;
        patch.apply(&mut row);
        row.updated_at = Utc::now();
        Ok(row.value().clone())
    }

    async fn archive(&self, id: ComponentId) -> Result<(), RepositoryError> {
        let mut row = self
            .rows
            .get_mut(&id)
            .filter(|row| !row.is_archived())
            .ok_or(RepositoryError::NotFoundOrArchived(id))?;
        row.archived_at = Some(Utc::now());
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: OwnerId,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<PersistedComponent>, usize), RepositoryError> {
        let rows = self.live_sorted(|row| row.owner_id == owner);
        let total = rows.len();
        let page = rows.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn list_public(&self) -> Result<Vec<PersistedComponent>, RepositoryError> {
        Ok(self.live_sorted(|row| row.is_public))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_component(owner: i64, title: &str) -> NewComponent {
        NewComponent {
            title: title.to_string(),
            kind: "button".to_string(),
            code: "<button/>".to_string(),
            is_public: false,
            owner_id: OwnerId(owner),
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let repo = InMemoryComponentRepository::new();
        let a = repo.create(new_component(1, "A")).await.unwrap();
        let b = repo.create(new_component(1, "B")).await.unwrap();

        assert!(b.id > a.id);
        assert_eq!(repo.get(a.id).await.unwrap().title, "A");
    }

    #[tokio::test]
    async fn archived_rows_are_hidden() {
        let repo = InMemoryComponentRepository::new();
        let row = repo.create(new_component(1, "A")).await.unwrap();

        repo.archive(row.id).await.unwrap();

        assert_eq!(
            repo.get(row.id).await.unwrap_err(),
            RepositoryError::NotFoundOrArchived(row.id)
        );
        assert_eq!(
            repo.archive(row.id).await.unwrap_err(),
            RepositoryError::NotFoundOrArchived(row.id)
        );
        assert!(repo
            .update(row.id, &ComponentPatch::default())
            .await
            .is_err());
        // Soft delete keeps the row
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn update_touches_timestamp() {
        let repo = InMemoryComponentRepository::new();
        let row = repo.create(new_component(1, "A")).await.unwrap();
        let patch = ComponentPatch {
            title: Some("B".to_string()),
            ..ComponentPatch::default()
        };

        let updated = repo.update(row.id, &patch).await.unwrap();

        assert_eq!(updated.title, "B");
        assert!(updated.updated_at >= row.updated_at);
        assert_eq!(updated.created_at, row.created_at);
    }

    #[tokio::test]
    async fn list_by_owner_pages_newest_first() {
        let repo = InMemoryComponentRepository::new();
        for i in 0..5 {
            repo.create(new_component(1, &format!("mine-{i}"))).await.unwrap();
        }
        repo.create(new_component(2, "theirs")).await.unwrap();

        let (page, total) = repo.list_by_owner(OwnerId(1), 2, 1).await.unwrap();

        assert_eq!(total, 5);
        let titles: Vec<&str> = page.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["mine-3", "mine-2"]);
    }

    #[tokio::test]
    async fn list_public_skips_private_and_archived() {
        let repo = InMemoryComponentRepository::new();
        let mut public = new_component(1, "pub");
        public.is_public = true;
        let shown = repo.create(public.clone()).await.unwrap();
        let hidden = repo.create(public).await.unwrap();
        repo.create(new_component(1, "private")).await.unwrap();
        repo.archive(hidden.id).await.unwrap();

        let rows = repo.list_public().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, shown.id);
    }
}
