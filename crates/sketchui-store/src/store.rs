//! TTL-bounded sketch cache using moka
//!
//! Entries carry their own lifetime through a [`moka::Expiry`] policy, so a
//! lookup past the deadline reports not-found even before the sweep has
//! physically removed the entry.

use crate::sketch::{OwnerId, Sketch, SketchId, SketchPayload};
use chrono::{TimeDelta, Utc};
use moka::future::Cache;
use moka::Expiry;
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Per-entry lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Never auto-expires
    Never,
    /// Expires this long after insertion
    After(Duration),
}

impl From<Duration> for Ttl {
    /// A zero duration means "no expiry"
    fn from(value: Duration) -> Self {
        if value.is_zero() {
            Self::Never
        } else {
            Self::After(value)
        }
    }
}

impl Ttl {
    fn as_duration(self) -> Option<Duration> {
        match self {
            Self::Never => None,
            Self::After(d) => Some(d),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of cached sketches before eviction
    pub max_capacity: u64,
    /// Lifetime applied by [`SketchStore::upload`], in seconds (0 = never)
    pub upload_ttl_secs: u64,
    /// Interval between background sweeps, in milliseconds
    pub sweep_interval_ms: u64,
}

impl StoreConfig {
    /// Lifetime applied to uploads
    #[inline]
    #[must_use]
    pub fn upload_ttl(&self) -> Ttl {
        Duration::from_secs(self.upload_ttl_secs).into()
    }

    /// Background sweep period (never zero)
    #[inline]
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }

    /// With sweep interval
    #[inline]
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With max capacity
    #[inline]
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            upload_ttl_secs: 24 * 60 * 60,
            sweep_interval_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    sketch: Arc<Sketch>,
    ttl: Ttl,
}

struct EntryExpiry;

impl Expiry<SketchId, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &SketchId, value: &Entry, _created_at: Instant) -> Option<Duration> {
        value.ttl.as_duration()
    }

    // Replacing an entry restarts its lifetime with the new TTL.
    fn expire_after_update(
        &self,
        _key: &SketchId,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl.as_duration()
    }
}

/// Concurrent sketch store with a background sweep
///
/// The sweep task is spawned on construction (a Tokio runtime must be
/// active) and runs until [`shutdown`](Self::shutdown) or drop.
pub struct SketchStore {
    inner: Cache<SketchId, Entry>,
    config: StoreConfig,
    shutdown: CancellationToken,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for SketchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SketchStore")
            .field("config", &self.config)
            .field("entry_count", &self.inner.entry_count())
            .finish_non_exhaustive()
    }
}

impl SketchStore {
    /// Create store and start its sweep task
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry)
            .build();
        let shutdown = CancellationToken::new();
        let sweeper = tokio::spawn(sweep_loop(
            inner.clone(),
            config.sweep_interval(),
            shutdown.clone(),
        ));

        Self {
            inner,
            config,
            shutdown,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    /// Store configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Insert or replace the sketch under `id`
    pub async fn put(
        &self,
        id: SketchId,
        payload: SketchPayload,
        owner: OwnerId,
        ttl: impl Into<Ttl>,
    ) -> Arc<Sketch> {
        let ttl = ttl.into();
        let expires_at = ttl
            .as_duration()
            .and_then(|d| TimeDelta::from_std(d).ok())
            .and_then(|d| Utc::now().checked_add_signed(d));
        let sketch = Arc::new(Sketch::new(id.clone(), payload, owner, expires_at));

        self.inner
            .insert(
                id,
                Entry {
                    sketch: Arc::clone(&sketch),
                    ttl,
                },
            )
            .await;
        tracing::debug!(sketch_id = %sketch.id(), ?ttl, "sketch stored");
        sketch
    }

    /// Look up a live sketch
    #[must_use]
    pub async fn get(&self, id: &str) -> Option<Arc<Sketch>> {
        self.inner.get(id).await.map(|entry| entry.sketch)
    }

    /// Remove one sketch; missing ids are ignored
    pub async fn delete(&self, id: &str) {
        self.inner.invalidate(id).await;
    }

    /// Remove every sketch
    #[inline]
    pub fn delete_all(&self) {
        self.inner.invalidate_all();
    }

    /// Live entries as of the last sweep
    #[inline]
    #[must_use]
    pub fn count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Run one sweep pass now
    pub async fn sweep(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// True once the sweep task has been asked to stop
    #[inline]
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stop the sweep task and wait for it to exit
    ///
    /// Lookups keep honouring expiry afterwards.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "sketch sweep task ended abnormally");
            }
        }
    }
}

impl Drop for SketchStore {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn sweep_loop(cache: Cache<SketchId, Entry>, period: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::debug!(period = ?period, "sketch sweep started");

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                cache.run_pending_tasks().await;
                tracing::trace!(entries = cache.entry_count(), "sketch sweep pass");
            }
        }
    }

    tracing::debug!("sketch sweep stopped");
}
