//! Sketch Store
//!
//! Holds uploaded sketch images between upload and generation, without a
//! database round-trip.
//!
//! # Core Concepts
//!
//! - [`Sketch`]: Immutable uploaded image plus owner and expiry
//! - [`SketchStore`]: Concurrent key-value cache with per-entry TTL
//! - [`Ttl`]: Per-entry lifetime (`Never` or `After(duration)`)
//! - Background sweep: periodic removal of expired entries, stopped by
//!   [`SketchStore::shutdown`]
//!
//! # Example
//!
//! ```rust,ignore
//! use sketchui_store::{OwnerId, SketchStore, StoreConfig};
//!
//! let store = SketchStore::new(StoreConfig::default());
//! let sketch = store.upload(&png_bytes, OwnerId(7)).await?;
//!
//! assert!(store.get(sketch.id()).await.is_some());
//! store.shutdown().await;
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod sketch;
pub mod store;
pub mod upload;

pub use error::UploadError;
pub use sketch::{OwnerId, Sketch, SketchId, SketchPayload};
pub use store::{SketchStore, StoreConfig, Ttl};
pub use upload::{detect_image_format, ImageFormat};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
