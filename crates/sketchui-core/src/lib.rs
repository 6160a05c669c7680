//! Sketch-to-UI Core
//!
//! Wires the sketch store, gateway client and extraction pipeline into the
//! two user-facing flows:
//! - **Synthesis**: stored sketch → model → drafts → persisted components
//! - **Management**: ownership-checked read, update, archive, listing and
//!   model-driven refinement of persisted components
//!
//! # Architecture
//!
//! ```text
//! caller ─→ ComponentSynthesizer ─→ SketchStore      (lookup)
//!                                 ─→ GatewayClient    (generate)
//!                                 ─→ extract_generation
//!                                 ─→ ComponentRepository (create each)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sketchui_core::{ComponentSynthesizer, SynthesisRequest};
//!
//! let report = synthesizer
//!     .synthesize(SynthesisRequest::new(sketch.id().clone(), owner), &cancel)
//!     .await?;
//! for component in &report.created {
//!     println!("{} {}", component.id, component.title);
//! }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod repository;
pub mod service;
pub mod synthesizer;
pub mod types;

pub use config::{AppConfig, SynthesisConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use error::{ConfigError, RepositoryError, ServiceError};
pub use repository::{ComponentRepository, InMemoryComponentRepository};
pub use service::ComponentService;
pub use synthesizer::ComponentSynthesizer;
pub use types::{
    ComponentId, ComponentPage, ComponentPatch, NewComponent, PersistedComponent, SynthesisReport,
    SynthesisRequest,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
