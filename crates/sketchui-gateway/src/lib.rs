//! Generation Gateway Client
//!
//! Sends chat-style requests (system instructions plus user text and image
//! blocks) to an OpenAI-compatible `/v1/chat/completions` endpoint and
//! returns the first choice's text.
//!
//! One call is exactly one outbound request: no retries, no caching.
//! Cancellation is cooperative through a [`CancellationToken`]; dropping the
//! in-flight request releases its connection.
//!
//! # Example
//!
//! ```rust,ignore
//! use sketchui_gateway::{ChatMessage, GatewayClient, GatewayConfig, HttpGatewayClient};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = HttpGatewayClient::new(GatewayConfig::default())?;
//! let messages = [
//!     ChatMessage::system("You generate UI components."),
//!     ChatMessage::user_with_image("Build this", "data:image/png;base64,..."),
//! ];
//! let text = client
//!     .generate(&CancellationToken::new(), &messages, "google/gemini-2.0-flash-exp:free")
//!     .await?;
//! ```

#![warn(unreachable_pub)]

pub mod client;
pub mod error;
pub mod message;

pub use client::{GatewayClient, GatewayConfig, HttpGatewayClient};
pub use error::GatewayError;
pub use message::{ChatMessage, ContentBlock, ImageUrl, MessageContent, Role};
pub use tokio_util::sync::CancellationToken;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
