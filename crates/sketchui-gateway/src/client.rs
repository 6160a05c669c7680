//! Gateway client trait and its HTTP implementation

use crate::error::GatewayError;
use crate::message::ChatMessage;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use ulid::Ulid;

/// Text generation through the gateway
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Send `messages` to `model` and return the first choice's text
    ///
    /// # Errors
    /// - `GatewayError::Cancelled` if `cancel` fires before the response completes
    /// - `GatewayError::Transport` on network failure
    /// - `GatewayError::Gateway` on a non-success status
    /// - `GatewayError::Decode` if the body is not the expected shape
    /// - `GatewayError::EmptyResult` if the response has zero choices
    async fn generate(
        &self,
        cancel: &CancellationToken,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<String, GatewayError>;
}

#[async_trait]
impl GatewayClient for Arc<dyn GatewayClient> {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<String, GatewayError> {
        (**self).generate(cancel, messages, model).await
    }
}

/// HTTP gateway configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Root URL; requests go to `{base_url}/v1/chat/completions`
    pub base_url: String,
    /// Bearer credential
    pub api_key: String,
    /// Whole-request timeout in seconds; `0` disables the timeout
    pub timeout_secs: u64,
}

impl GatewayConfig {
    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// With timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Whole-request timeout, `None` when disabled
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Full chat-completions URL
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Gateway client over an OpenAI-compatible HTTP API
#[derive(Debug, Clone)]
pub struct HttpGatewayClient {
    client: reqwest::Client,
    url: String,
    headers: HeaderMap,
}

impl HttpGatewayClient {
    /// Build client from configuration
    ///
    /// # Errors
    /// `GatewayError::InvalidConfig` if the credential is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::InvalidConfig(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| GatewayError::InvalidConfig(e.to_string()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        Ok(Self {
            client,
            url: config.completions_url(),
            headers,
        })
    }

    /// Endpoint this client posts to
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send(&self, messages: &[ChatMessage], model: &str) -> Result<String, GatewayError> {
        let body = ChatCompletionRequest {
            model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::gateway(status.as_u16(), text));
        }

        let text = response.text().await?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(GatewayError::Decode)?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(GatewayError::EmptyResult)
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<String, GatewayError> {
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        let request_id = Ulid::new();
        let started = Instant::now();
        tracing::info!(%request_id, model, messages = messages.len(), "gateway request started");

        // Losing the race drops the request future, which releases the connection.
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(GatewayError::Cancelled),
            result = self.send(messages, model) => result,
        };

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(text) => {
                tracing::info!(%request_id, elapsed_ms, chars = text.len(), "gateway request completed");
            }
            Err(e) => {
                tracing::warn!(%request_id, elapsed_ms, error = %e, "gateway request failed");
            }
        }
        result
    }
}
