//! Application configuration
//!
//! Loaded from an optional TOML file, then overridden by environment
//! variables:
//!
//! | variable | field |
//! |---|---|
//! | `OPENROUTER_API_KEY` | `gateway.api_key` |
//! | `OPENROUTER_BASE_URL` | `gateway.base_url` |
//! | `SKETCHUI_MODEL` | `synthesis.model` |
//!
//! ```toml
//! [gateway]
//! timeout_secs = 60
//!
//! [store]
//! upload_ttl_secs = 3600
//!
//! [synthesis]
//! model = "google/gemini-2.0-flash-exp:free"
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use sketchui_gateway::GatewayConfig;
use sketchui_store::StoreConfig;
use std::path::Path;

/// Default page size for component listings
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest accepted page size
pub const MAX_PAGE_SIZE: usize = 20;

const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-exp:free";

const DEFAULT_SYSTEM_PROMPT: &str = "You convert hand-drawn UI sketches into UI components built with HTML \
and CSS. Reply with a single JSON object and nothing else. On success reply \
{\"components\": [{\"title\": <at most 20 characters>, \"type\": <component kind>, \"code\": <HTML with a style tag above it>}]}. \
If the image is not a UI sketch or cannot be read, reply {\"failure response\": <short reason>}.";

const DEFAULT_REFINE_SYSTEM_PROMPT: &str = "You modify existing UI components following the user's \
instructions. Reply with a single JSON object and nothing else. On success reply \
{\"component\": {\"title\": <at most 20 characters>, \"type\": <component kind>, \"code\": <updated code>}}. \
If the instruction cannot be applied, reply {\"failure_response\": <short reason>}.";

const DEFAULT_USER_PROMPT: &str = "Analyze the following sketch image from the image url I sent and generate \
the corresponding UI component code (using HTML and CSS in a style tag above the HTML code) in JSON format.";

/// Prompt and model settings for generation and refinement
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Gateway model id
    pub model: String,
    /// System prompt for sketch generation
    pub system_prompt: String,
    /// System prompt for code refinement
    pub refine_system_prompt: String,
    /// User prompt used when the caller gives none
    pub default_user_prompt: String,
}

impl SynthesisConfig {
    /// With model
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            refine_system_prompt: DEFAULT_REFINE_SYSTEM_PROMPT.to_string(),
            default_user_prompt: DEFAULT_USER_PROMPT.to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `[gateway]` table
    pub gateway: GatewayConfig,
    /// `[store]` table
    pub store: StoreConfig,
    /// `[synthesis]` table
    pub synthesis: SynthesisConfig,
}

impl AppConfig {
    /// Parse TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` on invalid TOML or mistyped fields.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from an optional file, then apply process environment overrides
    ///
    /// # Errors
    /// `ConfigError` when the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config");
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        Ok(config.with_env(|name| std::env::var(name).ok()))
    }

    /// Apply environment overrides from `lookup`; blank values are ignored
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("OPENROUTER_API_KEY") {
            self.gateway = self.gateway.with_api_key(key);
        }
        if let Some(url) = var("OPENROUTER_BASE_URL") {
            self.gateway = self.gateway.with_base_url(url);
        }
        if let Some(model) = var("SKETCHUI_MODEL") {
            self.synthesis.model = model;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_file() {
        let config = AppConfig::from_toml("").unwrap();

        assert_eq!(config.gateway.timeout_secs, 30);
        assert_eq!(config.store.max_capacity, 1_000);
        assert_eq!(config.store.upload_ttl_secs, 86_400);
        assert_eq!(config.synthesis.model, "google/gemini-2.0-flash-exp:free");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [gateway]
            timeout_secs = 5

            [synthesis]
            system_prompt = "custom"
            "#,
        )
        .unwrap();

        assert_eq!(config.gateway.timeout_secs, 5);
        assert_eq!(config.synthesis.system_prompt, "custom");
        assert_eq!(config.synthesis.default_user_prompt, DEFAULT_USER_PROMPT);
    }

    #[test]
    fn mistyped_field_is_rejected() {
        let err = AppConfig::from_toml("[store]\nmax_capacity = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_BASE_URL", "http://localhost:9999"),
            ("SKETCHUI_MODEL", " "),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_toml("[synthesis]\nmodel = \"file/model\"")
            .unwrap()
            .with_env(|name| env.get(name).map(ToString::to_string));

        assert_eq!(config.gateway.api_key, "sk-test");
        assert_eq!(config.gateway.base_url, "http://localhost:9999");
        assert_eq!(config.synthesis.model, "file/model");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/sketchui.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
