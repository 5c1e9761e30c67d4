//! OpenAI client configuration.

use ragkit_core::{RagError, Result};

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Model used when `OPENAI_MODEL_NAME` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection and sampling settings for an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAIConfig {
    /// Bearer API key.
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended. Defaults to [`OPENAI_API_BASE`].
    pub base_url: Option<String>,
    /// Model name sent with every request.
    pub model: String,
    /// Default sampling temperature, overridden per request by
    /// [`GenerationConfig`](ragkit_core::GenerationConfig).
    pub temperature: Option<f32>,
}

impl OpenAIConfig {
    /// Configure the public OpenAI API.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), base_url: None, model: model.into(), temperature: None }
    }

    /// Configure an OpenAI-compatible server (vLLM, Ollama, proxies).
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self { base_url: Some(base_url.into()), ..Self::new(api_key, model) }
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_MODEL_NAME`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `OPENAI_API_KEY` is unset or empty.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| RagError::Config("OPENAI_API_KEY is not set".to_string()))?;
        let model = std::env::var("OPENAI_MODEL_NAME")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut config = Self::new(api_key, model);
        config.base_url = std::env::var("OPENAI_BASE_URL").ok().filter(|u| !u.trim().is_empty());
        Ok(config)
    }

    /// Set the default sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub(crate) fn endpoint(&self) -> String {
        let base = self.base_url.as_deref().unwrap_or(OPENAI_API_BASE);
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_defaults_to_public_api() {
        let config = OpenAIConfig::new("k", "gpt-4o-mini");
        assert_eq!(config.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn compatible_endpoint_trims_trailing_slash() {
        let config = OpenAIConfig::compatible("k", "http://localhost:8000/v1/", "qwen");
        assert_eq!(config.endpoint(), "http://localhost:8000/v1/chat/completions");
    }
}
