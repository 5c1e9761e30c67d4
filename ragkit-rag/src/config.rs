//! Configuration for the RAG pipeline.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Dimension of embeddings; must match the embedder and vector store.
    pub embedding_dimension: usize,
    /// Number of documents retrieved per query.
    pub top_k: usize,
    /// Sampling temperature for generation, in `[0, 2]`.
    pub temperature: f32,
    /// Per-stage time budget in milliseconds. `None` disables stage timeouts.
    pub stage_timeout_ms: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { embedding_dimension: 1024, top_k: 3, temperature: 0.7, stage_timeout_ms: Some(60_000) }
    }
}

impl PipelineConfig {
    /// Create a new builder for constructing a [`PipelineConfig`].
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// The per-stage timeout, if any.
    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_ms.map(Duration::from_millis)
    }

    /// Build a config from `RAGKIT_*` environment variables, falling back to defaults.
    ///
    /// Recognized variables: `RAGKIT_EMBEDDING_DIM`, `RAGKIT_TOP_K`,
    /// `RAGKIT_TEMPERATURE`, `RAGKIT_STAGE_TIMEOUT_MS`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a variable does not parse or the
    /// resulting config fails validation.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(dim) = env_var("RAGKIT_EMBEDDING_DIM")? {
            builder = builder.embedding_dimension(dim);
        }
        if let Some(top_k) = env_var("RAGKIT_TOP_K")? {
            builder = builder.top_k(top_k);
        }
        if let Some(temperature) = env_var("RAGKIT_TEMPERATURE")? {
            builder = builder.temperature(temperature);
        }
        if let Some(ms) = env_var::<u64>("RAGKIT_STAGE_TIMEOUT_MS")? {
            builder = builder.stage_timeout(Duration::from_millis(ms));
        }
        builder.build()
    }

    /// Check that parameters are within their allowed ranges.
    pub fn validate(&self) -> Result<()> {
        if self.embedding_dimension == 0 {
            return Err(RagError::Config("embedding_dimension must be greater than zero".to_string()));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(RagError::Config(format!(
                "temperature ({}) must be within [0, 2]",
                self.temperature
            )));
        }
        if self.stage_timeout_ms == Some(0) {
            return Err(RagError::Config("stage timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn env_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RagError::Config(format!("{name} has an invalid value: '{raw}'"))),
        Err(_) => Ok(None),
    }
}

/// Builder for constructing a validated [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the embedding dimension.
    pub fn embedding_dimension(mut self, dimension: usize) -> Self {
        self.config.embedding_dimension = dimension;
        self
    }

    /// Set the number of documents retrieved per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the per-stage timeout.
    ///
    /// The budget has millisecond granularity; a non-zero sub-millisecond
    /// duration rounds up to one millisecond.
    pub fn stage_timeout(mut self, timeout: Duration) -> Self {
        let ms = timeout.as_nanos().div_ceil(1_000_000);
        self.config.stage_timeout_ms = Some(u64::try_from(ms).unwrap_or(u64::MAX));
        self
    }

    /// Disable per-stage timeouts.
    pub fn no_stage_timeout(mut self) -> Self {
        self.config.stage_timeout_ms = None;
        self
    }

    /// Build the [`PipelineConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `embedding_dimension == 0`
    /// - `top_k == 0`
    /// - `temperature` is outside `[0, 2]`
    /// - the stage timeout is zero
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.stage_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(PipelineConfig::builder().top_k(0).build().is_err());
        assert!(PipelineConfig::builder().embedding_dimension(0).build().is_err());
        assert!(PipelineConfig::builder().temperature(2.5).build().is_err());
        assert!(PipelineConfig::builder().temperature(-0.1).build().is_err());
        assert!(PipelineConfig::builder().stage_timeout(Duration::ZERO).build().is_err());
        assert!(PipelineConfig::builder().temperature(2.0).build().is_ok());
    }

    #[test]
    fn sub_millisecond_timeout_rounds_up() {
        let config = PipelineConfig::builder().stage_timeout(Duration::from_micros(250)).build().unwrap();
        assert_eq!(config.stage_timeout(), Some(Duration::from_millis(1)));

        let config = PipelineConfig::builder().stage_timeout(Duration::from_micros(1500)).build().unwrap();
        assert_eq!(config.stage_timeout_ms, Some(2));
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{ "top_k": 5 }"#).unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.embedding_dimension, 1024);
    }
}
