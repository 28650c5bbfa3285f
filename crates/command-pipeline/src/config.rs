//! Pipeline configuration

use crate::error::ConfigError;
use crate::types::DEFAULT_FRAME;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Thresholds, timeout and frame label for one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Primary confidence below this is discarded in favour of the fallback parser
    pub escalation_threshold: f64,
    /// Non-STOP commands below this are marked invalid
    pub acceptance_threshold: f64,
    /// Call the primary interpreter at all
    pub enable_primary: bool,
    /// Use the keyword parser on escalation; when off, escalation yields the safe default
    pub enable_fallback: bool,
    /// Upper bound on the wait for the primary interpreter
    pub primary_timeout_ms: u64,
    /// Reference frame label copied into every command
    pub frame: String,
    /// HTTP interpreter settings
    pub llm: LlmConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: 0.5,
            acceptance_threshold: 0.7,
            enable_primary: true,
            enable_fallback: true,
            primary_timeout_ms: 3000,
            frame: DEFAULT_FRAME.to_string(),
            llm: LlmConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_millis(self.primary_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("escalation_threshold", self.escalation_threshold),
            ("acceptance_threshold", self.acceptance_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        if self.primary_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.frame.trim().is_empty() {
            return Err(ConfigError::EmptyFrame);
        }
        Ok(())
    }
}

/// OpenAI-compatible chat completion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 100,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Load and validate a YAML configuration file.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<PipelineConfig> {
    let path = path.as_ref();
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading config: {}", path.display()))?;
    let config: PipelineConfig =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing yaml: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("validating config: {}", path.display()))?;
    Ok(config)
}
