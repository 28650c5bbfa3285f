//! HTTP interpreter for an OpenAI-compatible chat completions endpoint.

use crate::config::{LlmConfig, PipelineConfig};
use crate::error::InterpretError;
use crate::prompt::{user_message, PROMPT_VERSION, SYSTEM_PROMPT};
use crate::response::{decode_candidate, extract_chat_content};
use crate::traits::{Interpreter, InterpreterMetadata};
use crate::types::CommandCandidate;
use async_trait::async_trait;

pub struct HttpInterpreter {
    config: LlmConfig,
    api_key: String,
    client: reqwest::Client,
}

impl HttpInterpreter {
    /// Build a client. The API key is read from `config.llm.api_key_env`.
    pub fn new(config: &PipelineConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let llm = config.llm.clone();
        let api_key = std::env::var(&llm.api_key_env)
            .map_err(|_| format!("{} is not set", llm.api_key_env))?;
        // The pipeline enforces its own bound; this one only guards the socket.
        let client = reqwest::Client::builder()
            .timeout(config.primary_timeout())
            .build()?;
        Ok(Self {
            config: llm,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl Interpreter for HttpInterpreter {
    async fn interpret(&self, text: &str) -> Result<CommandCandidate, InterpretError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_message(text) },
            ],
        });

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InterpretError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(InterpretError::Network(format!("HTTP {status}")));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| InterpretError::MalformedResponse(e.to_string()))?;
        let candidate = decode_candidate(extract_chat_content(&body)?)?;

        tracing::debug!(
            action = %candidate.action(),
            confidence = candidate.confidence(),
            prompt_version = PROMPT_VERSION,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "llm interpretation"
        );
        Ok(candidate)
    }

    fn metadata(&self) -> InterpreterMetadata {
        InterpreterMetadata {
            name: "Chat Completions Interpreter".to_string(),
            backend: "llm_http".to_string(),
            model: Some(self.config.model.clone()),
        }
    }
}
