//! Text in, validated command out

use crate::config::PipelineConfig;
use crate::manager::{Escalation, FallbackManager};
use crate::traits::{Interpreter, InterpreterMetadata};
use crate::types::RobotCommand;
use crate::validator::{CommandValidator, Verdict};
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// Everything known about one resolved utterance.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub request_id: Uuid,
    pub text: String,
    pub command: RobotCommand,
    pub verdict: Verdict,
    /// Why the primary tier was bypassed, if it was
    pub escalation: Option<Escalation>,
    pub latency_ms: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub resolved_at: OffsetDateTime,
}

impl Resolution {
    pub fn into_parts(self) -> (RobotCommand, Verdict) {
        (self.command, self.verdict)
    }
}

/// Composes tier selection and validation into one total call.
///
/// Stateless across calls; share it behind an `Arc` to serve concurrent
/// requests.
pub struct CommandPipeline {
    manager: FallbackManager,
    validator: CommandValidator,
}

impl CommandPipeline {
    pub fn new(
        primary: Option<Arc<dyn Interpreter>>,
        config: &PipelineConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        config.validate()?;
        let manager = FallbackManager::new(primary, config)?;
        let validator = CommandValidator::new(config.acceptance_threshold);
        let metadata = manager.primary_metadata();
        tracing::info!(
            primary = metadata.as_ref().map(|m| m.name.as_str()),
            backend = metadata.as_ref().map(|m| m.backend.as_str()),
            model = metadata.as_ref().and_then(|m| m.model.as_deref()),
            escalation_threshold = config.escalation_threshold,
            acceptance_threshold = config.acceptance_threshold,
            "command pipeline ready"
        );
        Ok(Self { manager, validator })
    }

    /// Pipeline with no primary interpreter: keyword parsing only.
    pub fn fallback_only(
        config: &PipelineConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::new(None, config)
    }

    /// Description of the primary interpreter, or `None` when running on
    /// keywords alone.
    pub fn primary(&self) -> Option<InterpreterMetadata> {
        self.manager.primary_metadata()
    }

    /// Resolve one utterance. Always returns exactly one command.
    pub async fn resolve(&self, text: &str) -> Resolution {
        let request_id = Uuid::new_v4();
        let start = std::time::Instant::now();

        let selection = self.manager.select(text).await;
        let verdict = self.validator.validate(&selection.command);
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            %request_id,
            action = %selection.command.action(),
            magnitude = %selection.command.magnitude(),
            confidence = selection.command.confidence(),
            source = %selection.command.source(),
            valid = verdict.is_valid,
            elapsed_ms = latency_ms,
            "resolved command"
        );

        Resolution {
            request_id,
            text: text.to_string(),
            command: selection.command,
            verdict,
            escalation: selection.escalation,
            latency_ms,
            resolved_at: OffsetDateTime::now_utc(),
        }
    }
}
