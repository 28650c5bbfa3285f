//! Tier selection between the primary interpreter and the keyword parser
//!
//! One request makes at most one primary attempt and at most one fallback
//! attempt. There is no retry and no backoff.

use crate::config::PipelineConfig;
use crate::error::InterpretError;
use crate::fallback::KeywordParser;
use crate::traits::{Interpreter, InterpreterMetadata};
use crate::types::{CommandCandidate, RobotCommand};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Why the primary tier's output was not used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Escalation {
    /// No primary configured, or disabled by configuration
    PrimaryDisabled,
    /// Error or timeout from the primary
    PrimaryFailed { error: String },
    /// Primary answered below the escalation threshold
    LowConfidence { confidence: f64, threshold: f64 },
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Escalation::PrimaryDisabled => f.write_str("primary disabled"),
            Escalation::PrimaryFailed { error } => write!(f, "primary failed: {error}"),
            Escalation::LowConfidence {
                confidence,
                threshold,
            } => write!(f, "primary confidence {confidence:.2} < {threshold:.2}"),
        }
    }
}

impl From<InterpretError> for Escalation {
    fn from(err: InterpretError) -> Self {
        Escalation::PrimaryFailed {
            error: err.to_string(),
        }
    }
}

/// Candidate command chosen for one request.
#[derive(Debug, Clone)]
pub struct Selection {
    pub command: RobotCommand,
    /// `None` when the primary's answer was used
    pub escalation: Option<Escalation>,
}

/// Decides per request which tier's output becomes the candidate.
pub struct FallbackManager {
    primary: Option<Arc<dyn Interpreter>>,
    keywords: KeywordParser,
    escalation_threshold: f64,
    enable_fallback: bool,
    timeout: Duration,
    frame: String,
}

impl FallbackManager {
    /// Create a manager. `primary` is ignored when the config disables it.
    pub fn new(
        primary: Option<Arc<dyn Interpreter>>,
        config: &PipelineConfig,
    ) -> Result<Self, regex::Error> {
        let primary = primary.filter(|_| config.enable_primary);
        Ok(Self {
            primary,
            keywords: KeywordParser::new()?,
            escalation_threshold: config.escalation_threshold,
            enable_fallback: config.enable_fallback,
            timeout: config.primary_timeout(),
            frame: config.frame.clone(),
        })
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Backend description of the primary tier, if one is active.
    pub fn primary_metadata(&self) -> Option<InterpreterMetadata> {
        self.primary.as_ref().map(|primary| primary.metadata())
    }

    /// Produce the candidate command for `text`. Never fails.
    pub async fn select(&self, text: &str) -> Selection {
        let escalation = match &self.primary {
            Some(primary) => match self.try_primary(primary.as_ref(), text).await {
                Ok(candidate) => {
                    tracing::info!(
                        action = %candidate.action(),
                        confidence = candidate.confidence(),
                        "primary interpretation accepted"
                    );
                    return Selection {
                        command: RobotCommand::from_candidate(candidate, &self.frame, text),
                        escalation: None,
                    };
                }
                Err(escalation) => {
                    tracing::warn!(%escalation, "escalating to fallback parser");
                    escalation
                }
            },
            None => Escalation::PrimaryDisabled,
        };

        Selection {
            command: self.run_fallback(text, &escalation),
            escalation: Some(escalation),
        }
    }

    async fn try_primary(
        &self,
        primary: &dyn Interpreter,
        text: &str,
    ) -> Result<CommandCandidate, Escalation> {
        let candidate = tokio::time::timeout(self.timeout, primary.interpret(text))
            .await
            .map_err(|_| InterpretError::Timeout(self.timeout))??;

        if candidate.confidence() < self.escalation_threshold {
            return Err(Escalation::LowConfidence {
                confidence: candidate.confidence(),
                threshold: self.escalation_threshold,
            });
        }
        Ok(candidate)
    }

    fn run_fallback(&self, text: &str, escalation: &Escalation) -> RobotCommand {
        if !self.enable_fallback {
            tracing::warn!("fallback parser disabled, issuing safe default");
            return RobotCommand::safe_default(&self.frame, text);
        }

        match self.keywords.match_text(text, &self.frame) {
            Some(command) => command,
            None => {
                if matches!(escalation, Escalation::PrimaryDisabled) {
                    tracing::warn!(%text, "no keyword matched, issuing safe default");
                } else {
                    tracing::error!(%text, %escalation, "all tiers failed, issuing safe default");
                }
                RobotCommand::safe_default(&self.frame, text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedInterpreter;
    use crate::types::{Action, Magnitude, Source};

    fn manager(primary: Arc<ScriptedInterpreter>, config: PipelineConfig) -> FallbackManager {
        FallbackManager::new(Some(primary as Arc<dyn Interpreter>), &config).unwrap()
    }

    fn guess(action: Action, magnitude: Magnitude, confidence: f64) -> Arc<ScriptedInterpreter> {
        Arc::new(ScriptedInterpreter::with_guess(action, magnitude, confidence).unwrap())
    }

    #[tokio::test]
    async fn test_low_confidence_escalates() {
        let primary = guess(Action::MoveDown, Magnitude::Big, 0.4);
        let selection = manager(primary.clone(), PipelineConfig::default())
            .select("move up a little")
            .await;

        assert_eq!(selection.command.source(), Source::Fallback);
        assert_eq!(selection.command.action(), Action::MoveUp);
        assert_eq!(selection.command.magnitude(), Magnitude::Small);
        assert_eq!(
            selection.escalation,
            Some(Escalation::LowConfidence {
                confidence: 0.4,
                threshold: 0.5
            })
        );
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_confidence_above_escalation_keeps_primary() {
        for confidence in [0.5, 0.6] {
            let primary = guess(Action::RotateRight, Magnitude::Small, confidence);
            let selection = manager(primary, PipelineConfig::default())
                .select("twist it the other way")
                .await;

            assert_eq!(selection.command.source(), Source::Primary);
            assert_eq!(selection.command.action(), Action::RotateRight);
            assert_eq!(selection.command.value_mm(), 2.0);
            assert_eq!(selection.command.confidence(), confidence);
            assert!(selection.escalation.is_none());
        }
    }

    #[tokio::test]
    async fn test_just_below_escalation_threshold_escalates() {
        let primary = guess(Action::MoveDown, Magnitude::Big, 0.49999999);
        let selection = manager(primary, PipelineConfig::default())
            .select("move up a little")
            .await;

        assert_eq!(selection.command.source(), Source::Fallback);
        assert_eq!(selection.command.action(), Action::MoveUp);
        assert!(matches!(
            selection.escalation,
            Some(Escalation::LowConfidence { confidence, .. }) if confidence < 0.5
        ));
    }

    #[tokio::test]
    async fn test_error_escalates() {
        let primary = Arc::new(ScriptedInterpreter::failing(InterpretError::Network(
            "API down".into(),
        )));
        let selection = manager(primary.clone(), PipelineConfig::default())
            .select("retract")
            .await;

        assert_eq!(selection.command.action(), Action::Retract);
        assert_eq!(selection.command.source(), Source::Fallback);
        assert!(matches!(
            selection.escalation,
            Some(Escalation::PrimaryFailed { .. })
        ));
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_escalates() {
        let primary = Arc::new(
            ScriptedInterpreter::with_guess(Action::MoveUp, Magnitude::Mid, 0.99)
                .unwrap()
                .with_delay(Duration::from_secs(5)),
        );
        let config = PipelineConfig {
            primary_timeout_ms: 20,
            ..Default::default()
        };
        let started = std::time::Instant::now();
        let selection = manager(primary, config).select("go left").await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(selection.command.action(), Action::MoveLeft);
        assert_eq!(selection.command.source(), Source::Fallback);
        assert_eq!(
            selection.escalation,
            Some(Escalation::from(InterpretError::Timeout(
                Duration::from_millis(20)
            )))
        );
    }

    #[tokio::test]
    async fn test_disabled_primary_is_never_called() {
        let primary = guess(Action::MoveUp, Magnitude::Mid, 0.99);
        let config = PipelineConfig {
            enable_primary: false,
            ..Default::default()
        };
        let mgr = manager(primary.clone(), config);
        assert!(!mgr.has_primary());
        assert!(mgr.primary_metadata().is_none());

        let selection = mgr.select("advance").await;
        assert_eq!(selection.command.action(), Action::MoveForward);
        assert_eq!(selection.escalation, Some(Escalation::PrimaryDisabled));
        assert_eq!(primary.calls(), 0);
    }

    #[test]
    fn test_primary_metadata_comes_from_backend() {
        let mgr = manager(guess(Action::MoveUp, Magnitude::Mid, 0.9), PipelineConfig::default());
        let metadata = mgr.primary_metadata().unwrap();
        assert_eq!(metadata.backend, "mock");
        assert_eq!(metadata.model, None);
    }

    #[tokio::test]
    async fn test_no_primary_configured() {
        let mgr = FallbackManager::new(None, &PipelineConfig::default()).unwrap();
        let selection = mgr.select("freeze").await;
        assert_eq!(selection.command.action(), Action::Stop);
        assert_eq!(selection.command.source(), Source::Fallback);
    }

    #[tokio::test]
    async fn test_total_failure_returns_safe_default() {
        let primary = Arc::new(ScriptedInterpreter::failing(
            InterpretError::MalformedResponse("not json".into()),
        ));
        let selection = manager(primary, PipelineConfig::default())
            .select("how are you today")
            .await;

        assert_eq!(selection.command.action(), Action::Stop);
        assert_eq!(selection.command.confidence(), 0.0);
        assert_eq!(selection.command.source(), Source::SafeDefault);
    }

    #[tokio::test]
    async fn test_fallback_disabled_goes_straight_to_safe_default() {
        let primary = guess(Action::MoveUp, Magnitude::Mid, 0.2);
        let config = PipelineConfig {
            enable_fallback: false,
            ..Default::default()
        };
        let selection = manager(primary, config).select("move up").await;
        assert_eq!(selection.command.source(), Source::SafeDefault);
        assert_eq!(selection.command.action(), Action::Stop);
    }

    #[tokio::test]
    async fn test_frame_passthrough() {
        let primary = guess(Action::MoveUp, Magnitude::Mid, 0.9);
        let config = PipelineConfig {
            frame: "BASE_LINK".to_string(),
            ..Default::default()
        };
        let selection = manager(primary, config).select("up").await;
        assert_eq!(selection.command.frame(), "BASE_LINK");
        assert_eq!(selection.command.raw_text(), "up");
    }
}
