//! Acceptance gate applied to every resolved command

use crate::types::RobotCommand;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.7;

/// Outcome of validating one command. Informational only; the command is
/// never altered or dropped by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_valid: bool,
    pub reason: String,
}

impl Verdict {
    pub fn accepted() -> Self {
        Self {
            is_valid: true,
            reason: "ok".to_string(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: reason.into(),
        }
    }
}

/// Confidence gate with an unconditional STOP exemption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandValidator {
    acceptance_threshold: f64,
}

impl Default for CommandValidator {
    fn default() -> Self {
        Self::new(DEFAULT_ACCEPTANCE_THRESHOLD)
    }
}

impl CommandValidator {
    pub fn new(acceptance_threshold: f64) -> Self {
        Self {
            acceptance_threshold,
        }
    }

    pub fn acceptance_threshold(&self) -> f64 {
        self.acceptance_threshold
    }

    /// STOP is always valid. Anything else needs `confidence >= threshold`.
    pub fn validate(&self, command: &RobotCommand) -> Verdict {
        if command.is_stop() {
            return Verdict::accepted();
        }
        if command.confidence() >= self.acceptance_threshold {
            Verdict::accepted()
        } else {
            Verdict::rejected(format!(
                "confidence {:.2} < {:.2}",
                command.confidence(),
                self.acceptance_threshold
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Magnitude, Source, DEFAULT_FRAME};

    fn command(action: Action, confidence: f64) -> RobotCommand {
        RobotCommand::new(
            action,
            Magnitude::Mid,
            confidence,
            Source::Primary,
            DEFAULT_FRAME,
            "test",
        )
        .unwrap()
    }

    #[test]
    fn test_stop_bypasses_threshold() {
        let validator = CommandValidator::default();
        for confidence in [0.0, 0.1, 0.69, 1.0] {
            let verdict = validator.validate(&command(Action::Stop, confidence));
            assert_eq!(verdict, Verdict::accepted());
        }
        let safe = RobotCommand::safe_default(DEFAULT_FRAME, "banana");
        assert!(validator.validate(&safe).is_valid);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let validator = CommandValidator::default();
        assert!(validator.validate(&command(Action::MoveUp, 0.7)).is_valid);
        assert!(validator.validate(&command(Action::MoveUp, 0.95)).is_valid);

        assert!(!validator.validate(&command(Action::MoveUp, 0.699)).is_valid);
        assert!(!validator.validate(&command(Action::MoveUp, 0.6999)).is_valid);
        assert!(!validator.validate(&command(Action::MoveUp, 0.69999999)).is_valid);

        let verdict = validator.validate(&command(Action::RotateLeft, 0.65));
        assert!(!verdict.is_valid);
        assert_eq!(verdict.reason, "confidence 0.65 < 0.70");
    }

    #[test]
    fn test_custom_threshold() {
        let validator = CommandValidator::new(0.5);
        assert!(validator.validate(&command(Action::Retract, 0.6)).is_valid);
        assert!(!validator.validate(&command(Action::Retract, 0.49)).is_valid);
    }

    #[test]
    fn test_fallback_match_is_below_default_gate() {
        let validator = CommandValidator::default();
        let cmd = RobotCommand::fallback(Action::MoveLeft, Magnitude::Small, DEFAULT_FRAME, "left");
        assert!(!validator.validate(&cmd).is_valid);
    }
}
