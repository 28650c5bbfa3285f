use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = ValidationError> = core::result::Result<T, E>;

/// Broken command-model invariants. Seeing one means a defect in the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("value_mm {value_mm} does not match magnitude {magnitude} ({expected} mm)")]
    ValueMismatch {
        magnitude: &'static str,
        expected: f64,
        value_mm: f64,
    },
    #[error("confidence {0} outside [0.0, 1.0]")]
    ConfidenceOutOfRange(f64),
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("unknown magnitude: {0}")]
    UnknownMagnitude(String),
}

/// Failure of the primary interpreter. Always recovered by escalation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("service refused: {0}")]
    Refused(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be within [0.0, 1.0], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("primary_timeout_ms must be greater than zero")]
    ZeroTimeout,
    #[error("frame label must not be empty")]
    EmptyFrame,
}

impl From<ValidationError> for InterpretError {
    fn from(err: ValidationError) -> Self {
        InterpretError::MalformedResponse(err.to_string())
    }
}
