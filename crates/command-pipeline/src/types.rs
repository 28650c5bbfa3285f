//! Command vocabulary shared by every tier of the pipeline

use crate::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Confidence assigned to every keyword match of the fallback parser.
pub const FALLBACK_CONFIDENCE: f64 = 0.6;

/// Confidence of the safe-default STOP.
pub const SAFE_DEFAULT_CONFIDENCE: f64 = 0.0;

/// Default reference frame label.
pub const DEFAULT_FRAME: &str = "CAMERA";

/// Robot actions. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveForward,
    Retract,
    RotateLeft,
    RotateRight,
    Stop,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveForward,
        Action::Retract,
        Action::RotateLeft,
        Action::RotateRight,
        Action::Stop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::MoveUp => "MOVE_UP",
            Action::MoveDown => "MOVE_DOWN",
            Action::MoveLeft => "MOVE_LEFT",
            Action::MoveRight => "MOVE_RIGHT",
            Action::MoveForward => "MOVE_FORWARD",
            Action::Retract => "RETRACT",
            Action::RotateLeft => "ROTATE_LEFT",
            Action::RotateRight => "ROTATE_RIGHT",
            Action::Stop => "STOP",
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Action::Stop)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownAction(s.to_string()))
    }
}

/// Movement step size, each bound to a fixed distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Magnitude {
    Small,
    #[default]
    Mid,
    Big,
}

impl Magnitude {
    pub const ALL: [Magnitude; 3] = [Magnitude::Small, Magnitude::Mid, Magnitude::Big];

    pub fn as_str(&self) -> &'static str {
        match self {
            Magnitude::Small => "SMALL",
            Magnitude::Mid => "MID",
            Magnitude::Big => "BIG",
        }
    }

    /// Step distance in millimeters.
    pub const fn to_mm(self) -> f64 {
        match self {
            Magnitude::Small => 2.0,
            Magnitude::Mid => 4.0,
            Magnitude::Big => 6.0,
        }
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Magnitude {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Magnitude::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownMagnitude(s.to_string()))
    }
}

/// Pure magnitude lookup.
pub const fn magnitude_to_mm(magnitude: Magnitude) -> f64 {
    magnitude.to_mm()
}

/// Which tier produced a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Primary,
    Fallback,
    SafeDefault,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Primary => "primary",
            Source::Fallback => "fallback",
            Source::SafeDefault => "safe-default",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check_confidence(confidence: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&confidence) {
        Ok(confidence)
    } else {
        Err(ValidationError::ConfidenceOutOfRange(confidence))
    }
}

/// Unvalidated guess from the primary interpreter.
///
/// Holds the same fields as [`RobotCommand`] minus provenance. The
/// confidence range is checked on construction so a candidate can always
/// be promoted to a command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandCandidate {
    action: Action,
    magnitude: Magnitude,
    confidence: f64,
}

impl CommandCandidate {
    pub fn new(action: Action, magnitude: Magnitude, confidence: f64) -> Result<Self> {
        Ok(Self {
            action,
            magnitude,
            confidence: check_confidence(confidence)?,
        })
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn magnitude(&self) -> Magnitude {
        self.magnitude
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// A single bounded robot command.
///
/// Fields are private: `value_mm` is always derived from `magnitude`, and
/// deserialization goes through [`RobotCommandRecord`] which re-checks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RobotCommandRecord", into = "RobotCommandRecord")]
pub struct RobotCommand {
    action: Action,
    magnitude: Magnitude,
    value_mm: f64,
    confidence: f64,
    source: Source,
    frame: String,
    raw_text: String,
}

impl RobotCommand {
    /// Build a command, rejecting a confidence outside [0, 1].
    pub fn new(
        action: Action,
        magnitude: Magnitude,
        confidence: f64,
        source: Source,
        frame: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::assemble(
            action,
            magnitude,
            check_confidence(confidence)?,
            source,
            frame.into(),
            raw_text.into(),
        ))
    }

    /// Keyword match produced by the fallback parser.
    pub fn fallback(
        action: Action,
        magnitude: Magnitude,
        frame: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self::assemble(
            action,
            magnitude,
            FALLBACK_CONFIDENCE,
            Source::Fallback,
            frame.into(),
            raw_text.into(),
        )
    }

    /// The unconditional STOP issued when nothing else resolved.
    pub fn safe_default(frame: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self::assemble(
            Action::Stop,
            Magnitude::Mid,
            SAFE_DEFAULT_CONFIDENCE,
            Source::SafeDefault,
            frame.into(),
            raw_text.into(),
        )
    }

    /// Promote a primary-tier candidate.
    pub fn from_candidate(
        candidate: CommandCandidate,
        frame: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self::assemble(
            candidate.action,
            candidate.magnitude,
            candidate.confidence,
            Source::Primary,
            frame.into(),
            raw_text.into(),
        )
    }

    fn assemble(
        action: Action,
        magnitude: Magnitude,
        confidence: f64,
        source: Source,
        frame: String,
        raw_text: String,
    ) -> Self {
        Self {
            action,
            magnitude,
            value_mm: magnitude.to_mm(),
            confidence,
            source,
            frame,
            raw_text,
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn magnitude(&self) -> Magnitude {
        self.magnitude
    }

    pub fn value_mm(&self) -> f64 {
        self.value_mm
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn frame(&self) -> &str {
        &self.frame
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn is_stop(&self) -> bool {
        self.action.is_stop()
    }
}

/// Wire shape of a [`RobotCommand`], with every field settable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotCommandRecord {
    pub action: Action,
    pub magnitude: Magnitude,
    pub value_mm: f64,
    pub confidence: f64,
    pub source: Source,
    pub frame: String,
    pub raw_text: String,
}

impl TryFrom<RobotCommandRecord> for RobotCommand {
    type Error = ValidationError;

    fn try_from(record: RobotCommandRecord) -> Result<Self> {
        let expected = record.magnitude.to_mm();
        if record.value_mm != expected {
            return Err(ValidationError::ValueMismatch {
                magnitude: record.magnitude.as_str(),
                expected,
                value_mm: record.value_mm,
            });
        }
        RobotCommand::new(
            record.action,
            record.magnitude,
            record.confidence,
            record.source,
            record.frame,
            record.raw_text,
        )
    }
}

impl From<RobotCommand> for RobotCommandRecord {
    fn from(cmd: RobotCommand) -> Self {
        Self {
            action: cmd.action,
            magnitude: cmd.magnitude,
            value_mm: cmd.value_mm,
            confidence: cmd.confidence,
            source: cmd.source,
            frame: cmd.frame,
            raw_text: cmd.raw_text,
        }
    }
}
