//! Deterministic keyword parser used when the primary interpreter cannot be trusted
//!
//! Matching is table driven. The tables are ordered and the order is part of
//! the contract:
//!
//! 1. [`STOP_TRIGGERS`] is checked before anything else. A stop phrase wins
//!    even when a direction or magnitude keyword appears in the same utterance.
//! 2. [`ACTION_TRIGGERS`] is scanned top to bottom and the first group with a
//!    hit decides the action. Rotations come before bare left/right.
//! 3. [`MAGNITUDE_TRIGGERS`] is scanned independently of the action; SMALL
//!    cues win over BIG cues, and no cue means MID.
//!
//! Each trigger is a regex fragment matched on whole words against the
//! normalized text.

use crate::types::{Action, Magnitude, RobotCommand};
use regex::Regex;

/// Phrases that always resolve to STOP.
pub const STOP_TRIGGERS: &[&str] = &[
    "stop",
    "halt",
    "freeze",
    "hold",
    r"don'?t\s+move",
    r"do\s+not\s+move",
];

/// Action groups in priority order.
pub const ACTION_TRIGGERS: &[(Action, &[&str])] = &[
    (
        Action::RotateLeft,
        &[
            r"rotate\s+left",
            r"twist\s+left",
            r"turn\s+left",
            r"counter[\s-]?clockwise",
            r"anti[\s-]?clockwise",
        ],
    ),
    (
        Action::RotateRight,
        &[r"rotate\s+right", r"twist\s+right", r"turn\s+right", "clockwise"],
    ),
    (Action::MoveUp, &[r"move\s+up", "up", "raise", "higher"]),
    (Action::MoveDown, &[r"move\s+down", "down", "lower"]),
    (Action::MoveLeft, &[r"move\s+left", "left"]),
    (Action::MoveRight, &[r"move\s+right", "right"]),
    (
        Action::MoveForward,
        &[r"move\s+forward", "forward", "advance", "push", "deeper"],
    ),
    (Action::Retract, &["retract", "back", "pull", "withdraw"]),
];

/// Magnitude cues, SMALL first.
pub const MAGNITUDE_TRIGGERS: &[(Magnitude, &[&str])] = &[
    (
        Magnitude::Small,
        &[r"a\s+little", "slightly", "nudge", "tiny", "bit", "smidge"],
    ),
    (
        Magnitude::Big,
        &[r"a\s+lot", "significantly", "way", "far", "big", "much"],
    ),
];

fn compile(triggers: &[&str]) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\b(?:{})\b", triggers.join("|")))
}

/// Lowercase, trim and fold typographic apostrophes.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Local, pure, pattern-based command parser.
///
/// Construction compiles the trigger tables and is the only fallible step;
/// [`KeywordParser::parse`] never fails.
#[derive(Debug, Clone)]
pub struct KeywordParser {
    stop: Regex,
    actions: Vec<(Action, Regex)>,
    magnitudes: Vec<(Magnitude, Regex)>,
}

impl KeywordParser {
    pub fn new() -> Result<Self, regex::Error> {
        let stop = compile(STOP_TRIGGERS)?;
        let actions = ACTION_TRIGGERS
            .iter()
            .map(|(action, triggers)| Ok((*action, compile(triggers)?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        let magnitudes = MAGNITUDE_TRIGGERS
            .iter()
            .map(|(magnitude, triggers)| Ok((*magnitude, compile(triggers)?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            stop,
            actions,
            magnitudes,
        })
    }

    /// Resolve text to a command. Unrecognized text yields the safe default.
    pub fn parse(&self, text: &str, frame: &str) -> RobotCommand {
        self.match_text(text, frame)
            .unwrap_or_else(|| RobotCommand::safe_default(frame, text))
    }

    /// Resolve text to a keyword match, or `None` when nothing matched.
    pub fn match_text(&self, text: &str, frame: &str) -> Option<RobotCommand> {
        let normalized = normalize(text);

        if self.stop.is_match(&normalized) {
            tracing::debug!(text = %normalized, "stop trigger matched");
            return Some(RobotCommand::fallback(
                Action::Stop,
                Magnitude::Mid,
                frame,
                text,
            ));
        }

        let action = self.detect_action(&normalized)?;
        let magnitude = self.detect_magnitude(&normalized);
        tracing::debug!(text = %normalized, %action, %magnitude, "action trigger matched");
        Some(RobotCommand::fallback(action, magnitude, frame, text))
    }

    fn detect_action(&self, normalized: &str) -> Option<Action> {
        self.actions
            .iter()
            .find(|(_, re)| re.is_match(normalized))
            .map(|(action, _)| *action)
    }

    fn detect_magnitude(&self, normalized: &str) -> Magnitude {
        self.magnitudes
            .iter()
            .find(|(_, re)| re.is_match(normalized))
            .map(|(magnitude, _)| *magnitude)
            .unwrap_or_default()
    }
}
