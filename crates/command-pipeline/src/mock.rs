//! Scripted interpreter for development and testing

use crate::error::InterpretError;
use crate::traits::{Interpreter, InterpreterMetadata};
use crate::types::{Action, CommandCandidate, Magnitude};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Interpreter that replays one fixed reply, optionally after a delay.
pub struct ScriptedInterpreter {
    reply: Result<CommandCandidate, InterpretError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedInterpreter {
    pub fn answering(candidate: CommandCandidate) -> Self {
        Self {
            reply: Ok(candidate),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Shorthand for a candidate built from its parts.
    pub fn with_guess(
        action: Action,
        magnitude: Magnitude,
        confidence: f64,
    ) -> Result<Self, crate::ValidationError> {
        Ok(Self::answering(CommandCandidate::new(
            action, magnitude, confidence,
        )?))
    }

    pub fn failing(error: InterpretError) -> Self {
        Self {
            reply: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before replying, to exercise the caller's timeout.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `interpret` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Interpreter for ScriptedInterpreter {
    async fn interpret(&self, text: &str) -> Result<CommandCandidate, InterpretError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(%text, "scripted interpreter called");
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }

    fn metadata(&self) -> InterpreterMetadata {
        InterpreterMetadata {
            name: "Scripted Interpreter".to_string(),
            backend: "mock".to_string(),
            model: None,
        }
    }
}
