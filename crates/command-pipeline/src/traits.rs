use crate::error::InterpretError;
use crate::types::CommandCandidate;
use async_trait::async_trait;

/// Primary interpreter capability: given text, return a structured guess or fail.
///
/// Implementations may block on I/O. Callers bound the wait themselves, so an
/// implementation does not need its own timeout, though it may have one.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Interpret one utterance.
    async fn interpret(&self, text: &str) -> Result<CommandCandidate, InterpretError>;

    /// Get interpreter metadata
    fn metadata(&self) -> InterpreterMetadata;
}

/// Metadata about an interpreter backend
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterMetadata {
    pub name: String,
    pub backend: String,
    pub model: Option<String>,
}
