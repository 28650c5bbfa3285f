//! command-pipeline: natural-language text to one bounded robot command
//!
//! Resolution runs in two tiers. A primary interpreter (typically a hosted
//! language model) is asked first under a bounded timeout; when it fails,
//! times out or reports low confidence, a deterministic keyword parser takes
//! over. Whatever comes out is gated by a confidence validator that always
//! lets STOP through. Every call yields exactly one command: when nothing
//! can be resolved the answer is a safe-default STOP.

mod types;
pub use types::{
    magnitude_to_mm, Action, CommandCandidate, Magnitude, RobotCommand, RobotCommandRecord,
    Source, DEFAULT_FRAME, FALLBACK_CONFIDENCE, SAFE_DEFAULT_CONFIDENCE,
};

mod error;
pub use error::{ConfigError, InterpretError, Result, ValidationError};

pub mod config;
pub use config::{load_config, LlmConfig, PipelineConfig};

pub mod fallback;
pub use fallback::KeywordParser;

mod traits;
pub use traits::{Interpreter, InterpreterMetadata};

pub mod prompt;
pub mod response;

mod manager;
pub use manager::{Escalation, FallbackManager, Selection};

mod validator;
pub use validator::{CommandValidator, Verdict, DEFAULT_ACCEPTANCE_THRESHOLD};

mod pipeline;
pub use pipeline::{CommandPipeline, Resolution};

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "llm-http")]
pub mod llm_http;

use std::sync::Arc;

/// Initialize the command pipeline system
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Initializing command pipeline");
    Ok(())
}

/// Create the primary interpreter described by `config`.
///
/// Returns `None` when the primary is disabled, no backend is compiled in, or
/// the backend cannot be set up (for example a missing API key). The pipeline
/// then runs on the keyword parser alone.
pub fn create_interpreter(
    config: &PipelineConfig,
) -> Result<Option<Arc<dyn Interpreter>>, Box<dyn std::error::Error + Send + Sync>> {
    if !config.enable_primary {
        return Ok(None);
    }

    #[cfg(feature = "llm-http")]
    {
        match llm_http::HttpInterpreter::new(config) {
            Ok(interpreter) => {
                let metadata = interpreter.metadata();
                tracing::info!(
                    name = %metadata.name,
                    backend = %metadata.backend,
                    model = metadata.model.as_deref(),
                    "using HTTP interpreter"
                );
                Ok(Some(Arc::new(interpreter)))
            }
            Err(e) => {
                tracing::warn!(error = %e, "HTTP interpreter unavailable, using keyword parser only");
                Ok(None)
            }
        }
    }

    #[cfg(not(feature = "llm-http"))]
    {
        tracing::warn!("primary enabled but no interpreter backend compiled in");
        Ok(None)
    }
}

/// Create a pipeline from configuration, with whatever primary it describes
pub fn create_pipeline(
    config: &PipelineConfig,
) -> Result<CommandPipeline, Box<dyn std::error::Error + Send + Sync>> {
    let primary = create_interpreter(config)?;
    CommandPipeline::new(primary, config)
}
