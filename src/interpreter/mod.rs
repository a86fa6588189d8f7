pub mod gemini;

use async_trait::async_trait;
use snafu::{Location, ResultExt, Snafu};
use std::sync::Arc;
use tracing::debug;

use crate::modification::FileModification;

pub use gemini::GeminiInterpreter;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum InterpretError {
    #[snafu(display("GEMINI_API_KEY environment variable is not set"))]
    MissingApiKey,

    #[snafu(display("Failed to render prompt"))]
    Prompt {
        #[snafu(source)]
        source: minijinja::Error,
    },

    #[snafu(display("Request failed"))]
    Request {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        source: reqwest::Error,
    },

    #[snafu(display("Request bad status {status}: {message}"))]
    Api {
        status: u16,
        message: String,
        location: Location,
    },

    #[snafu(display("Request deserialize failed"))]
    Deserialize {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        source: serde_json::Error,
        text: String,
    },

    #[snafu(display("Model response contained no text"))]
    EmptyResponse,

    #[snafu(display("Model response is not a valid file modification: {source}"))]
    InvalidModification {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        source: serde_json::Error,
        text: String,
    },
}

/// Turns a free-text instruction into a [`FileModification`].
#[async_trait]
pub trait InstructionInterpreter: Send + Sync {
    async fn interpret(&self, instruction: &str) -> Result<FileModification, InterpretError>;
}

#[async_trait]
impl<T: InstructionInterpreter + ?Sized> InstructionInterpreter for &T {
    async fn interpret(&self, instruction: &str) -> Result<FileModification, InterpretError> {
        (**self).interpret(instruction).await
    }
}

#[async_trait]
impl<T: InstructionInterpreter + ?Sized> InstructionInterpreter for Box<T> {
    async fn interpret(&self, instruction: &str) -> Result<FileModification, InterpretError> {
        (**self).interpret(instruction).await
    }
}

#[async_trait]
impl<T: InstructionInterpreter + ?Sized> InstructionInterpreter for Arc<T> {
    async fn interpret(&self, instruction: &str) -> Result<FileModification, InterpretError> {
        (**self).interpret(instruction).await
    }
}

/// Parse the model's structured output
pub fn parse_modification(text: &str) -> Result<FileModification, InterpretError> {
    serde_json::from_str(text).context(InvalidModificationSnafu { text })
}

pub async fn generate_file_modification(
    instruction: &str,
    interpreter: &dyn InstructionInterpreter,
) -> Result<FileModification, InterpretError> {
    let modification = interpreter.interpret(instruction).await?;
    debug!(
        "Interpreted instruction as {} on {}",
        modification.operation,
        modification.file_path.display()
    );
    Ok(modification)
}
