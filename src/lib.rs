pub mod config;
pub mod editor;
pub mod interpreter;
pub mod modification;
pub mod prompt;

use snafu::{ResultExt, Snafu};
use tracing::error;

pub use config::{Config, ErrorPolicy};
pub use editor::{EditError, FileEditor, execute_file_modification};
pub use interpreter::{
    GeminiInterpreter, InstructionInterpreter, InterpretError, generate_file_modification,
};
pub use modification::{FileModification, LAST_LINE, Operation, file_modification_schema};

pub const LOG_ENV: &str = "GENEDIT_LOG";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Config Error: {source}"))]
    Config {
        #[snafu(source)]
        source: config::ConfigError,
    },

    #[snafu(display("Failed to interpret instruction: {source}"))]
    Interpret {
        #[snafu(source)]
        source: InterpretError,
    },

    #[snafu(display("{source}"))]
    Edit {
        #[snafu(source)]
        source: EditError,
    },
}

/// Coarse classification of [`Error`] for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad line numbers or path, caught before any write
    Validation,
    /// Read, write or delete failed
    Storage,
    /// No API key available
    Authentication,
    /// The model's answer was not a usable modification record
    Parse,
    /// The model endpoint could not be reached or returned an error status
    Transport,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. } => ErrorKind::Config,
            Error::Interpret { source } => match source {
                InterpretError::MissingApiKey => ErrorKind::Authentication,
                InterpretError::Request { .. } | InterpretError::Api { .. } => {
                    ErrorKind::Transport
                }
                InterpretError::Prompt { .. }
                | InterpretError::Deserialize { .. }
                | InterpretError::EmptyResponse
                | InterpretError::InvalidModification { .. } => ErrorKind::Parse,
            },
            Error::Edit { source } if source.is_validation() => ErrorKind::Validation,
            Error::Edit { .. } => ErrorKind::Storage,
        }
    }
}

pub type SResult<T> = Result<T, Error>;

// Builds a tracing subscriber from the `GENEDIT_LOG` environment variable
// If the variables value is malformed or missing, sets the default log level to ERROR
pub fn init_logger() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let builder = FmtSubscriber::builder().with_env_filter(EnvFilter::from_env(LOG_ENV));

    // Ignore the error if a global subscriber is already installed
    let _ = builder
        .with_writer(std::io::stderr)
        .without_time()
        .with_ansi(false)
        .try_init();
}

fn settle(policy: ErrorPolicy, result: SResult<()>) -> SResult<()> {
    match result {
        Err(e) if policy == ErrorPolicy::LogAndSwallow => {
            error!("Error applying file modification: {e}");
            Ok(())
        }
        result => result,
    }
}

/// Interprets instructions and applies the resulting edit.
pub struct FileModifier<I> {
    interpreter: I,
    editor: FileEditor,
    error_policy: ErrorPolicy,
}

impl<I: InstructionInterpreter> FileModifier<I> {
    pub fn new(interpreter: I) -> Self {
        Self {
            interpreter,
            editor: FileEditor::new(),
            error_policy: ErrorPolicy::default(),
        }
    }

    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    pub async fn apply(&self, instruction: &str) -> SResult<()> {
        settle(self.error_policy, self.try_apply(instruction).await)
    }

    async fn try_apply(&self, instruction: &str) -> SResult<()> {
        let modification = generate_file_modification(instruction, &self.interpreter)
            .await
            .context(InterpretSnafu)?;

        self.editor
            .execute(&modification)
            .await
            .context(EditSnafu)
    }
}

/// Turn `text` into a file modification and apply it.
///
/// With an interpreter, errors always propagate. Without one, the config is
/// loaded, a [`GeminiInterpreter`] is built from it and the configured
/// [`ErrorPolicy`] applies.
pub async fn apply_file_modification(
    text: &str,
    interpreter: Option<&dyn InstructionInterpreter>,
) -> SResult<()> {
    if let Some(interpreter) = interpreter {
        return FileModifier::new(interpreter).apply(text).await;
    }

    let config = Config::new().context(ConfigSnafu)?;
    match GeminiInterpreter::from_config(&config.gemini) {
        Ok(interpreter) => {
            FileModifier::new(interpreter)
                .with_error_policy(config.error_policy)
                .apply(text)
                .await
        }
        Err(source) => settle(config.error_policy, Err(Error::Interpret { source })),
    }
}
