use etcetera::{AppStrategy, AppStrategyArgs, choose_app_strategy};
use serde::Deserialize;
use snafu::{ResultExt, Snafu};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub const CONFIG_PATH_ENV: &str = "GENEDIT_CONFIG_PATH";

/// Errors while getting the config
#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(transparent)]
    IO { source: io::Error },

    #[snafu(display("Error deserializing config. Double check all fields are valid"))]
    TomlDeserialize {
        #[snafu(source)]
        source: toml::de::Error,
    },

    #[snafu(display("Unable to locate the user config directory"))]
    ConfigDir {
        #[snafu(source)]
        source: etcetera::HomeDirError,
    },
}

fn get_config_file_path() -> Result<PathBuf, ConfigError> {
    // On Linux/macOS this is $HOME/.config/genedit/config.toml
    let strategy = choose_app_strategy(AppStrategyArgs {
        top_level_domain: "com".to_string(),
        author: "genedit".to_string(),
        app_name: "genedit".to_string(),
    })
    .context(ConfigDirSnafu)?;

    Ok(strategy.config_dir().join("config.toml"))
}

/// What the top-level entry point does with a failed modification.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Log the error and report success.
    LogAndSwallow,
}

/// Settings for the Gemini `generateContent` endpoint
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// Falls back to the `GEMINI_API_KEY` environment variable when unset
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

/// The config we deserialize directly from toml
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        let config_file_path = if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
            tracing::debug!("Using config path from {CONFIG_PATH_ENV}: {}", env_path);
            PathBuf::from(env_path)
        } else {
            get_config_file_path()?
        };

        tracing::debug!("Looking for config file at: {:?}", config_file_path);
        if fs::exists(&config_file_path)? {
            tracing::debug!("Found user config file");
            Config::from_file(&config_file_path)
        } else {
            tracing::debug!("No user config file found, using defaults");
            Config::load_default()
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Config::from_toml(&contents)
    }

    pub fn load_default() -> Result<Self, ConfigError> {
        Config::from_toml(include_str!("../default_config.toml"))
    }

    fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).context(TomlDeserializeSnafu)
    }
}
