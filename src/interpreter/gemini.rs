use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{OptionExt, ResultExt, location};
use std::fmt;
use tracing::debug;

use super::{
    DeserializeSnafu, EmptyResponseSnafu, InstructionInterpreter, InterpretError,
    MissingApiKeySnafu, PromptSnafu, RequestSnafu, parse_modification,
};
use crate::config::GeminiConfig;
use crate::modification::{FileModification, file_modification_schema};
use crate::prompt::render_prompt;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.into()),
                thought: None,
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate with thought parts skipped
    pub fn text(&self) -> Option<String> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text.clone())
            .reduce(|acc, s| acc + &s)
    }
}

/// Interprets instructions with Gemini structured output.
#[derive(Clone)]
pub struct GeminiInterpreter {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl fmt::Debug for GeminiInterpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiInterpreter")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiInterpreter {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from config, reading `GEMINI_API_KEY` (and `.env`) when the
    /// config has no key.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, InterpretError> {
        let configured = config.api_key.as_deref().filter(|key| !key.is_empty());
        let env_key = if configured.is_some() {
            None
        } else {
            // A missing .env file is fine
            let _ = dotenvy::dotenv();
            std::env::var(API_KEY_ENV).ok()
        };
        let api_key = pick_api_key(configured, env_key).context(MissingApiKeySnafu)?;

        Ok(Self::new(api_key, &config.model, &config.base_url))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn model_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model.trim_start_matches("models/")
        )
    }

    pub fn build_request(prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: file_modification_schema(),
            },
        }
    }

    /// Send one prompt and return the raw text of the answer
    pub async fn generate(&self, prompt: &str) -> Result<String, InterpretError> {
        let request = Self::build_request(prompt);

        let response = self
            .client
            .post(self.model_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context(RequestSnafu)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InterpretError::Api {
                status: status.as_u16(),
                message: error_text,
                location: location!(),
            });
        }

        let text = response.text().await.context(RequestSnafu)?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).with_context(|_| DeserializeSnafu { text })?;

        parsed.text().context(EmptyResponseSnafu)
    }
}

#[async_trait]
impl InstructionInterpreter for GeminiInterpreter {
    async fn interpret(&self, instruction: &str) -> Result<FileModification, InterpretError> {
        let prompt = render_prompt(instruction).context(PromptSnafu)?;
        debug!("Requesting file modification from {}", self.model);

        let text = self.generate(&prompt).await?;
        debug!("Model response: {}", text);

        parse_modification(&text)
    }
}

fn pick_api_key(configured: Option<&str>, env_key: Option<String>) -> Option<String> {
    match configured {
        Some(key) if !key.is_empty() => Some(key.to_string()),
        _ => env_key.filter(|key| !key.is_empty()),
    }
}
