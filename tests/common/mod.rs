#![allow(dead_code)]

use async_trait::async_trait;
use genedit::interpreter::parse_modification;
use genedit::{FileModification, GeminiInterpreter, InstructionInterpreter, InterpretError};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-key";
pub const TEST_MODEL: &str = "gemini-2.0-flash-exp";
pub const FIVE_LINES: &str = "Line 1\nLine 2\nLine 3\nLine 4\nLine 5";

pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(name);
    std::fs::write(&file_path, content).expect("Failed to write test file");
    file_path
}

pub fn read_file(file_path: &Path) -> String {
    std::fs::read_to_string(file_path).expect("Failed to read test file")
}

/// The JSON text the model would answer with
pub fn modification_json(
    file_path: &Path,
    operation: &str,
    content: &str,
    start_line: i64,
    end_line: i64,
) -> String {
    json!({
        "filePath": file_path,
        "operation": operation,
        "content": content,
        "startLine": start_line,
        "endLine": end_line,
    })
    .to_string()
}

/// Interpreter double that answers every instruction with the same model output
pub struct ScriptedInterpreter {
    response: String,
    instructions: Mutex<Vec<String>>,
}

impl ScriptedInterpreter {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            instructions: Mutex::new(Vec::new()),
        }
    }

    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }
}

#[async_trait]
impl InstructionInterpreter for ScriptedInterpreter {
    async fn interpret(&self, instruction: &str) -> Result<FileModification, InterpretError> {
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());
        parse_modification(&self.response)
    }
}

/// A `generateContent` response body carrying `text` as the only part
pub fn gemini_response_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {
            "promptTokenCount": 21,
            "candidatesTokenCount": 30,
            "totalTokenCount": 51
        },
        "modelVersion": TEST_MODEL
    })
}

pub fn generate_content_path() -> String {
    format!("/v1beta/models/{TEST_MODEL}:generateContent")
}

pub async fn mount_gemini_response(mock_server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .and(header("x-goog-api-key", TEST_API_KEY))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

pub async fn mount_gemini_text(mock_server: &MockServer, text: &str) {
    mount_gemini_response(
        mock_server,
        ResponseTemplate::new(200).set_body_json(gemini_response_body(text)),
    )
    .await;
}

pub fn gemini_interpreter(mock_server: &MockServer) -> GeminiInterpreter {
    GeminiInterpreter::new(TEST_API_KEY, TEST_MODEL, mock_server.uri())
}
