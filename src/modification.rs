use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::path::PathBuf;

/// Line number placeholder that resolves to the last line of the file.
pub const LAST_LINE: i64 = -1;

/// The kind of change a [`FileModification`] makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// A single file edit as produced by the model.
///
/// Line numbers are 1-based and inclusive. Either bound may be [`LAST_LINE`]
/// for updates. `content`, `start_line` and `end_line` are ignored for deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileModification {
    pub file_path: PathBuf,
    pub operation: Operation,
    pub content: String,
    #[serde(deserialize_with = "deserialize_line_number")]
    pub start_line: i64,
    #[serde(deserialize_with = "deserialize_line_number")]
    pub end_line: i64,
}

impl FileModification {
    pub fn create(file_path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            operation: Operation::Create,
            content: content.into(),
            start_line: 1,
            end_line: 1,
        }
    }

    pub fn update(
        file_path: impl Into<PathBuf>,
        start_line: i64,
        end_line: i64,
        content: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            operation: Operation::Update,
            content: content.into(),
            start_line,
            end_line,
        }
    }

    pub fn delete(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            operation: Operation::Delete,
            content: String::new(),
            start_line: 1,
            end_line: 1,
        }
    }
}

// The schema declares line numbers as NUMBER, so the model may answer `2.0`.
fn deserialize_line_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(line) = number.as_i64() {
        return Ok(line);
    }
    match number.as_f64() {
        Some(line)
            if line.fract() == 0.0 && line >= i64::MIN as f64 && line < i64::MAX as f64 =>
        {
            Ok(line as i64)
        }
        _ => Err(D::Error::custom(format!(
            "line number must be an integer (got {number})"
        ))),
    }
}

/// Response schema handed to the model so its output matches [`FileModification`].
pub fn file_modification_schema() -> Value {
    json!({
        "description": "Single file modification operation (Create, Update, Delete)",
        "type": "OBJECT",
        "properties": {
            "filePath": {
                "type": "STRING",
                "description": "Path to the file that needs to be modified",
                "nullable": false
            },
            "operation": {
                "type": "STRING",
                "description": "Type of operation (create, update, delete)",
                "enum": ["create", "update", "delete"],
                "nullable": false
            },
            "content": {
                "type": "STRING",
                "description": "Content for create/update operations",
                "nullable": false
            },
            "startLine": {
                "type": "NUMBER",
                "description": "Starting line number (1-based, always 1 for create, -1 for last line in update)",
                "nullable": false
            },
            "endLine": {
                "type": "NUMBER",
                "description": "Ending line number (1-based, -1 for last line in update)",
                "nullable": false
            }
        },
        "required": ["filePath", "operation", "content", "startLine", "endLine"]
    })
}
