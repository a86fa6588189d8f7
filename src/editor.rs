use snafu::{ResultExt, Snafu, ensure};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::modification::{FileModification, LAST_LINE, Operation};

// --- Error Handling with Snafu ---
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EditError {
    #[snafu(display("File path must not be empty"))]
    EmptyPath,

    #[snafu(display("Create operation must start at line 1 (received: {start_line})"))]
    CreateStartLine { start_line: i64 },

    #[snafu(display("Invalid line numbers:\n{}", violations.join("\n")))]
    InvalidLineNumbers { violations: Vec<String> },

    #[snafu(display("Failed to read file '{}': {}", path.display(), source))]
    ReadFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("Failed to write file '{}': {}", path.display(), source))]
    WriteFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("Failed to remove file '{}': {}", path.display(), source))]
    RemoveFile {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl EditError {
    /// True for errors raised before touching the filesystem.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EditError::EmptyPath
                | EditError::CreateStartLine { .. }
                | EditError::InvalidLineNumbers { .. }
        )
    }
}

pub type Result<T, E = EditError> = std::result::Result<T, E>;

/// An inclusive, 1-based line range with sentinels already substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: i64,
    pub end: i64,
}

/// Substitute [`LAST_LINE`] with `line_count`. Every other value is kept as is.
pub fn resolve_line(line: i64, line_count: usize) -> i64 {
    if line == LAST_LINE {
        line_count as i64
    } else {
        line
    }
}

/// Resolve both bounds and check `1 <= start <= end <= line_count`.
///
/// Every violated rule is reported, not just the first one.
pub fn resolve_range(start_line: i64, end_line: i64, line_count: usize) -> Result<LineRange> {
    let count = line_count as i64;
    let start = resolve_line(start_line, line_count);
    let end = resolve_line(end_line, line_count);

    let mut violations = Vec::new();
    if start < 1 {
        violations.push(format!("Start line must be >= 1 (got {start})"));
    }
    if end > count {
        violations.push(format!("End line must be <= {count} (got {end})"));
    }
    if start > end {
        violations.push(format!("Start line ({start}) must be <= end line ({end})"));
    }
    ensure!(violations.is_empty(), InvalidLineNumbersSnafu { violations });

    Ok(LineRange { start, end })
}

/// Replace lines `start_line..=end_line` of `text` with `content` as one block.
///
/// `text` is split on `\n` only, so a trailing newline counts as an extra
/// empty line. `content` is inserted verbatim and never re-split.
pub fn replace_line_range(
    text: &str,
    start_line: i64,
    end_line: i64,
    content: &str,
) -> Result<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    let range = resolve_range(start_line, end_line, lines.len())?;

    let before = &lines[..(range.start - 1) as usize];
    let after = &lines[range.end as usize..];

    let mut spliced = Vec::with_capacity(before.len() + 1 + after.len());
    spliced.extend_from_slice(before);
    spliced.push(content);
    spliced.extend_from_slice(after);

    Ok(spliced.join("\n"))
}

/// Applies [`FileModification`]s to the local filesystem.
///
/// Each call performs at most one write or one delete, and none when
/// validation fails.
pub struct FileEditor;

impl FileEditor {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, modification: &FileModification) -> Result<()> {
        let path = modification.file_path.as_path();
        ensure!(!path.as_os_str().is_empty(), EmptyPathSnafu);

        debug!(
            "Executing {} on {}",
            modification.operation,
            path.display()
        );

        match modification.operation {
            Operation::Create => {
                self.create(path, modification.start_line, &modification.content)
                    .await
            }
            Operation::Update => {
                self.update(
                    path,
                    modification.start_line,
                    modification.end_line,
                    &modification.content,
                )
                .await
            }
            Operation::Delete => self.delete(path).await,
        }
    }

    async fn create(&self, path: &Path, start_line: i64, content: &str) -> Result<()> {
        ensure!(start_line == 1, CreateStartLineSnafu { start_line });

        fs::write(path, content).await.context(WriteFileSnafu {
            path: path.to_path_buf(),
        })?;

        info!("Created {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    async fn update(
        &self,
        path: &Path,
        start_line: i64,
        end_line: i64,
        content: &str,
    ) -> Result<()> {
        let current = fs::read_to_string(path).await.context(ReadFileSnafu {
            path: path.to_path_buf(),
        })?;

        let new_content = replace_line_range(&current, start_line, end_line, content)?;

        fs::write(path, &new_content).await.context(WriteFileSnafu {
            path: path.to_path_buf(),
        })?;

        info!(
            "Updated {} lines {}..{}",
            path.display(),
            start_line,
            end_line
        );
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.context(RemoveFileSnafu {
            path: path.to_path_buf(),
        })?;

        info!("Deleted {}", path.display());
        Ok(())
    }
}

impl Default for FileEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply one modification with a default [`FileEditor`].
pub async fn execute_file_modification(modification: &FileModification) -> Result<()> {
    FileEditor::new().execute(modification).await
}
