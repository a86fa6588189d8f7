mod common;

use common::{FIVE_LINES, ScriptedInterpreter, modification_json, read_file, write_file};
use genedit::{ErrorKind, ErrorPolicy, FileModifier, apply_file_modification};
use tempfile::TempDir;

#[tokio::test]
async fn test_create_file_from_instruction() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = write_file(&temp_dir, "test.txt", "");
    let interpreter =
        ScriptedInterpreter::new(modification_json(&file_path, "create", "Hello World", 1, 1));

    let instruction = "Create a new file test.txt with content \"Hello World\"";
    apply_file_modification(instruction, Some(&interpreter))
        .await
        .unwrap();

    assert_eq!(read_file(&file_path), "Hello World");
    assert_eq!(interpreter.instructions(), vec![instruction.to_string()]);
}

#[tokio::test]
async fn test_update_lines_from_instruction() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = write_file(&temp_dir, "test.txt", FIVE_LINES);
    let interpreter =
        ScriptedInterpreter::new(modification_json(&file_path, "update", "New Content", 2, 4));

    apply_file_modification(
        "Update lines 2-4 in test.txt with \"New Content\"",
        Some(&interpreter),
    )
    .await
    .unwrap();

    assert_eq!(read_file(&file_path), "Line 1\nNew Content\nLine 5");
}

#[tokio::test]
async fn test_update_last_line_with_sentinel() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = write_file(&temp_dir, "test.txt", "Line 1\nLine 2\nLine 3");
    let interpreter =
        ScriptedInterpreter::new(modification_json(&file_path, "update", "Final Line", -1, -1));

    apply_file_modification(
        "Update the last line in test.txt with \"Final Line\"",
        Some(&interpreter),
    )
    .await
    .unwrap();

    assert_eq!(read_file(&file_path), "Line 1\nLine 2\nFinal Line");
}

#[tokio::test]
async fn test_delete_file_from_instruction() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = write_file(&temp_dir, "test.txt", "");
    let interpreter = ScriptedInterpreter::new(modification_json(&file_path, "delete", "", 1, 1));

    apply_file_modification("Delete the file test.txt", Some(&interpreter))
        .await
        .unwrap();

    assert!(!file_path.exists());
}

#[tokio::test]
async fn test_create_not_starting_at_line_one_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("test.txt");
    let interpreter =
        ScriptedInterpreter::new(modification_json(&file_path, "create", "Hello World", 2, 2));

    let err = apply_file_modification("Create a file starting at line 2", Some(&interpreter))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(
        err.to_string()
            .contains("Create operation must start at line 1")
    );
    assert!(!file_path.exists());
}

#[tokio::test]
async fn test_invalid_range_reports_every_rule_and_keeps_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = write_file(&temp_dir, "test.txt", FIVE_LINES);
    let interpreter =
        ScriptedInterpreter::new(modification_json(&file_path, "update", "x", 7, 6));

    let err = apply_file_modification("Replace lines 7 to 6", Some(&interpreter))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    let message = err.to_string();
    assert!(message.contains("End line must be <= 5 (got 6)"), "{message}");
    assert!(
        message.contains("Start line (7) must be <= end line (6)"),
        "{message}"
    );
    assert_eq!(read_file(&file_path), FIVE_LINES);
}

#[tokio::test]
async fn test_missing_file_is_storage_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("missing.txt");
    let interpreter = ScriptedInterpreter::new(modification_json(&file_path, "delete", "", 1, 1));

    let err = apply_file_modification("Delete missing.txt", Some(&interpreter))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
}

#[tokio::test]
async fn test_malformed_model_output_is_parse_error() {
    let interpreter = ScriptedInterpreter::new("{\"filePath\": \"a.txt\"");

    let err = apply_file_modification("Do something", Some(&interpreter))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_log_and_swallow_keeps_file_and_succeeds() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = write_file(&temp_dir, "test.txt", FIVE_LINES);
    let interpreter =
        ScriptedInterpreter::new(modification_json(&file_path, "update", "x", 4, 2));

    FileModifier::new(&interpreter)
        .with_error_policy(ErrorPolicy::LogAndSwallow)
        .apply("Replace lines 4 to 2")
        .await
        .unwrap();

    assert_eq!(read_file(&file_path), FIVE_LINES);
}
