//! Tests for the `json-schema-validate` binary.

mod common;

use std::process::{Command, Output};

use common::Workspace;
use json_schema_validator::ValidationReport;

const PERSON_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "name": {"type": "string", "required": true},
        "age": {"type": "integer", "minimum": 0}
    },
    "additionalProperties": false
}"#;

/// Run the binary inside `workspace`, isolated from any user configuration.
fn run(workspace: &Workspace, args: &[&str]) -> Output {
    command(workspace, args)
        .output()
        .expect("Failed to execute command")
}

fn command(workspace: &Workspace, args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_json-schema-validate"));
    command
        .args(args)
        .current_dir(workspace.path())
        .env("HOME", workspace.path())
        .env("XDG_CONFIG_HOME", workspace.path())
        .env_remove("RUST_LOG")
        .env_remove("JSON_SCHEMA_TIMEOUT")
        .env_remove("JSON_SCHEMA_USER_AGENT")
        .env_remove("JSON_SCHEMA_DIR")
        .env_remove("JSON_SCHEMA_VERBOSE")
        .env_remove("JSON_SCHEMA_QUIET")
        .env_remove("JSON_SCHEMA_FORMAT");
    command
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

fn person_workspace() -> Workspace {
    let workspace = Workspace::new();
    workspace.write("person.json", PERSON_SCHEMA);
    workspace.write("ada.json", r#"{"name": "Ada", "age": 36}"#);
    workspace.write("anon.json", r#"{"age": -1, "email": "x@example.com"}"#);
    workspace
}

#[test]
fn test_cli_help_output() {
    let workspace = Workspace::new();
    let output = run(&workspace, &["--help"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("draft-03 JSON Schema"));
    assert!(stdout.contains("--schema-dir"));
    assert!(stdout.contains("--format"));
    assert!(stdout.contains("--timeout"));
    assert!(stdout.contains("--quiet"));
}

#[test]
fn test_cli_version_output() {
    let workspace = Workspace::new();
    let output = run(&workspace, &["--version"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_valid_document() {
    let workspace = person_workspace();
    let output = run(&workspace, &["person.json", "ada.json"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("VALID    ada.json"));
}

#[test]
fn test_cli_invalid_document() {
    let workspace = person_workspace();
    let output = run(&workspace, &["person.json", "ada.json", "anon.json"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout(&output);
    assert!(stdout.contains("VALID    ada.json"));
    assert!(stdout.contains("INVALID  anon.json - 3 errors"));
    assert!(stdout.contains("    name: Missing required property name"));
    assert!(stdout.contains("    age: Value '-1' must be greater or equal to 0"));
    assert!(stdout.contains("    email: Unexpected property"));
}

#[test]
fn test_cli_quiet_hides_valid_documents() {
    let workspace = person_workspace();
    let output = run(&workspace, &["-q", "person.json", "ada.json", "anon.json"]);

    let stdout = stdout(&output);
    assert!(!stdout.contains("ada.json"));
    assert!(stdout.contains("anon.json"));
}

#[test]
fn test_cli_verbose_prints_summary() {
    let workspace = person_workspace();
    let output = run(&workspace, &["-v", "person.json", "ada.json", "anon.json"]);

    let stdout = stdout(&output);
    assert!(stdout.contains("Validation Summary:"));
    assert!(stdout.contains("Total documents: 2"));
    assert!(stdout.contains("Invalid: 1"));
}

#[test]
fn test_cli_json_format() {
    let workspace = person_workspace();
    let output = run(
        &workspace,
        &["--format", "json", "person.json", "ada.json", "anon.json"],
    );

    let reports: Vec<ValidationReport> = stdout(&output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(reports.len(), 2);
    assert!(reports[0].valid);
    assert_eq!(reports[1].document, "anon.json");
    assert_eq!(reports[1].errors.len(), 3);
}

#[test]
fn test_cli_unreadable_document() {
    let workspace = person_workspace();
    let output = run(&workspace, &["person.json", "nowhere.json"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("ERROR    nowhere.json"));
}

#[test]
fn test_cli_schema_by_name_from_schema_dir() {
    let workspace = person_workspace();
    workspace.write("schemas/person.json", PERSON_SCHEMA);

    let output = run(&workspace, &["--schema-dir", "schemas", "person", "ada.json"]);

    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_cli_schema_dir_from_config_file() {
    let workspace = person_workspace();
    workspace.write("schemas/person.json", PERSON_SCHEMA);
    workspace.write(
        "settings.toml",
        r#"
[lookup]
schema_dir = "schemas"

[output]
format = "json"
"#,
    );

    let output = run(&workspace, &["-c", "settings.toml", "person", "ada.json"]);

    assert_eq!(output.status.code(), Some(0));
    let report: ValidationReport = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert!(report.valid);
}

#[test]
fn test_cli_broken_schema_fails() {
    let workspace = person_workspace();
    workspace.write("broken.json", r#"{"type": "decimal"}"#);

    let output = run(&workspace, &["broken.json", "ada.json"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Could not compile schema"));
}

#[test]
fn test_cli_unknown_schema_name() {
    let workspace = person_workspace();
    let output = run(&workspace, &["no-such-schema", "ada.json"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Could not locate schema no-such-schema"));
}

#[test]
fn test_cli_conflicting_options() {
    let workspace = person_workspace();
    let output = run(&workspace, &["--verbose", "--quiet", "person.json", "ada.json"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("cannot be used with"));
}

#[test]
fn test_cli_zero_timeout() {
    let workspace = person_workspace();
    let output = run(&workspace, &["--timeout", "0", "person.json", "ada.json"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Timeout must be greater than 0"));
}

#[test]
fn test_cli_verbose_from_environment_raises_log_level() {
    let workspace = person_workspace();
    let output = command(&workspace, &["person.json", "ada.json"])
        .env("JSON_SCHEMA_VERBOSE", "true")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Validation Summary:"));
    assert!(stderr(&output).contains("loaded configuration"));
}

#[test]
fn test_cli_verbose_from_config_file_raises_log_level() {
    let workspace = person_workspace();
    workspace.write("settings.toml", "[output]\nverbose = true\n");

    let output = run(&workspace, &["-c", "settings.toml", "person.json", "ada.json"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("fetching schema"));
}

#[test]
fn test_cli_default_log_level_is_quiet() {
    let workspace = person_workspace();
    let output = run(&workspace, &["person.json", "ada.json"]);

    assert!(!stderr(&output).contains("loaded configuration"));
}
