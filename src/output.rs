//! Report types and their human-readable and JSON renderings.

use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;
use crate::error_message::ErrorMessage;
use crate::validator::ValidationSummary;

/// Outcome of validating one document.
///
/// Serializes as `{"document": ..., "valid": ..., "errors": [...]}`, with a
/// `read_error` entry only when the document could not be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub document: String,
    pub valid: bool,
    pub errors: Vec<ErrorMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_error: Option<String>,
}

impl ValidationReport {
    pub fn new(document: impl Into<String>, errors: Vec<ErrorMessage>) -> Self {
        Self {
            document: document.into(),
            valid: errors.is_empty(),
            errors,
            read_error: None,
        }
    }

    pub fn unreadable(document: impl Into<String>, read_error: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            valid: false,
            errors: Vec::new(),
            read_error: Some(read_error.into()),
        }
    }
}

/// How much the human format prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Only failing documents
    Quiet,
    /// Every document and its errors
    #[default]
    Normal,
    /// Also a summary at the end
    Verbose,
}

impl VerbosityLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Formatter for validation reports
pub struct Output {
    format: OutputFormat,
    verbosity: VerbosityLevel,
}

impl Output {
    pub fn new(format: OutputFormat, verbosity: VerbosityLevel) -> Self {
        Self { format, verbosity }
    }

    pub fn format_reports(&self, reports: &[ValidationReport]) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(reports),
            OutputFormat::Json => format_json(reports),
        }
    }

    fn format_human(&self, reports: &[ValidationReport]) -> String {
        let mut output = String::new();

        for report in reports {
            if report.valid && self.verbosity == VerbosityLevel::Quiet {
                continue;
            }
            output.push_str(&format_report(report));
            output.push('\n');
        }

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&format_summary(&ValidationSummary::aggregate(reports)));
        }

        output
    }
}

pub fn format_report(report: &ValidationReport) -> String {
    if let Some(read_error) = &report.read_error {
        return format!("ERROR    {} - {}", report.document, read_error);
    }
    if report.valid {
        return format!("VALID    {}", report.document);
    }

    let mut output = format!(
        "INVALID  {} - {} error{}",
        report.document,
        report.errors.len(),
        if report.errors.len() == 1 { "" } else { "s" }
    );
    for error in &report.errors {
        output.push_str(&format!("\n    {}", describe(error)));
    }
    output
}

fn describe(error: &ErrorMessage) -> String {
    if error.location().is_empty() {
        format!("(root): {}", error.message())
    } else {
        error.to_string()
    }
}

fn format_summary(summary: &ValidationSummary) -> String {
    let mut output = String::new();
    output.push_str("Validation Summary:\n");
    output.push_str(&format!("  Total documents: {}\n", summary.total_documents));
    output.push_str(&format!("  Valid: {}\n", summary.valid_documents));
    if summary.invalid_documents > 0 {
        output.push_str(&format!("  Invalid: {}\n", summary.invalid_documents));
    }
    if summary.unreadable_documents > 0 {
        output.push_str(&format!("  Unreadable: {}\n", summary.unreadable_documents));
    }
    output
}

/// One JSON object per line, in input order.
fn format_json(reports: &[ValidationReport]) -> String {
    let mut output = String::new();
    for report in reports {
        // string keys and plain values only, so serialization cannot fail
        output.push_str(&serde_json::to_string(report).unwrap_or_default());
        output.push('\n');
    }
    output
}
