//! Diagnostic infrastructure for validator findings
//!
//! Wraps validator findings as structured diagnostics with source context:
//! one diagnostic code and one fixed message template per structural rule,
//! terminal emission through codespan, and a JSON projection for IDE
//! integration.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use mirror_model::Span;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ValidationError;

/// Diagnostic code for a validator rule (e.g. "E4001").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with source code context.
pub struct Diagnostic {
    /// The underlying codespan diagnostic
    inner: CsDiagnostic<usize>,
    /// Diagnostic code (e.g. "E4001")
    code: Option<ErrorCode>,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Set the diagnostic code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code.clone());
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Add a primary label (main error location).
    pub fn with_primary_label(mut self, file_id: usize, span: Span, message: impl Into<String>) -> Self {
        let label = Label::primary(file_id, span.start as usize..span.end as usize)
            .with_message(message);
        self.inner = self.inner.with_labels(vec![label]);
        self
    }

    /// Add a note (additional context).
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Add a help suggestion.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Create a diagnostic from a validator finding.
    pub fn from_validation_error(error: &ValidationError, file_id: usize, span: Span) -> Self {
        use ValidationError::*;

        let diag = Diagnostic::error(error.to_string())
            .with_code(error_code(error))
            .with_primary_label(file_id, span, label_text(error));

        match error {
            MissingSpec { .. } => diag.with_help(
                "declare exactly one '@MirrorSpec' class nested under the interface",
            ),
            NonFinalShape { .. } => {
                diag.with_note("the specification must be a non-abstract, non-open class")
            }
            _ => diag,
        }
    }

    /// Emit the diagnostic to stderr with colors.
    pub fn emit(&self, files: &SimpleFiles<String, String>) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = codespan_reporting::term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// Get the underlying codespan diagnostic (for testing/custom rendering).
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON representation for IDE integration.
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        let json_diag = JsonDiagnostic::from_diagnostic(self, files);
        serde_json::to_string_pretty(&json_diag)
    }
}

/// JSON representation of a diagnostic for IDE integration.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// Diagnostic code (e.g. "E4001")
    pub code: Option<String>,
    /// Severity level
    pub severity: String,
    /// Main error message
    pub message: String,
    /// Source locations with labels
    pub labels: Vec<JsonLabel>,
    /// Additional notes and help
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    /// File path
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    /// End line (1-indexed)
    pub end_line: usize,
    /// End column (1-indexed)
    pub end_column: usize,
    /// Label message
    pub message: Option<String>,
}

impl JsonDiagnostic {
    /// Convert a Diagnostic to JSON representation.
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file_id = label.file_id;
                let file_name = files.get(file_id).ok()?.name().to_string();

                let start_location = files.get(file_id).ok()?.location((), label.range.start).ok()?;
                let end_location = files.get(file_id).ok()?.location((), label.range.end).ok()?;

                Some(JsonLabel {
                    file: file_name,
                    start_line: start_location.line_number,
                    start_column: start_location.column_number,
                    end_line: end_location.line_number,
                    end_column: end_location.column_number,
                    message: Some(label.message.clone()),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Get the diagnostic code for a validator finding.
pub fn error_code(error: &ValidationError) -> ErrorCode {
    use ValidationError::*;

    match error {
        RoleMismatch { .. } => ErrorCode("E4001"),
        MissingSpec { .. } => ErrorCode("E4002"),
        MissingConstructor { .. } => ErrorCode("E4003"),
        PrivateConstructor { .. } => ErrorCode("E4004"),
        NonFinalShape { .. } => ErrorCode("E4005"),
        MissingParent { .. } => ErrorCode("E4006"),
        IllegalFieldVisibility { .. } => ErrorCode("E4007"),
    }
}

fn label_text(error: &ValidationError) -> &'static str {
    use ValidationError::*;

    match error {
        RoleMismatch { .. } => "not an interface",
        MissingSpec { .. } => "no nested specification",
        MissingConstructor { .. } => "no primary constructor",
        PrivateConstructor { .. } => "constructor is private",
        NonFinalShape { .. } => "not a final class",
        MissingParent { .. } => "no enclosing marked interface",
        IllegalFieldVisibility { .. } => "field is not public",
    }
}

/// Helper to create a SimpleFiles instance from source code.
pub fn create_files(path: impl Into<PathBuf>, source: impl Into<String>) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}
