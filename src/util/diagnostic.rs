//! User-friendly diagnostic messages.
//!
//! Every failure reported to the user names the offending input, adds
//! whatever context is known, and ends with concrete next steps.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when the directory has no project state.
    pub const NOT_INITIALIZED: &str =
        "Run `devchain create --toolchain <kind>` to set up this directory";

    /// Suggestion when `create` runs twice.
    pub const ALREADY_INITIALIZED: &str =
        "Run `devchain clean --all` first to discard the existing project state";

    /// Suggestion when `create` finds unexpected files.
    pub const FORCE_CREATE: &str = "Use `devchain create --force` to set up anyway";

    /// Suggestion for settings problems.
    pub const LIST_SETTINGS: &str = "Run `devchain info` to list the supported settings";

    /// Suggestion for tool problems.
    pub const LIST_TOOLS: &str = "Run `devchain info` to list the tools of this project";

    /// Suggestion when the delegated command failed.
    pub const ACTION_FAILED: &str = "Re-run with `--verbose` to stream the command output";

    /// Suggestion when the state file cannot be read.
    pub const STATE_CORRUPT: &str =
        "Inspect or delete the state file, then run `devchain create` again";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(message)
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = match (self.severity, color) {
            (Severity::Error, true) => "\x1b[1;31merror\x1b[0m",
            (Severity::Warning, true) => "\x1b[1;33mwarning\x1b[0m",
            (Severity::Error, false) => "error",
            (Severity::Warning, false) => "warning",
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            if self.suggestions.len() == 1 {
                output.push_str(&format!("{}: {}\n", help_prefix, self.suggestions[0]));
            } else {
                output.push_str(&format!("{}: consider:\n", help_prefix));
                for (i, suggestion) in self.suggestions.iter().enumerate() {
                    output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
                }
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("settings `gcc99__x__debug` are not supported by toolchain `cpp`")
            .with_context("compiler `gcc99` is not one of: clang14, gcc12")
            .with_suggestion("Run `devchain info`")
            .with_suggestion("Add the compiler to .devchain/config.toml");

        let output = diag.format(false);
        assert!(output.starts_with("error: settings `gcc99__x__debug`"));
        assert!(output.contains("  = compiler `gcc99`"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("2. Add the compiler"));
    }

    #[test]
    fn test_single_suggestion_is_inline() {
        let diag = Diagnostic::warning("config ignored").with_suggestion("fix it");
        let output = diag.format(false);
        assert!(output.starts_with("warning: config ignored"));
        assert!(output.contains("help: fix it"));
        assert!(!output.contains("consider"));
    }

    #[test]
    fn test_location_line() {
        let diag = Diagnostic::error("bad state").with_location("/p/.devchain/state.toml");
        assert!(diag.format(false).contains("  --> /p/.devchain/state.toml"));
    }
}
