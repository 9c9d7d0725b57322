//! Dispatch error types and diagnostics.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::settings::SettingsError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Exit code used when the failure has no more specific code.
pub const EXIT_GENERIC: i32 = 1;

/// Every way a single invocation can end in the `Failed` state.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid settings identifier `{identifier}`: {reason}")]
    InvalidFormat {
        identifier: String,
        reason: SettingsError,
    },

    #[error("unknown toolchain `{name}`")]
    UnknownToolchain { name: String, available: Vec<String> },

    #[error("toolchain `{kind}` has no tool named `{name}`")]
    UnknownTool {
        kind: String,
        name: String,
        available: Vec<String>,
    },

    #[error("settings `{identifier}` are not supported by toolchain `{kind}`")]
    UnsupportedSettings {
        kind: String,
        identifier: String,
        mismatches: Vec<String>,
    },

    #[error("no devchain project in `{}`", root.display())]
    NotInitialized { root: PathBuf },

    #[error("`{}` is already a devchain project (toolchain `{kind}`)", root.display())]
    AlreadyInitialized { root: PathBuf, kind: String },

    #[error("directory `{}` is not empty", root.display())]
    DirectoryNotEmpty { root: PathBuf, conflicts: Vec<String> },

    #[error("`{action}` failed with exit code {code}")]
    ActionFailed {
        action: String,
        code: i32,
        output: String,
    },

    #[error("project state `{}` is corrupt: {reason}", path.display())]
    StateCorrupt { path: PathBuf, reason: String },

    #[error("`{}` was not produced", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("interrupted while running `{action}`")]
    Interrupted { action: String },

    #[error("failed to run `{action}`: {message}")]
    Execution { action: String, message: String },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl DispatchError {
    /// Wrap an I/O error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        DispatchError::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit status for this failure.
    ///
    /// `ActionFailed` passes the delegated tool's own status through; every
    /// dispatch-level failure has a fixed code above 100.
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::InvalidFormat { .. } => 101,
            DispatchError::UnknownToolchain { .. } => 102,
            DispatchError::UnknownTool { .. } => 103,
            DispatchError::UnsupportedSettings { .. } => 104,
            DispatchError::NotInitialized { .. } => 105,
            DispatchError::AlreadyInitialized { .. } => 106,
            DispatchError::DirectoryNotEmpty { .. } => 107,
            DispatchError::StateCorrupt { .. } => 108,
            DispatchError::MissingArtifact { .. } => 109,
            DispatchError::Interrupted { .. } => 130,
            DispatchError::ActionFailed { code, .. } => {
                if *code == 0 {
                    EXIT_GENERIC
                } else {
                    *code
                }
            }
            DispatchError::Execution { .. } | DispatchError::Io { .. } => EXIT_GENERIC,
        }
    }

    /// Short name of the failure kind, used in logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::InvalidFormat { .. } => "InvalidFormat",
            DispatchError::UnknownToolchain { .. } => "UnknownToolchain",
            DispatchError::UnknownTool { .. } => "UnknownTool",
            DispatchError::UnsupportedSettings { .. } => "UnsupportedSettings",
            DispatchError::NotInitialized { .. } => "NotInitialized",
            DispatchError::AlreadyInitialized { .. } => "AlreadyInitialized",
            DispatchError::DirectoryNotEmpty { .. } => "DirectoryNotEmpty",
            DispatchError::ActionFailed { .. } => "ActionFailed",
            DispatchError::StateCorrupt { .. } => "StateCorrupt",
            DispatchError::MissingArtifact { .. } => "MissingArtifact",
            DispatchError::Interrupted { .. } => "Interrupted",
            DispatchError::Execution { .. } => "Execution",
            DispatchError::Io { .. } => "Io",
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            DispatchError::InvalidFormat { .. } => diag
                .with_context("expected `<compiler>__<target-triple>__<build-type>`")
                .with_suggestion(suggestions::LIST_SETTINGS),

            DispatchError::UnknownToolchain { available, .. } => diag
                .with_context(format!("available toolchains: {}", available.join(", "))),

            DispatchError::UnknownTool { available, .. } => diag
                .with_context(format!("available tools: {}", available.join(", ")))
                .with_suggestion(suggestions::LIST_TOOLS),

            DispatchError::UnsupportedSettings { mismatches, .. } => {
                let mut diag = diag;
                for m in mismatches {
                    diag = diag.with_context(m.clone());
                }
                diag.with_suggestion(suggestions::LIST_SETTINGS)
            }

            DispatchError::NotInitialized { .. } => diag.with_suggestion(suggestions::NOT_INITIALIZED),

            DispatchError::AlreadyInitialized { .. } => {
                diag.with_suggestion(suggestions::ALREADY_INITIALIZED)
            }

            DispatchError::DirectoryNotEmpty { conflicts, .. } => diag
                .with_context(format!("conflicting entries: {}", conflicts.join(", ")))
                .with_suggestion(suggestions::FORCE_CREATE),

            DispatchError::ActionFailed { .. } => diag.with_suggestion(suggestions::ACTION_FAILED),

            DispatchError::StateCorrupt { path, .. } => diag
                .with_location(path.clone())
                .with_suggestion(suggestions::STATE_CORRUPT),

            DispatchError::Io { source, .. } => diag.with_context(source.to_string()),

            DispatchError::MissingArtifact { .. }
            | DispatchError::Interrupted { .. }
            | DispatchError::Execution { .. } => diag,
        }
    }
}
