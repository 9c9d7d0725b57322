//! Test utilities and mocks for devchain unit tests.
//!
//! [`MockExecutor`] stands in for the process-backed executor so dispatcher
//! tests can observe which actions were delegated without running Conan or
//! CMake.
//!
//! # Example
//!
//! ```rust,ignore
//! use devchain::test_support::{MockExecutor, MockOutput};
//!
//! let exec = MockExecutor::new();
//! exec.expect("run gtest", MockOutput::failure(3, "1 test failed"));
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::core::errors::DispatchError;
use crate::core::project::Project;
use crate::core::toolchain::ToolchainKind;
use crate::ops::executor::{Action, ActionExecutor, ActionOutput, ActionRequest};

/// Canned result of a delegated action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockOutput {
    pub exit_code: i32,
    pub output: String,
}

impl MockOutput {
    pub fn success(output: impl Into<String>) -> Self {
        MockOutput {
            exit_code: 0,
            output: output.into(),
        }
    }

    pub fn failure(exit_code: i32, output: impl Into<String>) -> Self {
        MockOutput {
            exit_code,
            output: output.into(),
        }
    }
}

/// A recorded call to [`MockExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub action: Action,
    pub root: PathBuf,
}

/// Executor that records requests and answers with canned outputs.
///
/// Expectations match on the prefix of [`Action::describe`]; the first match
/// wins. Unmatched actions succeed with empty output.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: Mutex<Vec<(String, MockOutput)>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer actions whose description starts with `prefix`.
    pub fn expect(&self, prefix: &str, output: MockOutput) -> &Self {
        if let Ok(mut expectations) = self.expectations.lock() {
            expectations.push((prefix.to_string(), output));
        }
        self
    }

    /// Every action executed so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl ActionExecutor for MockExecutor {
    fn execute(&self, request: &ActionRequest<'_>) -> Result<ActionOutput, DispatchError> {
        let description = request.action.describe();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                action: request.action.clone(),
                root: request.root.to_path_buf(),
            });
        }

        let canned = self
            .expectations
            .lock()
            .ok()
            .and_then(|e| {
                e.iter()
                    .find(|(prefix, _)| description.starts_with(prefix.as_str()))
                    .map(|(_, output)| output.clone())
            })
            .unwrap_or_default();

        Ok(ActionOutput {
            exit_code: canned.exit_code,
            output: canned.output,
            info: Vec::new(),
        })
    }
}

/// A scratch directory, optionally initialized as a project.
pub fn scratch_project(kind: Option<ToolchainKind>) -> TempDir {
    let tmp = TempDir::new().expect("failed to create temp dir");
    if let Some(kind) = kind {
        Project::init(tmp.path(), &kind.builtin_spec(), false).expect("failed to init project");
    }
    tmp
}

/// Write a file below `root`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    std::fs::write(&path, contents).expect("failed to write file");
    path
}
