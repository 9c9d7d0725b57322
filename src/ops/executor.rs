//! The seam between the dispatcher and the tools it delegates to.
//!
//! The dispatcher hands an [`ActionRequest`] to an [`ActionExecutor`] and only
//! looks at the exit code that comes back. [`ProcessExecutor`] is the real
//! implementation; it runs each toolchain kind's command recipes as child
//! processes.

use std::path::Path;

use crate::core::errors::DispatchError;
use crate::core::settings::Settings;
use crate::core::toolchain::{Tool, ToolchainKind, ToolchainSpec};
use crate::ops::cpp;
use crate::util::process::{was_interrupted, ProcessBuilder, ProcessOutput};
use crate::util::shell::Shell;

/// A fully resolved action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Build the project with the given settings.
    Build(Settings),

    /// Run a tool; `settings` are used for the implicit build.
    Run { tool: Tool, settings: Settings },
}

impl Action {
    /// Short label for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Action::Build(settings) => format!("build {}", settings),
            Action::Run { tool, .. } => format!("run {}", tool),
        }
    }
}

/// Everything an executor needs to carry out one action.
#[derive(Debug, Clone, Copy)]
pub struct ActionRequest<'a> {
    pub spec: &'a ToolchainSpec,
    pub action: &'a Action,
    pub root: &'a Path,
}

/// What came back from an executed action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutput {
    /// Exit code of the action; zero on success.
    pub exit_code: i32,

    /// Combined output of the commands that ran. Never parsed.
    pub output: String,

    /// Key/value lines for the result report.
    pub info: Vec<(String, String)>,
}

/// Executes resolved actions on behalf of the dispatcher.
pub trait ActionExecutor {
    fn execute(&self, request: &ActionRequest<'_>) -> Result<ActionOutput, DispatchError>;
}

/// Executor that runs the toolchain's commands as child processes.
pub struct ProcessExecutor<'a> {
    shell: &'a Shell,
}

impl<'a> ProcessExecutor<'a> {
    pub fn new(shell: &'a Shell) -> Self {
        ProcessExecutor { shell }
    }
}

impl ActionExecutor for ProcessExecutor<'_> {
    fn execute(&self, request: &ActionRequest<'_>) -> Result<ActionOutput, DispatchError> {
        let mut runner = StepRunner::new(self.shell);
        match request.spec.kind {
            ToolchainKind::Cpp => cpp::execute(&mut runner, request)?,
        }
        Ok(runner.finish())
    }
}

/// Runs a sequence of commands, stopping at the first failure.
///
/// Output and result info accumulate across steps; the exit code is that of
/// the first step that failed.
pub struct StepRunner<'a> {
    shell: &'a Shell,
    exit_code: i32,
    output: String,
    info: Vec<(String, String)>,
}

impl<'a> StepRunner<'a> {
    pub fn new(shell: &'a Shell) -> Self {
        StepRunner {
            shell,
            exit_code: 0,
            output: String::new(),
            info: Vec::new(),
        }
    }

    /// Whether every step so far succeeded.
    pub fn ok(&self) -> bool {
        self.exit_code == 0
    }

    pub fn is_verbose(&self) -> bool {
        self.shell.is_verbose()
    }

    /// Run one command. Returns whether it succeeded.
    ///
    /// Commands are streamed in verbose mode and captured otherwise.
    pub fn run(&mut self, label: &str, cmd: ProcessBuilder) -> Result<bool, DispatchError> {
        self.run_checked(label, cmd).map(|code| code == 0)
    }

    /// Run one command whose failure is recorded but does not stop later
    /// steps from being attempted. Returns the command's exit code.
    pub fn run_checked(&mut self, label: &str, cmd: ProcessBuilder) -> Result<i32, DispatchError> {
        let result = self.spawn(label, &cmd)?;
        if !result.success() && self.exit_code == 0 {
            self.exit_code = result.code;
        }
        Ok(result.code)
    }

    fn spawn(&mut self, label: &str, cmd: &ProcessBuilder) -> Result<ProcessOutput, DispatchError> {
        let command_line = cmd.display_command();
        let result = {
            let _spinner = self.shell.spinner(label);
            if self.shell.is_verbose() {
                cmd.exec_streaming()
            } else {
                cmd.exec()
            }
        }
        .map_err(|e| DispatchError::Execution {
            action: command_line.clone(),
            message: format!("{:#}", e),
        })?;

        if was_interrupted() {
            return Err(DispatchError::Interrupted {
                action: command_line,
            });
        }
        tracing::debug!("`{}` exited with {}", command_line, result.code);
        self.output.push_str(&result.output);
        Ok(result)
    }

    /// Record a key/value line for the result report.
    pub fn info(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.info.push((key.into(), value.into()));
    }

    pub fn finish(self) -> ActionOutput {
        ActionOutput {
            exit_code: self.exit_code,
            output: self.output,
            info: self.info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::shell::{ColorChoice, Verbosity};

    fn quiet() -> Shell {
        Shell::new(Verbosity::Quiet, ColorChoice::Never)
    }

    #[test]
    fn test_action_describe() {
        let settings = Settings::parse("gcc12__x86_64-pc-linux-elf__debug").unwrap();
        assert_eq!(
            Action::Build(settings.clone()).describe(),
            "build gcc12__x86_64-pc-linux-elf__debug"
        );
        assert_eq!(
            Action::Run {
                tool: Tool::GTest,
                settings
            }
            .describe(),
            "run gtest"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_step_runner_keeps_first_failure() {
        let shell = quiet();
        let mut runner = StepRunner::new(&shell);

        assert!(runner.run("ok", ProcessBuilder::new("true")).unwrap());
        assert_eq!(
            runner
                .run_checked("three", ProcessBuilder::new("sh").args(["-c", "exit 3"]))
                .unwrap(),
            3
        );
        assert!(!runner
            .run("five", ProcessBuilder::new("sh").args(["-c", "exit 5"]))
            .unwrap());
        assert!(!runner.ok());

        let output = runner.finish();
        assert_eq!(output.exit_code, 3);
    }

    #[test]
    fn test_step_runner_spawn_failure() {
        let shell = quiet();
        let mut runner = StepRunner::new(&shell);
        let err = runner
            .run("missing", ProcessBuilder::new("devchain-definitely-missing-binary"))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Execution { .. }));
    }
}
