//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Install a Ctrl-C handler that records the interrupt instead of exiting.
///
/// Children share the terminal's process group and receive the signal
/// themselves; this process only has to notice once they are gone.
pub fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        INTERRUPTED.store(true, Ordering::SeqCst);
    })
    .context("failed to set Ctrl-C handler")
}

/// Whether an interrupt arrived since the handler was installed.
pub fn was_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Exit code and combined output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Shell-style exit code; `128 + signo` when killed by a signal.
    pub code: i32,
    /// stdout followed by stderr. Empty when output was streamed.
    pub output: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    /// Run to completion, capturing stdout and stderr.
    pub fn exec(&self) -> Result<ProcessOutput> {
        tracing::debug!("running `{}`", self.display_command());
        let output = self
            .build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ProcessOutput {
            code: exit_code(output.status),
            output: combined,
        })
    }

    /// Run to completion with stdio inherited from this process.
    pub fn exec_streaming(&self) -> Result<ProcessOutput> {
        tracing::debug!("running `{}`", self.display_command());
        let status = self
            .build_command()
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;
        Ok(ProcessOutput {
            code: exit_code(status),
            output: String::new(),
        })
    }

    /// Display the command for logs and result info.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Map an exit status to a shell-style code.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_exec_captures_output_and_code() {
        let out = ProcessBuilder::new("sh")
            .args(["-c", "echo hello; echo oops >&2; exit 3"])
            .exec()
            .unwrap();

        assert_eq!(out.code, 3);
        assert!(!out.success());
        assert!(out.output.contains("hello"));
        assert!(out.output.contains("oops"));
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_exit_code() {
        let out = ProcessBuilder::new("sh")
            .args(["-c", "kill -TERM $$"])
            .exec()
            .unwrap();
        assert_eq!(out.code, 128 + 15);
    }

    #[test]
    fn test_spawn_failure_is_error() {
        let result = ProcessBuilder::new("devchain-definitely-missing-binary").exec();
        assert!(result.is_err());
    }

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("cmake").args(["--build", "build", "--", "-j"]);
        assert_eq!(pb.display_command(), "cmake --build build -- -j");
    }
}
