//! Command implementations

pub mod about;
pub mod build;
pub mod clean;
pub mod complete;
pub mod completions;
pub mod create;
pub mod info;
pub mod run;

use std::time::{Duration, Instant};

use devchain::core::errors::DispatchError;
use devchain::core::registry::ToolchainRegistry;
use devchain::ops::dispatch::{Command, CommandRequest, Dispatch, Dispatcher, Report};
use devchain::ops::executor::ProcessExecutor;
use devchain::util::diagnostic::emit;
use devchain::util::shell::{format_duration, Status};
use devchain::util::{GlobalContext, Shell};

/// Run one command through the dispatcher with the process-backed executor.
pub fn dispatch(command: Command, ctx: &GlobalContext, shell: &Shell) -> Dispatch {
    let registry = ToolchainRegistry::from_config(&ctx.load_config());
    let executor = ProcessExecutor::new(shell);
    let dispatcher = Dispatcher::new(&registry, &executor);
    dispatcher.dispatch(&CommandRequest::new(command, ctx.cwd()))
}

/// Dispatch a mutating command and print its result block.
///
/// `start` is an optional status line shown before dispatching. Returns the
/// process exit code.
pub fn run_and_report(
    command: Command,
    start: Option<(Status, String)>,
    ctx: &GlobalContext,
    shell: &Shell,
) -> i32 {
    let started = Instant::now();
    let label = command.name();
    if let Some((status, message)) = start {
        shell.status(status, message);
    }

    let outcome = dispatch(command, ctx, shell);
    let code = outcome.exit_code();
    match outcome.result {
        Ok(report) => {
            print_report(&report, Some(started.elapsed()));
            shell.status(
                Status::Finished,
                format!("`{}` in {}", label, format_duration(started.elapsed())),
            );
        }
        Err(e) => report_failure(&e, shell),
    }
    code
}

/// Print a result block to stdout.
///
/// `runtime` is left out for read-only commands so their output stays the
/// same across runs.
pub fn print_report(report: &Report, runtime: Option<Duration>) {
    println!("{}", report.message);

    let mut rows: Vec<(&str, String)> = report
        .info
        .iter()
        .map(|(k, v)| (k.as_str(), v.clone()))
        .collect();
    if let Some(runtime) = runtime {
        rows.push(("runtime", format_duration(runtime)));
    }
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in rows {
        println!("  {:<width$}  {}", key, value, width = width);
    }

    for (name, values) in &report.sections {
        println!();
        println!("{}:", name);
        for value in values {
            println!("  {}", value);
        }
    }
}

/// Emit the diagnostic for a failed invocation to stderr.
///
/// Captured output of a failed action is replayed first so the cause is
/// visible without re-running.
pub fn report_failure(err: &DispatchError, shell: &Shell) {
    if let DispatchError::ActionFailed { output, .. } = err {
        if !output.is_empty() && !shell.is_quiet() {
            eprint!("{}", output);
            if !output.ends_with('\n') {
                eprintln!();
            }
        }
    }
    tracing::debug!("exiting with {} ({})", err.exit_code(), err.kind());
    emit(&err.to_diagnostic(), shell.use_color());
}
