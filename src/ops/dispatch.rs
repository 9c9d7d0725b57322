//! The command-level state machine.
//!
//! Every invocation walks
//! `Idle -> ResolvingProject -> ResolvingAction -> Executing -> Done | Failed`
//! exactly once. `ResolvingProject` is skipped for `create` and `about`, and
//! any error jumps straight to `Failed`. The walk is recorded in
//! [`Dispatch::trace`] so callers and tests can see where it stopped.

use std::fmt;
use std::path::PathBuf;

use crate::core::errors::DispatchError;
use crate::core::project::Project;
use crate::core::registry::ToolchainRegistry;
use crate::core::toolchain::{Tool, ToolchainKind, ToolchainSpec};
use crate::ops::clean::clean_artifacts;
use crate::ops::cpp;
use crate::ops::executor::{Action, ActionExecutor, ActionRequest};
use crate::util::process::{find_executable, was_interrupted};

/// A parsed CLI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    About,
    Info,
    Create { toolchain: String, force: bool },
    Build { settings: String },
    Run { tool: String },
    Clean { all: bool },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::About => "about",
            Command::Info => "info",
            Command::Create { .. } => "create",
            Command::Build { .. } => "build",
            Command::Run { .. } => "run",
            Command::Clean { .. } => "clean",
        }
    }

    fn needs_project(&self) -> bool {
        !matches!(self, Command::About | Command::Create { .. })
    }

    /// Commands that bring a stale completion cache up to date on load.
    fn refreshes_cache(&self) -> bool {
        matches!(
            self,
            Command::Info | Command::Build { .. } | Command::Run { .. }
        )
    }
}

/// One invocation's input. Consumed once, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: Command,
    pub root: PathBuf,
}

impl CommandRequest {
    pub fn new(command: Command, root: impl Into<PathBuf>) -> Self {
        CommandRequest {
            command,
            root: root.into(),
        }
    }
}

/// States of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    ResolvingProject,
    ResolvingAction,
    Executing,
    Done,
    Failed,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub message: String,
    /// Ordered key/value lines.
    pub info: Vec<(String, String)>,
    /// Named lists, e.g. the settings and tools of a toolchain.
    pub sections: Vec<(String, Vec<String>)>,
    /// Captured output of the delegated action, if any.
    pub output: String,
}

impl Report {
    fn new(message: impl Into<String>) -> Self {
        Report {
            message: message.into(),
            ..Default::default()
        }
    }

    fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info.push((key.into(), value.into()));
        self
    }

    fn with_section(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.sections.push((name.into(), values));
        self
    }
}

/// A finished invocation: the states visited and how it ended.
#[derive(Debug)]
pub struct Dispatch {
    pub trace: Vec<DispatchState>,
    pub result: Result<Report, DispatchError>,
}

impl Dispatch {
    /// `Done` or `Failed`.
    pub fn terminal(&self) -> DispatchState {
        if self.result.is_ok() {
            DispatchState::Done
        } else {
            DispatchState::Failed
        }
    }

    /// Process exit status for this invocation.
    pub fn exit_code(&self) -> i32 {
        match &self.result {
            Ok(_) => 0,
            Err(e) => e.exit_code(),
        }
    }
}

/// What `ResolvingAction` settled on.
enum Plan {
    About,
    Info(Project),
    Created(Project),
    Delegate(Project, Action),
    Clean(Project, bool),
}

/// Drives a [`CommandRequest`] through the state machine.
pub struct Dispatcher<'a> {
    registry: &'a ToolchainRegistry,
    executor: &'a dyn ActionExecutor,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a ToolchainRegistry, executor: &'a dyn ActionExecutor) -> Self {
        Dispatcher { registry, executor }
    }

    /// Run one invocation to a terminal state.
    pub fn dispatch(&self, request: &CommandRequest) -> Dispatch {
        let mut trace = vec![DispatchState::Idle];
        let result = self.drive(request, &mut trace);
        let terminal = if result.is_ok() {
            DispatchState::Done
        } else {
            DispatchState::Failed
        };
        enter(&mut trace, terminal);
        if let Err(e) = &result {
            tracing::debug!("{} failed: {}", request.command.name(), e.kind());
        }
        Dispatch { trace, result }
    }

    fn drive(
        &self,
        request: &CommandRequest,
        trace: &mut Vec<DispatchState>,
    ) -> Result<Report, DispatchError> {
        let project = if request.command.needs_project() {
            enter(trace, DispatchState::ResolvingProject);
            Some(self.resolve_project(request)?)
        } else {
            None
        };

        enter(trace, DispatchState::ResolvingAction);
        let plan = self.resolve_action(request, project)?;

        enter(trace, DispatchState::Executing);
        self.execute(plan)
    }

    fn resolve_project(&self, request: &CommandRequest) -> Result<Project, DispatchError> {
        let mut project = Project::load(&request.root)?;
        if request.command.refreshes_cache() {
            let spec = self.registry.spec(project.kind())?;
            if let Err(e) = project.refresh_completion(spec) {
                tracing::warn!("could not refresh completion cache: {}", e);
            }
        }
        Ok(project)
    }

    fn resolve_action(
        &self,
        request: &CommandRequest,
        project: Option<Project>,
    ) -> Result<Plan, DispatchError> {
        let plan = match (&request.command, project) {
            (Command::About, _) => Plan::About,
            (Command::Create { toolchain, force }, _) => {
                let spec = self.registry.resolve_kind(toolchain)?;
                Plan::Created(Project::init(&request.root, spec, *force)?)
            }
            (Command::Info, Some(project)) => Plan::Info(project),
            (Command::Build { settings }, Some(project)) => {
                let settings = self.registry.resolve_settings(project.kind(), settings)?;
                Plan::Delegate(project, Action::Build(settings))
            }
            (Command::Run { tool }, Some(project)) => {
                let tool = self.registry.resolve_tool(project.kind(), tool)?;
                let spec = self.registry.spec(project.kind())?;
                let settings = self
                    .registry
                    .resolve_settings(project.kind(), &spec.default_settings)?;
                Plan::Delegate(project, Action::Run { tool, settings })
            }
            (Command::Clean { all }, Some(project)) => Plan::Clean(project, *all),
            (_, None) => {
                return Err(DispatchError::NotInitialized {
                    root: request.root.clone(),
                })
            }
        };
        Ok(plan)
    }

    fn execute(&self, plan: Plan) -> Result<Report, DispatchError> {
        match plan {
            Plan::About => Ok(about(self.registry)),
            Plan::Info(project) => {
                let spec = self.registry.spec(project.kind())?;
                Ok(info(&project, spec))
            }
            Plan::Created(project) => Ok(Report::new("Project successfully set up")
                .with_info("root-directory", project.root().display().to_string())
                .with_info("toolchain", project.kind().to_string())),
            Plan::Delegate(project, action) => self.delegate(&project, &action),
            Plan::Clean(project, all) => {
                let spec = self.registry.spec(project.kind())?;
                let removed = clean_artifacts(project.root(), spec)?;
                let message = if all {
                    Project::purge(project.root())?;
                    "Project state removed"
                } else {
                    Project::clear(project.root())?;
                    "Project cleanup successfully completed"
                };
                let removed = if removed.is_empty() {
                    "nothing".to_string()
                } else {
                    removed.join(", ")
                };
                Ok(Report::new(message)
                    .with_info("root-directory", project.root().display().to_string())
                    .with_info("removed", removed))
            }
        }
    }

    fn delegate(&self, project: &Project, action: &Action) -> Result<Report, DispatchError> {
        let spec = self.registry.spec(project.kind())?;
        let request = ActionRequest {
            spec,
            action,
            root: project.root(),
        };
        tracing::debug!("delegating `{}` in {}", action.describe(), project.root().display());
        let outcome = self.executor.execute(&request)?;

        if outcome.exit_code != 0 {
            if was_interrupted() {
                return Err(DispatchError::Interrupted {
                    action: action.describe(),
                });
            }
            return Err(DispatchError::ActionFailed {
                action: action.describe(),
                code: outcome.exit_code,
                output: outcome.output,
            });
        }

        let (message, settings) = match action {
            Action::Build(settings) => ("Project successfully built".to_string(), settings),
            Action::Run { tool, settings } => (tool_message(*tool), settings),
        };
        let mut report = Report::new(message)
            .with_info("root-directory", project.root().display().to_string())
            .with_info("settings", settings.to_string());
        report.info.extend(outcome.info);
        report.output = outcome.output;
        Ok(report)
    }
}

fn enter(trace: &mut Vec<DispatchState>, next: DispatchState) {
    if let Some(prev) = trace.last() {
        tracing::debug!("dispatch: {} -> {}", prev, next);
    }
    trace.push(next);
}

fn tool_message(tool: Tool) -> String {
    match tool {
        Tool::ClangTidy => "Static analysis successfully completed".to_string(),
        Tool::GTest => "Tests successfully executed".to_string(),
        Tool::Benchmark => "Benchmarks successfully executed".to_string(),
        Tool::AddressSanitizer | Tool::MemorySanitizer | Tool::ThreadSanitizer => {
            format!("Tests successfully executed with {}", tool)
        }
    }
}

fn about(registry: &ToolchainRegistry) -> Report {
    Report::new(format!(
        "{} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ))
    .with_info("description", env!("CARGO_PKG_DESCRIPTION"))
    .with_info("toolchains", registry.list_kinds().join(", "))
}

fn info(project: &Project, spec: &ToolchainSpec) -> Report {
    let mut report = Report::new(format!("{} project", spec.name()))
        .with_info("root-directory", project.root().display().to_string())
        .with_info("toolchain", spec.name())
        .with_info("default-settings", spec.default_settings.clone());

    let programs: &[&str] = match spec.kind {
        ToolchainKind::Cpp => &cpp::PROGRAMS,
    };
    for program in programs {
        let location = find_executable(program)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "not found".to_string());
        report = report.with_info(*program, location);
    }

    report
        .with_section("settings", crate::core::settings::enumerate(spec))
        .with_section("tools", spec.tool_names())
}
