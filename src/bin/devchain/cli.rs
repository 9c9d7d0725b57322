//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// devchain - one command surface for every project's build, test and lint
#[derive(Parser)]
#[command(name = "devchain")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output and stream delegated command output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show information about devchain itself
    About,

    /// Show the toolchain, settings and tools of the current project
    Info(InfoArgs),

    /// Set up a project in the current directory
    Create(CreateArgs),

    /// Build the project with the given settings
    Build(BuildArgs),

    /// Run a tool of the project's toolchain
    Run(RunArgs),

    /// Remove build artifacts
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Print completion candidates (used by shell completion scripts)
    #[command(hide = true)]
    Complete(CompleteArgs),
}

#[derive(Args)]
pub struct InfoArgs {
    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Toolchain kind (see `devchain complete toolchains`)
    #[arg(short, long, env = "DEVCHAIN_TOOLCHAIN")]
    pub toolchain: String,

    /// Set up even if the directory already holds files
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Settings identifier, `<compiler>__<target-triple>__<build-type>`
    #[arg(short, long, env = "DEVCHAIN_SETTINGS")]
    pub settings: String,
}

#[derive(Args)]
pub struct RunArgs {
    /// Tool to run
    #[arg(short, long)]
    pub tool: String,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Also remove the project state, un-initializing the directory
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[derive(Args)]
pub struct CompleteArgs {
    /// Which candidates to print
    #[arg(value_enum)]
    pub what: CompletionTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CompletionTarget {
    Toolchains,
    Settings,
    Tools,
}
