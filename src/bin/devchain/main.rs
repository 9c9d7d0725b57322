//! devchain CLI - toolchain automation behind one command surface

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use devchain::core::errors::EXIT_GENERIC;
use devchain::util::diagnostic::{emit, Diagnostic};
use devchain::util::process::install_interrupt_handler;
use devchain::util::{GlobalContext, Shell};

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            EXIT_GENERIC
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; RUST_LOG wins over the flag
    let default_filter = if cli.verbose {
        "devchain=debug"
    } else {
        "devchain=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.no_color);

    if let Err(e) = install_interrupt_handler() {
        emit(
            &Diagnostic::warning(format!("{:#}", e))
                .with_context("Ctrl-C will not be reported as an interruption"),
            shell.use_color(),
        );
    }

    let ctx = match cli.directory {
        Some(dir) => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            GlobalContext::with_cwd(cwd.join(dir))
        }
        None => GlobalContext::new()?,
    };

    // Execute command
    match cli.command {
        Commands::About => Ok(commands::about::execute(&ctx, &shell)),
        Commands::Info(args) => commands::info::execute(args, &ctx, &shell),
        Commands::Create(args) => Ok(commands::create::execute(args, &ctx, &shell)),
        Commands::Build(args) => Ok(commands::build::execute(args, &ctx, &shell)),
        Commands::Run(args) => Ok(commands::run::execute(args, &ctx, &shell)),
        Commands::Clean(args) => Ok(commands::clean::execute(args, &ctx, &shell)),
        Commands::Completions(args) => commands::completions::execute(args),
        Commands::Complete(args) => commands::complete::execute(args, &ctx),
    }
}
