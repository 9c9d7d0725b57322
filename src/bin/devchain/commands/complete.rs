//! `devchain complete` command
//!
//! Prints one completion candidate per line for shell completion scripts.
//! Reads the cached candidates from the project state when there is one and
//! falls back to the registry otherwise. Never writes and never spawns a
//! process; any failure just yields no candidates.

use anyhow::Result;

use devchain::core::project::Project;
use devchain::core::registry::ToolchainRegistry;
use devchain::core::toolchain::ToolchainKind;
use devchain::util::GlobalContext;

use crate::cli::{CompleteArgs, CompletionTarget};

pub fn execute(args: CompleteArgs, ctx: &GlobalContext) -> Result<i32> {
    for candidate in candidates(args.what, ctx) {
        println!("{}", candidate);
    }
    Ok(0)
}

fn candidates(what: CompletionTarget, ctx: &GlobalContext) -> Vec<String> {
    let registry = ToolchainRegistry::from_config(&ctx.load_config());
    if what == CompletionTarget::Toolchains {
        return registry.list_kinds().iter().map(|k| k.to_string()).collect();
    }

    let project = Project::load(ctx.cwd()).ok();
    if let Some(cache) = project.as_ref().and_then(|p| p.completion()) {
        return match what {
            CompletionTarget::Settings => cache.settings.clone(),
            _ => cache.tools.clone(),
        };
    }

    // Without a project there is no kind to ask about; offer every kind's
    // candidates.
    let kinds: Vec<ToolchainKind> = match project {
        Some(p) => vec![p.kind()],
        None => ToolchainKind::ALL.to_vec(),
    };
    kinds
        .into_iter()
        .flat_map(|kind| match what {
            CompletionTarget::Settings => registry.settings_candidates(kind),
            _ => registry.completion_candidates(kind),
        })
        .collect()
}
