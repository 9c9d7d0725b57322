//! `devchain build` command

use devchain::ops::dispatch::Command;
use devchain::util::shell::Status;
use devchain::util::{GlobalContext, Shell};

use crate::cli::BuildArgs;

pub fn execute(args: BuildArgs, ctx: &GlobalContext, shell: &Shell) -> i32 {
    let start = (Status::Building, args.settings.clone());
    super::run_and_report(
        Command::Build {
            settings: args.settings,
        },
        Some(start),
        ctx,
        shell,
    )
}
