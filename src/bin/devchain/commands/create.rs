//! `devchain create` command

use devchain::ops::dispatch::Command;
use devchain::util::{GlobalContext, Shell};

use crate::cli::CreateArgs;

pub fn execute(args: CreateArgs, ctx: &GlobalContext, shell: &Shell) -> i32 {
    super::run_and_report(
        Command::Create {
            toolchain: args.toolchain,
            force: args.force,
        },
        None,
        ctx,
        shell,
    )
}
