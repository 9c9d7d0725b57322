//! `devchain clean` command

use devchain::ops::dispatch::Command;
use devchain::util::{GlobalContext, Shell};

use crate::cli::CleanArgs;

pub fn execute(args: CleanArgs, ctx: &GlobalContext, shell: &Shell) -> i32 {
    super::run_and_report(Command::Clean { all: args.all }, None, ctx, shell)
}
