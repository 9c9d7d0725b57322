//! `devchain run` command

use devchain::ops::dispatch::Command;
use devchain::util::shell::Status;
use devchain::util::{GlobalContext, Shell};

use crate::cli::RunArgs;

pub fn execute(args: RunArgs, ctx: &GlobalContext, shell: &Shell) -> i32 {
    let start = (Status::Running, args.tool.clone());
    super::run_and_report(Command::Run { tool: args.tool }, Some(start), ctx, shell)
}
