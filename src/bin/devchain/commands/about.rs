//! `devchain about` command

use devchain::ops::dispatch::Command;
use devchain::util::{GlobalContext, Shell};

use super::{dispatch, print_report, report_failure};

pub fn execute(ctx: &GlobalContext, shell: &Shell) -> i32 {
    let outcome = dispatch(Command::About, ctx, shell);
    let code = outcome.exit_code();
    match outcome.result {
        Ok(report) => print_report(&report, None),
        Err(e) => report_failure(&e, shell),
    }
    code
}
