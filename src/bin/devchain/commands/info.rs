//! `devchain info` command

use anyhow::Result;
use serde_json::{json, Map, Value};

use devchain::ops::dispatch::{Command, Report};
use devchain::util::{GlobalContext, Shell};

use crate::cli::InfoArgs;

use super::{dispatch, print_report, report_failure};

pub fn execute(args: InfoArgs, ctx: &GlobalContext, shell: &Shell) -> Result<i32> {
    let outcome = dispatch(Command::Info, ctx, shell);
    let code = outcome.exit_code();
    match outcome.result {
        Ok(report) if args.json => {
            println!("{}", serde_json::to_string_pretty(&to_json(&report))?);
        }
        Ok(report) => print_report(&report, None),
        Err(e) => report_failure(&e, shell),
    }
    Ok(code)
}

fn to_json(report: &Report) -> Value {
    let info: Map<String, Value> = report
        .info
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    let mut out = json!({
        "message": report.message,
        "info": info,
    });
    if let Value::Object(ref mut obj) = out {
        for (name, values) in &report.sections {
            obj.insert(name.clone(), json!(values));
        }
    }
    out
}
