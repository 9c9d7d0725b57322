//! `devchain completions` command
//!
//! Generates shell completion scripts for various shells.
//!
//! The static script from clap_complete covers subcommands and flags. For
//! bash and fish a short section is appended so that `create --toolchain`,
//! `build --settings` and `run --tool` ask `devchain complete` for the
//! values of the project in the current directory.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::{Cli, CompletionsArgs};

/// Option values served by `devchain complete`, as
/// `(subcommand, short, long, target)`.
const DYNAMIC_OPTIONS: [(&str, char, &str, &str); 3] = [
    ("create", 't', "toolchain", "toolchains"),
    ("build", 's', "settings", "settings"),
    ("run", 't', "tool", "tools"),
];

pub fn execute(args: CompletionsArgs) -> Result<i32> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    let mut script = Vec::new();
    generate(args.shell, &mut cmd, name.clone(), &mut script);
    script.extend_from_slice(dynamic_section(args.shell, &name).as_bytes());

    io::stdout()
        .write_all(&script)
        .context("failed to write completion script")?;
    Ok(0)
}

/// Shell code that completes option values from `devchain complete`.
///
/// Empty for shells that only get the static script.
fn dynamic_section(shell: Shell, bin: &str) -> String {
    match shell {
        Shell::Bash => bash_section(bin),
        Shell::Fish => fish_section(bin),
        _ => String::new(),
    }
}

fn bash_section(bin: &str) -> String {
    let subs: Vec<&str> = DYNAMIC_OPTIONS.iter().map(|(sub, ..)| *sub).collect();
    let subs = subs.join("|");
    let mut cases = String::new();
    for (sub, short, long, target) in DYNAMIC_OPTIONS {
        cases.push_str(&format!(
            "        {sub}:--{long}|{sub}:-{short}) what={target} ;;\n"
        ));
    }

    format!(
        r#"
_{bin}_candidates() {{
    local cur="${{COMP_WORDS[COMP_CWORD]}}"
    local prev="${{COMP_WORDS[COMP_CWORD-1]}}"
    local sub="" word what=""
    for word in "${{COMP_WORDS[@]:1:COMP_CWORD-1}}"; do
        case "${{word}}" in
            {subs}) sub="${{word}}"; break ;;
        esac
    done
    case "${{sub}}:${{prev}}" in
{cases}    esac
    if [[ -n "${{what}}" ]]; then
        COMPREPLY=($(compgen -W "$({bin} complete "${{what}}" 2>/dev/null)" -- "${{cur}}"))
        return 0
    fi
    _{bin} "$@"
}}

if [[ "${{BASH_VERSINFO[0]}}" -eq 4 && "${{BASH_VERSINFO[1]}}" -ge 4 || "${{BASH_VERSINFO[0]}}" -gt 4 ]]; then
    complete -F _{bin}_candidates -o nosort -o bashdefault -o default {bin}
else
    complete -F _{bin}_candidates -o bashdefault -o default {bin}
fi
"#
    )
}

fn fish_section(bin: &str) -> String {
    let mut out = String::from("\n");
    for (sub, short, long, target) in DYNAMIC_OPTIONS {
        out.push_str(&format!(
            "complete -c {bin} -n \"__fish_seen_subcommand_from {sub}\" -s {short} -l {long} -x -a \"({bin} complete {target})\"\n"
        ));
    }
    out
}
