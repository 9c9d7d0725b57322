//! Command recipes of the `cpp` toolchain (Conan + CMake).
//!
//! A build runs three commands inside `build/<settings>`:
//!
//! 1. `conan install` with a host/build profile for the settings
//! 2. `cmake` configure with the generated `conan_toolchain.cmake`
//! 3. `cmake --build`
//!
//! Tools build first (with a clean slate when the tool changes compile flags)
//! and then run every matching binary found in the build directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::errors::DispatchError;
use crate::core::settings::Settings;
use crate::core::toolchain::Tool;
use crate::ops::clean::clean_artifacts;
use crate::ops::executor::{Action, ActionRequest, StepRunner};
use crate::util::fs::{ensure_dir, glob_files, write_atomic};
use crate::util::process::ProcessBuilder;

/// External programs the recipes invoke.
pub const PROGRAMS: [&str; 2] = ["conan", "cmake"];

/// Directory under the project root holding per-settings build trees.
pub const BUILD_DIR: &str = "build";

/// Project-provided Conan profiles, one file per settings identifier.
const PROFILE_DIR: &str = "tools/conan";

const TOOLCHAIN_FILE: &str = "conan_toolchain.cmake";
const COMPILE_COMMANDS: &str = "compile_commands.json";

/// Splits `clang14` into `clang` and `14`.
static COMPILER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z+]*?)-?(\d+(?:\.\d+)*)$").expect("compiler regex is valid")
});

/// Run one resolved action of the `cpp` toolchain.
pub fn execute(runner: &mut StepRunner<'_>, request: &ActionRequest<'_>) -> Result<(), DispatchError> {
    match request.action {
        Action::Build(settings) => {
            build(runner, request.root, settings, &[])?;
            Ok(())
        }
        Action::Run { tool, settings } => run_tool(runner, request, *tool, settings),
    }
}

/// Build directory for a settings identifier.
pub fn build_dir(root: &Path, settings: &Settings) -> PathBuf {
    root.join(BUILD_DIR).join(settings.serialize())
}

/// Build the project. Returns the build directory, or `None` if a step
/// failed (the failure is recorded on the runner).
fn build(
    runner: &mut StepRunner<'_>,
    root: &Path,
    settings: &Settings,
    cmake_opts: &[String],
) -> Result<Option<PathBuf>, DispatchError> {
    let dir = build_dir(root, settings);
    ensure_dir(&dir)
        .map_err(|e| DispatchError::io(format!("failed to create `{}`", dir.display()), e))?;

    let profile = conan_profile(root, settings, &dir)?;
    let install = ProcessBuilder::new("conan")
        .arg("install")
        .arg(root)
        .arg("--output-folder")
        .arg(&dir)
        .arg("--profile:host")
        .arg(&profile)
        .arg("--profile:build")
        .arg(&profile)
        .args(["--build", "missing"])
        .cwd(&dir);

    let toolchain_file = dir.join(TOOLCHAIN_FILE);
    let configure = ProcessBuilder::new("cmake")
        .arg(format!("-DCMAKE_BUILD_TYPE={}", settings.build_type().as_cmake()))
        .arg(format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain_file.display()))
        .arg("-DCMAKE_EXPORT_COMPILE_COMMANDS=ON")
        .args(cmake_opts)
        .arg(root)
        .cwd(&dir);

    let compile = ProcessBuilder::new("cmake")
        .arg("--build")
        .arg(&dir)
        .args(["--", "-j"])
        .cwd(&dir);

    if runner.is_verbose() {
        runner.info("command-1", install.display_command());
        runner.info("command-2", configure.display_command());
        runner.info("command-3", compile.display_command());
    }

    if !runner.run("Installing Conan packages", install)? {
        return Ok(None);
    }
    if !toolchain_file.is_file() {
        return Err(DispatchError::MissingArtifact {
            path: toolchain_file,
        });
    }
    if !runner.run("Configuring", configure)? {
        return Ok(None);
    }
    if !runner.run(&format!("Building {}", settings), compile)? {
        return Ok(None);
    }

    let compile_commands = dir.join(COMPILE_COMMANDS);
    if compile_commands.is_file() {
        let target = root.join(COMPILE_COMMANDS);
        fs::copy(&compile_commands, &target).map_err(|e| {
            DispatchError::io(format!("failed to copy `{}`", compile_commands.display()), e)
        })?;
    }

    runner.info("build-directory", dir.display().to_string());
    Ok(Some(dir))
}

fn run_tool(
    runner: &mut StepRunner<'_>,
    request: &ActionRequest<'_>,
    tool: Tool,
    settings: &Settings,
) -> Result<(), DispatchError> {
    if tool.requires_clean() {
        clean_artifacts(request.root, request.spec)?;
    }

    let mut cmake_opts = Vec::new();
    if tool == Tool::ClangTidy {
        cmake_opts.push("-DANALYSIS=clang-tidy".to_string());
    }
    if let Some(sanitizer) = tool.sanitizer() {
        cmake_opts.push(format!("-DSANITIZER={}", sanitizer.as_str()));
    }

    let Some(dir) = build(runner, request.root, settings, &cmake_opts)? else {
        return Ok(());
    };

    let pattern = match tool {
        // The analysis happens during the build
        Tool::ClangTidy => return Ok(()),
        Tool::Benchmark => "**/*-bench",
        Tool::GTest
        | Tool::AddressSanitizer
        | Tool::MemorySanitizer
        | Tool::ThreadSanitizer => "**/*-test",
    };

    let binaries = glob_files(&dir, &[pattern.to_string()]).map_err(|e| DispatchError::Execution {
        action: tool.to_string(),
        message: format!("{:#}", e),
    })?;
    if binaries.is_empty() {
        tracing::warn!("no binaries matching `{}` in {}", pattern, dir.display());
    }

    for binary in binaries {
        let name = binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| binary.display().to_string());
        let cmd = ProcessBuilder::new(&binary).cwd(request.root);
        let code = runner.run_checked(&format!("Running {}", name), cmd)?;
        if code == 0 {
            runner.info(name, "passed");
        } else {
            runner.info(name, format!("failed (exit code {})", code));
        }
    }
    Ok(())
}

/// Profile to pass to `conan install`.
///
/// A project-provided profile at `tools/conan/<settings>` wins; otherwise one
/// is generated into the build directory.
fn conan_profile(root: &Path, settings: &Settings, dir: &Path) -> Result<PathBuf, DispatchError> {
    let custom = root.join(PROFILE_DIR).join(settings.serialize());
    if custom.is_file() {
        tracing::debug!("using conan profile {}", custom.display());
        return Ok(custom);
    }

    let generated = dir.join("conan-profile");
    write_atomic(&generated, render_profile(settings).as_bytes())
        .map_err(|e| DispatchError::io(format!("failed to write `{}`", generated.display()), e))?;
    Ok(generated)
}

/// Render a Conan profile for the settings.
pub fn render_profile(settings: &Settings) -> String {
    let mut lines = vec!["[settings]".to_string()];
    if settings.target_triple().contains("linux") {
        lines.push("os=Linux".to_string());
    }
    lines.push(format!("arch={}", conan_arch(settings.arch())));

    match COMPILER_RE.captures(settings.compiler()) {
        Some(caps) => {
            let name = &caps[1];
            lines.push(format!("compiler={}", name));
            lines.push(format!("compiler.version={}", &caps[2]));
            if name == "gcc" || name == "clang" {
                lines.push("compiler.libcxx=libstdc++11".to_string());
            }
        }
        None => lines.push(format!("compiler={}", settings.compiler())),
    }

    lines.push(format!("build_type={}", settings.build_type().as_cmake()));
    lines.push(String::new());
    lines.join("\n")
}

fn conan_arch(arch: &str) -> &str {
    match arch {
        "aarch64" | "arm64" => "armv8",
        "i386" | "i686" => "x86",
        other => other,
    }
}
