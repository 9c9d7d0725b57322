//! CLI integration tests for devchain.
//!
//! These tests drive the binary end to end: project creation, the error
//! taxonomy and its exit codes, completion candidates and cleanup. Delegated
//! builds run against stand-in `conan`/`cmake` scripts on unix.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// A scratch project directory plus an isolated config home.
struct Sandbox {
    project: TempDir,
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Sandbox {
            project: TempDir::new().unwrap(),
            home: TempDir::new().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.project.path()
    }

    /// The devchain binary, rooted in the project with config isolated.
    fn devchain(&self) -> Command {
        let mut cmd = Command::cargo_bin("devchain").unwrap();
        cmd.current_dir(self.root())
            .env("DEVCHAIN_HOME", self.home.path())
            .env_remove("RUST_LOG")
            .env_remove("DEVCHAIN_TOOLCHAIN")
            .env_remove("DEVCHAIN_SETTINGS")
            .arg("--no-color");
        cmd
    }

    fn create(&self) {
        self.devchain()
            .args(["create", "--toolchain", "cpp"])
            .assert()
            .success();
    }

    fn write(&self, relative: &str, contents: &str) {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

// ============================================================================
// devchain about
// ============================================================================

#[test]
fn test_about_without_project() {
    let sb = Sandbox::new();

    let first = sb.devchain().arg("about").assert().success();
    let stdout = String::from_utf8(first.get_output().stdout.clone()).unwrap();
    assert!(stdout.starts_with("devchain "));
    assert!(stdout.contains("cpp"));

    let second = sb.devchain().arg("about").output().unwrap();
    assert_eq!(second.stdout, first.get_output().stdout);
}

// ============================================================================
// devchain create
// ============================================================================

#[test]
fn test_create_persists_toolchain() {
    let sb = Sandbox::new();

    sb.devchain()
        .args(["create", "--toolchain", "cpp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project successfully set up"));

    let state = fs::read_to_string(sb.root().join(".devchain/state.toml")).unwrap();
    assert!(state.contains("toolchain = \"cpp\""));
    assert!(state.contains("format = 1"));
}

#[test]
fn test_create_twice_fails() {
    let sb = Sandbox::new();
    sb.create();

    sb.devchain()
        .args(["create", "-t", "cpp", "--force"])
        .assert()
        .code(106)
        .stderr(predicate::str::contains("already a devchain project"));
}

#[test]
fn test_create_in_non_empty_directory() {
    let sb = Sandbox::new();
    sb.write("main.cpp", "int main() { return 0; }\n");

    sb.devchain()
        .args(["create", "--toolchain", "cpp"])
        .assert()
        .code(107)
        .stderr(predicate::str::contains("main.cpp"))
        .stderr(predicate::str::contains("--force"));
    assert!(!sb.root().join(".devchain/state.toml").exists());

    sb.devchain()
        .args(["create", "--toolchain", "cpp", "--force"])
        .assert()
        .success();
    assert!(sb.root().join("main.cpp").exists());
}

#[test]
fn test_create_tolerates_git_directory() {
    let sb = Sandbox::new();
    fs::create_dir(sb.root().join(".git")).unwrap();
    sb.create();
}

#[test]
fn test_create_unknown_toolchain() {
    let sb = Sandbox::new();

    sb.devchain()
        .args(["create", "--toolchain", "fortran"])
        .assert()
        .code(102)
        .stderr(predicate::str::contains("unknown toolchain `fortran`"))
        .stderr(predicate::str::contains("available toolchains: cpp"));
}

#[test]
fn test_create_with_directory_flag() {
    let sb = Sandbox::new();
    let nested = sb.root().join("nested");
    fs::create_dir(&nested).unwrap();

    sb.devchain()
        .args(["-C", "nested", "create", "--toolchain", "cpp"])
        .assert()
        .success();
    assert!(nested.join(".devchain/state.toml").exists());
}

// ============================================================================
// Uninitialized and corrupt projects
// ============================================================================

#[test]
fn test_info_requires_project() {
    let sb = Sandbox::new();

    sb.devchain()
        .arg("info")
        .assert()
        .code(105)
        .stderr(predicate::str::contains("no devchain project"))
        .stderr(predicate::str::contains("devchain create --toolchain"));
}

#[test]
fn test_build_requires_project() {
    let sb = Sandbox::new();

    sb.devchain()
        .args(["build", "--settings", "clang14__x86_64-pc-linux-elf__release"])
        .assert()
        .code(105);
}

#[test]
fn test_corrupt_state_is_reported_and_kept() {
    let sb = Sandbox::new();
    sb.write(".devchain/state.toml", "toolchain = [\n");

    sb.devchain()
        .arg("info")
        .assert()
        .code(108)
        .stderr(predicate::str::contains("corrupt"));
    assert!(sb.root().join(".devchain/state.toml").exists());
}

// ============================================================================
// devchain build / run resolution failures
// ============================================================================

#[test]
fn test_build_malformed_settings() {
    let sb = Sandbox::new();
    sb.create();

    sb.devchain()
        .args(["build", "--settings", "gcc99__bogus"])
        .assert()
        .code(101)
        .stderr(predicate::str::contains("gcc99__bogus"));
    assert!(!sb.root().join("build").exists());
}

#[test]
fn test_build_unsupported_settings() {
    let sb = Sandbox::new();
    sb.create();

    sb.devchain()
        .args(["build", "-s", "gcc99__x86_64-pc-linux-elf__release"])
        .assert()
        .code(104)
        .stderr(predicate::str::contains("compiler `gcc99` is not one of"));
}

#[test]
fn test_run_unknown_tool() {
    let sb = Sandbox::new();
    sb.create();

    sb.devchain()
        .args(["run", "--tool", "valgrind"])
        .assert()
        .code(103)
        .stderr(predicate::str::contains("available tools: clang-tidy, gtest"));
}

#[test]
fn test_run_tool_removed_by_project_config() {
    let sb = Sandbox::new();
    sb.create();
    sb.write(
        ".devchain/config.toml",
        "[toolchains.cpp]\ntools = [\"clang-tidy\"]\n",
    );

    sb.devchain()
        .args(["run", "--tool", "gtest"])
        .assert()
        .code(103);
}

// ============================================================================
// devchain info / complete
// ============================================================================

#[test]
fn test_info_is_idempotent() {
    let sb = Sandbox::new();
    sb.create();

    let first = sb.devchain().arg("info").output().unwrap();
    let second = sb.devchain().arg("info").output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let stdout = String::from_utf8(first.stdout).unwrap();
    assert!(stdout.contains("clang14__x86_64-pc-linux-elf__release"));
    assert!(stdout.contains("gtest"));
}

#[test]
fn test_info_json() {
    let sb = Sandbox::new();
    sb.create();

    let output = sb.devchain().args(["info", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["info"]["toolchain"], "cpp");
    assert_eq!(value["tools"].as_array().unwrap().len(), 6);
}

#[test]
fn test_complete_candidates() {
    let sb = Sandbox::new();

    sb.devchain()
        .args(["complete", "toolchains"])
        .assert()
        .success()
        .stdout("cpp\n");

    sb.create();
    sb.devchain()
        .args(["complete", "settings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gcc13__aarch64-pc-linux-elf__debug\n"));
    sb.devchain()
        .args(["complete", "tools"])
        .assert()
        .success()
        .stdout("clang-tidy\ngtest\nbenchmark\nasan\nmsan\ntsan\n");
}

#[test]
fn test_completions_script() {
    let sb = Sandbox::new();

    sb.devchain()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("devchain"));
}

#[test]
fn test_completions_query_project_candidates() {
    let sb = Sandbox::new();

    sb.devchain()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("build:--settings|build:-s) what=settings"))
        .stdout(predicate::str::contains("devchain complete \"${what}\""))
        .stdout(predicate::str::contains("complete -F _devchain_candidates"));

    sb.devchain()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(devchain complete settings)"));
}

// ============================================================================
// devchain clean
// ============================================================================

#[test]
fn test_clean_removes_artifacts() {
    let sb = Sandbox::new();
    sb.create();
    sb.write("build/clang14__x86_64-pc-linux-elf__release/app", "");
    sb.write("compile_commands.json", "[]");
    sb.write("src/main.cpp", "");

    sb.devchain().arg("clean").assert().success();
    assert!(!sb.root().join("build").exists());
    assert!(!sb.root().join("compile_commands.json").exists());
    assert!(sb.root().join("src/main.cpp").exists());

    // Still initialized
    sb.devchain().arg("info").assert().success();
}

#[test]
fn test_clean_all_uninitializes() {
    let sb = Sandbox::new();
    sb.create();

    sb.devchain().args(["clean", "--all"]).assert().success();
    sb.devchain().arg("info").assert().code(105);

    // The directory can be set up again
    sb.create();
}

// ============================================================================
// Delegated actions (stand-in conan/cmake)
// ============================================================================

#[cfg(unix)]
mod delegated {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const FAKE_CONAN: &str = "#!/bin/sh\ntouch conan_toolchain.cmake\nexit 0\n";

    const FAKE_CMAKE: &str = r#"#!/bin/sh
if [ -n "$FAKE_INTERRUPT" ]; then
  kill -INT "$PPID"
  sleep 1
  exit 2
fi
if [ "$1" = "--build" ]; then
  mkdir -p "$2/tests"
  printf '#!/bin/sh\nexit %s\n' "${FAKE_TEST_CODE:-0}" > "$2/tests/unit-test"
  chmod +x "$2/tests/unit-test"
  exit "${FAKE_BUILD_CODE:-0}"
fi
echo '[]' > compile_commands.json
exit 0
"#;

    /// Put stand-in tools first on PATH.
    fn with_fake_tools(sb: &Sandbox, cmd: &mut Command) {
        let bin = sb.home.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        for (name, script) in [("conan", FAKE_CONAN), ("cmake", FAKE_CMAKE)] {
            let path = bin.join(name);
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        let path = std::env::var("PATH").unwrap_or_default();
        cmd.env("PATH", format!("{}:{}", bin.display(), path));
    }

    #[test]
    fn test_build_delegates_and_copies_compile_commands() {
        let sb = Sandbox::new();
        sb.create();

        let mut cmd = sb.devchain();
        with_fake_tools(&sb, &mut cmd);
        cmd.args(["build", "--settings", "gcc12__x86_64-pc-linux-elf__debug"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Project successfully built"))
            .stdout(predicate::str::contains("runtime"));

        let dir = sb.root().join("build/gcc12__x86_64-pc-linux-elf__debug");
        let profile = fs::read_to_string(dir.join("conan-profile")).unwrap();
        assert!(profile.contains("compiler=gcc"));
        assert!(profile.contains("build_type=Debug"));
        assert!(sb.root().join("compile_commands.json").exists());
    }

    #[test]
    fn test_build_exit_code_propagates() {
        let sb = Sandbox::new();
        sb.create();

        let mut cmd = sb.devchain();
        with_fake_tools(&sb, &mut cmd);
        cmd.env("FAKE_BUILD_CODE", "3")
            .args(["build", "--settings", "clang14__x86_64-pc-linux-elf__release"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("failed with exit code 3"));
    }

    #[test]
    fn test_interrupted_build_exits_130_and_keeps_state() {
        let sb = Sandbox::new();
        sb.create();
        // Settle the completion cache before taking the snapshot
        sb.devchain().arg("info").assert().success();
        let state_path = sb.root().join(".devchain/state.toml");
        let before = fs::read(&state_path).unwrap();

        let mut cmd = sb.devchain();
        with_fake_tools(&sb, &mut cmd);
        cmd.env("FAKE_INTERRUPT", "1")
            .args(["build", "--settings", "gcc12__x86_64-pc-linux-elf__debug"])
            .assert()
            .code(130);

        assert_eq!(fs::read(&state_path).unwrap(), before);
        assert!(!sb.root().join("compile_commands.json").exists());
    }

    #[test]
    fn test_gtest_failure_propagates() {
        let sb = Sandbox::new();
        sb.create();

        let mut cmd = sb.devchain();
        with_fake_tools(&sb, &mut cmd);
        cmd.env("FAKE_TEST_CODE", "4")
            .args(["run", "--tool", "gtest"])
            .assert()
            .code(4);

        let mut cmd = sb.devchain();
        with_fake_tools(&sb, &mut cmd);
        cmd.args(["run", "--tool", "gtest"])
            .assert()
            .success()
            .stdout(predicate::str::contains("unit-test"))
            .stdout(predicate::str::contains("passed"));
    }
}
