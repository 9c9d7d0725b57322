//! Toolchain kinds, the tools they expose, and their catalogs.

use std::fmt;
use std::str::FromStr;

use crate::core::settings::{BuildType, Settings};

/// A family of build automation, one per supported project ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolchainKind {
    /// CMake + Conan based C/C++ projects.
    Cpp,
}

impl ToolchainKind {
    /// All kinds compiled into this binary.
    pub const ALL: [ToolchainKind; 1] = [ToolchainKind::Cpp];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainKind::Cpp => "cpp",
        }
    }

    /// The built-in catalog for this kind, before config overrides.
    pub fn builtin_spec(&self) -> ToolchainSpec {
        match self {
            ToolchainKind::Cpp => ToolchainSpec {
                kind: ToolchainKind::Cpp,
                compilers: vec![
                    "clang14".to_string(),
                    "clang15".to_string(),
                    "gcc12".to_string(),
                    "gcc13".to_string(),
                ],
                target_triples: vec![
                    "x86_64-pc-linux-elf".to_string(),
                    "aarch64-pc-linux-elf".to_string(),
                ],
                build_types: vec![BuildType::Debug, BuildType::Release],
                tools: Tool::ALL
                    .iter()
                    .copied()
                    .filter(|t| t.kind() == ToolchainKind::Cpp)
                    .collect(),
                default_settings: "clang14__x86_64-pc-linux-elf__release".to_string(),
                create_allow: vec![".git".to_string()],
                artifacts: vec!["build".to_string(), "compile_commands.json".to_string()],
            },
        }
    }
}

impl FromStr for ToolchainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolchainKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for ToolchainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memory, address or thread sanitizer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sanitizer {
    Address,
    Memory,
    Thread,
}

impl Sanitizer {
    /// Value passed as `-DSANITIZER=`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sanitizer::Address => "asan",
            Sanitizer::Memory => "msan",
            Sanitizer::Thread => "tsan",
        }
    }
}

/// A named action exposed by a toolchain kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    ClangTidy,
    GTest,
    Benchmark,
    AddressSanitizer,
    MemorySanitizer,
    ThreadSanitizer,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::ClangTidy,
        Tool::GTest,
        Tool::Benchmark,
        Tool::AddressSanitizer,
        Tool::MemorySanitizer,
        Tool::ThreadSanitizer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::ClangTidy => "clang-tidy",
            Tool::GTest => "gtest",
            Tool::Benchmark => "benchmark",
            Tool::AddressSanitizer => "asan",
            Tool::MemorySanitizer => "msan",
            Tool::ThreadSanitizer => "tsan",
        }
    }

    /// The kind that owns this tool.
    pub fn kind(&self) -> ToolchainKind {
        ToolchainKind::Cpp
    }

    /// Whether the tool needs a successful build before it can run.
    pub fn requires_build(&self) -> bool {
        true
    }

    /// Whether the build directory is wiped before the tool's build.
    pub fn requires_clean(&self) -> bool {
        matches!(
            self,
            Tool::ClangTidy
                | Tool::AddressSanitizer
                | Tool::MemorySanitizer
                | Tool::ThreadSanitizer
        )
    }

    pub fn sanitizer(&self) -> Option<Sanitizer> {
        match self {
            Tool::AddressSanitizer => Some(Sanitizer::Address),
            Tool::MemorySanitizer => Some(Sanitizer::Memory),
            Tool::ThreadSanitizer => Some(Sanitizer::Thread),
            _ => None,
        }
    }

    /// Look a tool up by its user-facing name.
    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The resolved catalog of one toolchain kind.
///
/// Built once at startup from [`ToolchainKind::builtin_spec`] and any config
/// overrides, then shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainSpec {
    pub kind: ToolchainKind,
    pub compilers: Vec<String>,
    pub target_triples: Vec<String>,
    pub build_types: Vec<BuildType>,
    pub tools: Vec<Tool>,
    /// Settings used by tools that build implicitly.
    pub default_settings: String,
    /// Entries tolerated in a directory at `create` time.
    pub create_allow: Vec<String>,
    /// Paths, relative to the project root, removed by `clean`.
    pub artifacts: Vec<String>,
}

impl ToolchainSpec {
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Membership check of each settings field against this catalog.
    pub fn supports(&self, settings: &Settings) -> bool {
        self.compilers.iter().any(|c| c == settings.compiler())
            && self
                .target_triples
                .iter()
                .any(|t| t == settings.target_triple())
            && self.build_types.contains(&settings.build_type())
    }

    pub fn tool(&self, name: &str) -> Option<Tool> {
        self.tools.iter().copied().find(|t| t.name() == name)
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }
}
