//! Configuration file support for devchain.
//!
//! Two configuration file locations are merged:
//! - Global: `$DEVCHAIN_HOME/config.toml` - User-wide defaults
//! - Project: `.devchain/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, field by field.
//!
//! ```toml
//! [toolchains.cpp]
//! compilers = ["clang14", "clang17"]
//! tools = ["clang-tidy", "gtest"]
//! create_allow = [".git", "README.md"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::settings::{validate_segment, BuildType};
use crate::core::toolchain::{Tool, ToolchainSpec};
use crate::util::fs::is_contained;

/// devchain configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog overrides keyed by toolchain kind name
    pub toolchains: BTreeMap<String, ToolchainOverride>,
}

/// Overrides for one toolchain kind's built-in catalog.
///
/// Every field left unset keeps the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainOverride {
    /// Compiler segments offered in settings identifiers
    pub compilers: Option<Vec<String>>,

    /// Target triple segments offered in settings identifiers
    pub target_triples: Option<Vec<String>>,

    /// Build type segments offered in settings identifiers
    pub build_types: Option<Vec<String>>,

    /// Tools exposed to `devchain run`
    pub tools: Option<Vec<String>>,

    /// Settings used by tools that build implicitly
    pub default_settings: Option<String>,

    /// Directory entries tolerated by `devchain create`
    pub create_allow: Option<Vec<String>>,

    /// Paths removed by `devchain clean`
    pub artifacts: Option<Vec<String>>,
}

impl ToolchainOverride {
    /// Merge another override into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolchainOverride) {
        if other.compilers.is_some() {
            self.compilers = other.compilers;
        }
        if other.target_triples.is_some() {
            self.target_triples = other.target_triples;
        }
        if other.build_types.is_some() {
            self.build_types = other.build_types;
        }
        if other.tools.is_some() {
            self.tools = other.tools;
        }
        if other.default_settings.is_some() {
            self.default_settings = other.default_settings;
        }
        if other.create_allow.is_some() {
            self.create_allow = other.create_allow;
        }
        if other.artifacts.is_some() {
            self.artifacts = other.artifacts;
        }
    }

    /// Apply these overrides on top of a catalog.
    ///
    /// Entries that could never appear in a valid settings identifier, and
    /// tool names the kind does not implement, are dropped with a warning.
    pub fn apply(&self, spec: &mut ToolchainSpec) {
        if let Some(ref compilers) = self.compilers {
            spec.compilers = valid_segments(spec.name(), "compiler", compilers);
        }
        if let Some(ref triples) = self.target_triples {
            spec.target_triples = valid_segments(spec.name(), "target-triple", triples);
        }
        if let Some(ref build_types) = self.build_types {
            spec.build_types = build_types
                .iter()
                .filter_map(|bt| match bt.parse::<BuildType>() {
                    Ok(bt) => Some(bt),
                    Err(e) => {
                        tracing::warn!("ignoring build type for `{}`: {}", spec.name(), e);
                        None
                    }
                })
                .collect();
        }
        if let Some(ref tools) = self.tools {
            let kind = spec.kind;
            spec.tools = tools
                .iter()
                .filter_map(|name| match Tool::from_name(name) {
                    Some(tool) if tool.kind() == kind => Some(tool),
                    _ => {
                        tracing::warn!("ignoring unknown tool `{}` for `{}`", name, kind);
                        None
                    }
                })
                .collect();
        }
        if let Some(ref default_settings) = self.default_settings {
            spec.default_settings = default_settings.clone();
        }
        if let Some(ref allow) = self.create_allow {
            spec.create_allow = allow.clone();
        }
        if let Some(ref artifacts) = self.artifacts {
            spec.artifacts = artifacts
                .iter()
                .filter(|a| {
                    let ok = is_contained(Path::new(a));
                    if !ok {
                        tracing::warn!(
                            "ignoring artifact `{}` for `{}`: must be a relative path inside the project",
                            a,
                            spec.name()
                        );
                    }
                    ok
                })
                .cloned()
                .collect();
        }
    }
}

fn valid_segments(kind: &str, field: &'static str, values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter(|v| match validate_segment(field, v) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("ignoring {} for `{}`: {}", field, kind, e);
                false
            }
        })
        .cloned()
        .collect()
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or
    /// invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("{:#}", e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        for (kind, overrides) in other.toolchains {
            self.toolchains.entry(kind).or_default().merge(overrides);
        }
    }

    /// Overrides for one toolchain kind, if any are configured.
    pub fn toolchain(&self, kind: &str) -> Option<&ToolchainOverride> {
        self.toolchains.get(kind)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.devchain/config.toml)
/// 2. Global config ($DEVCHAIN_HOME/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::load_or_default(global_path);
    config.merge(Config::load_or_default(project_path));
    config
}
