//! Toolchain registry - the process-wide catalog of toolchain kinds.
//!
//! The registry is populated once, from the built-in catalogs plus config
//! overrides, and is read-only afterwards. It is passed to the dispatcher
//! explicitly rather than living in a global.

use std::collections::BTreeMap;

use crate::core::errors::DispatchError;
use crate::core::settings::{self, Settings};
use crate::core::toolchain::{Tool, ToolchainKind, ToolchainSpec};
use crate::util::config::Config;

/// Registry of known toolchain kinds.
#[derive(Debug, Clone)]
pub struct ToolchainRegistry {
    kinds: BTreeMap<&'static str, ToolchainSpec>,
}

impl ToolchainRegistry {
    /// Create a registry with the built-in catalog of every kind.
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Create a registry with config overrides applied to the built-in
    /// catalogs. Overrides for kinds this binary does not know are ignored.
    pub fn from_config(config: &Config) -> Self {
        let mut kinds = BTreeMap::new();
        for kind in ToolchainKind::ALL {
            let mut spec = kind.builtin_spec();
            if let Some(overrides) = config.toolchain(kind.as_str()) {
                overrides.apply(&mut spec);
            }
            kinds.insert(kind.as_str(), spec);
        }

        for name in config.toolchains.keys() {
            if !kinds.contains_key(name.as_str()) {
                tracing::warn!("ignoring config for unknown toolchain `{}`", name);
            }
        }

        ToolchainRegistry { kinds }
    }

    /// Names of all known toolchain kinds, sorted.
    pub fn list_kinds(&self) -> Vec<&'static str> {
        self.kinds.keys().copied().collect()
    }

    /// Look a toolchain kind up by name.
    pub fn resolve_kind(&self, name: &str) -> Result<&ToolchainSpec, DispatchError> {
        self.kinds
            .get(name)
            .ok_or_else(|| DispatchError::UnknownToolchain {
                name: name.to_string(),
                available: self.list_kinds().iter().map(|k| k.to_string()).collect(),
            })
    }

    /// The catalog of a kind compiled into this binary.
    pub fn spec(&self, kind: ToolchainKind) -> Result<&ToolchainSpec, DispatchError> {
        self.resolve_kind(kind.as_str())
    }

    /// Look a tool up among the tools a kind exposes.
    pub fn resolve_tool(&self, kind: ToolchainKind, name: &str) -> Result<Tool, DispatchError> {
        let spec = self.spec(kind)?;
        spec.tool(name).ok_or_else(|| DispatchError::UnknownTool {
            kind: kind.to_string(),
            name: name.to_string(),
            available: spec.tool_names(),
        })
    }

    /// Check settings against the combinations a kind advertises.
    ///
    /// Pure and side-effect free. On failure every mismatching field is named.
    pub fn validate_settings(
        &self,
        kind: ToolchainKind,
        settings: &Settings,
    ) -> Result<(), DispatchError> {
        let spec = self.spec(kind)?;
        if spec.supports(settings) {
            return Ok(());
        }

        let mut mismatches = Vec::new();
        if !spec.compilers.iter().any(|c| c == settings.compiler()) {
            mismatches.push(format!(
                "compiler `{}` is not one of: {}",
                settings.compiler(),
                spec.compilers.join(", ")
            ));
        }
        if !spec
            .target_triples
            .iter()
            .any(|t| t == settings.target_triple())
        {
            mismatches.push(format!(
                "target triple `{}` is not one of: {}",
                settings.target_triple(),
                spec.target_triples.join(", ")
            ));
        }
        if !spec.build_types.contains(&settings.build_type()) {
            let build_types: Vec<&str> = spec.build_types.iter().map(|b| b.as_str()).collect();
            mismatches.push(format!(
                "build type `{}` is not one of: {}",
                settings.build_type(),
                build_types.join(", ")
            ));
        }

        Err(DispatchError::UnsupportedSettings {
            kind: kind.to_string(),
            identifier: settings.serialize(),
            mismatches,
        })
    }

    /// Parse an identifier and validate it against a kind in one step.
    ///
    /// Malformed input yields `InvalidFormat`; well-formed input the kind
    /// does not advertise yields `UnsupportedSettings`.
    pub fn resolve_settings(
        &self,
        kind: ToolchainKind,
        identifier: &str,
    ) -> Result<Settings, DispatchError> {
        let settings =
            Settings::parse(identifier).map_err(|reason| DispatchError::InvalidFormat {
                identifier: identifier.to_string(),
                reason,
            })?;
        self.validate_settings(kind, &settings)?;
        Ok(settings)
    }

    /// Tool names for shell completion, in catalog order.
    pub fn completion_candidates(&self, kind: ToolchainKind) -> Vec<String> {
        self.spec(kind).map(|s| s.tool_names()).unwrap_or_default()
    }

    /// Settings identifiers for shell completion, in catalog order.
    pub fn settings_candidates(&self, kind: ToolchainKind) -> Vec<String> {
        self.spec(kind).map(settings::enumerate).unwrap_or_default()
    }
}

impl Default for ToolchainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::ToolchainOverride;

    #[test]
    fn test_list_kinds() {
        let registry = ToolchainRegistry::new();
        assert_eq!(registry.list_kinds(), vec!["cpp"]);
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let registry = ToolchainRegistry::new();
        let err = registry.resolve_kind("haskell").unwrap_err();
        assert!(matches!(
            err,
            DispatchError::UnknownToolchain { ref name, ref available }
                if name == "haskell" && available == &["cpp".to_string()]
        ));
    }

    #[test]
    fn test_resolve_tool() {
        let registry = ToolchainRegistry::new();
        assert_eq!(
            registry.resolve_tool(ToolchainKind::Cpp, "gtest").unwrap(),
            Tool::GTest
        );
        assert!(matches!(
            registry.resolve_tool(ToolchainKind::Cpp, "valgrind"),
            Err(DispatchError::UnknownTool { .. })
        ));
    }

    #[test]
    fn test_every_enumerated_identifier_validates() {
        let registry = ToolchainRegistry::new();
        let candidates = registry.settings_candidates(ToolchainKind::Cpp);
        assert!(!candidates.is_empty());
        for id in &candidates {
            let settings = Settings::parse(id).unwrap();
            registry
                .validate_settings(ToolchainKind::Cpp, &settings)
                .unwrap();
        }
    }

    #[test]
    fn test_unsupported_names_each_mismatch() {
        let registry = ToolchainRegistry::new();
        let err = registry
            .resolve_settings(ToolchainKind::Cpp, "msvc19__x86_64-pc-linux-elf__minsizerel")
            .unwrap_err();
        match err {
            DispatchError::UnsupportedSettings { mismatches, .. } => {
                assert_eq!(mismatches.len(), 2);
                assert!(mismatches[0].contains("`msvc19`"));
                assert!(mismatches[1].contains("`minsizerel`"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_is_invalid_format() {
        let registry = ToolchainRegistry::new();
        assert!(matches!(
            registry.resolve_settings(ToolchainKind::Cpp, "gcc99__bogus"),
            Err(DispatchError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_config_restricts_tools() {
        let mut config = Config::default();
        config.toolchains.insert(
            "cpp".to_string(),
            ToolchainOverride {
                tools: Some(vec!["clang-tidy".to_string()]),
                ..Default::default()
            },
        );
        let registry = ToolchainRegistry::from_config(&config);

        assert_eq!(
            registry.completion_candidates(ToolchainKind::Cpp),
            vec!["clang-tidy".to_string()]
        );
        assert!(matches!(
            registry.resolve_tool(ToolchainKind::Cpp, "gtest"),
            Err(DispatchError::UnknownTool { .. })
        ));
    }
}
