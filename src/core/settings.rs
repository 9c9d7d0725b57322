//! Settings identifiers.
//!
//! A settings identifier is the flat string
//! `<compiler>__<target-triple>__<build-type>`, e.g.
//! `clang14__x86_64-pc-linux-elf__release`. It is parsed purely by lexical
//! splitting so completion candidates can be produced and checked without any
//! further context.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::core::toolchain::ToolchainSpec;

/// Separator between the three segments of a settings identifier.
pub const SEPARATOR: &str = "__";

/// CMake-style build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// All recognized build types, in canonical order.
    pub const ALL: [BuildType; 4] = [
        BuildType::Debug,
        BuildType::Release,
        BuildType::RelWithDebInfo,
        BuildType::MinSizeRel,
    ];

    /// Get the identifier segment for this build type.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "debug",
            BuildType::Release => "release",
            BuildType::RelWithDebInfo => "relwithdebinfo",
            BuildType::MinSizeRel => "minsizerel",
        }
    }

    /// Get the value passed as `CMAKE_BUILD_TYPE`.
    pub fn as_cmake(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err(SettingsError::UnknownBuildType(s.to_string())),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an identifier or segment was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("expected 3 segments separated by `{SEPARATOR}`, found {0}")]
    SegmentCount(usize),

    #[error("empty {0} segment")]
    EmptySegment(&'static str),

    #[error("{field} segment `{value}` must not contain `{SEPARATOR}` or start/end with `_`")]
    InvalidSegment { field: &'static str, value: String },

    #[error("unknown build type `{0}`, expected one of: debug, release, relwithdebinfo, minsizerel")]
    UnknownBuildType(String),
}

/// A structured build configuration.
///
/// Immutable once constructed; every constructor validates the segments so
/// that `serialize` followed by `parse` always yields the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Settings {
    compiler: String,
    target_triple: String,
    build_type: BuildType,
}

impl Settings {
    /// Create settings from already-split parts.
    pub fn new(
        compiler: impl Into<String>,
        target_triple: impl Into<String>,
        build_type: BuildType,
    ) -> Result<Self, SettingsError> {
        let compiler = compiler.into();
        let target_triple = target_triple.into();
        validate_segment("compiler", &compiler)?;
        validate_segment("target-triple", &target_triple)?;
        Ok(Settings {
            compiler,
            target_triple,
            build_type,
        })
    }

    /// Parse a settings identifier.
    pub fn parse(identifier: &str) -> Result<Self, SettingsError> {
        let segments: Vec<&str> = identifier.split(SEPARATOR).collect();
        if segments.len() != 3 {
            return Err(SettingsError::SegmentCount(segments.len()));
        }
        if segments[2].is_empty() {
            return Err(SettingsError::EmptySegment("build-type"));
        }
        let build_type = segments[2].parse()?;
        Settings::new(segments[0], segments[1], build_type)
    }

    /// Serialize back to the identifier form.
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    pub fn target_triple(&self) -> &str {
        &self.target_triple
    }

    pub fn build_type(&self) -> BuildType {
        self.build_type
    }

    /// First component of the target triple (e.g. `x86_64`).
    pub fn arch(&self) -> &str {
        self.target_triple
            .split('-')
            .next()
            .unwrap_or(&self.target_triple)
    }
}

impl FromStr for Settings {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Settings::parse(s)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.compiler, self.target_triple, self.build_type
        )
    }
}

/// Check a compiler or target-triple segment.
pub fn validate_segment(field: &'static str, value: &str) -> Result<(), SettingsError> {
    if value.is_empty() {
        return Err(SettingsError::EmptySegment(field));
    }
    // A leading or trailing `_` would merge with the separator and make the
    // split ambiguous.
    if value.contains(SEPARATOR) || value.starts_with('_') || value.ends_with('_') {
        return Err(SettingsError::InvalidSegment {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Every valid identifier for a toolchain, in catalog order.
///
/// Order is compiler, then target triple, then build type, each following the
/// order the catalog lists them in. Recomputed on every call.
pub fn enumerate(spec: &ToolchainSpec) -> Vec<String> {
    let mut out =
        Vec::with_capacity(spec.compilers.len() * spec.target_triples.len() * spec.build_types.len());
    for compiler in &spec.compilers {
        for triple in &spec.target_triples {
            for build_type in &spec.build_types {
                out.push(format!("{compiler}{SEPARATOR}{triple}{SEPARATOR}{build_type}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::toolchain::ToolchainKind;

    #[test]
    fn test_parse_valid() {
        let s = Settings::parse("clang14__x86_64-pc-linux-elf__release").unwrap();
        assert_eq!(s.compiler(), "clang14");
        assert_eq!(s.target_triple(), "x86_64-pc-linux-elf");
        assert_eq!(s.build_type(), BuildType::Release);
        assert_eq!(s.arch(), "x86_64");
    }

    #[test]
    fn test_serialize_matches_input() {
        let id = "gcc12__aarch64-pc-linux-elf__debug";
        assert_eq!(Settings::parse(id).unwrap().serialize(), id);
    }

    #[test]
    fn test_round_trip_enumerated() {
        let spec = ToolchainKind::Cpp.builtin_spec();
        for id in enumerate(&spec) {
            let parsed = Settings::parse(&id).unwrap();
            assert_eq!(Settings::parse(&parsed.serialize()).unwrap(), parsed);
        }
    }

    #[test]
    fn test_reject_wrong_segment_count() {
        assert_eq!(
            Settings::parse("gcc99__bogus"),
            Err(SettingsError::SegmentCount(2))
        );
        assert_eq!(
            Settings::parse("a__b__release__c"),
            Err(SettingsError::SegmentCount(4))
        );
        assert_eq!(Settings::parse(""), Err(SettingsError::SegmentCount(1)));
    }

    #[test]
    fn test_reject_empty_segments() {
        assert!(matches!(
            Settings::parse("__x86_64-pc-linux-elf__release"),
            Err(SettingsError::EmptySegment("compiler"))
        ));
        assert!(matches!(
            Settings::parse("clang14____release"),
            Err(SettingsError::EmptySegment("target-triple"))
        ));
        assert!(matches!(
            Settings::parse("clang14__x86_64__"),
            Err(SettingsError::EmptySegment("build-type"))
        ));
    }

    #[test]
    fn test_reject_unknown_build_type() {
        assert!(matches!(
            Settings::parse("clang14__x86_64-pc-linux-elf__fast"),
            Err(SettingsError::UnknownBuildType(_))
        ));
        // Build types are case sensitive
        assert!(Settings::parse("clang14__x86_64-pc-linux-elf__Release").is_err());
    }

    #[test]
    fn test_reject_ambiguous_underscores() {
        assert!(matches!(
            Settings::parse("clang___x86_64__release"),
            Err(SettingsError::InvalidSegment { .. })
        ));
        assert!(Settings::new("clang_", "x86_64", BuildType::Debug).is_err());
        assert!(Settings::new("clang", "x86__64", BuildType::Debug).is_err());
        assert!(Settings::new("clang_14", "x86_64", BuildType::Debug).is_ok());
    }

    #[test]
    fn test_enumerate_is_stable() {
        let spec = ToolchainKind::Cpp.builtin_spec();
        let first = enumerate(&spec);
        assert_eq!(first, enumerate(&spec));
        assert_eq!(
            first.len(),
            spec.compilers.len() * spec.target_triples.len() * spec.build_types.len()
        );
        assert_eq!(first[0], "clang14__x86_64-pc-linux-elf__debug");
        assert_eq!(first[1], "clang14__x86_64-pc-linux-elf__release");
    }

    #[test]
    fn test_build_type_cmake_names() {
        assert_eq!(BuildType::RelWithDebInfo.as_cmake(), "RelWithDebInfo");
        for bt in BuildType::ALL {
            assert_eq!(bt.as_str().parse::<BuildType>().unwrap(), bt);
        }
    }
}
