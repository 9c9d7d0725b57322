//! Core data structures for devchain.
//!
//! - Settings identifiers and their codec
//! - Toolchain kinds, tools and catalogs
//! - The toolchain registry
//! - Per-project persisted state
//! - The dispatch error taxonomy

pub mod errors;
pub mod project;
pub mod registry;
pub mod settings;
pub mod toolchain;

pub use errors::DispatchError;
pub use project::Project;
pub use registry::ToolchainRegistry;
pub use settings::{BuildType, Settings};
pub use toolchain::{Tool, ToolchainKind, ToolchainSpec};
