//! devchain - toolchain resolution and dispatch for project automation
//!
//! This crate provides the core library functionality for devchain,
//! including settings parsing, toolchain lookup, project state and the
//! command dispatcher.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for devchain unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    errors::DispatchError, project::Project, registry::ToolchainRegistry, settings::Settings,
    toolchain::ToolchainKind,
};

pub use ops::dispatch::{Command, CommandRequest, Dispatcher};
pub use util::context::GlobalContext;
