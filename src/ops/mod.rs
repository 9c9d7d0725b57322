//! High-level operations.
//!
//! This module contains the dispatcher and the actions it delegates to.

pub mod clean;
pub mod cpp;
pub mod dispatch;
pub mod executor;

pub use clean::clean_artifacts;
pub use dispatch::{Command, CommandRequest, Dispatch, DispatchState, Dispatcher, Report};
pub use executor::{Action, ActionExecutor, ActionOutput, ActionRequest, ProcessExecutor};
