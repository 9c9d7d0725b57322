//! Global context for devchain operations.
//!
//! Provides centralized access to the project root, the per-project state
//! directory, and the user-wide configuration home.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::util::config::{load_config, Config};

/// Environment variable overriding the user-wide configuration directory.
pub const HOME_ENV: &str = "DEVCHAIN_HOME";

/// Name of the per-project state directory.
pub const PROJECT_DIR_NAME: &str = ".devchain";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Project root (the current directory unless overridden)
    cwd: PathBuf,

    /// User-wide configuration directory
    home: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a context rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at a specific directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = std::env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                ProjectDirs::from("org", "devchain", "devchain")
                    .map(|dirs| dirs.config_dir().to_path_buf())
            });

        GlobalContext { cwd, home }
    }

    /// Override the user-wide configuration directory.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// The project root.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join("config.toml"))
    }

    /// Get the project-local devchain directory.
    pub fn project_dir(&self) -> PathBuf {
        self.cwd.join(PROJECT_DIR_NAME)
    }

    /// Get the project-local configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir().join("config.toml")
    }

    /// Load the merged global + project configuration.
    pub fn load_config(&self) -> Config {
        match self.config_path() {
            Some(global) => load_config(&global, &self.project_config_path()),
            None => Config::load_or_default(&self.project_config_path()),
        }
    }
}
