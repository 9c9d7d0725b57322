//! Project state - the directory-scoped record written by `devchain create`.
//!
//! State lives in `.devchain/state.toml` under the project root. It records
//! the selected toolchain kind and caches the completion candidates of that
//! kind so shell completion does not have to rebuild the registry.
//!
//! Every write goes through [`write_atomic`], so an interrupted write leaves
//! the previous file intact. Keys this version does not know about are kept
//! as-is when the file is rewritten.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::DispatchError;
use crate::core::settings;
use crate::core::toolchain::{ToolchainKind, ToolchainSpec};
use crate::util::context::PROJECT_DIR_NAME;
use crate::util::fs::{list_entries, write_atomic};

/// File name of the state file inside the project directory.
pub const STATE_FILE_NAME: &str = "state.toml";

/// Current state file format version.
pub const STATE_FORMAT: u32 = 1;

/// Version of this binary, recorded in the state file.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// On-disk layout of the state file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateFile {
    format: u32,
    toolchain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completion: Option<CompletionCache>,
    #[serde(flatten)]
    extra: toml::Table,
}

/// Cached completion candidates of the project's toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCache {
    pub generated_by: String,
    pub settings: Vec<String>,
    pub tools: Vec<String>,
}

impl CompletionCache {
    /// Snapshot the candidates of a toolchain catalog.
    pub fn from_spec(spec: &ToolchainSpec) -> Self {
        CompletionCache {
            generated_by: VERSION.to_string(),
            settings: settings::enumerate(spec),
            tools: spec.tool_names(),
        }
    }
}

/// Path of the state file for a project root.
pub fn state_path(root: &Path) -> PathBuf {
    root.join(PROJECT_DIR_NAME).join(STATE_FILE_NAME)
}

/// An initialized project.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    kind: ToolchainKind,
    state: StateFile,
}

impl Project {
    /// Initialize a project at `root` for the given toolchain.
    ///
    /// Fails if state already exists. Unless `force` is set, also fails when
    /// the directory holds entries the toolchain does not tolerate.
    pub fn init(root: &Path, spec: &ToolchainSpec, force: bool) -> Result<Project, DispatchError> {
        let path = state_path(root);
        if path.exists() {
            let kind = read_state(&path)
                .map(|s| s.toolchain)
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(DispatchError::AlreadyInitialized {
                root: root.to_path_buf(),
                kind,
            });
        }

        if root.exists() && !force {
            let conflicts: Vec<String> = list_entries(root)
                .map_err(|e| {
                    DispatchError::io(format!("failed to read directory `{}`", root.display()), e)
                })?
                .into_iter()
                .filter(|name| name != PROJECT_DIR_NAME && !spec.create_allow.contains(name))
                .collect();
            if !conflicts.is_empty() {
                return Err(DispatchError::DirectoryNotEmpty {
                    root: root.to_path_buf(),
                    conflicts,
                });
            }
        }

        let project = Project {
            root: root.to_path_buf(),
            kind: spec.kind,
            state: StateFile {
                format: STATE_FORMAT,
                toolchain: spec.name().to_string(),
                created_with: Some(VERSION.to_string()),
                completion: Some(CompletionCache::from_spec(spec)),
                extra: toml::Table::new(),
            },
        };
        project.save()?;
        tracing::debug!("initialized `{}` project in {}", spec.name(), root.display());
        Ok(project)
    }

    /// Load the project at `root`.
    pub fn load(root: &Path) -> Result<Project, DispatchError> {
        let path = state_path(root);
        if !path.is_file() {
            return Err(DispatchError::NotInitialized {
                root: root.to_path_buf(),
            });
        }

        let state = read_state(&path)?;
        if state.format > STATE_FORMAT {
            tracing::warn!(
                "{} was written by a newer devchain (format {}), reading it as format {}",
                path.display(),
                state.format,
                STATE_FORMAT
            );
        }
        let kind = state
            .toolchain
            .parse::<ToolchainKind>()
            .map_err(|name| DispatchError::StateCorrupt {
                path: path.clone(),
                reason: format!("unknown toolchain `{}`", name),
            })?;

        Ok(Project {
            root: root.to_path_buf(),
            kind,
            state,
        })
    }

    /// Drop the cached completion data of the project at `root`.
    ///
    /// The toolchain selection is kept.
    pub fn clear(root: &Path) -> Result<Project, DispatchError> {
        let mut project = Project::load(root)?;
        if project.state.completion.take().is_some() {
            project.save()?;
        }
        Ok(project)
    }

    /// Remove the state file, un-initializing the project at `root`.
    ///
    /// User configuration in the project directory is left alone.
    pub fn purge(root: &Path) -> Result<(), DispatchError> {
        let project = Project::load(root)?;
        let path = project.state_path();
        fs::remove_file(&path)
            .map_err(|e| DispatchError::io(format!("failed to remove `{}`", path.display()), e))?;

        let dir = root.join(PROJECT_DIR_NAME);
        if list_entries(&dir).map(|e| e.is_empty()).unwrap_or(false) {
            let _ = fs::remove_dir(&dir);
        }
        Ok(())
    }

    /// Bring the completion cache in line with the current catalog.
    ///
    /// Returns whether the state file was rewritten.
    pub fn refresh_completion(&mut self, spec: &ToolchainSpec) -> Result<bool, DispatchError> {
        let fresh = CompletionCache::from_spec(spec);
        if self.state.completion.as_ref() == Some(&fresh) {
            return Ok(false);
        }
        self.state.completion = Some(fresh);
        self.save()?;
        tracing::debug!("refreshed completion cache in {}", self.state_path().display());
        Ok(true)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind(&self) -> ToolchainKind {
        self.kind
    }

    pub fn completion(&self) -> Option<&CompletionCache> {
        self.state.completion.as_ref()
    }

    pub fn state_path(&self) -> PathBuf {
        state_path(&self.root)
    }

    fn save(&self) -> Result<(), DispatchError> {
        let path = self.state_path();
        let contents = toml::to_string_pretty(&self.state).map_err(|e| {
            DispatchError::io(
                format!("failed to serialize `{}`", path.display()),
                io::Error::new(io::ErrorKind::InvalidData, e),
            )
        })?;
        write_atomic(&path, contents.as_bytes())
            .map_err(|e| DispatchError::io(format!("failed to write `{}`", path.display()), e))
    }
}

fn read_state(path: &Path) -> Result<StateFile, DispatchError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| DispatchError::io(format!("failed to read `{}`", path.display()), e))?;
    toml::from_str(&contents).map_err(|e| DispatchError::StateCorrupt {
        path: path.to_path_buf(),
        reason: e.message().to_string(),
    })
}
