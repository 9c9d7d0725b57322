//! Removal of build artifacts.

use std::path::Path;

use crate::core::errors::DispatchError;
use crate::core::toolchain::ToolchainSpec;
use crate::util::fs::{is_contained, remove_path_if_exists};

/// Remove every artifact path of the toolchain under `root`.
///
/// Returns the paths that actually existed, relative to `root`. Running it on
/// an already clean project is a no-op. Artifacts that would resolve outside
/// `root` are skipped.
pub fn clean_artifacts(root: &Path, spec: &ToolchainSpec) -> Result<Vec<String>, DispatchError> {
    let mut removed = Vec::new();
    for artifact in &spec.artifacts {
        if !is_contained(Path::new(artifact)) {
            tracing::warn!("refusing to remove `{}`: outside the project", artifact);
            continue;
        }
        let path = root.join(artifact);
        let existed = remove_path_if_exists(&path)
            .map_err(|e| DispatchError::io(format!("failed to remove `{}`", path.display()), e))?;
        if existed {
            tracing::debug!("removed {}", path.display());
            removed.push(artifact.clone());
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::toolchain::ToolchainKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_artifacts_only() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("build/gcc12__x86_64-pc-linux-elf__debug")).unwrap();
        fs::write(tmp.path().join("compile_commands.json"), "[]").unwrap();
        fs::write(tmp.path().join("CMakeLists.txt"), "").unwrap();

        let spec = ToolchainKind::Cpp.builtin_spec();
        let removed = clean_artifacts(tmp.path(), &spec).unwrap();
        assert_eq!(removed, vec!["build", "compile_commands.json"]);
        assert!(tmp.path().join("CMakeLists.txt").exists());

        assert!(clean_artifacts(tmp.path(), &spec).unwrap().is_empty());
    }

    #[test]
    fn test_clean_never_leaves_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("proj");
        fs::create_dir_all(root.join("build")).unwrap();
        let victim = tmp.path().join("victim");
        fs::create_dir_all(&victim).unwrap();
        fs::write(victim.join("keep.txt"), "keep").unwrap();

        let mut spec = ToolchainKind::Cpp.builtin_spec();
        spec.artifacts = vec![
            "../victim".to_string(),
            victim.to_string_lossy().into_owned(),
            "build".to_string(),
        ];
        let removed = clean_artifacts(&root, &spec).unwrap();
        assert_eq!(removed, vec!["build"]);
        assert!(victim.join("keep.txt").exists());
    }
}
