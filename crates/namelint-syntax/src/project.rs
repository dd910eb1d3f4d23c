//! Project container loading.
//!
//! A check target can be a single `.rs` file, a `Cargo.toml` manifest, or
//! a directory. All three resolve to a project root and a list of source
//! files relative to it. Discovery walks the tree respecting ignore files,
//! so generated code under `target/` and anything gitignored never enters
//! an analysis pass. A target that does not resolve is a container error,
//! which is fatal before any file is parsed.

use ignore::WalkBuilder;
use namelint_core::frontend::FrontendError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A loaded project: a root directory and the source files under it.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl Project {
    /// Resolves `target` into a project.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Container`] when the target does not exist,
    /// is not a Rust source file, manifest, or directory, or cannot be
    /// walked.
    pub fn load(target: &Path) -> Result<Self, FrontendError> {
        let container = |message: String| FrontendError::Container {
            path: target.to_path_buf(),
            message,
        };

        let metadata = std::fs::metadata(target)
            .map_err(|e| container(format!("cannot stat target: {e}")))?;

        if metadata.is_file() {
            let file_name = target.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if target.extension().and_then(|e| e.to_str()) == Some("rs") {
                let root = target
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
                return Ok(Self {
                    root,
                    files: vec![PathBuf::from(file_name)],
                });
            }
            if file_name == "Cargo.toml" {
                let root = target
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
                return Self::from_dir(root);
            }
            return Err(container(
                "target must be a .rs file, a Cargo.toml, or a directory".to_string(),
            ));
        }

        if metadata.is_dir() {
            return Self::from_dir(target.to_path_buf());
        }
        Err(container("target is neither a file nor a directory".to_string()))
    }

    fn from_dir(root: PathBuf) -> Result<Self, FrontendError> {
        let mut files = Vec::new();
        for entry in WalkBuilder::new(&root).build() {
            let entry = entry.map_err(|e| FrontendError::Container {
                path: root.clone(),
                message: format!("walk failed: {e}"),
            })?;
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }
            if path.components().any(|c| c.as_os_str() == "target") {
                continue;
            }
            if let Ok(rel) = path.strip_prefix(&root) {
                files.push(rel.to_path_buf());
            }
        }
        files.sort();
        debug!(root = %root.display(), files = files.len(), "loaded project");
        Ok(Self { root, files })
    }

    /// The project root all file paths are relative to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source files relative to the root, sorted.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn directory_target_discovers_sources_recursively() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::create_dir_all(dir.path().join("target/debug")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), "").unwrap();
        fs::write(dir.path().join("src/nested/mod.rs"), "").unwrap();
        fs::write(dir.path().join("target/debug/gen.rs"), "").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();

        let project = Project::load(dir.path()).unwrap();
        assert_eq!(
            project.files(),
            &[
                PathBuf::from("src/lib.rs"),
                PathBuf::from("src/nested/mod.rs")
            ]
        );
    }

    #[test]
    fn manifest_target_resolves_to_its_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"x\"\n").unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}\n").unwrap();

        let project = Project::load(&dir.path().join("Cargo.toml")).unwrap();
        assert_eq!(project.root(), dir.path());
        assert_eq!(project.files(), &[PathBuf::from("src/main.rs")]);
    }

    #[test]
    fn single_file_target_uses_its_parent_as_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("one.rs"), "fn main() {}\n").unwrap();

        let project = Project::load(&dir.path().join("one.rs")).unwrap();
        assert_eq!(project.root(), dir.path());
        assert_eq!(project.files(), &[PathBuf::from("one.rs")]);
    }

    #[test]
    fn missing_target_is_a_container_error() {
        let err = Project::load(Path::new("/nonexistent/project")).unwrap_err();
        assert!(matches!(err, FrontendError::Container { .. }));
    }

    #[test]
    fn non_rust_file_target_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        let err = Project::load(&dir.path().join("notes.txt")).unwrap_err();
        assert!(matches!(err, FrontendError::Container { .. }));
    }
}
