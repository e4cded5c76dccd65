//! The working directory holding one clone per mirrored repository

use std::path::{Path, PathBuf};

use crate::git::GitRepo;
use crate::{Error, Result};

/// Directory layout of a mirroring run: `<root>/<repoid>` per repository
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the working directory if needed
    pub fn ensure(&self) -> Result<()> {
        create_dir(&self.root)?;
        tracing::info!("Working directory {}", self.root.display());
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the local clone of `id`
    pub fn repo_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Whether `id` still has to be cloned
    ///
    /// An absent or empty directory is cloned into, such as the leftover of a
    /// failed clone. A directory holding anything but a git clone is an error:
    /// git would resolve it to an enclosing repository instead.
    pub fn needs_clone(&self, id: &str) -> Result<bool> {
        let dir = self.repo_dir(id);
        if !dir.exists() {
            return Ok(true);
        }
        if !dir.is_dir() {
            return Err(Error::Workspace(format!(
                "{} exists but is not a directory",
                dir.display()
            )));
        }
        if GitRepo::is_git_repo(&dir) {
            return Ok(false);
        }

        let mut entries = std::fs::read_dir(&dir)
            .map_err(|e| Error::Workspace(format!("Could not read {}: {}", dir.display(), e)))?;
        if entries.next().is_none() {
            tracing::warn!("Found empty directory {}, cloning again", dir.display());
            Ok(true)
        } else {
            Err(Error::Workspace(format!(
                "{} is not empty and is not a git clone",
                dir.display()
            )))
        }
    }

    /// Create the (empty) directory `id` will be cloned into
    pub fn create_repo_dir(&self, id: &str) -> Result<PathBuf> {
        let dir = self.repo_dir(id);
        create_dir(&dir)?;
        Ok(dir)
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| Error::Workspace(format!("Could not create {}: {}", dir.display(), e)))?;

    if !dir.is_dir() {
        return Err(Error::Workspace(format!(
            "Could not create {}: not a directory",
            dir.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_creates_nested_root() {
        let tmp = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(tmp.path().join("a").join("b"));
        workspace.ensure().unwrap();
        assert!(workspace.root().is_dir());
        // Idempotent
        workspace.ensure().unwrap();
    }

    #[test]
    fn test_repo_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(tmp.path());
        assert!(workspace.needs_clone("repo").unwrap());

        let dir = workspace.create_repo_dir("repo").unwrap();
        assert_eq!(dir, tmp.path().join("repo"));
        // Still empty: a clone never happened or failed
        assert!(workspace.needs_clone("repo").unwrap());

        std::fs::create_dir(dir.join(".git")).unwrap();
        assert!(!workspace.needs_clone("repo").unwrap());
    }

    #[test]
    fn test_non_clone_directory_is_workspace_error() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("repo");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("notes.txt"), "stray").unwrap();
        let workspace = Workspace::new(tmp.path());

        assert!(matches!(
            workspace.needs_clone("repo"),
            Err(Error::Workspace(_))
        ));
    }

    #[test]
    fn test_file_in_the_way_is_workspace_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("repo"), "not a dir").unwrap();
        let workspace = Workspace::new(tmp.path());

        assert!(matches!(
            workspace.needs_clone("repo"),
            Err(Error::Workspace(_))
        ));
        assert!(matches!(
            workspace.create_repo_dir("repo"),
            Err(Error::Workspace(_))
        ));
    }
}
