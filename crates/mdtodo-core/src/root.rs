use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RootError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git rev-parse failed: {0}")]
    NotARepository(String),
    #[error("git rev-parse returned an empty path")]
    Empty,
}

pub trait RepoRootFinder {
    fn repo_root(&self, cwd: &Path) -> Result<PathBuf, RootError>;
}

/// Asks `git rev-parse --show-toplevel` for the enclosing working tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitRootFinder;

impl RepoRootFinder for GitRootFinder {
    fn repo_root(&self, cwd: &Path) -> Result<PathBuf, RootError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(cwd)
            .arg("rev-parse")
            .arg("--show-toplevel")
            .output()?;
        if !output.status.success() {
            return Err(RootError::NotARepository(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(RootError::Empty);
        }
        Ok(PathBuf::from(text))
    }
}

/// Repository root when `finder` knows one, otherwise `cwd`.
pub fn resolve_root(finder: &dyn RepoRootFinder, cwd: &Path) -> PathBuf {
    match finder.repo_root(cwd) {
        Ok(root) => root,
        Err(err) => {
            tracing::debug!(error = %err, cwd = %cwd.display(), "no repository root; using cwd");
            cwd.to_path_buf()
        }
    }
}
