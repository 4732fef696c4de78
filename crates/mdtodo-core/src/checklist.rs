use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Content written to a checklist that does not exist yet.
pub const SEED_CONTENT: &str = "# TODOs\n\n- [ ] Add your first task here.\n";

pub const DEFAULT_FILE_NAME: &str = "TODO.md";

#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("Error creating {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Error reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Error writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Existing,
    Created,
    Declined,
}

pub fn checklist_path(root: &Path, file_name: &str) -> PathBuf {
    root.join(file_name)
}

/// Seeds the checklist at `path` if it is missing. `confirm` is only asked
/// when the file would be created.
pub fn ensure_exists<F>(path: &Path, confirm: F) -> Result<EnsureOutcome, ChecklistError>
where
    F: FnOnce() -> bool,
{
    if path.exists() {
        return Ok(EnsureOutcome::Existing);
    }
    if !confirm() {
        return Ok(EnsureOutcome::Declined);
    }
    fs::write(path, SEED_CONTENT).map_err(|source| ChecklistError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "seeded checklist");
    Ok(EnsureOutcome::Created)
}

/// Appends an unchecked item. The existing content is kept as raw bytes.
/// Read-modify-write without locking: concurrent invocations on the same file
/// can lose an update.
pub fn append_task(path: &Path, text: &str) -> Result<(), ChecklistError> {
    let mut content = fs::read(path).map_err(|source| ChecklistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    content.extend_from_slice(task_line(text).as_bytes());
    fs::write(path, content).map_err(|source| ChecklistError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn task_line(text: &str) -> String {
    format!("\n- [ ] {text}")
}

/// Short form of `path` for prompts: `~/...` under `home`, otherwise relative
/// to `cwd` (with `..` steps), otherwise unchanged.
pub fn display_path(path: &Path, home: Option<&Path>, cwd: Option<&Path>) -> String {
    if let Some(rest) = home.and_then(|home| path.strip_prefix(home).ok()) {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    if let Some(relative) = cwd.and_then(|cwd| relative_to(path, cwd)) {
        if relative.as_os_str().is_empty() {
            return ".".to_string();
        }
        return relative.display().to_string();
    }
    path.display().to_string()
}

fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    if path.is_absolute() != base.is_absolute() {
        return None;
    }
    let target: Vec<Component> = path.components().collect();
    let from: Vec<Component> = base.components().collect();
    let common = target
        .iter()
        .zip(&from)
        .take_while(|(a, b)| a == b)
        .count();
    // Different roots (e.g. Windows drive prefixes).
    if common == 0 && path.is_absolute() {
        return None;
    }
    if from[common..]
        .iter()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return None;
    }

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    Some(relative)
}
