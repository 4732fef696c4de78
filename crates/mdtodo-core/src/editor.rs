use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

pub const FALLBACK_EDITOR: &str = "nvim";

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Editor command is empty")]
    Empty,
    #[error("Failed to parse editor command {command:?}: {source}")]
    Parse {
        command: String,
        source: shell_words::ParseError,
    },
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

/// First non-blank of `$EDITOR`, the configured editor, then `nvim`.
pub fn resolve_editor(env_editor: Option<&str>, config_editor: Option<&str>) -> String {
    [env_editor, config_editor]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(FALLBACK_EDITOR)
        .to_string()
}

pub trait EditorLauncher {
    /// Runs `editor` on `file` and waits. `Ok(false)` means the editor ran
    /// but exited unsuccessfully.
    fn launch(&self, editor: &str, file: &Path) -> Result<bool, EditorError>;
}

/// Runs the editor in the current terminal with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalEditor;

impl EditorLauncher for TerminalEditor {
    fn launch(&self, editor: &str, file: &Path) -> Result<bool, EditorError> {
        let mut words = shell_words::split(editor).map_err(|source| EditorError::Parse {
            command: editor.to_string(),
            source,
        })?;
        if words.is_empty() {
            return Err(EditorError::Empty);
        }
        let program = words.remove(0);
        let status = Command::new(&program)
            .args(&words)
            .arg(file)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| EditorError::Spawn {
                program: program.clone(),
                source,
            })?;
        Ok(status.success())
    }
}
