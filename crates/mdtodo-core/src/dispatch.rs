use std::path::PathBuf;

use crate::checklist::{append_task, ensure_exists, ChecklistError, EnsureOutcome};
use crate::editor::EditorLauncher;
use crate::options::InvocationOptions;
use crate::tmux::{open_checklist, MultiplexerSession, OpenOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The checklist was missing and creation was refused.
    Declined,
    Added { path: PathBuf, task: String },
    Opened(OpenOutcome),
    /// Neither add nor edit was requested.
    Ensured { path: PathBuf, created: bool },
}

/// Runs one invocation: make sure the checklist exists, then add a task or
/// open the editor. Adding wins when both are requested.
pub fn run<F>(
    options: &InvocationOptions,
    confirm: F,
    session: &dyn MultiplexerSession,
    launcher: &dyn EditorLauncher,
) -> Result<RunOutcome, ChecklistError>
where
    F: FnOnce(&InvocationOptions) -> bool,
{
    let path = options.checklist_path();
    let ensured = ensure_exists(&path, || options.yes || confirm(options))?;
    if ensured == EnsureOutcome::Declined {
        return Ok(RunOutcome::Declined);
    }

    if let Some(task) = options.task() {
        append_task(&path, task)?;
        return Ok(RunOutcome::Added {
            path,
            task: task.to_string(),
        });
    }
    if options.edit {
        return Ok(RunOutcome::Opened(open_checklist(options, session, launcher)));
    }
    Ok(RunOutcome::Ensured {
        path,
        created: ensured == EnsureOutcome::Created,
    })
}
