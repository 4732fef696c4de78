//! Reuses a named tmux window for the checklist editor.
//!
//! Every invocation lists the current session's windows, then either focuses
//! the window carrying the configured name or creates it. Nothing is cached
//! between runs and tmux failures never abort the process.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::editor::EditorLauncher;
use crate::options::InvocationOptions;

/// Environment marker tmux sets for processes inside a session.
pub const SESSION_ENV: &str = "TMUX";

const LIST_FORMAT: &str = "#{window_index}:#{window_name}";
const START_DIRECTORY: &str = "#{pane_current_path}";

#[derive(Debug, Error)]
pub enum MuxError {
    #[error("tmux not found on PATH: {0}")]
    NotFound(#[from] which::Error),
    #[error("failed to run tmux: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("tmux {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDescriptor {
    pub index: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowPlan {
    Select { index: u32 },
    Create { name: String, index: Option<u32> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWindow {
    pub name: String,
    pub index: Option<u32>,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Not inside tmux; the editor ran in this terminal.
    Direct { launched: bool },
    Switched { index: u32, launched: bool },
    Created { index: Option<u32>, launched: bool },
    /// The window listing failed, so nothing was opened.
    Aborted { reason: String },
}

pub trait MultiplexerSession {
    /// Raw `index:name` listing, one window per line.
    fn list_windows(&self) -> Result<String, MuxError>;
    fn select_window(&self, index: u32) -> Result<bool, MuxError>;
    fn new_window(&self, request: &NewWindow) -> Result<bool, MuxError>;
}

pub fn in_tmux() -> bool {
    std::env::var_os(SESSION_ENV).is_some_and(|value| !value.is_empty())
}

pub fn parse_window_list(raw: &str) -> Vec<WindowDescriptor> {
    raw.lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (index, name) = line.split_once(':')?;
            let index = index.trim().parse::<u32>().ok()?;
            Some(WindowDescriptor {
                index,
                name: name.to_string(),
            })
        })
        .collect()
}

/// Focus the first window named `name`; otherwise create it at `preferred`
/// unless that index is already taken.
pub fn plan_window(windows: &[WindowDescriptor], name: &str, preferred: u32) -> WindowPlan {
    if let Some(existing) = windows.iter().find(|window| window.name == name) {
        return WindowPlan::Select {
            index: existing.index,
        };
    }
    let taken = windows.iter().any(|window| window.index == preferred);
    WindowPlan::Create {
        name: name.to_string(),
        index: (!taken).then_some(preferred),
    }
}

/// Shell command run in a new window. The file check covers the checklist
/// vanishing between listing and window creation.
pub fn guarded_command(editor: &str, file: &Path) -> String {
    let quoted = shell_words::quote(&file.to_string_lossy()).into_owned();
    format!("[ -e {quoted} ] && {editor} {quoted}")
}

pub fn new_window_args(request: &NewWindow) -> Vec<String> {
    let mut args = vec![
        "new-window".to_string(),
        "-n".to_string(),
        request.name.clone(),
    ];
    if let Some(index) = request.index {
        args.push("-t".to_string());
        args.push(format!(":{index}"));
    }
    args.push("-c".to_string());
    args.push(START_DIRECTORY.to_string());
    args.push(request.command.clone());
    args
}

/// Opens the checklist for editing, preferring an existing tmux window.
pub fn open_checklist(
    options: &InvocationOptions,
    session: &dyn MultiplexerSession,
    launcher: &dyn EditorLauncher,
) -> OpenOutcome {
    let file = options.checklist_path();
    if !options.in_multiplexer {
        let launched = match launcher.launch(&options.editor, &file) {
            Ok(success) => success,
            Err(err) => {
                tracing::warn!(error = %err, "editor did not start");
                false
            }
        };
        return OpenOutcome::Direct { launched };
    }

    let raw = match session.list_windows() {
        Ok(raw) => raw,
        Err(err) => {
            tracing::debug!(error = %err, "window listing failed");
            return OpenOutcome::Aborted {
                reason: err.to_string(),
            };
        }
    };
    let windows = parse_window_list(&raw);

    match plan_window(&windows, &options.window_name, options.window_number) {
        WindowPlan::Select { index } => {
            tracing::debug!(index, name = %options.window_name, "switching to existing window");
            let launched = report(session.select_window(index), "select-window");
            OpenOutcome::Switched { index, launched }
        }
        WindowPlan::Create { name, index } => {
            tracing::debug!(?index, name = %name, "creating window");
            let request = NewWindow {
                name,
                index,
                command: guarded_command(&options.editor, &file),
            };
            let launched = report(session.new_window(&request), "new-window");
            OpenOutcome::Created { index, launched }
        }
    }
}

fn report(result: Result<bool, MuxError>, command: &str) -> bool {
    match result {
        Ok(true) => true,
        Ok(false) => {
            tracing::warn!(command, "tmux exited unsuccessfully");
            false
        }
        Err(err) => {
            tracing::warn!(command, error = %err, "tmux did not run");
            false
        }
    }
}

/// Talks to the `tmux` binary found on `PATH`.
#[derive(Debug, Clone)]
pub struct TmuxSession {
    binary: String,
}

impl Default for TmuxSession {
    fn default() -> Self {
        Self {
            binary: "tmux".to_string(),
        }
    }
}

impl TmuxSession {
    fn program(&self) -> Result<PathBuf, MuxError> {
        Ok(which::which(&self.binary)?)
    }

    /// Runs attached to the caller's terminal so tmux can report errors.
    fn run_attached(&self, args: &[String]) -> Result<bool, MuxError> {
        let status = Command::new(self.program()?)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        Ok(status.success())
    }
}

impl MultiplexerSession for TmuxSession {
    fn list_windows(&self) -> Result<String, MuxError> {
        let output = Command::new(self.program()?)
            .arg("list-windows")
            .arg("-F")
            .arg(LIST_FORMAT)
            .output()?;
        if !output.status.success() {
            return Err(MuxError::Failed {
                command: "list-windows".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn select_window(&self, index: u32) -> Result<bool, MuxError> {
        self.run_attached(&[
            "select-window".to_string(),
            "-t".to_string(),
            format!(":{index}"),
        ])
    }

    fn new_window(&self, request: &NewWindow) -> Result<bool, MuxError> {
        self.run_attached(&new_window_args(request))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::editor::EditorError;

    #[derive(Default)]
    struct FakeSession {
        listing: Option<String>,
        selected: RefCell<Vec<u32>>,
        created: RefCell<Vec<NewWindow>>,
        /// select-window cannot be spawned.
        select_errors: bool,
        /// new-window runs but exits non-zero.
        create_exits_nonzero: bool,
    }

    impl FakeSession {
        fn with_listing(listing: &str) -> Self {
            Self {
                listing: Some(listing.to_string()),
                ..Self::default()
            }
        }
    }

    impl MultiplexerSession for FakeSession {
        fn list_windows(&self) -> Result<String, MuxError> {
            self.listing.clone().ok_or_else(|| MuxError::Failed {
                command: "list-windows".to_string(),
                stderr: "no server running".to_string(),
            })
        }

        fn select_window(&self, index: u32) -> Result<bool, MuxError> {
            self.selected.borrow_mut().push(index);
            if self.select_errors {
                return Err(MuxError::Spawn(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "tmux vanished",
                )));
            }
            Ok(true)
        }

        fn new_window(&self, request: &NewWindow) -> Result<bool, MuxError> {
            self.created.borrow_mut().push(request.clone());
            Ok(!self.create_exits_nonzero)
        }
    }

    #[derive(Default)]
    struct RecordingEditor {
        calls: RefCell<Vec<(String, PathBuf)>>,
    }

    impl EditorLauncher for RecordingEditor {
        fn launch(&self, editor: &str, file: &Path) -> Result<bool, EditorError> {
            self.calls
                .borrow_mut()
                .push((editor.to_string(), file.to_path_buf()));
            Ok(true)
        }
    }

    struct BrokenEditor;

    impl EditorLauncher for BrokenEditor {
        fn launch(&self, _editor: &str, _file: &Path) -> Result<bool, EditorError> {
            Err(EditorError::Empty)
        }
    }

    fn options(in_multiplexer: bool) -> InvocationOptions {
        InvocationOptions {
            root: PathBuf::from("/work/app"),
            file_name: "TODO.md".to_string(),
            add: None,
            edit: true,
            yes: false,
            window_name: "TODOs".to_string(),
            window_number: 9,
            editor: "nvim".to_string(),
            in_multiplexer,
        }
    }

    fn window(index: u32, name: &str) -> WindowDescriptor {
        WindowDescriptor {
            index,
            name: name.to_string(),
        }
    }

    #[test]
    fn parse_window_list_skips_malformed_lines() {
        let windows = parse_window_list("0:main\n\nbogus\nx:bad\n3:logs:tail\n9:TODOs\n");
        assert_eq!(
            windows,
            vec![window(0, "main"), window(3, "logs:tail"), window(9, "TODOs")]
        );
    }

    #[test]
    fn plan_selects_window_with_matching_name() {
        let windows = parse_window_list("0:main\n9:TODOs\n");
        assert_eq!(
            plan_window(&windows, "TODOs", 9),
            WindowPlan::Select { index: 9 }
        );
    }

    #[test]
    fn plan_selects_first_match_even_off_preferred_index() {
        let windows = parse_window_list("0:main\n2:TODOs\n5:TODOs\n");
        assert_eq!(
            plan_window(&windows, "TODOs", 9),
            WindowPlan::Select { index: 2 }
        );
    }

    #[test]
    fn plan_creates_at_free_preferred_index() {
        let windows = parse_window_list("0:main\n1:other\n");
        assert_eq!(
            plan_window(&windows, "TODOs", 9),
            WindowPlan::Create {
                name: "TODOs".to_string(),
                index: Some(9)
            }
        );
    }

    #[test]
    fn plan_lets_tmux_assign_when_preferred_index_taken() {
        let windows = parse_window_list("0:main\n9:other\n");
        assert_eq!(
            plan_window(&windows, "TODOs", 9),
            WindowPlan::Create {
                name: "TODOs".to_string(),
                index: None
            }
        );
    }

    #[test]
    fn plan_does_not_treat_longer_index_as_taken() {
        let windows = parse_window_list("0:main\n19:other\n");
        assert_eq!(
            plan_window(&windows, "TODOs", 9),
            WindowPlan::Create {
                name: "TODOs".to_string(),
                index: Some(9)
            }
        );
    }

    #[test]
    fn guarded_command_quotes_the_path() {
        assert_eq!(
            guarded_command("nvim", Path::new("/work/my app/TODO.md")),
            "[ -e '/work/my app/TODO.md' ] && nvim '/work/my app/TODO.md'"
        );
        assert_eq!(
            guarded_command("code -w", Path::new("/work/TODO.md")),
            "[ -e /work/TODO.md ] && code -w /work/TODO.md"
        );
    }

    #[test]
    fn new_window_args_include_index_only_when_requested() {
        let mut request = NewWindow {
            name: "TODOs".to_string(),
            index: Some(9),
            command: "true".to_string(),
        };
        assert_eq!(
            new_window_args(&request),
            vec![
                "new-window",
                "-n",
                "TODOs",
                "-t",
                ":9",
                "-c",
                "#{pane_current_path}",
                "true"
            ]
        );

        request.index = None;
        assert_eq!(
            new_window_args(&request),
            vec!["new-window", "-n", "TODOs", "-c", "#{pane_current_path}", "true"]
        );
    }

    #[test]
    fn open_switches_to_existing_window_without_creating() {
        let session = FakeSession::with_listing("0:main\n9:TODOs\n");
        let editor = RecordingEditor::default();

        let outcome = open_checklist(&options(true), &session, &editor);
        assert_eq!(
            outcome,
            OpenOutcome::Switched {
                index: 9,
                launched: true
            }
        );
        assert_eq!(*session.selected.borrow(), vec![9]);
        assert!(session.created.borrow().is_empty());
        assert!(editor.calls.borrow().is_empty());
    }

    #[test]
    fn open_creates_window_running_guarded_editor() {
        let session = FakeSession::with_listing("0:main\n1:other\n");
        let editor = RecordingEditor::default();

        let outcome = open_checklist(&options(true), &session, &editor);
        assert_eq!(
            outcome,
            OpenOutcome::Created {
                index: Some(9),
                launched: true
            }
        );
        let created = session.created.borrow();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "TODOs");
        assert_eq!(created[0].index, Some(9));
        assert_eq!(
            created[0].command,
            "[ -e /work/app/TODO.md ] && nvim /work/app/TODO.md"
        );
        assert!(session.selected.borrow().is_empty());
    }

    #[test]
    fn open_aborts_quietly_when_listing_fails() {
        let session = FakeSession::default();
        let editor = RecordingEditor::default();

        let outcome = open_checklist(&options(true), &session, &editor);
        assert!(matches!(outcome, OpenOutcome::Aborted { ref reason } if reason.contains("no server")));
        assert!(session.created.borrow().is_empty());
        assert!(editor.calls.borrow().is_empty());
    }

    #[test]
    fn open_reports_failed_switch_without_creating() {
        let session = FakeSession {
            select_errors: true,
            ..FakeSession::with_listing("0:main\n9:TODOs\n")
        };
        let editor = RecordingEditor::default();

        let outcome = open_checklist(&options(true), &session, &editor);
        assert_eq!(
            outcome,
            OpenOutcome::Switched {
                index: 9,
                launched: false
            }
        );
        assert_eq!(*session.selected.borrow(), vec![9]);
        assert!(session.created.borrow().is_empty());
    }

    #[test]
    fn open_reports_unsuccessful_window_creation() {
        let session = FakeSession {
            create_exits_nonzero: true,
            ..FakeSession::with_listing("0:main\n")
        };
        let editor = RecordingEditor::default();

        let outcome = open_checklist(&options(true), &session, &editor);
        assert_eq!(
            outcome,
            OpenOutcome::Created {
                index: Some(9),
                launched: false
            }
        );
        assert_eq!(session.created.borrow().len(), 1);
        assert!(editor.calls.borrow().is_empty());
    }

    #[test]
    fn open_outside_tmux_runs_editor_directly() {
        let session = FakeSession::with_listing("9:TODOs\n");
        let editor = RecordingEditor::default();

        let outcome = open_checklist(&options(false), &session, &editor);
        assert_eq!(outcome, OpenOutcome::Direct { launched: true });
        assert_eq!(
            *editor.calls.borrow(),
            vec![("nvim".to_string(), PathBuf::from("/work/app/TODO.md"))]
        );
        assert!(session.selected.borrow().is_empty());
    }

    #[test]
    fn open_outside_tmux_swallows_editor_failure() {
        let session = FakeSession::default();
        let outcome = open_checklist(&options(false), &session, &BrokenEditor);
        assert_eq!(outcome, OpenOutcome::Direct { launched: false });
    }
}
