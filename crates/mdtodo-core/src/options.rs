use std::path::PathBuf;

use crate::checklist::checklist_path;

pub const DEFAULT_WINDOW_NAME: &str = "TODOs";
pub const DEFAULT_WINDOW_NUMBER: u32 = 9;

/// Resolved settings for a single run. Built once at startup and only read
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOptions {
    pub root: PathBuf,
    pub file_name: String,
    pub add: Option<String>,
    pub edit: bool,
    pub yes: bool,
    pub window_name: String,
    pub window_number: u32,
    pub editor: String,
    /// True when the process runs inside a tmux session.
    pub in_multiplexer: bool,
}

impl InvocationOptions {
    pub fn checklist_path(&self) -> PathBuf {
        checklist_path(&self.root, &self.file_name)
    }

    /// Task text to append, if any. Blank text counts as absent.
    pub fn task(&self) -> Option<&str> {
        self.add.as_deref().filter(|text| !text.is_empty())
    }
}
