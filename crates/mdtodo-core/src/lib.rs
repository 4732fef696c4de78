//! Core logic for mdtodo: one markdown checklist per project, edited in a
//! reusable tmux window.

pub mod checklist;
pub mod config;
pub mod dispatch;
pub mod editor;
pub mod options;
pub mod root;
pub mod tmux;
