use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mdtodo_core::checklist::display_path;
use mdtodo_core::config::{
    load_config, load_global_config, resolve_settings, resolve_user_home_dir, MdtodoConfig,
};
use mdtodo_core::dispatch::{run, RunOutcome};
use mdtodo_core::editor::{resolve_editor, TerminalEditor};
use mdtodo_core::options::InvocationOptions;
use mdtodo_core::root::{resolve_root, GitRootFinder};
use mdtodo_core::tmux::{in_tmux, OpenOutcome, TmuxSession};

mod version;

#[derive(Parser)]
#[command(
    name = "mdtodo",
    version = version::FULL,
    about = "Keep a markdown TODO checklist at the project root"
)]
struct Cli {
    /// Add to to-dos
    #[arg(short, long, value_name = "TEXT")]
    add: Option<String>,
    /// Same as --add when no --add is given
    #[arg(value_name = "TASK")]
    task: Vec<String>,
    /// Edit in editor
    #[arg(short, long)]
    edit: bool,
    /// Bypass confirm
    #[arg(short, long)]
    yes: bool,
    /// Markdown file name for TODOs [default: TODO.md]
    #[arg(short, long, value_name = "NAME")]
    file: Option<String>,
    /// Tmux window name [default: TODOs]
    #[arg(short = 'w', long = "twin", value_name = "NAME")]
    twin: Option<String>,
    /// Tmux window number [default: 9]
    #[arg(short = 'n', long = "tnum", value_name = "NUM")]
    tnum: Option<u32>,
}

impl Cli {
    fn add_text(&self) -> Option<String> {
        self.add
            .clone()
            .filter(|text| !text.is_empty())
            .or_else(|| self.task.first().cloned())
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let root = resolve_root(&GitRootFinder, &cwd);
    let options = build_options(&cli, root);
    tracing::debug!(?options, "resolved options");

    let outcome = run(
        &options,
        |options| confirm_create(options, &cwd),
        &TmuxSession::default(),
        &TerminalEditor,
    )
    .with_context(|| format!("update checklist in {}", options.root.display()))?;

    match outcome {
        RunOutcome::Declined => println!("Aborted!"),
        RunOutcome::Added { task, .. } => println!("Added task: {task}"),
        RunOutcome::Opened(OpenOutcome::Aborted { reason }) => {
            tracing::debug!(%reason, "tmux window not opened");
        }
        RunOutcome::Opened(opened) => tracing::debug!(?opened, "editor opened"),
        RunOutcome::Ensured { path, created } => {
            tracing::debug!(path = %path.display(), created, "checklist ready");
        }
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("MDTODO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_options(cli: &Cli, root: PathBuf) -> InvocationOptions {
    let flags = MdtodoConfig {
        file: cli.file.clone(),
        window_name: cli.twin.clone(),
        window_number: cli.tnum,
        editor: None,
    };
    let project = load_config(&root);
    let global = load_global_config();
    let settings = resolve_settings(&flags, project.as_ref(), global.as_ref());
    let env_editor = std::env::var("EDITOR").ok();

    InvocationOptions {
        root,
        file_name: settings.file,
        add: cli.add_text(),
        edit: cli.edit,
        yes: cli.yes,
        window_name: settings.window_name,
        window_number: settings.window_number,
        editor: resolve_editor(env_editor.as_deref(), settings.editor.as_deref()),
        in_multiplexer: in_tmux(),
    }
}

fn confirm_create(options: &InvocationOptions, cwd: &Path) -> bool {
    let home = resolve_user_home_dir();
    let dir = display_path(&options.root, home.as_deref(), Some(cwd));
    print!(
        "File {} does not exist in {}/ Create it? [y/N]: ",
        options.file_name, dir
    );
    if let Err(err) = io::stdout().flush() {
        tracing::debug!(error = %err, "prompt flush failed");
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
