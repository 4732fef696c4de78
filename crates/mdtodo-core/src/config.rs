use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::checklist::DEFAULT_FILE_NAME;
use crate::options::{DEFAULT_WINDOW_NAME, DEFAULT_WINDOW_NUMBER};

/// Optional defaults read from `.mdtodo.toml` or the global config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdtodoConfig {
    /// Checklist file name relative to the project root.
    pub file: Option<String>,
    pub window_name: Option<String>,
    pub window_number: Option<u32>,
    /// Editor used when `$EDITOR` is unset.
    pub editor: Option<String>,
}

/// Values after layering flags over project and global config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub file: String,
    pub window_name: String,
    pub window_number: u32,
    pub editor: Option<String>,
}

pub fn config_filename_candidates() -> [&'static str; 2] {
    [".mdtodo.toml", ".mdtodorc"]
}

pub fn resolve_user_home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"].into_iter().find_map(|key| {
        let value = std::env::var(key).ok()?;
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    })
}

pub fn resolve_mdtodo_home_dir() -> Option<PathBuf> {
    if let Ok(value) = std::env::var("MDTODO_HOME") {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    resolve_user_home_dir().map(|home| home.join(".mdtodo"))
}

pub fn global_config_path() -> Option<PathBuf> {
    resolve_mdtodo_home_dir().map(|home| home.join("config.toml"))
}

pub fn load_config(root: &Path) -> Option<MdtodoConfig> {
    config_filename_candidates()
        .into_iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
        .and_then(|path| read_config(&path))
}

pub fn load_global_config() -> Option<MdtodoConfig> {
    let path = global_config_path()?;
    if !path.is_file() {
        return None;
    }
    read_config(&path)
}

fn read_config(path: &Path) -> Option<MdtodoConfig> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            return None;
        }
    };
    match toml::from_str::<MdtodoConfig>(&text) {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
            None
        }
    }
}

/// Flag values win, then project config, then global config, then defaults.
/// A flag given on the command line is used as-is, even when empty; blank
/// config values fall through to the next layer.
pub fn resolve_settings(
    flags: &MdtodoConfig,
    project: Option<&MdtodoConfig>,
    global: Option<&MdtodoConfig>,
) -> Settings {
    let layers = [Some(flags), project, global];
    let files = [project, global];
    let pick = |get: fn(&MdtodoConfig) -> Option<String>| {
        get(flags).or_else(|| {
            files
                .iter()
                .flatten()
                .filter_map(|layer| get(layer))
                .find(|value| !value.trim().is_empty())
        })
    };

    Settings {
        file: pick(|c| c.file.clone()).unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
        window_name: pick(|c| c.window_name.clone())
            .unwrap_or_else(|| DEFAULT_WINDOW_NAME.to_string()),
        window_number: layers
            .iter()
            .flatten()
            .find_map(|layer| layer.window_number)
            .unwrap_or(DEFAULT_WINDOW_NUMBER),
        editor: pick(|c| c.editor.clone()),
    }
}
