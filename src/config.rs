use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{read_json, write_json_atomic, NoteError, Result};

/// Locations of every file the store persists, derived from one root directory.
///
/// A `StorePaths` is handed to every component instead of a process-wide
/// "current store" so that two stores never share state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    root: PathBuf,
}

impl StorePaths {
    /// Anchors `root` to the current directory when it is relative, so the
    /// trash and templates dirs compare equal to paths found by a walk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self { root }
    }

    /// The per-user data directory, or `None` when no home directory is known.
    pub fn default_root() -> Option<PathBuf> {
        ProjectDirs::from("", "", "notedex").map(|dirs| dirs.data_dir().to_path_buf())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn index_file(&self) -> PathBuf {
        self.root.join("index.json")
    }

    pub fn tags_file(&self) -> PathBuf {
        self.root.join("tags.json")
    }

    pub fn pins_file(&self) -> PathBuf {
        self.root.join("pins.json")
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.root.join("trash")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }
}

/// Application configuration settings, persisted as `config.json`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory where notes are stored
    pub note_dir: PathBuf,

    /// Editor command; empty means "work it out at launch time"
    #[serde(default)]
    pub editor: String,

    /// Glob patterns, relative to `note_dir`, skipped by a reindex
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let home = BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            note_dir: home.join("notes"),
            editor: String::new(),
            ignore: Vec::new(),
        }
    }
}

impl Config {
    /// Loads `config.json`, falling back to defaults when it does not exist.
    pub fn load(paths: &StorePaths) -> Result<Self> {
        let path = paths.config_file();
        match read_json::<Config>(&path) {
            Ok(Some(config)) => {
                debug!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Ok(None) => {
                debug!("No configuration at {}, using defaults", path.display());
                Ok(Config::default())
            }
            Err(e) => Err(NoteError::ConfigError {
                message: format!("cannot read {}: {}", path.display(), e),
            }),
        }
    }

    pub fn save(&self, paths: &StorePaths) -> Result<()> {
        write_json_atomic(&paths.config_file(), self)?;
        info!("Saved configuration to {}", paths.config_file().display());
        Ok(())
    }

    /// Applies a `key=value` assignment coming from the command line.
    pub fn set(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| NoteError::ConfigError {
                message: format!("expected key=value, got '{}'", assignment),
            })?;

        match key.trim() {
            "noteDir" | "note_dir" => self.note_dir = PathBuf::from(value.trim()),
            "editor" => self.editor = value.trim().to_string(),
            other => {
                return Err(NoteError::ConfigError {
                    message: format!("unknown setting '{}'", other),
                })
            }
        }
        Ok(())
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        if !self.editor.trim().is_empty() {
            return self.editor.clone();
        }

        if let Ok(editor) = std::env::var("EDITOR") {
            if !editor.trim().is_empty() {
                return editor;
            }
        }

        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -W -t".to_string()
        } else {
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}
