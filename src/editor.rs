use std::{path::Path, process::Command};

use log::{debug, info};
use shell_words::split;

use crate::{NoteError, Result};

/// Something that lets the user edit a note file in place.
pub trait EditorLauncher {
    fn edit(&self, path: &Path) -> Result<()>;
}

/// Runs an editor command line with the note path appended.
#[derive(Debug, Clone)]
pub struct ShellEditor {
    command: String,
}

impl ShellEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl EditorLauncher for ShellEditor {
    fn edit(&self, path: &Path) -> Result<()> {
        let args = split(&self.command).map_err(|e| NoteError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let (program, rest) = args.split_first().ok_or_else(|| NoteError::EditorError {
            message: "Empty editor command".to_string(),
        })?;

        info!("Opening {} with {}", path.display(), program);
        let status = Command::new(program).args(rest).arg(path).status()?;

        if !status.success() {
            return Err(NoteError::EditorError {
                message: format!("Editor exited with {}", status),
            });
        }
        Ok(())
    }
}

/// Leaves the file untouched; used when only indexing is wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipEditor;

impl EditorLauncher for SkipEditor {
    fn edit(&self, path: &Path) -> Result<()> {
        debug!("Skipping editor for {}", path.display());
        Ok(())
    }
}
