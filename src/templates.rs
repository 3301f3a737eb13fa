use std::{fs, io};

use log::debug;

use crate::{storage::file_title, NoteError, NoteStorage, Result};

impl NoteStorage {
    /// Names of the reusable note bodies in `<store>/templates`.
    pub fn list_templates(&self) -> Result<Vec<String>> {
        let dir = self.paths().templates_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NoteError::Io(e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                names.push(file_title(&path));
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn read_template(&self, name: &str) -> Result<String> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(NoteError::TemplateNotFound {
                name: name.to_string(),
            });
        }

        let path = self.paths().templates_dir().join(format!("{}.md", name));
        debug!("Reading template {}", path.display());
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => NoteError::TemplateNotFound {
                name: name.to_string(),
            },
            _ => NoteError::Io(e),
        })
    }
}
