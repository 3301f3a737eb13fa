//! Trash and recovery.
//!
//! A deleted note's file is moved to `<store>/trash/<title>.md` and every
//! trace of it leaves the indexes and the pin set. Recovery moves it back and
//! indexes it from scratch; `empty_trash` removes trashed files for good.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, error, info, warn};

use crate::{
    build_metadata, now_timestamp, storage::file_title, FileLock, NoteError, NoteRecord,
    NoteStorage, Result,
};

impl NoteStorage {
    /// Moves a note to the trash, dropping its pin and index entry.
    pub fn delete_note(&self, title: &str) -> Result<PathBuf> {
        info!("Deleting note: {}", title);

        let _index_lock = FileLock::acquire(&self.paths().index_file())?;
        let _pins_lock = FileLock::acquire(&self.paths().pins_file())?;

        let mut index = self.load_index();
        let record = index.get(title).cloned().ok_or_else(|| {
            error!("Cannot delete note {}: Note not found", title);
            NoteError::NoteNotFound {
                title: title.to_string(),
            }
        })?;

        let trash_dir = self.paths().trash_dir();
        fs::create_dir_all(&trash_dir).map_err(|_| NoteError::DirectoryError {
            path: trash_dir.clone(),
        })?;

        let source = PathBuf::from(&record.file_path);
        let destination = trash_dir.join(format!("{}.md", file_title(&source)));
        if destination.exists() {
            set_aside(&destination)?;
        }

        fs::rename(&source, &destination).map_err(|e| {
            error!(
                "Failed to move {} to {}: {}",
                source.display(),
                destination.display(),
                e
            );
            NoteError::Io(e)
        })?;

        let mut pins = self.load_pins();
        if pins.remove(title).is_some() {
            self.save_pins(&pins)?;
            debug!("Dropped pin of '{}'", title);
        }

        index.remove(title);
        self.commit_index(&index)?;

        info!("Note '{}' moved to {}", title, destination.display());
        Ok(destination)
    }

    /// Moves `<title>.md` back from the trash and indexes it as a new note.
    ///
    /// Refuses to overwrite an active note. The pin, `created` and
    /// `last_visited` values from before the delete are not restored.
    pub fn recover_note(&self, title: &str) -> Result<NoteRecord> {
        info!("Recovering note: {}", title);
        let destination = self.resolve_path(title)?;
        let key = file_title(&destination);
        let source = self.paths().trash_dir().join(format!("{}.md", key));

        let _lock = FileLock::acquire(&self.paths().index_file())?;

        if !source.is_file() {
            return Err(NoteError::TrashedNoteNotFound { title: key });
        }

        let mut index = self.load_index();
        if destination.exists() || index.contains_key(&key) {
            return Err(NoteError::NoteAlreadyExists { title: key });
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&source, &destination)?;

        let record = build_metadata(&destination)?;
        index.insert(record.title.clone(), record.clone());
        self.commit_index(&index)?;

        info!("Recovered '{}' to {}", key, destination.display());
        Ok(record)
    }

    /// Titles of trashed notes, sorted.
    pub fn list_trashed(&self) -> Result<Vec<String>> {
        let dir = self.paths().trash_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NoteError::Io(e)),
        };

        let mut titles = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                titles.push(file_title(&path));
            }
        }
        titles.sort();
        Ok(titles)
    }

    /// Trashed titles containing `query`, ignoring case.
    pub fn search_trash(&self, query: &str) -> Result<Vec<String>> {
        let needle = query.to_lowercase();
        Ok(self
            .list_trashed()?
            .into_iter()
            .filter(|title| title.to_lowercase().contains(&needle))
            .collect())
    }

    /// Permanently deletes every file in the trash, returning how many went.
    pub fn empty_trash(&self) -> Result<usize> {
        let _lock = FileLock::acquire(&self.paths().index_file())?;

        let dir = self.paths().trash_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No trash directory at {}", dir.display());
                return Ok(0);
            }
            Err(e) => return Err(NoteError::Io(e)),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }

        info!("Emptied trash: {} files removed", removed);
        Ok(removed)
    }
}

/// Renames an already trashed `<title>.md` to `<title>~<timestamp>.md` so the
/// incoming file can take the bare name.
fn set_aside(existing: &Path) -> Result<PathBuf> {
    let stem = file_title(existing);
    let dir = existing.parent().unwrap_or_else(|| Path::new("."));
    let stamp = now_timestamp();

    let mut candidate = dir.join(format!("{}~{}.md", stem, stamp));
    let mut attempt = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{}~{}-{}.md", stem, stamp, attempt));
        attempt += 1;
    }

    fs::rename(existing, &candidate)?;
    warn!(
        "Trash already held '{}', kept the older copy as {}",
        stem,
        candidate.display()
    );
    Ok(candidate)
}
