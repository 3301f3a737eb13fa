use std::{
    collections::BTreeMap,
    fs,
    path::{Component, Path, PathBuf},
};

use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, error, info, trace, warn};
use walkdir::WalkDir;

use crate::{
    build_metadata, format_tag_line, normalize_tag, now_timestamp, parse_tag_line, read_json,
    split_first_line, write_atomic, write_json_atomic, Config, EditorLauncher, FileLock,
    NoteError, NoteRecord, ReindexSummary, Result, StorePaths,
};

/// Title to record; the single source of truth for which notes exist.
pub type PrimaryIndex = BTreeMap<String, NoteRecord>;

/// Command words that can never be used as note titles.
pub const RESERVED_WORDS: &[&str] = &[
    "open", "new", "edit", "rename", "mv", "tag", "pin", "unpin", "pins", "delete", "rm",
    "recover", "trash", "empty-trash", "list", "ls", "search", "date", "recent", "tags",
    "reindex", "render", "templates", "config", "help",
];

/// Manages the note directory and the metadata documents of one store.
#[derive(Debug, Clone)]
pub struct NoteStorage {
    /// Where the index, tags, pins, trash and templates live
    paths: StorePaths,

    /// Application configuration
    config: Config,

    /// `config.note_dir` made absolute
    note_dir: PathBuf,
}

impl NoteStorage {
    /// Creates a storage handle over `paths` using `config`.
    pub fn new(paths: StorePaths, config: Config) -> Self {
        let note_dir = std::path::absolute(&config.note_dir).unwrap_or_else(|e| {
            warn!(
                "Cannot make {} absolute ({}), using it as given",
                config.note_dir.display(),
                e
            );
            config.note_dir.clone()
        });

        Self {
            paths,
            config,
            note_dir,
        }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn note_dir(&self) -> &Path {
        &self.note_dir
    }

    /// Makes sure the store root and the note directory exist.
    pub fn initialize(&self) -> Result<()> {
        for dir in [self.paths.root(), self.note_dir.as_path()] {
            if !dir.exists() {
                debug!("Creating directory: {}", dir.display());
                fs::create_dir_all(dir).map_err(|e| {
                    error!("Failed to create directory {}: {}", dir.display(), e);
                    NoteError::DirectoryError {
                        path: dir.to_path_buf(),
                    }
                })?;
            }
        }
        Ok(())
    }

    /// Maps a title onto `<note_dir>/<title>.md`.
    ///
    /// Rejects empty titles, reserved command words, absolute paths and
    /// relative paths that climb out of the note directory.
    pub fn resolve_path(&self, title: &str) -> Result<PathBuf> {
        let invalid = |reason: &str| NoteError::InvalidTitle {
            title: title.to_string(),
            reason: reason.to_string(),
        };

        let name = title.trim();
        let name = name.strip_suffix(".md").unwrap_or(name);
        if name.is_empty() {
            return Err(invalid("title is empty"));
        }
        if RESERVED_WORDS.contains(&name) {
            return Err(invalid("reserved command word"));
        }

        let relative = Path::new(name);
        if relative.is_absolute() || relative.has_root() {
            return Err(invalid("absolute paths are not allowed"));
        }

        let mut depth: i32 = 0;
        for component in relative.components() {
            match component {
                Component::Normal(_) => depth += 1,
                Component::CurDir => {}
                Component::ParentDir => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(invalid("path escapes the note directory"));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("absolute paths are not allowed"))
                }
            }
        }
        if depth == 0 {
            return Err(invalid("title does not name a file"));
        }

        Ok(self.note_dir.join(format!("{}.md", name)))
    }

    /// Loads the primary index. A missing or unreadable index is an empty one;
    /// `reindex_all` recovers from that state.
    pub fn load_index(&self) -> PrimaryIndex {
        let path = self.paths.index_file();
        match read_json::<PrimaryIndex>(&path) {
            Ok(Some(index)) => {
                trace!("Loaded {} records from {}", index.len(), path.display());
                index
            }
            Ok(None) => {
                debug!("No index at {}, starting empty", path.display());
                PrimaryIndex::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable index {}: {}", path.display(), e);
                PrimaryIndex::new()
            }
        }
    }

    /// Overwrites `index.json` with `index`.
    pub fn save_index(&self, index: &PrimaryIndex) -> Result<()> {
        write_json_atomic(&self.paths.index_file(), index)?;
        debug!("Saved index with {} records", index.len());
        Ok(())
    }

    /// Persists the primary index and then the tag index derived from it.
    /// Callers must hold the index lock.
    pub(crate) fn commit_index(&self, index: &PrimaryIndex) -> Result<()> {
        self.save_index(index)?;
        self.persist_tag_index(index)?;
        Ok(())
    }

    /// Inserts or replaces `record` under its title and rebuilds the tag index.
    pub fn upsert(&self, record: NoteRecord) -> Result<()> {
        let _lock = FileLock::acquire(&self.paths.index_file())?;
        let mut index = self.load_index();
        debug!("Upserting record for '{}'", record.title);
        index.insert(record.title.clone(), record);
        self.commit_index(&index)
    }

    pub fn get_note(&self, title: &str) -> Result<NoteRecord> {
        self.load_index()
            .remove(title)
            .ok_or_else(|| NoteError::NoteNotFound {
                title: title.to_string(),
            })
    }

    /// All known notes, ordered by title.
    pub fn list_notes(&self) -> Vec<NoteRecord> {
        self.load_index().into_values().collect()
    }

    fn ignore_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.config.ignore {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }

    /// Rebuilds both indexes from a walk of the note directory.
    ///
    /// Titles that were already indexed keep their recorded `created` and
    /// `last_visited` values. Any unreadable file aborts the whole reindex.
    pub fn reindex_all(&self) -> Result<ReindexSummary> {
        let _lock = FileLock::acquire(&self.paths.index_file())?;
        let prior = self.load_index();

        if !self.note_dir.exists() {
            fs::create_dir_all(&self.note_dir)?;
            info!("Created notes directory: {}", self.note_dir.display());
        }

        let ignore = self.ignore_set()?;
        let trash_dir = self.paths.trash_dir();
        let templates_dir = self.paths.templates_dir();
        let mut index = PrimaryIndex::new();
        let mut shadowed = 0;

        for entry in WalkDir::new(&self.note_dir)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "md") {
                continue;
            }
            if path.starts_with(&trash_dir) || path.starts_with(&templates_dir) {
                continue;
            }
            let relative = path.strip_prefix(&self.note_dir).unwrap_or(path);
            if ignore.is_match(relative) {
                trace!("Ignoring {}", relative.display());
                continue;
            }

            let mut record = build_metadata(path).map_err(|e| {
                error!("Reindex aborted at {}: {}", path.display(), e);
                e
            })?;
            if let Some(previous) = prior.get(&record.title) {
                record.created = previous.created.clone();
                record.last_visited = previous.last_visited.clone();
            }
            if let Some(dropped) = index.insert(record.title.clone(), record) {
                warn!(
                    "Duplicate title '{}', {} is shadowed",
                    dropped.title, dropped.file_path
                );
                shadowed += 1;
            }
        }

        self.save_index(&index)?;
        let tags = self.persist_tag_index(&index)?;
        let pruned = self.prune_pins(&index)?;

        info!("Reindexed {} notes", index.len());
        Ok(ReindexSummary {
            notes: index.len(),
            tags: tags.len(),
            shadowed,
            pruned_pins: pruned,
        })
    }

    /// Opens `title` in `editor`, creating the file first when it is missing,
    /// then records the visit in the index.
    ///
    /// The editor runs without the index lock held.
    pub fn create_or_open_note(
        &self,
        title: &str,
        editor: &dyn EditorLauncher,
        template: Option<&str>,
    ) -> Result<NoteRecord> {
        let path = self.resolve_path(title)?;
        let key = file_title(&path);

        if let Some(existing) = self.load_index().get(&key) {
            if Path::new(&existing.file_path) != path {
                return Err(NoteError::NoteAlreadyExists { title: key });
            }
        }

        if !path.exists() {
            let body = match template {
                Some(name) => self.read_template(name)?,
                None => String::new(),
            };
            info!("Creating note {}", path.display());
            write_atomic(&path, body.as_bytes())?;
        } else if let Some(name) = template {
            warn!("Note '{}' exists, template '{}' not applied", key, name);
        }

        editor.edit(&path)?;

        let _lock = FileLock::acquire(&self.paths.index_file())?;
        let mut index = self.load_index();
        let previous = index.get(&key).cloned();
        let mut record = refreshed_record(&path, previous.as_ref())?;
        record.last_visited = Some(now_timestamp());

        index.insert(record.title.clone(), record.clone());
        self.commit_index(&index)?;
        Ok(record)
    }

    /// Renames a note's file and index entry, carrying its pin along.
    pub fn rename_note(&self, old_title: &str, new_title: &str) -> Result<NoteRecord> {
        let new_path = self.resolve_path(new_title)?;
        let new_key = file_title(&new_path);

        let _index_lock = FileLock::acquire(&self.paths.index_file())?;
        let _pins_lock = FileLock::acquire(&self.paths.pins_file())?;

        let mut index = self.load_index();
        let old = index
            .get(old_title)
            .cloned()
            .ok_or_else(|| NoteError::NoteNotFound {
                title: old_title.to_string(),
            })?;

        if index.contains_key(&new_key) || new_path.exists() {
            return Err(NoteError::NoteAlreadyExists { title: new_key });
        }

        if let Some(parent) = new_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&old.file_path, &new_path).map_err(|e| {
            error!(
                "Failed to move {} to {}: {}",
                old.file_path,
                new_path.display(),
                e
            );
            NoteError::Io(e)
        })?;

        let record = refreshed_record(&new_path, Some(&old))?;
        index.remove(old_title);
        index.insert(new_key.clone(), record.clone());
        self.commit_index(&index)?;

        let mut pins = self.load_pins();
        if pins.remove(old_title).is_some() {
            pins.insert(new_key, Default::default());
            self.save_pins(&pins)?;
            debug!("Moved pin from '{}' to '{}'", old_title, record.title);
        }

        info!("Renamed '{}' to '{}'", old_title, record.title);
        Ok(record)
    }

    /// Appends tags to the note's tag line, creating the line if needed.
    pub fn add_tags_to_note(&self, title: &str, tags: &[String]) -> Result<NoteRecord> {
        let tags = requested_tags(tags)?;
        self.edit_tag_line(title, |current| {
            for tag in tags {
                if !current.contains(&tag) {
                    current.push(tag);
                }
            }
        })
    }

    /// Drops tags from the note's tag line.
    pub fn remove_tags_from_note(&self, title: &str, tags: &[String]) -> Result<NoteRecord> {
        let tags = requested_tags(tags)?;
        self.edit_tag_line(title, |current| current.retain(|t| !tags.contains(t)))
    }

    fn edit_tag_line<F>(&self, title: &str, edit: F) -> Result<NoteRecord>
    where
        F: FnOnce(&mut Vec<String>),
    {
        let _lock = FileLock::acquire(&self.paths.index_file())?;
        let mut index = self.load_index();
        let previous = index
            .get(title)
            .cloned()
            .ok_or_else(|| NoteError::NoteNotFound {
                title: title.to_string(),
            })?;

        let path = PathBuf::from(&previous.file_path);
        let content = fs::read_to_string(&path)?;
        let (first_line, body) = split_first_line(&content);

        // A blank first line is an emptied tag line, not body text.
        let has_tag_line = first_line.is_empty() || first_line.starts_with('.');
        let mut tags = parse_tag_line(first_line);
        let before = tags.clone();
        edit(&mut tags);

        if tags == before {
            debug!("Tags of '{}' unchanged", title);
            return Ok(previous);
        }

        // An emptied tag line stays as a blank first line so the body keeps its place.
        let updated = if has_tag_line {
            format!("{}\n{}", format_tag_line(&tags), body)
        } else {
            format!("{}\n{}", format_tag_line(&tags), content)
        };
        write_atomic(&path, updated.as_bytes())?;

        let record = refreshed_record(&path, Some(&previous))?;
        index.insert(record.title.clone(), record.clone());
        self.commit_index(&index)?;

        info!("Tags of '{}' are now [{}]", title, record.tags.join(", "));
        Ok(record)
    }
}

/// Index key for a note file: its stem.
pub(crate) fn file_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Rebuilds a record, keeping the history fields of the record it replaces.
fn refreshed_record(path: &Path, previous: Option<&NoteRecord>) -> Result<NoteRecord> {
    let mut record = build_metadata(path)?;
    if let Some(previous) = previous {
        record.created = previous.created.clone();
        record.last_visited = previous.last_visited.clone();
    }
    Ok(record)
}

fn requested_tags(tags: &[String]) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags.iter().filter_map(|t| normalize_tag(t)) {
        if tag.contains(['.', '#', '[', ']', '|']) || tag.contains(char::is_whitespace) {
            return Err(NoteError::InvalidInput {
                message: format!("tag '{}' contains reserved characters", tag),
            });
        }
        if !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    if normalized.is_empty() {
        return Err(NoteError::InvalidInput {
            message: "no tags given".to_string(),
        });
    }
    Ok(normalized)
}
