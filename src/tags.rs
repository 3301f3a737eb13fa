//! The derived tag index.
//!
//! `tags.json` is recomputed in full from the primary index after every
//! mutation and is never patched incrementally.
use std::collections::BTreeMap;

use log::{debug, info};

use crate::{read_json, write_json_atomic, NoteError, NoteStorage, PrimaryIndex, Result, TagRecord};

/// Tag name to its derived record.
pub type TagIndex = BTreeMap<String, TagRecord>;

/// Recomputes the whole tag index from a primary index snapshot.
pub fn rebuild_tag_index(index: &PrimaryIndex) -> TagIndex {
    let mut tags = TagIndex::new();

    for record in index.values() {
        for tag in &record.tags {
            let entry = tags.entry(tag.clone()).or_insert_with(|| TagRecord {
                tag: tag.clone(),
                notes: Vec::new(),
                count: 0,
            });
            entry.notes.push(record.file_path.clone());
            entry.count = entry.notes.len();
        }
    }

    tags
}

impl NoteStorage {
    /// Recomputes `tags.json` from `index` and persists it.
    pub(crate) fn persist_tag_index(&self, index: &PrimaryIndex) -> Result<TagIndex> {
        let tags = rebuild_tag_index(index);
        write_json_atomic(&self.paths().tags_file(), &tags)?;
        info!(
            "Rebuilt tag index: {} tags over {} notes",
            tags.len(),
            index.len()
        );
        Ok(tags)
    }

    /// Reads `tags.json`. A missing file is an empty index; an unreadable one
    /// has to be fixed with a reindex.
    pub fn load_tag_index(&self) -> Result<TagIndex> {
        let path = self.paths().tags_file();
        match read_json::<TagIndex>(&path) {
            Ok(Some(tags)) => Ok(tags),
            Ok(None) => {
                debug!("No tag index at {}", path.display());
                Ok(TagIndex::new())
            }
            Err(NoteError::CorruptState { path, message }) => Err(NoteError::CorruptState {
                path,
                message: format!("{} (run `reindex` to rebuild it)", message),
            }),
            Err(e) => Err(e),
        }
    }
}
