//! Core data structures for the notedex application.
//!
//! A note is a plain `.md` file. Its first line is reserved for the tag line
//! (`.work.urgent`) and everything after it is free-form content. The
//! [`NoteRecord`] cached in the primary index is derived from the file by
//! [`build_metadata`].
use std::{fs, path::Path};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{format_system_time, NoteError, Result};

/// Cached metadata for one note, keyed by title in the primary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    /// Absolute path of the backing `.md` file
    pub file_path: String,
    /// File stem, unique across the index
    pub title: String,
    /// `YYMMDD.HHMMSS`, birth time when the platform exposes it
    pub created: String,
    /// `YYMMDD.HHMMSS` of the file's last modification
    pub modified: String,
    /// Set only when the note is opened through the open path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visited: Option<String>,
    /// Whitespace separated tokens after the tag line
    pub word_count: usize,
    /// Characters (not bytes) after the tag line
    pub char_count: usize,
    /// Lowercase tags from the tag line, in order of first appearance
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Derived tag index entry. Never edited by hand; see [`crate::rebuild_tag_index`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub tag: String,
    pub notes: Vec<String>,
    pub count: usize,
}

/// Splits note content into its first (tag) line and the remaining body.
pub fn split_first_line(content: &str) -> (&str, &str) {
    match content.split_once('\n') {
        Some((first, rest)) => (first.trim_end_matches('\r'), rest),
        None => (content.trim_end_matches('\r'), ""),
    }
}

/// Parses a tag line into its ordered, deduplicated tags.
///
/// Only a line starting with `.` is a tag line; anything else yields no tags.
pub fn parse_tag_line(line: &str) -> Vec<String> {
    if !line.starts_with('.') {
        return Vec::new();
    }

    let stripped: String = line
        .chars()
        .filter(|c| !matches!(c, '#' | '[' | ']' | '|'))
        .collect();

    let mut tags: Vec<String> = Vec::new();
    for segment in stripped.split('.') {
        let tag = segment.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Renders tags back into tag line form.
pub fn format_tag_line(tags: &[String]) -> String {
    tags.iter().map(|t| format!(".{}", t)).collect()
}

/// Builds a fresh [`NoteRecord`] from the file at `path`. Performs no writes.
pub fn build_metadata(path: &Path) -> Result<NoteRecord> {
    debug!("Building metadata for {}", path.display());

    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| NoteError::InvalidTitle {
            title: path.display().to_string(),
            reason: "path has no file name".to_string(),
        })?;

    let content = fs::read_to_string(path)?;
    let metadata = fs::metadata(path)?;

    let modified_time = metadata.modified()?;
    let created_time = metadata.created().unwrap_or(modified_time);

    let (first_line, body) = split_first_line(&content);

    let record = NoteRecord {
        file_path: path.to_string_lossy().to_string(),
        title,
        created: format_system_time(created_time),
        modified: format_system_time(modified_time),
        last_visited: None,
        word_count: body.split_whitespace().count(),
        char_count: body.chars().count(),
        tags: parse_tag_line(first_line),
    };

    trace!(
        "Built record for '{}': {} words, {} tags",
        record.title,
        record.word_count,
        record.tags.len()
    );
    Ok(record)
}
