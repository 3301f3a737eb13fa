use std::{
    fs,
    io::{self, Write},
    path::Path,
    time::SystemTime,
};

use chrono::{DateTime, Local};
use log::{error, trace};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::{NoteError, Result};

/// `YYMMDD.HHMMSS`; fixed width, so string order is chronological order.
pub const TIMESTAMP_FORMAT: &str = "%y%m%d.%H%M%S";

pub fn format_timestamp(time: DateTime<Local>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_system_time(time: SystemTime) -> String {
    format_timestamp(DateTime::<Local>::from(time))
}

pub fn now_timestamp() -> String {
    format_timestamp(Local::now())
}

/// Reads a JSON document.
///
/// Returns `Ok(None)` when the file does not exist and `CorruptState` when it
/// exists but cannot be parsed.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            return Err(NoteError::Io(e));
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| NoteError::CorruptState {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Serializes `value` and atomically replaces `path` with it.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        error!("Failed to serialize {}: {}", path.display(), e);
        NoteError::Serialization(e)
    })?;
    write_atomic(path, json.as_bytes())
}

/// Writes through a temporary file in the target directory, then renames it
/// over the target.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            error!("Failed to create directory {}: {}", dir.display(), e);
            NoteError::DirectoryError {
                path: dir.to_path_buf(),
            }
        })?;
    }

    let mut temp_file = NamedTempFile::new_in(dir)?;
    temp_file.write_all(bytes)?;
    temp_file.flush()?;

    temp_file.persist(path).map_err(|e| {
        error!("Failed to persist file {}: {}", path.display(), e.error);
        NoteError::Io(e.error)
    })?;

    trace!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Lowercases and trims a user supplied tag; `None` if nothing is left.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim().trim_start_matches('.').trim().to_lowercase();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

// Helper method for parsing comma separated tags from the command line
pub fn parse_tags(tags: &[String]) -> Vec<String> {
    let mut parsed: Vec<String> = Vec::new();
    for tag in tags.iter().flat_map(|t| t.split(',')) {
        if let Some(tag) = normalize_tag(tag) {
            if !parsed.contains(&tag) {
                parsed.push(tag);
            }
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn timestamps_are_fixed_width() {
        let ts = now_timestamp();
        assert_eq!(ts.len(), 13);
        assert_eq!(ts.as_bytes()[6], b'.');
    }

    #[test]
    fn read_json_distinguishes_missing_from_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");

        let missing: Option<BTreeMap<String, u32>> = read_json(&path).unwrap();
        assert!(missing.is_none());

        fs::write(&path, "{ not json").unwrap();
        let err = read_json::<BTreeMap<String, u32>>(&path).unwrap_err();
        assert!(matches!(err, NoteError::CorruptState { .. }));
    }

    #[test]
    fn atomic_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        let mut doc = BTreeMap::new();
        doc.insert("a".to_string(), 1u32);

        write_json_atomic(&path, &doc).unwrap();

        let loaded: BTreeMap<String, u32> = read_json(&path).unwrap().unwrap();
        assert_eq!(loaded, doc);
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn parse_tags_splits_and_dedups() {
        let input = vec!["Work, urgent".to_string(), ".work".to_string(), " ".to_string()];
        assert_eq!(parse_tags(&input), vec!["work", "urgent"]);
    }
}
