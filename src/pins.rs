use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    read_json, write_json_atomic, FileLock, NoteError, NoteStorage, PrimaryIndex, Result,
};

/// Presence-only marker; serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinEntry {}

/// Pinned titles, persisted as `pins.json`.
pub type PinSet = BTreeMap<String, PinEntry>;

impl NoteStorage {
    /// Loads the pin set; a missing or unreadable file counts as no pins.
    pub fn load_pins(&self) -> PinSet {
        let path = self.paths().pins_file();
        match read_json::<PinSet>(&path) {
            Ok(Some(pins)) => pins,
            Ok(None) => PinSet::new(),
            Err(e) => {
                warn!("Ignoring unreadable pins {}: {}", path.display(), e);
                PinSet::new()
            }
        }
    }

    pub fn save_pins(&self, pins: &PinSet) -> Result<()> {
        write_json_atomic(&self.paths().pins_file(), pins)
    }

    /// Pins an indexed note. Returns `false` if it was already pinned.
    pub fn pin(&self, title: &str) -> Result<bool> {
        self.set_pinned(title, true)
    }

    /// Unpins an indexed note. Returns `false` if it was not pinned.
    pub fn unpin(&self, title: &str) -> Result<bool> {
        self.set_pinned(title, false)
    }

    fn set_pinned(&self, title: &str, pinned: bool) -> Result<bool> {
        let _lock = FileLock::acquire(&self.paths().pins_file())?;

        if !self.load_index().contains_key(title) {
            return Err(NoteError::NoteNotFound {
                title: title.to_string(),
            });
        }

        let mut pins = self.load_pins();
        let changed = if pinned {
            pins.insert(title.to_string(), PinEntry::default()).is_none()
        } else {
            pins.remove(title).is_some()
        };

        if !changed {
            debug!("'{}' already {}", title, if pinned { "pinned" } else { "unpinned" });
            return Ok(false);
        }

        self.save_pins(&pins)?;
        info!("{} '{}'", if pinned { "Pinned" } else { "Unpinned" }, title);
        Ok(true)
    }

    /// Drops every pin whose title is missing from `index`, returning how many
    /// went. Callers must hold the index lock.
    pub(crate) fn prune_pins(&self, index: &PrimaryIndex) -> Result<usize> {
        let _lock = FileLock::acquire(&self.paths().pins_file())?;
        let mut pins = self.load_pins();
        let before = pins.len();
        pins.retain(|title, _| index.contains_key(title));

        let pruned = before - pins.len();
        if pruned > 0 {
            self.save_pins(&pins)?;
            info!("Dropped {} pins of notes no longer indexed", pruned);
        }
        Ok(pruned)
    }

    /// Currently pinned titles.
    pub fn list_pinned(&self) -> Vec<String> {
        self.load_pins().into_keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_entry_is_an_empty_object() {
        let mut pins = PinSet::new();
        pins.insert("a".to_string(), PinEntry::default());
        assert_eq!(serde_json::to_string(&pins).unwrap(), r#"{"a":{}}"#);

        let parsed: PinSet = serde_json::from_str(r#"{"b":{}}"#).unwrap();
        assert!(parsed.contains_key("b"));
    }
}
