//! Advisory cross-process locking.
//!
//! Each guarded resource file `foo.json` gets a sentinel `foo.json.lock` next
//! to it. [`FileLock::acquire`] blocks until the exclusive lock is granted and
//! the lock is released when the guard is dropped, on every exit path.
use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use log::{debug, trace, warn};

use crate::{NoteError, Result};

/// Scoped exclusive lock on a resource path.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Blocks until the exclusive lock guarding `resource` is held.
    pub fn acquire(resource: &Path) -> Result<Self> {
        let path = lock_path(resource);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|_| NoteError::DirectoryError {
                    path: parent.to_path_buf(),
                })?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| NoteError::LockAcquisitionFailed {
                path: path.clone(),
                source,
            })?;

        trace!("Waiting for lock {}", path.display());
        FileExt::lock_exclusive(&file).map_err(|source| NoteError::LockAcquisitionFailed {
            path: path.clone(),
            source,
        })?;
        debug!("Acquired lock {}", path.display());

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        match FileExt::unlock(&self.file) {
            Ok(()) => debug!("Released lock {}", self.path.display()),
            Err(e) => warn!("Failed to release lock {}: {}", self.path.display(), e),
        }
    }
}

/// Sentinel path for a resource: the resource path with `.lock` appended.
pub fn lock_path(resource: &Path) -> PathBuf {
    let mut name = resource.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
