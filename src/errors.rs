//! Error types for the notedex application.
//!
//! This module defines the crate error type together with the coarse
//! [`ErrorKind`] taxonomy that callers use to decide how to react to a failure.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Coarse classification of every [`NoteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced note, trashed file or template does not exist.
    NotFound,
    /// The destination name is already taken.
    Conflict,
    /// The request was rejected before any persisted state was touched.
    InvalidInput,
    /// A persisted document could not be parsed.
    CorruptState,
    /// The filesystem or an external process failed mid-operation.
    IoFailure,
}

/// The main error type for the notedex application.
#[derive(Error, Debug)]
pub enum NoteError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors raised while walking the note directory.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// An ignore pattern in the configuration is not a valid glob.
    #[error("Invalid ignore pattern: {0}")]
    Glob(#[from] globset::Error),

    /// Note was not found in the primary index.
    #[error("Note not found: {title}")]
    NoteNotFound { title: String },

    /// No file with this title is sitting in the trash.
    #[error("No trashed note named: {title}")]
    TrashedNoteNotFound { title: String },

    /// Template was not found in the templates directory.
    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    /// A note with the same title already exists.
    #[error("Note already exists: {title}")]
    NoteAlreadyExists { title: String },

    /// The title cannot be used as a note name.
    #[error("Invalid note title '{title}': {reason}")]
    InvalidTitle { title: String, reason: String },

    /// The request itself is malformed.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A date specifier could not be expanded.
    #[error("Invalid date specifier '{spec}': {reason}")]
    InvalidDateSpec { spec: String, reason: String },

    /// A persisted document exists but cannot be parsed.
    #[error("Corrupt store file {path}: {message}")]
    CorruptState { path: PathBuf, message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// The advisory lock for a resource could not be taken.
    #[error("Failed to lock {path}: {source}")]
    LockAcquisitionFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{message}")]
    EditorError { message: String },
}

impl NoteError {
    /// Maps the error onto its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            NoteError::NoteNotFound { .. }
            | NoteError::TrashedNoteNotFound { .. }
            | NoteError::TemplateNotFound { .. } => ErrorKind::NotFound,
            NoteError::NoteAlreadyExists { .. } => ErrorKind::Conflict,
            NoteError::InvalidTitle { .. }
            | NoteError::InvalidDateSpec { .. }
            | NoteError::InvalidInput { .. }
            | NoteError::Glob(_)
            | NoteError::ConfigError { .. } => ErrorKind::InvalidInput,
            NoteError::CorruptState { .. } | NoteError::Serialization(_) => {
                ErrorKind::CorruptState
            }
            NoteError::Io(_)
            | NoteError::Walk(_)
            | NoteError::DirectoryError { .. }
            | NoteError::LockAcquisitionFailed { .. }
            | NoteError::EditorError { .. } => ErrorKind::IoFailure,
        }
    }
}
