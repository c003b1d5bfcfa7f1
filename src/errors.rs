//! Error types for the calnotes application.
//!
//! Configuration and directory errors are fatal to the operation that hit
//! them and are always propagated. Read corruption of the notes file is not
//! an error: it is recovered inside the repository.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the calnotes application.
#[derive(Error, Debug)]
pub enum CalError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No storage directory was ever chosen.
    #[error("No storage directory configured, complete setup first")]
    NoStorageConfigured,

    /// A storage directory was chosen but is gone from disk.
    #[error("Storage directory no longer exists: {path}")]
    StorageDirectoryMissing { path: PathBuf },

    /// The chosen storage directory could not be created.
    #[error("Failed to create storage directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The notes file changed on disk since it was loaded.
    #[error("Notes were modified concurrently: expected revision {expected_revision}, found {actual_revision}")]
    Conflict {
        expected_revision: u64,
        actual_revision: u64,
    },

    /// Note was not found when performing an operation.
    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    /// Note with the same ID already exists.
    #[error("Note already exists: {id}")]
    NoteAlreadyExists { id: String },

    /// User input rejected before reaching storage.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{message}")]
    EditorError { message: String },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },
}
