//! Error type for loading and reloading handler definitions.
//!
//! Every failure of the reload pipeline (name parsing, file access,
//! parsing, definition construction) is a [`ReloadError`], which maps
//! into `handler_core::error::AppError` at the host boundary.

use std::path::PathBuf;

use handler_core::error::AppError;
use thiserror::Error;

/// Errors raised while resolving, loading, or reloading a handler type.
#[derive(Debug, Error)]
pub enum ReloadError {
    /// The qualified type name is malformed.
    #[error("Invalid type name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The definition file does not exist.
    #[error("Definition file not found: {path}")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The definition file could not be read.
    #[error("Failed to read definition file {path}: {source}")]
    Io {
        /// The unreadable path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The definition file is not a valid definition document.
    #[error("Failed to parse definition file {path}: {message}")]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The document declares a format version this loader does not understand.
    #[error("Unsupported definition format {format} in {path}")]
    UnsupportedFormat {
        /// The offending file.
        path: PathBuf,
        /// Declared format version.
        format: u32,
    },

    /// Constructing a declared type failed.
    #[error("Failed to define '{name}': {reason}")]
    Definition {
        /// Name of the type being defined.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// The file loaded cleanly but did not define the requested type.
    #[error("Loading {path} did not define '{name}'")]
    NotDefined {
        /// The requested type.
        name: String,
        /// The file that was loaded.
        path: PathBuf,
    },

    /// A shared library could not be opened or lacks the expected symbol.
    #[error("Failed to load handler library {path}: {message}")]
    Library {
        /// The library path.
        path: PathBuf,
        /// Loader diagnostic.
        message: String,
    },
}

impl From<ReloadError> for AppError {
    fn from(err: ReloadError) -> Self {
        match &err {
            ReloadError::InvalidName { .. } => AppError::validation(err.to_string()),
            ReloadError::SourceNotFound { .. } => AppError::not_found(err.to_string()),
            _ => AppError::plugin(err.to_string()),
        }
    }
}
