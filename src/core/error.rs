use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the configuration store and the process runtime
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write configuration {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration {path}: {source}")]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a spawn error for the given program
    pub fn spawn<S: Into<String>>(program: S, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// True when the underlying problem is a program that does not exist
    pub fn is_missing_program(&self) -> bool {
        match self {
            Self::ExecutableNotFound(_) => true,
            Self::Spawn { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
