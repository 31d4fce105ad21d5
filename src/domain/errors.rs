use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while extracting a profile.
///
/// Most variants are recovered from close to where they occur; only `Write`
/// and `NoFiles` end a profile run, and nothing here ends the whole process.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("malformed settings file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("directory not found: {0}")]
    MissingDirectory(String),

    #[error("no files matched profile '{0}'")]
    NoFiles(String),

    #[error("could not read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("profile '{name}' not found (available: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExtractorError>;
