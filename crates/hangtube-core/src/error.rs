//! Core error types for hangtube-core.
//!
//! Every failure the engine can hit is classified here. Source and item
//! failures are recoverable by design -- they are logged and skipped at the
//! ingest boundary; only configuration and storage failures surface to the
//! caller as process errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for hangtube-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Quiz source errors
    #[error("Quiz source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Quiz source failures.
///
/// All variants are non-fatal to the scheduler: the polling loop logs them
/// and waits for the next interval.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The request never completed (connection refused, timeout, ...)
    #[error("Quiz source unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Quiz source returned HTTP {status}")]
    Status { status: u16 },

    /// The response body could not be decoded into question records
    #[error("Failed to decode quiz source response: {0}")]
    Decode(String),

    /// The configured endpoint is not a usable URL
    #[error("Invalid quiz source endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },
}

/// Reasons a raw question record is rejected during ingest.
///
/// A rejected record is dropped with a diagnostic; it never reaches the
/// queue, so presentation can assume every queued item is well-formed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// Question text is missing or blank
    #[error("question text is empty")]
    EmptyPrompt,

    /// Not enough choices to present
    #[error("too few choices: {got} (need at least 2)")]
    TooFewChoices { got: usize },

    /// The declared correct answer matches neither a label nor a choice
    #[error("correct answer '{answer}' does not resolve to a choice")]
    UnresolvedAnswer { answer: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
