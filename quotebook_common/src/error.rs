//! Error types shared between the CLI and the sync daemon.
//!
//! The `QuoteError` enum unifies the failure cases of storage I/O, JSON
//! (de)serialization, user input validation, import checks, remote HTTP calls,
//! channel communication and lock poisoning, so every crate can propagate a
//! single error type.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by the CLI and the sync daemon.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// I/O error originating from storage files or exported/imported files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// A required user-supplied field was empty after trimming.
    #[error("Please fill in both the quote and the category (missing {0})")]
    EmptyField(&'static str),

    /// Imported data did not have the expected shape.
    #[error("Invalid JSON format: {0}")]
    InvalidImport(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Remote endpoint could not be reached or answered with an error status.
    #[error("Remote sync error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage directory could not be resolved for this platform.
    #[error("No data directory available: {0}")]
    DataDir(String),

    /// Crossbeam/channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for QuoteError {
    fn from(err: PoisonError<T>) -> Self {
        QuoteError::MutexLock(err.to_string())
    }
}
