//! Error types
//!
//! Defines domain-specific error types for each module of the server.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Credential store errors
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Username not found: {0}")]
    UsernameNotFound(String),

    #[error("Failed to persist credentials to {path}: {source}")]
    PersistenceFailure { path: PathBuf, source: io::Error },

    #[error("Credential file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Failed to read credential file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Request flow errors surfaced to the user
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Invalid password for user: {0}")]
    InvalidPassword(String),

    #[error("Password confirmation does not match")]
    PasswordMismatch,

    #[error("Field is required: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {value:?}")]
    MalformedFeatureInput { field: &'static str, value: String },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Dataset loading, training and prediction errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Dataset {path} unavailable: {reason}")]
    StartupDataUnavailable { path: PathBuf, reason: String },

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),
}

/// Top-level startup error that encompasses all error types
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Credential store error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Startup task failed: {0}")]
    Task(String),
}
