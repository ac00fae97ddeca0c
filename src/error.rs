//! Error types for the notification plugin.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Notification context error: {0}")]
    Context(#[from] ContextError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),
}

/// Configuration loading and parsing errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {message}")]
    ParseFailed { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Notification context errors raised when the environment handed over by
/// the monitoring core is unusable.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Environment variable NOTIFY_CONTACTPAGER missing")]
    MissingPager,

    #[error("Environment variable {variable} missing for {what} notification")]
    MissingField { what: String, variable: String },
}

/// Per-attempt SMS gateway errors.
#[derive(Error, Debug)]
pub enum SmsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    /// Gateway answered 2xx but the body did not acknowledge the message.
    #[error("{0}")]
    Rejected(String),
}

/// Failure email errors.
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid mail address '{address}': {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },

    #[error("Failed to build failure email: {0}")]
    Build(#[from] lettre::error::Error),
}
