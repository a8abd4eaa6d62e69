//! Common types and utilities shared across gamescout crates.
//!
//! This crate holds the observability setup and the error type used by the
//! interactive front end. It stays small so that every crate can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`GamescoutError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use gamescout_common::GamescoutError;
//!
//! let err = GamescoutError::Config("missing url template".into());
//! assert_eq!(err.to_string(), "Configuration error: missing url template");
//! ```

pub mod observability;

/// Error types used by the gamescout binaries.
#[derive(thiserror::Error, Debug)]
pub enum GamescoutError {
    /// Reading from or writing to the terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`GamescoutError`].
pub type Result<T> = std::result::Result<T, GamescoutError>;
