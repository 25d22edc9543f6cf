// src/error.rs

//! Construction-time errors.
//!
//! A tick never fails: sensing gaps, degenerate geometry and malformed
//! commands are all recovered locally. Only building the core from a bad
//! configuration is reported as an error.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The configuration source could not be read or deserialised.
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// The configuration was read but holds unusable values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for fallible construction.
pub type CoreResult<T> = Result<T, CoreError>;
