//! Error types for ferrochain

use std::fmt;

#[derive(Debug, Clone)]
pub enum ChainError {
    /// The supplied payload cannot be admitted into a block (e.g. it exceeds
    /// the configured maximum size). Recoverable: the chain tip is untouched.
    InputError(String),
    /// A digest or target value is malformed (wrong length, bad hex).
    CryptoError(String),
    ConfigError(String),
    /// The output sink could not be written. Recoverable: the in-memory tip
    /// stays valid and mining may continue.
    IoError(String),
    /// Mining was cancelled before a qualifying nonce was found. The partial
    /// header is discarded, never published.
    Cancelled,
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::InputError(msg) => write!(f, "Input error: {}", msg),
            ChainError::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
            ChainError::Cancelled => write!(f, "Mining cancelled"),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
