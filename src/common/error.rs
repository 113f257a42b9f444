//! Common error type for housekeeping tools
//!
//! Each module defines its own error enum with thiserror; `HkError` wraps
//! them for callers that drive several stages at once.

use thiserror::Error;

use crate::config::ConfigError;
use crate::decoder::DecodeError;
use crate::packet::PacketError;
use crate::report::NoteError;
use crate::session::SessionError;

/// Errors across decoding, framing, loading and configuration
#[derive(Error, Debug)]
pub enum HkError {
    /// RTD log decoding error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Bench packet framing error
    #[error("Packet error: {0}")]
    Packet(#[from] PacketError),

    /// Log discovery or loading error
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Operator notes error
    #[error("Notes error: {0}")]
    Notes(#[from] NoteError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl HkError {
    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Result type alias using HkError
pub type HkResult<T> = Result<T, HkError>;
