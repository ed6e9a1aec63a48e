//! Decode and encode error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("expected {expected} at byte {offset}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A scalar token was consumed but could not be converted. Callers may
    /// skip the value and keep reading.
    #[error("malformed value at byte {offset}: {literal:?}")]
    MalformedValue { offset: usize, literal: String },

    /// The string was read through its closing quote, so the reader can
    /// continue past it.
    #[error("invalid utf-8 at byte {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("nesting too deep at byte {offset}")]
    DepthLimit { offset: usize },
}

impl DecodeError {
    /// Whether the reader is still positioned at a valid token boundary.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DecodeError::MalformedValue { .. } | DecodeError::InvalidUtf8 { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
