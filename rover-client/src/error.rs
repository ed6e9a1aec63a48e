use rover_jsonapi::{DecodeError, EncodeError};
use rover_layout::LayoutError;
use thiserror::Error;

/// Failures below HTTP: connecting, reading, or building the URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),

    /// The background task was dropped before it produced a result.
    #[error("request canceled")]
    Canceled,

    #[error("response did not contain {0}")]
    MissingResource(String),
}
