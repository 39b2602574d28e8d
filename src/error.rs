//! Error types for the meshtastic-client library.

use thiserror::Error;

use crate::proto;

/// The main error type for client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Frame encoding/decoding error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Protobuf encoding error.
    #[error("protobuf encode error: {0}")]
    Encode(#[from] prost::EncodeError),

    /// Protobuf decoding error.
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Outbound payload exceeds the radio's maximum frame size.
    #[error("payload too large: {size} bytes exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Transport write failure attributed to a specific queue entry.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The radio reported a delivery failure for a sent packet.
    #[error("routing error: {reason:?}")]
    Routing { reason: proto::routing::Error },

    /// Protocol error (malformed or unexpected data from the radio).
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// The random source failed or produced an unusable value.
    #[error("randomness unavailable for packet id generation")]
    Randomness,

    /// Connection is not established.
    #[error("not connected")]
    NotConnected,

    /// The pending operation was cancelled by a queue clear or disconnect.
    #[error("operation cancelled")]
    Cancelled,
}

/// Frame-specific errors.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Frame payload exceeds maximum size.
    #[error("frame too large: {size} bytes exceeds maximum {max}")]
    TooLarge { size: usize, max: usize },
}

/// Result type alias for meshtastic-client operations.
pub type Result<T> = std::result::Result<T, Error>;
