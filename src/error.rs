// Error types for Jaguar communication
//
// Three failure families: transport (serial/IO, closed channel, timeout),
// decode (malformed received frame), and protocol (well-formed but unexpected
// response). Requests that cannot be encoded are rejected before anything is sent.

use crate::can::CodecError;
use crate::jaguar::exchange::ProtocolError;

#[derive(Debug, thiserror::Error)]
pub enum JaguarError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed while reading a frame")]
    ConnectionClosed,

    #[error("Timeout waiting for a frame")]
    Timeout,

    #[error("Decode error: {0}")]
    Decode(#[from] CodecError),

    #[error("Invalid request: {0}")]
    InvalidRequest(CodecError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl JaguarError {
    /// Channel unavailable, closed, timed out or failed to read/write
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            JaguarError::Serial(_)
                | JaguarError::Io(_)
                | JaguarError::ConnectionClosed
                | JaguarError::Timeout
        )
    }

    /// A malformed frame was received
    pub fn is_decode(&self) -> bool {
        matches!(self, JaguarError::Decode(_))
    }

    /// An outgoing message had a field or payload outside its wire limits
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, JaguarError::InvalidRequest(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, JaguarError::Protocol(_))
    }
}

pub type Result<T> = std::result::Result<T, JaguarError>;
