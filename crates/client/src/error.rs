//! Transport errors.
//!
//! These never reach the UI as errors: the middleware logs them and turns
//! every one of them into a `Disconnected` status change.

use std::time::Duration;

use livegrid_protocol::ProtocolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Handshake failed (refused, bad URL, HTTP error).
    ConnectFailed(String),
    /// Handshake did not complete within the configured limit.
    Timeout(Duration),
    /// The server closed the socket.
    Closed,
    /// Read or write failed on an established socket.
    Io(String),
    Protocol(ProtocolError),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::ConnectFailed(msg) => write!(f, "Connection failed: {}", msg),
            ClientError::Timeout(limit) => {
                write!(f, "Connection attempt timed out after {}ms", limit.as_millis())
            }
            ClientError::Closed => write!(f, "Connection closed by server"),
            ClientError::Io(msg) => write!(f, "I/O error: {}", msg),
            ClientError::Protocol(err) => write!(f, "Protocol error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        ClientError::Protocol(err)
    }
}
