//! LiveGrid Websocket Protocol: v1 Frozen Wire Format
//!
//! This crate defines the canonical message types exchanged between a grid
//! client and the computation server. One websocket per session, one JSON
//! document per text frame.
//!
//! - Client → server: a single [`CellUpdateRequest`] per edit.
//! - Server → client: a JSON array of [`CellUpdateResponse`] (a *batch*), which
//!   may include cells the client never edited (dependency recalculation).
//!
//! Changing field names or shapes breaks deployed servers. The golden vectors
//! in `tests/golden/` pin the format.
//!
//! # Usage
//!
//! ```ignore
//! use livegrid_protocol::{CellUpdateRequest, decode_batch, encode_request};
//!
//! let text = encode_request(&CellUpdateRequest::new(0, 0, Some("=B1".into())))?;
//! let batch = decode_batch(&incoming)?;
//! ```

use serde::{Deserialize, Serialize};

/// Where the calculation server listens by default.
pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:9123";

/// Maximum inbound message size (10 MB).
pub const MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

// =============================================================================
// Client → Server
// =============================================================================

/// Request to set (or clear) the expression of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdateRequest {
    pub col: u32,
    pub row: u32,
    /// `None` requests deletion of the cell's formula. Serialized as `null`.
    pub expression: Option<String>,
}

impl CellUpdateRequest {
    pub fn new(col: u32, row: u32, expression: Option<String>) -> Self {
        Self { col, row, expression }
    }
}

// =============================================================================
// Server → Client
// =============================================================================

/// One computed cell result inside a server batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdateResponse {
    pub col: u32,
    pub row: u32,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// =============================================================================
// Codec
// =============================================================================

/// Serialize an outbound request to the text frame payload.
pub fn encode_request(request: &CellUpdateRequest) -> Result<String, ProtocolError> {
    serde_json::to_string(request).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Parse an inbound text frame as a batch of cell results.
///
/// Entry order is preserved. Anything other than a JSON array of result
/// objects is rejected.
pub fn decode_batch(payload: &str) -> Result<Vec<CellUpdateResponse>, ProtocolError> {
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    serde_json::from_str(payload).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

/// Errors produced while encoding or decoding wire messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    MessageTooLarge { size: usize, max: usize },
    Malformed(String),
    Encode(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::MessageTooLarge { size, max } => {
                write!(f, "Message of {} bytes exceeds {} byte limit", size, max)
            }
            ProtocolError::Malformed(msg) => write!(f, "Malformed message: {}", msg),
            ProtocolError::Encode(msg) => write!(f, "Failed to encode message: {}", msg),
        }
    }
}

impl std::error::Error for ProtocolError {}
