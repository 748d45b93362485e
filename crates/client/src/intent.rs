//! Typed intents dispatched into the session.
//!
//! Every state change goes through one of these. The transport middleware
//! intercepts `Connect` and `UpdateCell`; the rest pass straight to the
//! reducer.

use livegrid_protocol::CellUpdateRequest;

use crate::cell::CellCoord;
use crate::cells::CellUpdate;
use crate::connection::ConnectionStatus;

/// A committed edit of one cell. `expression: None` deletes the formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub x: u32,
    pub y: u32,
    pub expression: Option<String>,
}

impl CellEdit {
    pub fn new(x: u32, y: u32, expression: Option<String>) -> Self {
        Self { x, y, expression }
    }

    pub fn to_request(&self) -> CellUpdateRequest {
        CellUpdateRequest::new(self.x, self.y, self.expression.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Open a new socket to the configured server.
    Connect,
    /// Optimistic local write, also transmitted if a socket is open.
    UpdateCell(CellEdit),
    SetEditedCell(Option<CellCoord>),
    SetStatus {
        status: ConnectionStatus,
        text: String,
    },
    ApplyServerBatch(Vec<CellUpdate>),
    ClearAll,
}

impl Intent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Connect => "connect",
            Intent::UpdateCell(_) => "update_cell",
            Intent::SetEditedCell(_) => "set_edited_cell",
            Intent::SetStatus { .. } => "set_status",
            Intent::ApplyServerBatch(_) => "apply_server_batch",
            Intent::ClearAll => "clear_all",
        }
    }
}
