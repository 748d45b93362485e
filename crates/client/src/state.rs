//! Process-wide application state and its reducer.

use crate::cells::CellStore;
use crate::connection::ConnectionState;
use crate::intent::Intent;

/// Everything the UI reads. Constructed empty and `Disconnected`.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub cells: CellStore,
    pub connection: ConnectionState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one intent. Side effects (socket I/O) are not performed here.
    pub fn reduce(&mut self, intent: &Intent) {
        match intent {
            Intent::Connect => {}
            Intent::UpdateCell(edit) => {
                self.cells.set_expression(edit.x, edit.y, edit.expression.clone());
            }
            Intent::SetEditedCell(coord) => self.cells.set_edited_cell(*coord),
            Intent::SetStatus { status, text } => self.connection.set_status(*status, text.clone()),
            Intent::ApplyServerBatch(updates) => self.cells.apply_server_batch(updates.iter().cloned()),
            Intent::ClearAll => self.cells.clear_all(),
        }
    }
}
