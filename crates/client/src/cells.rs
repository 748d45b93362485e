//! Normalized cell store.
//!
//! Holds one [`Cell`] per coordinate that currently has something to show,
//! plus a pointer to the single cell being edited. All mutations are
//! synchronous and infallible; nothing here touches the network.

use std::collections::BTreeMap;

use livegrid_protocol::CellUpdateResponse;

use crate::cell::{Cell, CellCoord};

/// One computed result from the server, in client coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub x: u32,
    pub y: u32,
    pub value: Option<String>,
    pub error: Option<String>,
}

impl From<CellUpdateResponse> for CellUpdate {
    fn from(r: CellUpdateResponse) -> Self {
        Self {
            x: r.col,
            y: r.row,
            value: r.value,
            error: r.error,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CellStore {
    /// Keyed by coordinate; BTreeMap order is the canonical row-major order.
    cells: BTreeMap<CellCoord, Cell>,
    edited: Option<CellCoord>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Optimistic local write.
    ///
    /// `Some(expr)` upserts the record and clears its value/error, since the
    /// new formula's result is not known yet. `None` (or an empty string)
    /// removes the record.
    pub fn set_expression(&mut self, x: u32, y: u32, expression: Option<String>) {
        let coord = CellCoord::new(x, y);
        match expression.filter(|e| !e.is_empty()) {
            Some(expression) => {
                self.cells.insert(
                    coord,
                    Cell {
                        x,
                        y,
                        expression: Some(expression),
                        value: None,
                        error: None,
                    },
                );
            }
            None => {
                self.cells.remove(&coord);
            }
        }
    }

    /// Apply a batch of server results.
    ///
    /// Only `value`/`error` are written; `expression` is left alone. A
    /// coordinate with no record gets one with no expression (a pure
    /// dependency push). Later entries for the same coordinate win.
    pub fn apply_server_batch<I>(&mut self, updates: I)
    where
        I: IntoIterator<Item = CellUpdate>,
    {
        for update in updates {
            let coord = CellCoord::new(update.x, update.y);
            let cell = self.cells.entry(coord).or_insert_with(|| Cell {
                x: update.x,
                y: update.y,
                ..Cell::default()
            });
            cell.value = update.value;
            cell.error = update.error;
        }
    }

    /// Drop every record. The edited-cell pointer is kept.
    pub fn clear_all(&mut self) {
        self.cells.clear();
    }

    pub fn select(&self, x: u32, y: u32) -> Option<&Cell> {
        self.cells.get(&CellCoord::new(x, y))
    }

    /// Current expression at a coordinate, if any.
    pub fn expression(&self, x: u32, y: u32) -> Option<&str> {
        self.select(x, y).and_then(|c| c.expression.as_deref())
    }

    pub fn set_edited_cell(&mut self, coord: Option<CellCoord>) {
        self.edited = coord;
    }

    pub fn edited_cell(&self) -> Option<CellCoord> {
        self.edited
    }

    pub fn is_edited(&self, x: u32, y: u32) -> bool {
        self.edited == Some(CellCoord::new(x, y))
    }

    pub fn is_edited_any(&self) -> bool {
        self.edited.is_some()
    }

    /// Iterate records in row-major order (x ascending, then y ascending).
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
