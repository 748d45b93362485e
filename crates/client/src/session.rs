//! The session: one state container per process.
//!
//! A `Session` owns the application state, the transport middleware, the
//! editing overlay and the receiving end of the socket event channel. The UI
//! holds it by `&mut` and drives it with explicit calls; socket tasks only
//! talk to it through [`TransportEvent`]s, so every mutation happens on the
//! thread that owns the session, one intent at a time.

use tokio::sync::mpsc;

use crate::cell::CellCoord;
use crate::editing::{commit_expression, EditKey, EditingOverlay, FinishMode, PendingEdit};
use crate::intent::{CellEdit, Intent};
use crate::state::AppState;
use crate::transport::{Connector, TransportEvent, TransportMiddleware, WsConnector};

pub struct Session<C: Connector = WsConnector> {
    state: AppState,
    transport: TransportMiddleware<C>,
    overlay: EditingOverlay,
    events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl<C: Connector> Session<C> {
    /// Empty store, `Disconnected`, nothing edited.
    pub fn new(url: impl Into<String>, connector: C) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(),
            transport: TransportMiddleware::new(url, connector, events_tx),
            overlay: EditingOverlay::new(),
            events: events_rx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn url(&self) -> &str {
        self.transport.url()
    }

    pub fn transport(&self) -> &TransportMiddleware<C> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut TransportMiddleware<C> {
        &mut self.transport
    }

    /// Run one intent through the middleware and the reducer.
    pub fn dispatch(&mut self, intent: Intent) {
        log::trace!("dispatch {}", intent.name());

        if let Intent::SetEditedCell(target) = &intent {
            // Leaving a cell always commits its pending text first.
            if self.overlay.pending().map_or(false, |p| Some(p.coord) != *target) {
                self.finish_editing(FinishMode::Commit);
            }
            if let Some(coord) = target {
                if !self.overlay.is_editing() {
                    let text = self.state.cells.expression(coord.x, coord.y).unwrap_or("").to_string();
                    self.overlay.begin(*coord, text);
                }
            }
        }

        for pre in self.transport.intercept(&intent) {
            self.state.reduce(&pre);
        }
        self.state.reduce(&intent);
    }

    /// Explicit connect from the UI. Only acts when `Disconnected`.
    pub fn connect(&mut self) -> bool {
        if !self.state.connection.can_connect() {
            return false;
        }
        self.dispatch(Intent::Connect);
        true
    }

    /// Apply one socket callback.
    pub fn handle_event(&mut self, event: TransportEvent) {
        for intent in self.transport.on_event(event) {
            self.dispatch(intent);
        }
    }

    /// Apply every socket callback already queued. Never blocks.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next socket callback. The caller applies it with
    /// [`Session::handle_event`].
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    pub fn pending_edit(&self) -> Option<&PendingEdit> {
        self.overlay.pending()
    }

    pub fn edit_text(&self) -> Option<&str> {
        self.overlay.pending().map(|p| p.text.as_str())
    }

    /// A click on a cell. Enters edit mode when connected and the cell is not
    /// already being edited; another cell being edited is committed first.
    pub fn click_cell(&mut self, coord: CellCoord) -> bool {
        if !self.state.connection.is_connected() || self.state.cells.is_edited(coord.x, coord.y) {
            return false;
        }
        self.dispatch(Intent::SetEditedCell(Some(coord)));
        true
    }

    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        self.overlay.set_text(text);
    }

    pub fn insert_char(&mut self, ch: char) {
        self.overlay.insert_char(ch);
    }

    pub fn backspace(&mut self) {
        self.overlay.backspace();
    }

    /// A control key while editing. Returns the committed edit, if any.
    pub fn key(&mut self, key: EditKey) -> Option<CellEdit> {
        self.finish_editing(key.finish_mode())
    }

    /// Input focus left the editor: commit.
    pub fn blur(&mut self) -> Option<CellEdit> {
        self.finish_editing(FinishMode::Commit)
    }

    /// Leave edit mode. A commit that changes the expression dispatches
    /// `UpdateCell` (which also sends it if a socket is open); a discard or
    /// an unchanged commit writes nothing.
    pub fn finish_editing(&mut self, mode: FinishMode) -> Option<CellEdit> {
        let pending = self.overlay.take()?;
        let PendingEdit { coord, text } = pending;

        let edit = match mode {
            FinishMode::Commit => commit_expression(&text, self.state.cells.expression(coord.x, coord.y))
                .map(|expression| CellEdit::new(coord.x, coord.y, expression)),
            FinishMode::Discard => None,
        };

        if let Some(edit) = &edit {
            self.dispatch(Intent::UpdateCell(edit.clone()));
        }
        self.dispatch(Intent::SetEditedCell(None));
        edit
    }
}
