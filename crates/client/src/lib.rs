//! LiveGrid client engine.
//!
//! Keeps a local mirror of a server-owned spreadsheet: a normalized cell
//! store, the websocket connection status, and a single-cell editing overlay.
//! The server owns formula evaluation; this crate only sends expressions and
//! applies the computed results it pushes back.
//!
//! Everything is driven through a [`Session`]:
//!
//! ```ignore
//! let connector = WsConnector::new(runtime.handle().clone(), Some(Duration::from_secs(10)));
//! let mut session = Session::new("ws://127.0.0.1:9123", connector);
//! session.connect();
//! loop {
//!     session.pump_events();
//!     // render session.state()
//! }
//! ```

pub mod cell;
pub mod cells;
pub mod connection;
pub mod editing;
pub mod error;
pub mod intent;
pub mod session;
pub mod state;
pub mod transport;

pub use cell::{col_to_letters, Cell, CellCoord};
pub use cells::{CellStore, CellUpdate};
pub use connection::{ConnectionState, ConnectionStatus};
pub use editing::{EditKey, EditingOverlay, FinishMode, PendingEdit};
pub use error::ClientError;
pub use intent::{CellEdit, Intent};
pub use session::Session;
pub use state::AppState;
pub use transport::{ConnectionId, Connector, SocketHandle, TransportEvent, TransportMiddleware, WsConnector};
