//! Websocket transport middleware.
//!
//! Sits in front of the reducer. It intercepts two intents:
//!
//! - `Connect` opens a new socket and moves the status to `Connecting`.
//! - `UpdateCell` is serialized and sent if a socket is open, then passed on
//!   so the optimistic local write still happens.
//!
//! Socket lifecycle callbacks (open, close, message) come back as
//! [`TransportEvent`]s over a channel and are turned into intents by
//! [`TransportMiddleware::on_event`]. The socket itself runs on a tokio task;
//! nothing else touches it.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use livegrid_protocol::{decode_batch, encode_request};

use crate::cells::CellUpdate;
use crate::connection::{connected_text, connecting_text, failed_text, ConnectionStatus};
use crate::error::ClientError;
use crate::intent::{CellEdit, Intent};

/// Identifies one socket instance. Events from older sockets are ignored.
pub type ConnectionId = u64;

/// Socket lifecycle callbacks, delivered to the session's event loop.
#[derive(Debug)]
pub enum TransportEvent {
    Opened {
        id: ConnectionId,
    },
    /// Closed for any reason. `reason` is `None` for a close the client asked for.
    Closed {
        id: ConnectionId,
        reason: Option<ClientError>,
    },
    /// One text frame, not yet parsed.
    Message {
        id: ConnectionId,
        text: String,
    },
}

impl TransportEvent {
    pub fn connection_id(&self) -> ConnectionId {
        match self {
            TransportEvent::Opened { id }
            | TransportEvent::Closed { id, .. }
            | TransportEvent::Message { id, .. } => *id,
        }
    }
}

/// Client-side handle to a socket task.
///
/// Dropping the handle closes the socket.
#[derive(Debug)]
pub struct SocketHandle {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<String>,
    open: bool,
}

impl SocketHandle {
    pub fn new(id: ConnectionId, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self { id, outbound, open: false }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// True once the socket has reported `Opened`.
    pub fn is_open(&self) -> bool {
        self.open
    }

    fn mark_open(&mut self) {
        self.open = true;
    }

    /// Queue a text frame. Returns false if the socket task is gone.
    pub fn send(&self, text: String) -> bool {
        self.outbound.send(text).is_ok()
    }
}

/// Opens sockets. The websocket implementation is [`WsConnector`]; tests
/// substitute an in-memory one.
pub trait Connector {
    fn connect(
        &mut self,
        url: &str,
        id: ConnectionId,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> SocketHandle;
}

pub struct TransportMiddleware<C> {
    url: String,
    connector: C,
    socket: Option<SocketHandle>,
    next_id: ConnectionId,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl<C: Connector> TransportMiddleware<C> {
    pub fn new(url: impl Into<String>, connector: C, events: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self {
            url: url.into(),
            connector,
            socket: None,
            next_id: 1,
            events,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    /// Whether edits are currently transmitted.
    pub fn is_open(&self) -> bool {
        self.socket.as_ref().map_or(false, |s| s.is_open())
    }

    /// Perform side effects for `intent`.
    ///
    /// Returns intents that must be reduced before `intent` itself.
    pub fn intercept(&mut self, intent: &Intent) -> Vec<Intent> {
        match intent {
            Intent::Connect => {
                let id = self.next_id;
                self.next_id += 1;
                if let Some(old) = self.socket.take() {
                    log::info!("Replacing socket {} with socket {}", old.id(), id);
                }
                log::info!("Connecting to {} (socket {})", self.url, id);
                self.socket = Some(self.connector.connect(&self.url, id, self.events.clone()));
                vec![Intent::SetStatus {
                    status: ConnectionStatus::Connecting,
                    text: connecting_text(&self.url),
                }]
            }
            Intent::UpdateCell(edit) => {
                self.send_edit(edit);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn send_edit(&self, edit: &CellEdit) {
        let socket = match self.socket.as_ref().filter(|s| s.is_open()) {
            Some(socket) => socket,
            None => {
                log::debug!("No open socket, edit of ({}, {}) kept local", edit.x, edit.y);
                return;
            }
        };

        match encode_request(&edit.to_request()) {
            Ok(text) => {
                if socket.send(text) {
                    log::debug!("Sent edit of ({}, {}) on socket {}", edit.x, edit.y, socket.id());
                } else {
                    log::warn!("Socket {} writer is gone, edit of ({}, {}) dropped", socket.id(), edit.x, edit.y);
                }
            }
            Err(e) => log::warn!("{}", ClientError::from(e)),
        }
    }

    /// Translate a socket callback into intents.
    pub fn on_event(&mut self, event: TransportEvent) -> Vec<Intent> {
        let current = self.socket.as_ref().map(|s| s.id());
        if current != Some(event.connection_id()) {
            log::debug!("Ignoring event from stale socket {}", event.connection_id());
            return Vec::new();
        }

        match event {
            TransportEvent::Opened { id } => {
                log::info!("Connected to {} (socket {})", self.url, id);
                if let Some(socket) = self.socket.as_mut() {
                    socket.mark_open();
                }
                vec![
                    Intent::SetStatus {
                        status: ConnectionStatus::Connected,
                        text: connected_text(&self.url),
                    },
                    Intent::ClearAll,
                ]
            }
            TransportEvent::Closed { id, reason } => {
                match reason {
                    Some(err) => log::warn!("Socket {} to {} closed: {}", id, self.url, err),
                    None => log::info!("Socket {} to {} closed", id, self.url),
                }
                self.socket = None;
                vec![Intent::SetStatus {
                    status: ConnectionStatus::Disconnected,
                    text: failed_text(&self.url),
                }]
            }
            TransportEvent::Message { id, text } => match decode_batch(&text) {
                Ok(batch) => {
                    log::debug!("Socket {} pushed {} cell results", id, batch.len());
                    vec![Intent::ApplyServerBatch(
                        batch.into_iter().map(CellUpdate::from).collect(),
                    )]
                }
                Err(e) => {
                    log::warn!("Ignoring message on socket {}: {}", id, e);
                    Vec::new()
                }
            },
        }
    }
}

// ============================================================================
// Websocket connector
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens real websockets on a tokio runtime.
#[derive(Debug, Clone)]
pub struct WsConnector {
    runtime: Handle,
    connect_timeout: Option<Duration>,
}

impl WsConnector {
    /// `connect_timeout: None` waits for the handshake indefinitely.
    pub fn new(runtime: Handle, connect_timeout: Option<Duration>) -> Self {
        Self { runtime, connect_timeout }
    }
}

impl Connector for WsConnector {
    fn connect(
        &mut self,
        url: &str,
        id: ConnectionId,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> SocketHandle {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        self.runtime
            .spawn(run_socket(url.to_string(), id, self.connect_timeout, events, outbound_rx));
        SocketHandle::new(id, outbound_tx)
    }
}

async fn run_socket(
    url: String,
    id: ConnectionId,
    connect_timeout: Option<Duration>,
    events: mpsc::UnboundedSender<TransportEvent>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    let reason = match open_socket(&url, connect_timeout).await {
        Ok(ws) => {
            if events.send(TransportEvent::Opened { id }).is_err() {
                return;
            }
            pump(ws, id, &events, &mut outbound).await
        }
        Err(e) => Some(e),
    };
    let _ = events.send(TransportEvent::Closed { id, reason });
}

async fn open_socket(url: &str, connect_timeout: Option<Duration>) -> Result<WsStream, ClientError> {
    let result = match connect_timeout {
        Some(limit) => tokio::time::timeout(limit, connect_async(url))
            .await
            .map_err(|_| ClientError::Timeout(limit))?,
        None => connect_async(url).await,
    };
    result
        .map(|(ws, _response)| ws)
        .map_err(|e| ClientError::ConnectFailed(e.to_string()))
}

/// Shuttle frames until either side goes away.
async fn pump(
    ws: WsStream,
    id: ConnectionId,
    events: &mpsc::UnboundedSender<TransportEvent>,
    outbound: &mut mpsc::UnboundedReceiver<String>,
) -> Option<ClientError> {
    let (mut sink, mut stream) = ws.split();
    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        return Some(ClientError::Io(e.to_string()));
                    }
                }
                None => {
                    // Handle dropped by the session
                    let _ = sink.close().await;
                    return None;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let text = text.as_str().to_owned();
                    if events.send(TransportEvent::Message { id, text }).is_err() {
                        let _ = sink.close().await;
                        return None;
                    }
                }
                Some(Ok(Message::Close(_))) | None => return Some(ClientError::Closed),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Some(ClientError::Io(e.to_string())),
            },
        }
    }
}
