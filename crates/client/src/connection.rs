//! Transport lifecycle as seen by the UI.
//!
//! `Disconnected -> Connecting -> Connected -> Disconnected -> ...`
//!
//! There is no terminal state and no automatic retry: leaving `Disconnected`
//! always takes an explicit connect intent.

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    status: ConnectionStatus,
    status_text: String,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            status_text: "Disconnected".to_string(),
        }
    }
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Human-readable status shown in the header.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn set_status(&mut self, status: ConnectionStatus, text: impl Into<String>) {
        self.status = status;
        self.status_text = text.into();
    }

    /// Cells may only be edited while connected.
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// A new connect is only offered from `Disconnected`.
    pub fn can_connect(&self) -> bool {
        self.status == ConnectionStatus::Disconnected
    }
}

pub fn connecting_text(url: &str) -> String {
    format!("Connecting to {}", url)
}

pub fn connected_text(url: &str) -> String {
    format!("Connected to {}", url)
}

/// Same text for every kind of close: refused, timed out, lost or clean.
pub fn failed_text(url: &str) -> String {
    format!("Failed to connect to {}", url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ConnectionState::new();
        assert_eq!(state.status(), ConnectionStatus::Disconnected);
        assert_eq!(state.status_text(), "Disconnected");
        assert!(state.can_connect());
        assert!(!state.is_connected());
    }

    #[test]
    fn test_gates() {
        let mut state = ConnectionState::new();
        state.set_status(ConnectionStatus::Connecting, connecting_text("ws://h:1"));
        assert!(!state.can_connect());
        assert!(!state.is_connected());

        state.set_status(ConnectionStatus::Connected, connected_text("ws://h:1"));
        assert!(state.is_connected());
        assert!(!state.can_connect());
        assert_eq!(state.status_text(), "Connected to ws://h:1");
    }

    #[test]
    fn test_failure_text_shape() {
        assert_eq!(failed_text("ws://127.0.0.1:9123"), "Failed to connect to ws://127.0.0.1:9123");
    }
}
