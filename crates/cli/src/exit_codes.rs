//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain      | Description                              |
//! |---------|-------------|------------------------------------------|
//! | 0       | Universal   | Success                                  |
//! | 1       | Universal   | General error (unspecified)              |
//! | 2       | Universal   | CLI usage error (bad args, bad cell ref) |
//! | 20-29   | connection  | Websocket connection codes               |

use livegrid_client::ClientError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid cell reference.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Connection (20-29)
// =============================================================================

/// Cannot connect to the server (refused, bad URL, handshake rejected).
pub const EXIT_CONNECT: u8 = 20;

/// Connection was established, then lost.
pub const EXIT_DISCONNECTED: u8 = 21;

/// Handshake did not complete within `server.connectTimeoutMs`.
pub const EXIT_TIMEOUT: u8 = 22;

/// Map the reason a socket closed to its exit code.
///
/// `was_open` tells a lost connection apart from one that never came up.
pub fn close_exit_code(reason: Option<&ClientError>, was_open: bool) -> u8 {
    match reason {
        Some(ClientError::Timeout(_)) => EXIT_TIMEOUT,
        _ if was_open => EXIT_DISCONNECTED,
        _ => EXIT_CONNECT,
    }
}
