// Headless commands: `watch` and `set`.
//
// Both drive a Session on the tokio runtime and print the results the server
// pushes. The session still owns all state; these only observe events on the
// way through.

use std::time::Duration;

use tokio::runtime::Runtime;

use livegrid_client::{CellCoord, CellEdit, Intent, Session, TransportEvent, WsConnector};
use livegrid_protocol::{decode_batch, CellUpdateResponse};

use crate::exit_codes::{close_exit_code, EXIT_ERROR};
use crate::CliError;

/// One pushed result, as printed.
pub fn format_result(update: &CellUpdateResponse, json: bool) -> String {
    let cell = CellCoord::new(update.col, update.row).to_string();
    if json {
        return serde_json::json!({
            "cell": cell,
            "col": update.col,
            "row": update.row,
            "value": update.value,
            "error": update.error,
        })
        .to_string();
    }
    match (&update.value, &update.error) {
        (_, Some(error)) => format!("{} ! {}", cell, error),
        (Some(value), None) => format!("{} = {}", cell, value),
        (None, None) => format!("{} (empty)", cell),
    }
}

fn print_pushed(event: &TransportEvent, json: bool) {
    if let TransportEvent::Message { text, .. } = event {
        // Malformed payloads are logged by the session itself.
        if let Ok(batch) = decode_batch(text) {
            for update in &batch {
                println!("{}", format_result(update, json));
            }
        }
    }
}

/// Exit code and hint for a close event.
fn close_info(event: &TransportEvent, was_open: bool) -> Option<(u8, Option<String>)> {
    match event {
        TransportEvent::Closed { reason, .. } => Some((
            close_exit_code(reason.as_ref(), was_open),
            reason.as_ref().map(|r| r.to_string()),
        )),
        _ => None,
    }
}

/// Turn a close into the command's error.
fn closed_error(session: &Session, reason: Option<String>, code: u8) -> CliError {
    CliError {
        code,
        message: session.state().connection.status_text().to_string(),
        hint: reason,
    }
}

/// Connect and wait for the socket to open (or fail).
async fn connect(session: &mut Session) -> Result<(), CliError> {
    session.connect();
    loop {
        let event = session
            .next_event()
            .await
            .ok_or_else(|| CliError::new(EXIT_ERROR, "event channel closed"))?;

        let closed = close_info(&event, false);
        session.handle_event(event);
        if let Some((code, hint)) = closed {
            return Err(closed_error(session, hint, code));
        }
        if session.state().connection.is_connected() {
            eprintln!("{}", session.state().connection.status_text());
            return Ok(());
        }
    }
}

/// Apply events until the socket closes, printing every pushed result.
async fn follow(session: &mut Session, json: bool) -> Result<(), CliError> {
    loop {
        let event = session
            .next_event()
            .await
            .ok_or_else(|| CliError::new(EXIT_ERROR, "event channel closed"))?;
        print_pushed(&event, json);

        let closed = close_info(&event, true);
        session.handle_event(event);
        if let Some((code, hint)) = closed {
            return Err(closed_error(session, hint, code));
        }
    }
}

pub fn cmd_watch(runtime: &Runtime, mut session: Session<WsConnector>, json: bool) -> Result<(), CliError> {
    runtime.block_on(async {
        connect(&mut session).await?;
        follow(&mut session, json).await
    })
}

pub fn cmd_set(
    runtime: &Runtime,
    mut session: Session<WsConnector>,
    edit: CellEdit,
    wait: Duration,
    json: bool,
) -> Result<(), CliError> {
    runtime.block_on(async {
        connect(&mut session).await?;
        log::info!("Setting ({}, {}) to {:?}", edit.x, edit.y, edit.expression);
        session.dispatch(Intent::UpdateCell(edit));

        match tokio::time::timeout(wait, follow(&mut session, json)).await {
            // The wait window ran out with the socket still up
            Err(_elapsed) => Ok(()),
            Ok(result) => result,
        }
    })
}

/// `EXPRESSION` argument to the edit it describes. Blank deletes.
pub fn parse_expression(expression: Option<String>) -> Option<String> {
    expression
        .map(|e| e.trim_end().to_string())
        .filter(|e| !e.is_empty())
}
