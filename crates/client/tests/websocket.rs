//! End-to-end tests against an in-process websocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use livegrid_client::{CellCoord, ConnectionStatus, EditKey, Session, WsConnector};

const WAIT: Duration = Duration::from_secs(5);

/// What the fake server does after the handshake.
enum Script {
    /// Report every text frame, answer each with `reply`.
    Echo { reply: &'static str },
    /// Close immediately.
    Close,
}

async fn spawn_server(script: Script) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        match script {
            Script::Close => {
                let _ = ws.close(None).await;
            }
            Script::Echo { reply } => {
                while let Some(Ok(msg)) = ws.next().await {
                    if let Message::Text(text) = msg {
                        let _ = seen_tx.send(text.as_str().to_owned());
                        if ws.send(Message::Text(reply.into())).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });

    (url, seen_rx)
}

fn session(url: &str, timeout: Option<Duration>) -> Session {
    let connector = WsConnector::new(tokio::runtime::Handle::current(), timeout);
    Session::new(url, connector)
}

/// Apply socket events until `done` holds.
async fn drive_until(session: &mut Session, done: impl Fn(&Session) -> bool) {
    tokio::time::timeout(WAIT, async {
        while !done(&*session) {
            let event = session.next_event().await.expect("event channel closed");
            session.handle_event(event);
        }
    })
    .await
    .expect("condition not reached in time");
}

fn is_connected(s: &Session) -> bool {
    s.state().connection.status() == ConnectionStatus::Connected
}

fn is_disconnected(s: &Session) -> bool {
    s.state().connection.status() == ConnectionStatus::Disconnected
}

#[tokio::test]
async fn test_connect_edit_and_receive_push() {
    let (url, mut seen) = spawn_server(Script::Echo {
        reply: r#"[{"col":1,"row":2,"value":"42","error":null},{"col":0,"row":5,"value":"84","error":null}]"#,
    })
    .await;
    let mut session = session(&url, Some(WAIT));

    assert!(session.connect());
    assert_eq!(session.state().connection.status_text(), format!("Connecting to {}", url));
    drive_until(&mut session, is_connected).await;
    assert_eq!(session.state().connection.status_text(), format!("Connected to {}", url));

    assert!(session.click_cell(CellCoord::new(1, 2)));
    session.set_edit_text("=A1*2");
    session.key(EditKey::Enter);

    let sent = tokio::time::timeout(WAIT, seen.recv()).await.unwrap().unwrap();
    let sent: serde_json::Value = serde_json::from_str(&sent).unwrap();
    assert_eq!(sent, serde_json::json!({ "col": 1, "row": 2, "expression": "=A1*2" }));

    drive_until(&mut session, |s| s.state().cells.len() == 2).await;
    let edited = session.state().cells.select(1, 2).unwrap();
    assert_eq!(edited.expression.as_deref(), Some("=A1*2"));
    assert_eq!(edited.value.as_deref(), Some("42"));
    let dependent = session.state().cells.select(0, 5).unwrap();
    assert_eq!(dependent.expression, None);
    assert_eq!(dependent.value.as_deref(), Some("84"));
}

#[tokio::test]
async fn test_delete_sends_null_expression() {
    let (url, mut seen) = spawn_server(Script::Echo { reply: "[]" }).await;
    let mut session = session(&url, Some(WAIT));
    session.connect();
    drive_until(&mut session, is_connected).await;

    session.click_cell(CellCoord::new(0, 0));
    session.set_edit_text("5");
    session.key(EditKey::Tab);
    session.click_cell(CellCoord::new(0, 0));
    session.set_edit_text("");
    session.key(EditKey::Enter);

    let first = tokio::time::timeout(WAIT, seen.recv()).await.unwrap().unwrap();
    let second = tokio::time::timeout(WAIT, seen.recv()).await.unwrap().unwrap();
    assert_eq!(first, r#"{"col":0,"row":0,"expression":"5"}"#);
    assert_eq!(second, r#"{"col":0,"row":0,"expression":null}"#);
    assert!(session.state().cells.select(0, 0).is_none());
}

#[tokio::test]
async fn test_server_close_reports_failure() {
    let (url, _seen) = spawn_server(Script::Close).await;
    let mut session = session(&url, Some(WAIT));
    session.connect();

    drive_until(&mut session, is_connected).await;
    drive_until(&mut session, is_disconnected).await;
    assert_eq!(session.state().connection.status_text(), format!("Failed to connect to {}", url));
    assert!(!session.transport().is_open());
}

#[tokio::test]
async fn test_refused_connection_reports_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);

    let mut session = session(&url, Some(WAIT));
    session.connect();
    drive_until(&mut session, is_disconnected).await;
    assert_eq!(session.state().connection.status_text(), format!("Failed to connect to {}", url));

    // The user may try again
    assert!(session.connect());
}

#[tokio::test]
async fn test_handshake_timeout_reports_failure() {
    // Accepts TCP but never speaks websocket
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let mut session = session(&url, Some(Duration::from_millis(200)));
    session.connect();
    drive_until(&mut session, is_disconnected).await;
    assert_eq!(session.state().connection.status_text(), format!("Failed to connect to {}", url));
    drop(listener);
}
