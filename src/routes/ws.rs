//! `GET /ws`: live change notifications.
//!
//! Clients send `{"command":"subscribe","collections":["souvenirs"]}` (or
//! `"*"` for everything they may read) and then receive a `ChangeEvent`
//! envelope for every matching mutation. Events only carry ids, so clients
//! re-fetch over REST.
//!
//! Without a session only the catalog collections are available. Cart,
//! wishlist and notification events reach their owner only; users, orders
//! and messages are for admins.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{
    events::{ChangeEvent, Collection, SubscriptionFilter, Viewer},
    middleware::auth::SocketViewer,
    state::AppState,
};

const WILDCARD: &str = "*";

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Response,
    Event,
    Error,
}

/// Server to client frame.
#[derive(Debug, Serialize)]
pub struct Frame {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: FrameKind,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl Frame {
    fn new(id: Option<String>, kind: FrameKind, payload: serde_json::Value) -> Self {
        Self {
            id,
            kind,
            timestamp: Utc::now(),
            payload,
        }
    }

    fn error(id: Option<String>, code: u16, message: &str) -> Self {
        Self::new(
            id,
            FrameKind::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Subscribe {
        #[serde(default)]
        id: Option<String>,
        collections: Vec<String>,
    },
    Unsubscribe {
        #[serde(default)]
        id: Option<String>,
        collections: Vec<String>,
    },
}

/// The session is resolved before the upgrade so a bad token gets a plain
/// 401/403 response.
pub async fn ws_handler(
    State(state): State<AppState>,
    SocketViewer(viewer): SocketViewer,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let events = state.events.subscribe();
    ws.on_upgrade(move |socket| run_connection(socket, events, viewer))
}

async fn run_connection(
    socket: WebSocket,
    mut events: broadcast::Receiver<ChangeEvent>,
    viewer: Viewer,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut filter = SubscriptionFilter::new(viewer);
    tracing::debug!(?viewer, "ws connection opened");

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_command(&text, &mut filter);
                        if let Some(json) = encode(&reply)
                            && ws_tx.send(Message::text(json)).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {}
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if !filter.matches(&event) {
                            continue;
                        }
                        let payload = match serde_json::to_value(&event) {
                            Ok(payload) => payload,
                            Err(err) => {
                                tracing::warn!(error = %err, "failed to encode change event");
                                continue;
                            }
                        };
                        let frame = Frame::new(None, FrameKind::Event, payload);
                        if let Some(json) = encode(&frame)
                            && ws_tx.send(Message::text(json)).await.is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

fn encode(frame: &Frame) -> Option<String> {
    serde_json::to_string(frame).ok()
}

/// Splits names into known collections and the wildcard flag. Unknown names
/// are returned so the client can be told about them.
fn parse_collections(names: &[String]) -> (Vec<Collection>, bool, Vec<String>) {
    let mut collections = Vec::new();
    let mut wildcard = false;
    let mut unknown = Vec::new();
    for name in names {
        if name == WILDCARD {
            wildcard = true;
            continue;
        }
        match serde_json::from_value::<Collection>(serde_json::Value::String(name.clone())) {
            Ok(collection) => collections.push(collection),
            Err(_) => unknown.push(name.clone()),
        }
    }
    (collections, wildcard, unknown)
}

/// Applies one client command to the connection's filter and builds the reply.
pub fn handle_command(text: &str, filter: &mut SubscriptionFilter) -> Frame {
    let command = match serde_json::from_str::<Command>(text) {
        Ok(command) => command,
        Err(_) => return Frame::error(None, 400, "malformed command"),
    };

    match command {
        Command::Subscribe { id, collections } => {
            let (collections, wildcard, unknown) = parse_collections(&collections);
            let forbidden = filter.subscribe(&collections, wildcard);
            Frame::new(
                id,
                FrameKind::Response,
                serde_json::json!({
                    "subscribed": filter.collections(),
                    "wildcard": filter.is_wildcard(),
                    "unknown": unknown,
                    "forbidden": forbidden,
                }),
            )
        }
        Command::Unsubscribe { id, collections } => {
            let (collections, wildcard, unknown) = parse_collections(&collections);
            filter.unsubscribe(&collections, wildcard);
            Frame::new(
                id,
                FrameKind::Response,
                serde_json::json!({
                    "subscribed": filter.collections(),
                    "wildcard": filter.is_wildcard(),
                    "unknown": unknown,
                }),
            )
        }
    }
}
