//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{GameSession, SessionSettings};
use crate::util::rate_limit::ClientRateLimiter;
use crate::util::time::{unix_millis, SIMULATION_TPS};
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection: one socket, one game session
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4();
    info!(session_id = %session_id, "New WebSocket connection");

    let (mut ws_sink, ws_stream) = socket.split();

    let (session, handle) =
        GameSession::new(session_id, SessionSettings::from_config(&state.config));
    // Subscribe before the session can publish anything
    let snapshot_rx = handle.snapshot_tx.subscribe();
    state.sessions.insert(handle.clone());
    let session_task = tokio::spawn(session.run());

    // Send welcome message
    let welcome = ServerMsg::Welcome {
        session_id,
        server_time: unix_millis(),
        tick_rate: SIMULATION_TPS,
    };

    if let Err(e) = send_msg(&mut ws_sink, &welcome).await {
        error!(session_id = %session_id, error = %e, "Failed to send welcome");
    } else {
        run_connection(session_id, ws_sink, ws_stream, handle.input_tx.clone(), snapshot_rx)
            .await;
    }

    // Cleanup on disconnect
    let _ = handle.input_tx.send(ClientMsg::LeaveMatch).await;
    drop(handle);
    if let Err(e) = session_task.await {
        error!(session_id = %session_id, error = %e, "Session task failed");
    }
    state.sessions.remove(&session_id);

    info!(session_id = %session_id, "WebSocket connection closed");
}

/// Pump messages both ways until either side goes away
async fn run_connection(
    session_id: Uuid,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    input_tx: mpsc::Sender<ClientMsg>,
    mut snapshot_rx: broadcast::Receiver<ServerMsg>,
) {
    let rate_limiter = ClientRateLimiter::new();

    // Spawn writer task: session snapshots -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            match snapshot_rx.recv().await {
                Ok(msg) => {
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(session_id = %session_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        session_id = %session_id,
                        lagged_count = n,
                        "Client lagged, skipping {} snapshots", n
                    );
                    // Continue - the next snapshot supersedes the dropped ones
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(session_id = %session_id, "Snapshot channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> session
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(session_id = %session_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(client_msg) => {
                        if input_tx.send(client_msg).await.is_err() {
                            debug!(session_id = %session_id, "Input channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(session_id = %session_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(session_id = %session_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(session_id = %session_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(session_id = %session_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(session_id = %session_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
