//! WebSocket connection handlers.
//!
//! A connection carries no identity at upgrade time; the session id is
//! generated server-side and the user identity arrives with the first
//! `join-room` event. All registry reads and routing decisions run as
//! synchronous reactions to inbound events on this connection's receive
//! task, so registry mutation and the snapshot that follows it are never
//! split across a suspension point observable by another event.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{PresenceTransition, PusherChannel, SessionId, UserId},
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
};

use super::super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
///
/// This is the outbound half of a session: events relayed from other users
/// (via the session's channel) are written to this client's socket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = SessionId::generate();
    let (sender, mut receiver) = socket.split();

    // Create a channel for this session to receive relayed events
    let (tx, rx) = mpsc::unbounded_channel();
    let mut send_task = pusher_loop(rx, sender);

    let session_id_clone = session_id.clone();
    let state_clone = state.clone();

    // Receive events from this session and dispatch to the usecases
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let event = match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("Failed to parse client event, dropping: {}", e);
                            continue;
                        }
                    };
                    handle_client_event(&state_clone, &session_id_clone, &tx, event).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Session '{}' requested close", session_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Unregister the session; safe even if cleanup already ran elsewhere
    if let Some(disconnection) = state.disconnect_session_usecase.execute(&session_id).await {
        tracing::info!(
            "Session '{}' of user '{}' disconnected",
            session_id,
            disconnection.user_id
        );
        if disconnection.went_offline {
            let offline_event = ServerEvent::UserOffline {
                user_id: disconnection.user_id.as_str().to_string(),
            };
            if let Some(offline_json) = encode(&offline_event) {
                if let Err(e) = state
                    .disconnect_session_usecase
                    .broadcast_user_offline(&offline_json)
                    .await
                {
                    tracing::warn!("Failed to broadcast user-offline: {}", e);
                } else {
                    tracing::info!("Broadcasted user-offline for '{}'", disconnection.user_id);
                }
            }
        }
    }
}

fn encode(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to serialize server event: {}", e);
            None
        }
    }
}

async fn handle_client_event(
    state: &Arc<AppState>,
    session_id: &SessionId,
    tx: &PusherChannel,
    event: ClientEvent,
) {
    match event {
        ClientEvent::JoinRoom { user_id } => {
            let user_id = match UserId::try_from(user_id) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Rejecting join-room with invalid user id: {}", e);
                    return;
                }
            };

            let transition = state
                .join_room_usecase
                .execute(user_id.clone(), session_id.clone(), tx.clone())
                .await;
            tracing::info!("Session '{}' joined as '{}'", session_id, user_id);

            // Snapshot reflects the registry right after registration,
            // so the joining user sees themselves and everyone else.
            let snapshot = state.join_room_usecase.online_snapshot().await;
            let snapshot_event = ServerEvent::OnlineUsers {
                user_ids: snapshot.into_iter().map(UserId::into_string).collect(),
            };
            if let Some(snapshot_json) = encode(&snapshot_event) {
                if let Err(e) = state
                    .join_room_usecase
                    .send_snapshot(session_id, &snapshot_json)
                    .await
                {
                    tracing::warn!("Failed to send online-users snapshot: {}", e);
                }
            }

            if transition == PresenceTransition::CameOnline {
                let online_event = ServerEvent::UserOnline {
                    user_id: user_id.as_str().to_string(),
                };
                if let Some(online_json) = encode(&online_event) {
                    if let Err(e) = state
                        .join_room_usecase
                        .broadcast_user_online(&online_json)
                        .await
                    {
                        tracing::warn!("Failed to broadcast user-online: {}", e);
                    } else {
                        tracing::info!("Broadcasted user-online for '{}'", user_id);
                    }
                }
            }
        }
        ClientEvent::SendMessage(payload) => {
            let Some(recipient) = payload.recipient() else {
                tracing::warn!(
                    "Dropping malformed send-message for chat '{}'",
                    payload.chat_id
                );
                return;
            };
            let recipient = match UserId::new(recipient.to_string()) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Dropping send-message with invalid recipient: {}", e);
                    return;
                }
            };

            // Re-emit the payload verbatim as receive-message
            let Some(json) = encode(&ServerEvent::ReceiveMessage(payload)) else {
                return;
            };
            let delivered = state.relay_message_usecase.execute(&recipient, &json).await;
            tracing::debug!(
                "Relayed message to {} session(s) of '{}'",
                delivered,
                recipient
            );
        }
        ClientEvent::Typing(payload) => {
            relay_typing_signal(state, ServerEvent::Typing(payload)).await;
        }
        ClientEvent::StopTyping(payload) => {
            relay_typing_signal(state, ServerEvent::StopTyping(payload)).await;
        }
    }
}

async fn relay_typing_signal(state: &Arc<AppState>, event: ServerEvent) {
    let receiver_id = match &event {
        ServerEvent::Typing(payload) | ServerEvent::StopTyping(payload) => {
            payload.receiver_id.clone()
        }
        _ => return,
    };
    let receiver = match UserId::new(receiver_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Dropping typing signal with invalid receiver: {}", e);
            return;
        }
    };
    let Some(json) = encode(&event) else {
        return;
    };
    state.relay_typing_usecase.execute(&receiver, &json).await;
}
