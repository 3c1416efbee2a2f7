// src/api/handlers/realtime_handler.rs

use crate::api::AppState;
use crate::service::notification_service::{
    NotificationHub, RealtimeEvent, Room, ROOM_CHANNEL_CAPACITY,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// クライアントから届くテキストフレーム
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ClientAction {
    JoinRoleRoom {
        room: String,
    },
    JoinComplaintRoom {
        #[serde(rename = "complaintId")]
        complaint_id: Uuid,
    },
}

impl ClientAction {
    pub fn room(&self) -> Option<Room> {
        match self {
            Self::JoinRoleRoom { room } => Room::parse_role(room),
            Self::JoinComplaintRoom { complaint_id } => Some(Room::Complaint(*complaint_id)),
        }
    }
}

/// 1接続で購読できるルームの上限
pub const MAX_ROOMS_PER_CONNECTION: usize = 32;

pub fn parse_client_frame(text: &str) -> Option<Room> {
    serde_json::from_str::<ClientAction>(text)
        .ok()
        .and_then(|action| action.room())
}

/// 苦情ルームは実在する苦情に限る
pub async fn admit_room(app_state: &AppState, room: Room) -> bool {
    match room {
        Room::Role(_) => true,
        Room::Complaint(id) => match app_state.complaint_service.exists(id).await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(room = %room, error = %err, "Failed to look up complaint room");
                false
            }
        },
    }
}

pub async fn websocket_handler(
    State(app_state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

/// ルームの購読を接続用のキューへ流し込む
async fn forward_room(
    hub: &NotificationHub,
    room: Room,
    sender: mpsc::Sender<Arc<RealtimeEvent>>,
) -> JoinHandle<()> {
    let mut receiver = hub.subscribe(room).await;
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if sender.send(event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(room = %room, skipped, "Realtime subscriber lagged; events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn handle_socket(mut socket: WebSocket, app_state: AppState) {
    let hub = app_state.notifications.clone();
    let connection_id = Uuid::new_v4();
    info!(%connection_id, "Realtime client connected");

    let (sender, mut events) = mpsc::channel::<Arc<RealtimeEvent>>(ROOM_CHANNEL_CAPACITY);
    let mut forwarders: HashMap<Room, JoinHandle<()>> = HashMap::new();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => match parse_client_frame(text.as_str()) {
                        Some(room) if forwarders.contains_key(&room) => {
                            debug!(%connection_id, room = %room, "Client already in room");
                        }
                        Some(room) if forwarders.len() >= MAX_ROOMS_PER_CONNECTION => {
                            warn!(%connection_id, room = %room, "Room limit reached; join ignored");
                        }
                        Some(room) => {
                            if admit_room(&app_state, room).await {
                                let handle = forward_room(&hub, room, sender.clone()).await;
                                forwarders.insert(room, handle);
                                debug!(%connection_id, room = %room, "Client joined room");
                            } else {
                                warn!(%connection_id, room = %room, "Join refused for unknown complaint");
                            }
                        }
                        None => {
                            warn!(%connection_id, frame = %text.as_str(), "Ignoring invalid realtime frame");
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(%connection_id, error = %err, "Realtime socket error");
                        break;
                    }
                }
            }
            Some(event) = events.recv() => {
                let payload = match serde_json::to_string(event.as_ref()) {
                    Ok(payload) => payload,
                    Err(err) => {
                        warn!(event = event.name(), error = %err, "Failed to serialize realtime event");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    // 受信側を確実に破棄してからルームを解放する
    for (room, handle) in forwarders {
        handle.abort();
        let _ = handle.await;
        hub.release(room).await;
    }
    info!(%connection_id, "Realtime client disconnected");
}

pub fn realtime_router(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user_role::UserRole;

    #[test]
    fn test_parse_role_room_frame() {
        let room = parse_client_frame(r#"{"action":"join-role-room","room":"admin"}"#);
        assert_eq!(room, Some(Room::Role(UserRole::Admin)));
    }

    #[test]
    fn test_parse_complaint_room_frame() {
        let id = Uuid::new_v4();
        let frame = format!(
            r#"{{"action":"join-complaint-room","complaintId":"{}"}}"#,
            id
        );
        assert_eq!(parse_client_frame(&frame), Some(Room::Complaint(id)));
    }

    #[test]
    fn test_invalid_frames_are_rejected() {
        assert_eq!(parse_client_frame("not json"), None);
        assert_eq!(
            parse_client_frame(r#"{"action":"join-role-room","room":"superuser"}"#),
            None
        );
        assert_eq!(
            parse_client_frame(r#"{"action":"join-complaint-room","complaintId":"nope"}"#),
            None
        );
        assert_eq!(parse_client_frame(r#"{"action":"leave-room"}"#), None);
    }
}
