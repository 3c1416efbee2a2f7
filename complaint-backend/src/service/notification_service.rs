// src/service/notification_service.rs

use crate::api::dto::complaint_dto::{ComplaintResponse, ComplaintUpdateResponse};
use crate::domain::complaint_status::ComplaintStatus;
use crate::domain::user_role::UserRole;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

/// ルームごとのバッファ。遅れた購読者はこれを超えた分を取りこぼす。
pub const ROOM_CHANNEL_CAPACITY: usize = 64;

/// 配信先ルーム
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    Role(UserRole),
    Complaint(Uuid),
}

impl Room {
    /// ロールルーム名（`admin` / `provider` / `citizen`）を解釈
    pub fn parse_role(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(Self::Role(UserRole::Admin)),
            "provider" => Some(Self::Role(UserRole::Provider)),
            "citizen" => Some(Self::Role(UserRole::Citizen)),
            _ => None,
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(role) => write!(f, "{}", role.as_str()),
            Self::Complaint(id) => write!(f, "complaint-{}", id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplaintNotice {
    pub complaint: ComplaintResponse,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateNotice {
    pub complaint: ComplaintResponse,
    pub old_status: ComplaintStatus,
    pub new_status: ComplaintStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintUpdateNotice {
    pub complaint_id: Uuid,
    pub status: ComplaintStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUpdateNotice {
    pub complaint: Uuid,
    pub update: ComplaintUpdateResponse,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentNotice {
    pub complaint: ComplaintResponse,
    pub assigned_to: Uuid,
    pub message: String,
}

/// WebSocketでクライアントに送るイベント（`{"event": ..., "data": ...}`）
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum RealtimeEvent {
    NewComplaint(ComplaintNotice),
    EmergencyComplaint(ComplaintNotice),
    StatusUpdate(StatusUpdateNotice),
    ComplaintUpdate(ComplaintUpdateNotice),
    NewUpdate(NewUpdateNotice),
    AssignmentUpdate(AssignmentNotice),
}

impl RealtimeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewComplaint(_) => "new-complaint",
            Self::EmergencyComplaint(_) => "emergency-complaint",
            Self::StatusUpdate(_) => "status-update",
            Self::ComplaintUpdate(_) => "complaint-update",
            Self::NewUpdate(_) => "new-update",
            Self::AssignmentUpdate(_) => "assignment-update",
        }
    }
}

/// プロセス内のpub/subハブ
///
/// 配信はベストエフォートで高々1回。再送も確認応答もなく、
/// 購読者がいないルームへの発行は何もしない。
pub struct NotificationHub {
    rooms: RwLock<HashMap<Room, broadcast::Sender<Arc<RealtimeEvent>>>>,
    capacity: usize,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::with_capacity(ROOM_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// ルームを購読（なければ作成）
    pub async fn subscribe(&self, room: Room) -> broadcast::Receiver<Arc<RealtimeEvent>> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// イベントを発行し、受信した購読者数を返す
    pub async fn publish(&self, room: Room, event: RealtimeEvent) -> usize {
        let event_name = event.name();
        let delivered = {
            let rooms = self.rooms.read().await;
            match rooms.get(&room) {
                Some(sender) => sender.send(Arc::new(event)).unwrap_or(0),
                None => 0,
            }
        };

        if delivered == 0 {
            self.release(room).await;
        }
        debug!(room = %room, event = event_name, delivered, "Realtime event published");
        delivered
    }

    /// 購読者がいなくなったルームを片付ける
    pub async fn release(&self, room: Room) {
        let mut rooms = self.rooms.write().await;
        if rooms
            .get(&room)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            rooms.remove(&room);
        }
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    // --- 苦情ライフサイクルの通知 ---

    pub async fn complaint_created(&self, complaint: &ComplaintResponse) {
        let message = if complaint.is_emergency {
            "New emergency complaint submitted"
        } else {
            "New complaint submitted"
        };
        self.publish(
            Room::Role(UserRole::Admin),
            RealtimeEvent::NewComplaint(ComplaintNotice {
                complaint: complaint.clone(),
                message: message.to_string(),
            }),
        )
        .await;

        if complaint.is_emergency {
            self.publish(
                Room::Role(UserRole::Provider),
                RealtimeEvent::EmergencyComplaint(ComplaintNotice {
                    complaint: complaint.clone(),
                    message: "Emergency complaint requires immediate attention".to_string(),
                }),
            )
            .await;
        }
    }

    pub async fn status_changed(&self, complaint: &ComplaintResponse, old_status: ComplaintStatus) {
        self.publish(
            Room::Complaint(complaint.id),
            RealtimeEvent::StatusUpdate(StatusUpdateNotice {
                complaint: complaint.clone(),
                old_status,
                new_status: complaint.status,
                message: format!("Complaint status updated to {}", complaint.status),
            }),
        )
        .await;

        self.publish(
            Room::Role(UserRole::Citizen),
            RealtimeEvent::ComplaintUpdate(ComplaintUpdateNotice {
                complaint_id: complaint.id,
                status: complaint.status,
            }),
        )
        .await;
    }

    pub async fn complaint_assigned(&self, complaint: &ComplaintResponse, assigned_to: Uuid) {
        self.publish(
            Room::Complaint(complaint.id),
            RealtimeEvent::AssignmentUpdate(AssignmentNotice {
                complaint: complaint.clone(),
                assigned_to,
                message: "Complaint has been assigned to a service provider".to_string(),
            }),
        )
        .await;
    }

    pub async fn update_added(&self, complaint_id: Uuid, update: &ComplaintUpdateResponse) {
        self.publish(
            Room::Complaint(complaint_id),
            RealtimeEvent::NewUpdate(NewUpdateNotice {
                complaint: complaint_id,
                update: update.clone(),
                message: "New update added to your complaint".to_string(),
            }),
        )
        .await;
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}
