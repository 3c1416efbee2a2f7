// complaint-backend/src/domain/complaint_update_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 更新ログの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    #[default]
    ProgressUpdate,
    StatusChange,
    Assignment,
    Resolution,
    Comment,
}

impl UpdateType {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "progress_update" => Some(Self::ProgressUpdate),
            "status_change" => Some(Self::StatusChange),
            "assignment" => Some(Self::Assignment),
            "resolution" => Some(Self::Resolution),
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProgressUpdate => "progress_update",
            Self::StatusChange => "status_change",
            Self::Assignment => "assignment",
            Self::Resolution => "resolution",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 更新ログのエントリ。追記のみで、作成後は変更しない。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaint_updates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub complaint_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub created_by: Uuid,
    pub update_type: String,
    pub is_internal: bool,
    /// 添付URLの配列
    pub attachments: Json,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::complaint_model::Entity",
        from = "Column::ComplaintId",
        to = "super::complaint_model::Column::Id",
        on_delete = "Cascade"
    )]
    Complaint,
}

impl Related<super::complaint_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Complaint.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            update_type: Set(UpdateType::default().to_string()),
            is_internal: Set(false),
            attachments: Set(serde_json::json!([])),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

impl Model {
    pub fn update_type(&self) -> UpdateType {
        UpdateType::from_str(&self.update_type).unwrap_or_default()
    }

    pub fn attachment_urls(&self) -> Vec<String> {
        serde_json::from_value(self.attachments.clone()).unwrap_or_default()
    }
}
