// complaint-backend/src/domain/complaint_model.rs

use super::complaint_category::ComplaintCategory;
use super::complaint_priority::ComplaintPriority;
use super::complaint_status::ComplaintStatus;
use super::geo::GeoPoint;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaints")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub category: String,

    pub priority: String,

    pub status: String,

    pub is_emergency: bool,

    pub latitude: f64,

    pub longitude: f64,

    pub address: String,

    #[sea_orm(nullable)]
    pub city: Option<String>,

    #[sea_orm(nullable)]
    pub region: Option<String>,

    pub submitted_by: Uuid,

    #[sea_orm(nullable)]
    pub assigned_to: Option<Uuid>,

    pub department_id: Uuid,

    pub view_count: i32,

    #[sea_orm(nullable)]
    pub rating: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,

    #[sea_orm(nullable)]
    pub resolved_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_model::Entity",
        from = "Column::SubmittedBy",
        to = "super::user_model::Column::Id"
    )]
    Submitter,
    #[sea_orm(
        belongs_to = "super::department_model::Entity",
        from = "Column::DepartmentId",
        to = "super::department_model::Column::Id"
    )]
    Department,
    #[sea_orm(has_many = "super::complaint_update_model::Entity")]
    Updates,
    #[sea_orm(has_many = "super::complaint_attachment_model::Entity")]
    Attachments,
}

impl Related<super::user_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submitter.def()
    }
}

impl Related<super::department_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::complaint_update_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Updates.def()
    }
}

impl Related<super::complaint_attachment_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            priority: Set(ComplaintPriority::default().to_string()),
            status: Set(ComplaintStatus::default().to_string()),
            is_emergency: Set(false),
            view_count: Set(0),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

impl Model {
    pub fn status(&self) -> ComplaintStatus {
        ComplaintStatus::from_str(&self.status).unwrap_or_default()
    }

    pub fn priority(&self) -> ComplaintPriority {
        ComplaintPriority::from_str(&self.priority).unwrap_or_default()
    }

    pub fn category(&self) -> ComplaintCategory {
        ComplaintCategory::from_str(&self.category).unwrap_or(ComplaintCategory::Other)
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}
