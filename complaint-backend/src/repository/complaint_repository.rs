// src/repository/complaint_repository.rs

use crate::domain::complaint_attachment_model::{
    self, ActiveModel as AttachmentActiveModel, AttachmentType, Entity as AttachmentEntity,
};
use crate::domain::complaint_category::ComplaintCategory;
use crate::domain::complaint_model::{
    self, ActiveModel as ComplaintActiveModel, Entity as ComplaintEntity,
};
use crate::domain::complaint_priority::ComplaintPriority;
use crate::domain::complaint_status::ComplaintStatus;
use crate::domain::complaint_update_model::{
    self, ActiveModel as UpdateActiveModel, Entity as UpdateEntity, UpdateType,
};
use crate::domain::geo::GeoPoint;
use crate::types::{SortKey, SortOrder};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    entity::*, query::*, DbConn, DbErr, FromQueryResult, Order, PaginatorTrait, Set,
    TransactionTrait,
};
use uuid::Uuid;

/// 一覧のソート対象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintSortField {
    CreatedAt,
    UpdatedAt,
    Priority,
    Status,
    Title,
    Category,
    ViewCount,
}

impl ComplaintSortField {
    /// クエリパラメータ上の名前から解決
    pub fn from_param(name: &str) -> Option<Self> {
        match name {
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            "priority" => Some(Self::Priority),
            "status" => Some(Self::Status),
            "title" => Some(Self::Title),
            "category" => Some(Self::Category),
            "viewCount" | "view_count" => Some(Self::ViewCount),
            _ => None,
        }
    }

    fn column(self) -> complaint_model::Column {
        match self {
            Self::CreatedAt => complaint_model::Column::CreatedAt,
            Self::UpdatedAt => complaint_model::Column::UpdatedAt,
            Self::Priority => complaint_model::Column::Priority,
            Self::Status => complaint_model::Column::Status,
            Self::Title => complaint_model::Column::Title,
            Self::Category => complaint_model::Column::Category,
            Self::ViewCount => complaint_model::Column::ViewCount,
        }
    }

    /// 既定の並び順（新しい順）
    pub fn default_sort() -> Vec<SortKey<Self>> {
        vec![SortKey {
            field: Self::CreatedAt,
            order: SortOrder::Desc,
        }]
    }
}

/// 半径検索条件
#[derive(Debug, Clone, Copy)]
pub struct NearFilter {
    pub center: GeoPoint,
    pub radius_km: f64,
}

/// 苦情検索の条件
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub status: Option<ComplaintStatus>,
    pub category: Option<ComplaintCategory>,
    pub priority: Option<ComplaintPriority>,
    pub is_emergency: Option<bool>,
    pub department_id: Option<Uuid>,
    pub submitted_by: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub near: Option<NearFilter>,
}

impl ComplaintFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(status) = self.status {
            condition = condition.add(complaint_model::Column::Status.eq(status.as_str()));
        }
        if let Some(category) = self.category {
            condition = condition.add(complaint_model::Column::Category.eq(category.as_str()));
        }
        if let Some(priority) = self.priority {
            condition = condition.add(complaint_model::Column::Priority.eq(priority.as_str()));
        }
        if let Some(is_emergency) = self.is_emergency {
            condition = condition.add(complaint_model::Column::IsEmergency.eq(is_emergency));
        }
        if let Some(department_id) = self.department_id {
            condition = condition.add(complaint_model::Column::DepartmentId.eq(department_id));
        }
        if let Some(submitted_by) = self.submitted_by {
            condition = condition.add(complaint_model::Column::SubmittedBy.eq(submitted_by));
        }
        if let Some(assigned_to) = self.assigned_to {
            condition = condition.add(complaint_model::Column::AssignedTo.eq(assigned_to));
        }
        if let Some(from) = self.created_from {
            condition = condition.add(complaint_model::Column::CreatedAt.gte(from));
        }
        if let Some(to) = self.created_to {
            condition = condition.add(complaint_model::Column::CreatedAt.lte(to));
        }

        // 半径検索はバウンディングボックスで事前に絞る
        if let Some(near) = &self.near {
            let bbox = near.center.bounding_box(near.radius_km);
            condition = condition
                .add(complaint_model::Column::Latitude.between(bbox.min_lat, bbox.max_lat));
            let ranges = bbox.longitude_ranges();
            if !ranges.is_empty() {
                let longitude = ranges.into_iter().fold(Condition::any(), |any, (lo, hi)| {
                    any.add(complaint_model::Column::Longitude.between(lo, hi))
                });
                condition = condition.add(longitude);
            }
        }

        condition
    }
}

/// 苦情作成の入力
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
    pub is_emergency: bool,
    pub location: GeoPoint,
    pub address: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub submitted_by: Uuid,
    pub department_id: Uuid,
}

/// 更新ログ追加の入力
#[derive(Debug, Clone)]
pub struct NewComplaintUpdate {
    pub complaint_id: Uuid,
    pub message: String,
    pub created_by: Uuid,
    pub update_type: UpdateType,
    pub is_internal: bool,
    pub attachments: Vec<String>,
}

/// 添付メタデータ追加の入力
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub complaint_id: Uuid,
    pub filename: String,
    pub url: String,
    pub attachment_type: AttachmentType,
    pub size: i64,
}

// --- 集計結果 ---

#[derive(Debug, Clone, FromQueryResult)]
pub struct CategoryCountRow {
    pub category: String,
    pub count: i64,
    pub resolved: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct StatusCountRow {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct CreatedStatusRow {
    pub created_at: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, FromQueryResult)]
struct AverageRow {
    average: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ComplaintRepository {
    db: DbConn,
}

impl ComplaintRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<complaint_model::Model>, DbErr> {
        ComplaintEntity::find_by_id(id).one(&self.db).await
    }

    /// 条件に合う苦情をページ単位で取得し、総件数とともに返す
    pub async fn search(
        &self,
        filter: &ComplaintFilter,
        sort: &[SortKey<ComplaintSortField>],
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<complaint_model::Model>, u64), DbErr> {
        let mut query = ComplaintEntity::find().filter(filter.condition());

        let sort = if sort.is_empty() {
            ComplaintSortField::default_sort()
        } else {
            sort.to_vec()
        };
        for key in &sort {
            let order = match key.order {
                SortOrder::Asc => Order::Asc,
                SortOrder::Desc => Order::Desc,
            };
            query = query.order_by(key.field.column(), order);
        }
        // 同値の並びを安定させる
        query = query.order_by_asc(complaint_model::Column::Id);

        match &filter.near {
            None => {
                let total = query.clone().count(&self.db).await?;
                let items = query.offset(offset).limit(limit).all(&self.db).await?;
                Ok((items, total))
            }
            Some(near) => {
                // 球面距離で厳密に絞り込んでからページングする
                let candidates = query.all(&self.db).await?;
                let matched: Vec<_> = candidates
                    .into_iter()
                    .filter(|c| near.center.distance_km(&c.location()) <= near.radius_km)
                    .collect();
                let total = matched.len() as u64;
                let items = matched
                    .into_iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .collect();
                Ok((items, total))
            }
        }
    }

    pub async fn create(&self, input: NewComplaint) -> Result<complaint_model::Model, DbErr> {
        let active = ComplaintActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            category: Set(input.category.to_string()),
            priority: Set(input.priority.to_string()),
            is_emergency: Set(input.is_emergency),
            latitude: Set(input.location.lat),
            longitude: Set(input.location.lng),
            address: Set(input.address),
            city: Set(input.city),
            region: Set(input.region),
            submitted_by: Set(input.submitted_by),
            department_id: Set(input.department_id),
            ..ComplaintActiveModel::new()
        };
        active.insert(&self.db).await
    }

    pub async fn save(
        &self,
        active: ComplaintActiveModel,
    ) -> Result<complaint_model::Model, DbErr> {
        active.update(&self.db).await
    }

    /// 閲覧数を1件加算（DB側で加算し、同時閲覧でも取りこぼさない）
    pub async fn increment_view_count(&self, id: Uuid) -> Result<(), DbErr> {
        ComplaintEntity::update_many()
            .col_expr(
                complaint_model::Column::ViewCount,
                Expr::col(complaint_model::Column::ViewCount).add(1),
            )
            .filter(complaint_model::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// 担当者を設定し、状態を確認中にする（後勝ち）
    pub async fn assign(
        &self,
        id: Uuid,
        provider_id: Uuid,
    ) -> Result<Option<complaint_model::Model>, DbErr> {
        let result = ComplaintEntity::update_many()
            .col_expr(complaint_model::Column::AssignedTo, Expr::value(provider_id))
            .col_expr(
                complaint_model::Column::Status,
                Expr::value(ComplaintStatus::UnderReview.as_str()),
            )
            .col_expr(complaint_model::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(complaint_model::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// 苦情と子レコードを削除
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let txn = self.db.begin().await?;

        UpdateEntity::delete_many()
            .filter(complaint_update_model::Column::ComplaintId.eq(id))
            .exec(&txn)
            .await?;
        AttachmentEntity::delete_many()
            .filter(complaint_attachment_model::Column::ComplaintId.eq(id))
            .exec(&txn)
            .await?;
        let result = ComplaintEntity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    // --- 更新ログ・添付 ---

    pub async fn add_update(
        &self,
        input: NewComplaintUpdate,
    ) -> Result<complaint_update_model::Model, DbErr> {
        let active = UpdateActiveModel {
            complaint_id: Set(input.complaint_id),
            message: Set(input.message),
            created_by: Set(input.created_by),
            update_type: Set(input.update_type.to_string()),
            is_internal: Set(input.is_internal),
            attachments: Set(serde_json::json!(input.attachments)),
            ..UpdateActiveModel::new()
        };
        active.insert(&self.db).await
    }

    /// 更新ログ（古い順）
    pub async fn list_updates(
        &self,
        complaint_id: Uuid,
    ) -> Result<Vec<complaint_update_model::Model>, DbErr> {
        UpdateEntity::find()
            .filter(complaint_update_model::Column::ComplaintId.eq(complaint_id))
            .order_by_asc(complaint_update_model::Column::CreatedAt)
            .order_by_asc(complaint_update_model::Column::Id)
            .all(&self.db)
            .await
    }

    pub async fn add_attachment(
        &self,
        input: NewAttachment,
    ) -> Result<complaint_attachment_model::Model, DbErr> {
        let active = AttachmentActiveModel {
            complaint_id: Set(input.complaint_id),
            filename: Set(input.filename),
            url: Set(input.url),
            attachment_type: Set(input.attachment_type.to_string()),
            size: Set(input.size),
            ..AttachmentActiveModel::new()
        };
        active.insert(&self.db).await
    }

    pub async fn list_attachments(
        &self,
        complaint_id: Uuid,
    ) -> Result<Vec<complaint_attachment_model::Model>, DbErr> {
        AttachmentEntity::find()
            .filter(complaint_attachment_model::Column::ComplaintId.eq(complaint_id))
            .order_by_asc(complaint_attachment_model::Column::UploadedAt)
            .all(&self.db)
            .await
    }

    // --- 集計 ---

    pub async fn count(&self, filter: &ComplaintFilter) -> Result<u64, DbErr> {
        ComplaintEntity::find()
            .filter(filter.condition())
            .count(&self.db)
            .await
    }

    /// カテゴリ別件数と解決済み件数
    pub async fn count_by_category(&self) -> Result<Vec<CategoryCountRow>, DbErr> {
        ComplaintEntity::find()
            .select_only()
            .column(complaint_model::Column::Category)
            .column_as(Expr::col(complaint_model::Column::Id).count(), "count")
            .column_as(
                Expr::cust("SUM(CASE WHEN status = 'resolved' THEN 1 ELSE 0 END)"),
                "resolved",
            )
            .group_by(complaint_model::Column::Category)
            .order_by_asc(complaint_model::Column::Category)
            .into_model::<CategoryCountRow>()
            .all(&self.db)
            .await
    }

    /// 状態別件数
    pub async fn count_by_status(
        &self,
        filter: &ComplaintFilter,
    ) -> Result<Vec<StatusCountRow>, DbErr> {
        ComplaintEntity::find()
            .filter(filter.condition())
            .select_only()
            .column(complaint_model::Column::Status)
            .column_as(Expr::col(complaint_model::Column::Id).count(), "count")
            .group_by(complaint_model::Column::Status)
            .order_by_asc(complaint_model::Column::Status)
            .into_model::<StatusCountRow>()
            .all(&self.db)
            .await
    }

    /// 月次集計用の作成日時と状態
    pub async fn created_and_status(&self) -> Result<Vec<CreatedStatusRow>, DbErr> {
        ComplaintEntity::find()
            .select_only()
            .column(complaint_model::Column::CreatedAt)
            .column(complaint_model::Column::Status)
            .into_model::<CreatedStatusRow>()
            .all(&self.db)
            .await
    }

    /// 評価の平均（評価がなければNone）
    pub async fn average_rating(&self, filter: &ComplaintFilter) -> Result<Option<f64>, DbErr> {
        let row = ComplaintEntity::find()
            .filter(filter.condition())
            .filter(complaint_model::Column::Rating.is_not_null())
            .select_only()
            .column_as(
                Expr::cust("CAST(AVG(rating) AS DOUBLE PRECISION)"),
                "average",
            )
            .into_model::<AverageRow>()
            .one(&self.db)
            .await?;

        Ok(row.and_then(|r| r.average))
    }
}
