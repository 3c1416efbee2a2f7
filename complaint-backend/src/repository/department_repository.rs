// src/repository/department_repository.rs

use crate::domain::complaint_category::ComplaintCategory;
use crate::domain::department_model::{
    self, ActiveModel as DepartmentActiveModel, ContactInfo, Entity as DepartmentEntity,
    ServiceArea, SlaTarget, WorkingHours,
};
use crate::domain::department_staff_model::{
    self, ActiveModel as StaffActiveModel, Entity as StaffEntity,
};
use crate::domain::geo::GeoPoint;
use sea_orm::prelude::Json;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DbConn, DbErr, PaginatorTrait, Set};
use serde::Serialize;
use uuid::Uuid;

/// 部署作成の入力
#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub name: String,
    pub description: String,
    pub categories: Vec<ComplaintCategory>,
    pub contact_info: ContactInfo,
    pub working_hours: WorkingHours,
    pub sla: Vec<SlaTarget>,
    pub service_areas: Vec<ServiceArea>,
    pub tags: Vec<String>,
    pub head_user_id: Option<Uuid>,
    pub budget_annual: Option<f64>,
    pub budget_allocated: f64,
    pub budget_spent: f64,
}

/// 部署の部分更新
#[derive(Debug, Clone, Default)]
pub struct DepartmentChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<ComplaintCategory>>,
    pub contact_info: Option<ContactInfo>,
    pub working_hours: Option<WorkingHours>,
    pub sla: Option<Vec<SlaTarget>>,
    pub service_areas: Option<Vec<ServiceArea>>,
    pub tags: Option<Vec<String>>,
    pub head_user_id: Option<Option<Uuid>>,
    pub budget_annual: Option<f64>,
    pub budget_allocated: Option<f64>,
    pub budget_spent: Option<f64>,
    pub is_active: Option<bool>,
}

fn to_json<T: Serialize>(value: &T) -> Result<Json, DbErr> {
    serde_json::to_value(value).map_err(|e| DbErr::Custom(format!("JSON encode error: {}", e)))
}

#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    db: DbConn,
}

impl DepartmentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<department_model::Model>, DbErr> {
        DepartmentEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<department_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        DepartmentEntity::find()
            .filter(department_model::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<department_model::Model>, DbErr> {
        DepartmentEntity::find()
            .filter(department_model::Column::Name.eq(name))
            .one(&self.db)
            .await
    }

    /// 登録順（作成日時、ID）で部署を取得
    pub async fn find_in_insertion_order(
        &self,
        is_active: Option<bool>,
    ) -> Result<Vec<department_model::Model>, DbErr> {
        let mut query = DepartmentEntity::find();
        if let Some(is_active) = is_active {
            query = query.filter(department_model::Column::IsActive.eq(is_active));
        }
        query
            .order_by_asc(department_model::Column::CreatedAt)
            .order_by_asc(department_model::Column::Id)
            .all(&self.db)
            .await
    }

    /// サービスエリアに点を含む有効な部署
    pub async fn find_active_covering(
        &self,
        point: &GeoPoint,
    ) -> Result<Vec<department_model::Model>, DbErr> {
        let departments = self.find_in_insertion_order(Some(true)).await?;
        Ok(departments
            .into_iter()
            .filter(|department| department.covers_location(point))
            .collect())
    }

    pub async fn create(&self, input: NewDepartment) -> Result<department_model::Model, DbErr> {
        let active = DepartmentActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            categories: Set(to_json(&input.categories)?),
            contact_info: Set(to_json(&input.contact_info)?),
            working_hours: Set(to_json(&input.working_hours)?),
            sla: Set(to_json(&input.sla)?),
            service_areas: Set(to_json(&input.service_areas)?),
            tags: Set(to_json(&input.tags)?),
            head_user_id: Set(input.head_user_id),
            budget_annual: Set(input.budget_annual),
            budget_allocated: Set(input.budget_allocated),
            budget_spent: Set(input.budget_spent),
            ..DepartmentActiveModel::new()
        };
        active.insert(&self.db).await
    }

    pub async fn update(
        &self,
        current: department_model::Model,
        changes: DepartmentChanges,
    ) -> Result<department_model::Model, DbErr> {
        let mut active: DepartmentActiveModel = current.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(categories) = changes.categories {
            active.categories = Set(to_json(&categories)?);
        }
        if let Some(contact_info) = changes.contact_info {
            active.contact_info = Set(to_json(&contact_info)?);
        }
        if let Some(working_hours) = changes.working_hours {
            active.working_hours = Set(to_json(&working_hours)?);
        }
        if let Some(sla) = changes.sla {
            active.sla = Set(to_json(&sla)?);
        }
        if let Some(service_areas) = changes.service_areas {
            active.service_areas = Set(to_json(&service_areas)?);
        }
        if let Some(tags) = changes.tags {
            active.tags = Set(to_json(&tags)?);
        }
        if let Some(head_user_id) = changes.head_user_id {
            active.head_user_id = Set(head_user_id);
        }
        if let Some(budget_annual) = changes.budget_annual {
            active.budget_annual = Set(Some(budget_annual));
        }
        if let Some(budget_allocated) = changes.budget_allocated {
            active.budget_allocated = Set(budget_allocated);
        }
        if let Some(budget_spent) = changes.budget_spent {
            active.budget_spent = Set(budget_spent);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }

        active.update(&self.db).await
    }

    // --- 実績カウンタ ---

    pub async fn increment_total_handled(&self, id: Uuid) -> Result<(), DbErr> {
        DepartmentEntity::update_many()
            .col_expr(
                department_model::Column::TotalComplaintsHandled,
                Expr::col(department_model::Column::TotalComplaintsHandled).add(1),
            )
            .filter(department_model::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn increment_resolved(&self, id: Uuid) -> Result<(), DbErr> {
        DepartmentEntity::update_many()
            .col_expr(
                department_model::Column::ResolvedComplaints,
                Expr::col(department_model::Column::ResolvedComplaints).add(1),
            )
            .filter(department_model::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// 解決済みから戻された苦情の分を差し引く（0未満にはしない）
    pub async fn decrement_resolved(&self, id: Uuid) -> Result<(), DbErr> {
        DepartmentEntity::update_many()
            .col_expr(
                department_model::Column::ResolvedComplaints,
                Expr::col(department_model::Column::ResolvedComplaints).sub(1),
            )
            .filter(department_model::Column::Id.eq(id))
            .filter(department_model::Column::ResolvedComplaints.gt(0))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn set_satisfaction_rating(&self, id: Uuid, rating: f64) -> Result<(), DbErr> {
        DepartmentEntity::update_many()
            .col_expr(
                department_model::Column::SatisfactionRating,
                Expr::value(rating),
            )
            .filter(department_model::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    // --- スタッフ ---

    pub async fn find_staff_member(
        &self,
        department_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<department_staff_model::Model>, DbErr> {
        StaffEntity::find()
            .filter(department_staff_model::Column::DepartmentId.eq(department_id))
            .filter(department_staff_model::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    pub async fn list_staff(
        &self,
        department_id: Uuid,
    ) -> Result<Vec<department_staff_model::Model>, DbErr> {
        StaffEntity::find()
            .filter(department_staff_model::Column::DepartmentId.eq(department_id))
            .order_by_asc(department_staff_model::Column::JoinedAt)
            .all(&self.db)
            .await
    }

    pub async fn count_active_staff(&self, department_id: Uuid) -> Result<u64, DbErr> {
        StaffEntity::find()
            .filter(department_staff_model::Column::DepartmentId.eq(department_id))
            .filter(department_staff_model::Column::IsActive.eq(true))
            .count(&self.db)
            .await
    }

    pub async fn add_staff_member(
        &self,
        department_id: Uuid,
        user_id: Uuid,
        position: String,
    ) -> Result<department_staff_model::Model, DbErr> {
        let active = StaffActiveModel {
            department_id: Set(department_id),
            user_id: Set(user_id),
            position: Set(position),
            ..StaffActiveModel::new()
        };
        active.insert(&self.db).await
    }

    /// 既存メンバーの役職と有効フラグを更新
    pub async fn update_staff_member(
        &self,
        member: department_staff_model::Model,
        position: Option<String>,
        is_active: bool,
    ) -> Result<department_staff_model::Model, DbErr> {
        let mut active: StaffActiveModel = member.into();
        if let Some(position) = position {
            active.position = Set(position);
        }
        active.is_active = Set(is_active);
        active.update(&self.db).await
    }
}
