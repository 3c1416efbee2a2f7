// src/service/department_service.rs

use crate::api::dto::complaint_dto::ComplaintListItem;
use crate::api::dto::department_dto::{
    AddStaffRequest, CreateDepartmentRequest, DepartmentComplaintStats, DepartmentListQuery,
    DepartmentResponse, DepartmentStatsResponse, DepartmentSummary, PerformanceResponse,
    SlaResponse, UpdateDepartmentRequest,
};
use crate::db::DbPool;
use crate::domain::complaint_category::ComplaintCategory;
use crate::domain::department_model;
use crate::domain::geo::GeoPoint;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::repository::complaint_repository::{
    ComplaintFilter, ComplaintRepository, ComplaintSortField,
};
use crate::repository::department_repository::{DepartmentChanges, DepartmentRepository};
use crate::repository::user_repository::UserRepository;
use crate::service::complaint_service::ComplaintService;
use crate::types::{Paginated, PaginationQuery};
use crate::utils::permission::{Action, Subject};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct DepartmentService {
    repo: Arc<DepartmentRepository>,
    user_repo: Arc<UserRepository>,
    complaint_repo: Arc<ComplaintRepository>,
    complaint_service: Arc<ComplaintService>,
}

fn not_found() -> AppError {
    AppError::NotFound("Department not found".to_string())
}

impl DepartmentService {
    pub fn new(db_pool: DbPool, complaint_service: Arc<ComplaintService>) -> Self {
        Self {
            repo: Arc::new(DepartmentRepository::new(db_pool.clone())),
            user_repo: Arc::new(UserRepository::new(db_pool.clone())),
            complaint_repo: Arc::new(ComplaintRepository::new(db_pool)),
            complaint_service,
        }
    }

    async fn find_department(&self, id: Uuid) -> AppResult<department_model::Model> {
        self.repo.find_by_id(id).await?.ok_or_else(not_found)
    }

    async fn to_response(
        &self,
        department: department_model::Model,
    ) -> AppResult<DepartmentResponse> {
        let active_staff = self.repo.count_active_staff(department.id).await?;
        Ok(DepartmentResponse::new(department, active_staff))
    }

    async fn ensure_user_exists(&self, user_id: Uuid) -> AppResult<()> {
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(AppError::ValidationError(format!(
                "User {} does not exist",
                user_id
            )));
        }
        Ok(())
    }

    async fn ensure_unique_name(&self, name: &str, except: Option<Uuid>) -> AppResult<()> {
        if let Some(existing) = self.repo.find_by_name(name).await? {
            if Some(existing.id) != except {
                return Err(AppError::Conflict(format!(
                    "Department '{}' already exists",
                    name
                )));
            }
        }
        Ok(())
    }

    // --- 公開の参照系 ---

    /// 登録順の一覧（既定は有効な部署のみ）
    pub async fn list_departments(
        &self,
        query: &DepartmentListQuery,
    ) -> AppResult<Paginated<DepartmentResponse>> {
        let departments = self
            .repo
            .find_in_insertion_order(Some(query.is_active.unwrap_or(true)))
            .await?;
        let matched: Vec<_> = departments
            .into_iter()
            .filter(|department| match query.category {
                Some(category) => department.handles_category(category),
                None => true,
            })
            .collect();

        let pagination = query.pagination();
        let (page, limit) = pagination.get_pagination();
        let total = matched.len() as u64;

        let mut items = Vec::new();
        for department in matched
            .into_iter()
            .skip(pagination.get_offset() as usize)
            .take(limit as usize)
        {
            items.push(self.to_response(department).await?);
        }
        Ok(Paginated::new(items, total, page, limit))
    }

    pub async fn get_department(&self, id: Uuid) -> AppResult<DepartmentResponse> {
        let department = self.find_department(id).await?;
        let staff = self.repo.list_staff(id).await?;
        Ok(self.to_response(department).await?.with_staff(staff))
    }

    /// サービスエリアに点を含む有効な部署
    pub async fn departments_at(&self, point: &GeoPoint) -> AppResult<Vec<DepartmentResponse>> {
        let departments = self.repo.find_active_covering(point).await?;
        let mut responses = Vec::with_capacity(departments.len());
        for department in departments {
            responses.push(self.to_response(department).await?);
        }
        Ok(responses)
    }

    pub async fn sla_for(&self, id: Uuid, category: ComplaintCategory) -> AppResult<SlaResponse> {
        let department = self.find_department(id).await?;
        let target = department.get_sla(category).ok_or_else(|| {
            AppError::NotFound(format!(
                "No SLA defined for category '{}' in this department",
                category
            ))
        })?;
        Ok(SlaResponse {
            department: department.id,
            target,
        })
    }

    // --- 管理者操作 ---

    pub async fn create_department(
        &self,
        user: &AuthenticatedUser,
        request: CreateDepartmentRequest,
    ) -> AppResult<DepartmentResponse> {
        user.ensure(Action::ManageDepartments, &Subject::none())?;
        self.ensure_unique_name(request.name.trim(), None).await?;
        if let Some(head) = request.head_user_id {
            self.ensure_user_exists(head).await?;
        }

        let created = self.repo.create(request.into()).await?;
        info!(
            department_id = %created.id,
            name = %created.name,
            created_by = %user.user_id(),
            "Department created"
        );
        self.to_response(created).await
    }

    pub async fn update_department(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateDepartmentRequest,
    ) -> AppResult<DepartmentResponse> {
        user.ensure(Action::ManageDepartments, &Subject::none())?;
        let current = self.find_department(id).await?;

        let changes = DepartmentChanges::from(request);
        if let Some(name) = &changes.name {
            self.ensure_unique_name(name, Some(id)).await?;
        }
        if let Some(Some(head)) = changes.head_user_id {
            self.ensure_user_exists(head).await?;
        }

        let updated = self.repo.update(current, changes).await?;
        info!(department_id = %id, updated_by = %user.user_id(), "Department updated");
        self.to_response(updated).await
    }

    /// 論理削除（無効化）
    pub async fn deactivate_department(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<()> {
        user.ensure(Action::ManageDepartments, &Subject::none())?;
        let current = self.find_department(id).await?;

        self.repo
            .update(
                current,
                DepartmentChanges {
                    is_active: Some(false),
                    ..DepartmentChanges::default()
                },
            )
            .await?;
        info!(department_id = %id, deactivated_by = %user.user_id(), "Department deactivated");
        Ok(())
    }

    /// スタッフを追加。無効化済みのメンバーは再有効化する。
    pub async fn add_staff(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: AddStaffRequest,
    ) -> AppResult<DepartmentResponse> {
        user.ensure(Action::ManageDepartments, &Subject::none())?;
        let department = self.find_department(id).await?;
        let member = self
            .user_repo
            .find_by_id(request.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let position = request.position.trim().to_string();
        match self.repo.find_staff_member(id, member.id).await? {
            Some(existing) if existing.is_active => {
                return Err(AppError::Conflict(
                    "User is already a member of this department".to_string(),
                ));
            }
            Some(existing) => {
                self.repo
                    .update_staff_member(existing, Some(position), true)
                    .await?;
            }
            None => {
                self.repo.add_staff_member(id, member.id, position).await?;
            }
        }
        self.user_repo.set_department(member.id, Some(id)).await?;

        info!(department_id = %id, user_id = %member.id, "Staff member added");
        let staff = self.repo.list_staff(id).await?;
        Ok(self.to_response(department).await?.with_staff(staff))
    }

    pub async fn remove_staff(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        user_id: Uuid,
    ) -> AppResult<DepartmentResponse> {
        user.ensure(Action::ManageDepartments, &Subject::none())?;
        let department = self.find_department(id).await?;

        let existing = self
            .repo
            .find_staff_member(id, user_id)
            .await?
            .filter(|member| member.is_active)
            .ok_or_else(|| {
                AppError::NotFound("User is not a member of this department".to_string())
            })?;
        self.repo.update_staff_member(existing, None, false).await?;

        if let Some(member) = self.user_repo.find_by_id(user_id).await? {
            if member.department_id == Some(id) {
                self.user_repo.set_department(user_id, None).await?;
            }
        }

        info!(department_id = %id, %user_id, "Staff member removed");
        let staff = self.repo.list_staff(id).await?;
        Ok(self.to_response(department).await?.with_staff(staff))
    }

    // --- 管理者・プロバイダー向け ---

    pub async fn department_stats(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<DepartmentStatsResponse> {
        user.ensure(Action::ViewDepartmentStats, &Subject::none())?;
        let department = self.find_department(id).await?;

        let filter = ComplaintFilter {
            department_id: Some(id),
            ..ComplaintFilter::default()
        };
        let by_status: BTreeMap<String, i64> = self
            .complaint_repo
            .count_by_status(&filter)
            .await?
            .into_iter()
            .map(|row| (row.status, row.count))
            .collect();
        let total = self.complaint_repo.count(&filter).await?;
        let average_rating = self.complaint_repo.average_rating(&filter).await?;
        let active_staff_count = self.repo.count_active_staff(id).await?;

        Ok(DepartmentStatsResponse {
            department: DepartmentSummary::from(&department),
            complaints: DepartmentComplaintStats {
                total,
                by_status,
                average_rating,
            },
            performance: PerformanceResponse::from(&department),
            active_staff_count,
        })
    }

    pub async fn department_complaints(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        pagination: &PaginationQuery,
    ) -> AppResult<Paginated<ComplaintListItem>> {
        user.ensure(Action::ViewDepartmentStats, &Subject::none())?;
        self.find_department(id).await?;

        let filter = ComplaintFilter {
            department_id: Some(id),
            ..ComplaintFilter::default()
        };
        self.complaint_service
            .search(&filter, &ComplaintSortField::default_sort(), pagination)
            .await
    }
}
