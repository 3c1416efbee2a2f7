// src/service/complaint_service.rs

use crate::api::dto::complaint_dto::{
    AddAttachmentRequest, AddComplaintUpdateRequest, AssignComplaintRequest,
    AttachmentResponse, ComplaintDetailResponse, ComplaintListItem,
    ComplaintUpdateResponse, CreateComplaintRequest, RateComplaintRequest,
    UpdateComplaintRequest,
};
use crate::api::dto::department_dto::DepartmentSummary;
use crate::api::dto::user_dto::UserSummary;
use crate::db::DbPool;
use crate::domain::complaint_model::{self, ActiveModel as ComplaintActiveModel};
use crate::domain::complaint_priority::ComplaintPriority;
use crate::domain::complaint_status::ComplaintStatus;
use crate::domain::user_role::UserRole;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::repository::complaint_repository::{
    ComplaintFilter, ComplaintRepository, ComplaintSortField, NewAttachment, NewComplaint,
    NewComplaintUpdate,
};
use crate::repository::department_repository::DepartmentRepository;
use crate::repository::user_repository::UserRepository;
use crate::service::notification_service::NotificationHub;
use crate::service::routing_service::DepartmentRouter;
use crate::types::{Paginated, PaginationQuery, SortKey};
use crate::utils::permission::{Action, Subject};
use chrono::Utc;
use sea_orm::Set;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// 半径検索で返す最大件数
pub const LOCATION_RESULT_LIMIT: u64 = 500;

pub struct ComplaintService {
    repo: Arc<ComplaintRepository>,
    user_repo: Arc<UserRepository>,
    department_repo: Arc<DepartmentRepository>,
    router: DepartmentRouter,
    notifications: Arc<NotificationHub>,
}

fn subject_of(complaint: &complaint_model::Model) -> Subject {
    Subject::owned_by(complaint.submitted_by).with_assignee(complaint.assigned_to)
}

fn not_found() -> AppError {
    AppError::NotFound("Complaint not found".to_string())
}

impl ComplaintService {
    pub fn new(db_pool: DbPool, notifications: Arc<NotificationHub>) -> Self {
        let department_repo = Arc::new(DepartmentRepository::new(db_pool.clone()));
        Self {
            repo: Arc::new(ComplaintRepository::new(db_pool.clone())),
            user_repo: Arc::new(UserRepository::new(db_pool)),
            router: DepartmentRouter::new(department_repo.clone()),
            department_repo,
            notifications,
        }
    }

    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.repo.find_by_id(id).await?.is_some())
    }

    async fn find_complaint(&self, id: Uuid) -> AppResult<complaint_model::Model> {
        self.repo.find_by_id(id).await?.ok_or_else(not_found)
    }

    /// 投稿者・担当者・部署の概要を付けて返す
    async fn enrich(
        &self,
        complaints: Vec<complaint_model::Model>,
    ) -> AppResult<Vec<ComplaintListItem>> {
        let mut user_ids: Vec<Uuid> = complaints
            .iter()
            .flat_map(|c| std::iter::once(c.submitted_by).chain(c.assigned_to))
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut department_ids: Vec<Uuid> = complaints.iter().map(|c| c.department_id).collect();
        department_ids.sort_unstable();
        department_ids.dedup();

        let users: HashMap<Uuid, UserSummary> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .iter()
            .map(|user| (user.id, UserSummary::from(user)))
            .collect();
        let departments: HashMap<Uuid, DepartmentSummary> = self
            .department_repo
            .find_by_ids(&department_ids)
            .await?
            .iter()
            .map(|department| (department.id, DepartmentSummary::from(department)))
            .collect();

        Ok(complaints
            .into_iter()
            .map(|complaint| ComplaintListItem {
                submitter: users.get(&complaint.submitted_by).cloned(),
                assignee: complaint.assigned_to.and_then(|id| users.get(&id).cloned()),
                department_info: departments.get(&complaint.department_id).cloned(),
                complaint: complaint.into(),
            })
            .collect())
    }

    async fn enrich_one(&self, complaint: complaint_model::Model) -> AppResult<ComplaintListItem> {
        self.enrich(vec![complaint])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalServerError("Failed to load complaint".to_string()))
    }

    async fn detail(
        &self,
        complaint: complaint_model::Model,
        viewer_role: UserRole,
    ) -> AppResult<ComplaintDetailResponse> {
        let complaint_id = complaint.id;
        let summary = self.enrich_one(complaint).await?;

        // 内部向けの更新ログは市民には見せない
        let show_internal = matches!(viewer_role, UserRole::Admin | UserRole::Provider);
        let updates = self
            .repo
            .list_updates(complaint_id)
            .await?
            .into_iter()
            .filter(|update| show_internal || !update.is_internal)
            .map(ComplaintUpdateResponse::from)
            .collect();
        let attachments = self
            .repo
            .list_attachments(complaint_id)
            .await?
            .into_iter()
            .map(AttachmentResponse::from)
            .collect();

        Ok(ComplaintDetailResponse {
            summary,
            updates,
            attachments,
        })
    }

    // --- 一覧 ---

    pub async fn search(
        &self,
        filter: &ComplaintFilter,
        sort: &[SortKey<ComplaintSortField>],
        pagination: &PaginationQuery,
    ) -> AppResult<Paginated<ComplaintListItem>> {
        let (page, limit) = pagination.get_pagination();
        let (complaints, total) = self
            .repo
            .search(filter, sort, pagination.get_offset(), limit)
            .await?;
        let items = self.enrich(complaints).await?;
        Ok(Paginated::new(items, total, page, limit))
    }

    /// 半径内の苦情（新しい順）
    pub async fn list_near(&self, filter: &ComplaintFilter) -> AppResult<Vec<ComplaintListItem>> {
        let (complaints, _) = self
            .repo
            .search(
                filter,
                &ComplaintSortField::default_sort(),
                0,
                LOCATION_RESULT_LIMIT,
            )
            .await?;
        self.enrich(complaints).await
    }

    pub async fn list_submitted_by(
        &self,
        user: &AuthenticatedUser,
        mut filter: ComplaintFilter,
        pagination: &PaginationQuery,
    ) -> AppResult<Paginated<ComplaintListItem>> {
        user.ensure(Action::ListOwnComplaints, &Subject::none())?;
        filter.submitted_by = Some(user.user_id());
        self.search(&filter, &ComplaintSortField::default_sort(), pagination)
            .await
    }

    pub async fn list_assigned_to(
        &self,
        user: &AuthenticatedUser,
        mut filter: ComplaintFilter,
        pagination: &PaginationQuery,
    ) -> AppResult<Paginated<ComplaintListItem>> {
        user.ensure(Action::ListAssignedComplaints, &Subject::none())?;
        filter.assigned_to = Some(user.user_id());
        self.search(&filter, &ComplaintSortField::default_sort(), pagination)
            .await
    }

    // --- 作成・参照 ---

    pub async fn create_complaint(
        &self,
        user: &AuthenticatedUser,
        request: CreateComplaintRequest,
    ) -> AppResult<ComplaintListItem> {
        user.ensure(Action::CreateComplaint, &Subject::none())?;

        let department = self.router.route(request.category).await?;
        let location = request.location.point();

        let created = self
            .repo
            .create(NewComplaint {
                title: request.title.trim().to_string(),
                description: request.description,
                category: request.category,
                priority: ComplaintPriority::effective(request.priority, request.is_emergency),
                is_emergency: request.is_emergency,
                location,
                address: request.location.address,
                city: request.location.city,
                region: request.location.region,
                submitted_by: user.user_id(),
                department_id: department.id,
            })
            .await?;

        // カウンタ更新は別の書き込み。失敗しても作成は成功扱い。
        if let Err(e) = self.department_repo.increment_total_handled(department.id).await {
            warn!(error = %e, department_id = %department.id, "Failed to update department counter");
        }

        info!(
            complaint_id = %created.id,
            user_id = %user.user_id(),
            category = %created.category,
            is_emergency = created.is_emergency,
            "Complaint created"
        );

        let item = self.enrich_one(created).await?;
        self.notifications.complaint_created(&item.complaint).await;
        Ok(item)
    }

    /// 詳細を取得し、閲覧数を1加算する
    pub async fn view_complaint(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<ComplaintDetailResponse> {
        let complaint = self.find_complaint(id).await?;
        user.ensure(Action::ViewComplaint, &subject_of(&complaint))?;

        self.repo.increment_view_count(id).await?;
        let complaint = self.find_complaint(id).await?;
        self.detail(complaint, user.role()).await
    }

    // --- 更新 ---

    pub async fn update_complaint(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateComplaintRequest,
    ) -> AppResult<ComplaintListItem> {
        let current = self.find_complaint(id).await?;
        user.ensure(Action::UpdateComplaint, &subject_of(&current))?;

        let old_status = current.status();
        let department_id = current.department_id;
        let is_emergency = request.is_emergency.unwrap_or(current.is_emergency);
        let requested_priority = request.priority.unwrap_or_else(|| current.priority());
        let priority = ComplaintPriority::effective(Some(requested_priority), is_emergency);

        let mut active: ComplaintActiveModel = current.into();
        if let Some(title) = request.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = request.description {
            active.description = Set(description);
        }
        if let Some(category) = request.category {
            active.category = Set(category.to_string());
        }
        if let Some(location) = request.location {
            let point = location.point();
            active.latitude = Set(point.lat);
            active.longitude = Set(point.lng);
            active.address = Set(location.address);
            active.city = Set(location.city);
            active.region = Set(location.region);
        }
        active.is_emergency = Set(is_emergency);
        active.priority = Set(priority.to_string());

        let new_status = request.status.filter(|status| *status != old_status);
        if let Some(status) = new_status {
            active.status = Set(status.to_string());
            if status == ComplaintStatus::Resolved {
                active.resolved_at = Set(Some(Utc::now()));
            } else if old_status == ComplaintStatus::Resolved {
                active.resolved_at = Set(None);
            }
        }

        let updated = self.repo.save(active).await?;

        // 部署の解決件数は解決済みへの出入りで増減させる
        let counter = match new_status {
            Some(ComplaintStatus::Resolved) => {
                Some(self.department_repo.increment_resolved(department_id).await)
            }
            Some(_) if old_status == ComplaintStatus::Resolved => {
                Some(self.department_repo.decrement_resolved(department_id).await)
            }
            _ => None,
        };
        if let Some(Err(e)) = counter {
            warn!(error = %e, %department_id, "Failed to update resolved counter");
        }

        info!(
            complaint_id = %id,
            user_id = %user.user_id(),
            status_changed = new_status.is_some(),
            "Complaint updated"
        );

        let item = self.enrich_one(updated).await?;
        if new_status.is_some() {
            self.notifications
                .status_changed(&item.complaint, old_status)
                .await;
        }
        Ok(item)
    }

    pub async fn delete_complaint(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<()> {
        let complaint = self.find_complaint(id).await?;
        user.ensure(Action::DeleteComplaint, &subject_of(&complaint))?;

        if !self.repo.delete(id).await? {
            return Err(not_found());
        }
        info!(complaint_id = %id, user_id = %user.user_id(), "Complaint deleted");
        Ok(())
    }

    pub async fn add_update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: AddComplaintUpdateRequest,
    ) -> AppResult<ComplaintDetailResponse> {
        let complaint = self.find_complaint(id).await?;
        user.ensure(Action::AddComplaintUpdate, &subject_of(&complaint))?;

        let update = self
            .repo
            .add_update(NewComplaintUpdate {
                complaint_id: id,
                message: request.message.trim().to_string(),
                created_by: user.user_id(),
                update_type: request.update_type,
                is_internal: request.is_internal,
                attachments: request.attachments,
            })
            .await?;

        info!(
            complaint_id = %id,
            update_id = %update.id,
            update_type = %update.update_type,
            "Complaint update appended"
        );

        let update = ComplaintUpdateResponse::from(update);
        self.notifications.update_added(id, &update).await;

        let complaint = self.find_complaint(id).await?;
        self.detail(complaint, user.role()).await
    }

    /// 解決済みの苦情を評価し、部署の満足度を再計算する
    pub async fn rate_complaint(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: RateComplaintRequest,
    ) -> AppResult<ComplaintListItem> {
        let complaint = self.find_complaint(id).await?;
        user.ensure(Action::RateComplaint, &subject_of(&complaint))?;

        if !complaint.status().is_resolved() {
            return Err(AppError::ComplaintNotResolved);
        }

        let department_id = complaint.department_id;
        let mut active: ComplaintActiveModel = complaint.into();
        active.rating = Set(Some(request.rating));
        active.feedback = Set(request.feedback);
        let rated = self.repo.save(active).await?;

        let filter = ComplaintFilter {
            department_id: Some(department_id),
            ..ComplaintFilter::default()
        };
        match self.repo.average_rating(&filter).await {
            Ok(Some(average)) => {
                if let Err(e) = self
                    .department_repo
                    .set_satisfaction_rating(department_id, average)
                    .await
                {
                    warn!(error = %e, %department_id, "Failed to update satisfaction rating");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, %department_id, "Failed to compute average rating"),
        }

        info!(complaint_id = %id, rating = request.rating, "Complaint rated");
        self.enrich_one(rated).await
    }

    /// 担当者を設定する（後勝ち）
    pub async fn assign_complaint(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: AssignComplaintRequest,
    ) -> AppResult<ComplaintListItem> {
        let complaint = self.find_complaint(id).await?;
        user.ensure(Action::AssignComplaint, &subject_of(&complaint))?;

        let provider = self
            .user_repo
            .find_by_id(request.assigned_to)
            .await?
            .filter(|candidate| candidate.is_active && candidate.role() == UserRole::Provider)
            .ok_or_else(|| {
                AppError::InvalidAssignee("Can only assign to service providers".to_string())
            })?;

        let assigned = self
            .repo
            .assign(id, provider.id)
            .await?
            .ok_or_else(not_found)?;

        info!(
            complaint_id = %id,
            provider_id = %provider.id,
            assigned_by = %user.user_id(),
            "Complaint assigned"
        );

        let item = self.enrich_one(assigned).await?;
        self.notifications
            .complaint_assigned(&item.complaint, provider.id)
            .await;
        Ok(item)
    }

    pub async fn add_attachment(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: AddAttachmentRequest,
    ) -> AppResult<ComplaintDetailResponse> {
        let complaint = self.find_complaint(id).await?;
        user.ensure(Action::AddAttachment, &subject_of(&complaint))?;

        let attachment = self
            .repo
            .add_attachment(NewAttachment {
                complaint_id: id,
                filename: request.filename,
                url: request.url,
                attachment_type: request.attachment_type,
                size: request.size,
            })
            .await?;
        info!(complaint_id = %id, attachment_id = %attachment.id, "Attachment added");

        self.detail(complaint, user.role()).await
    }
}
