// src/service/user_service.rs

use crate::api::dto::user_dto::{CreateUserRequest, UserResponse};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::repository::department_repository::DepartmentRepository;
use crate::repository::user_repository::UserRepository;
use crate::utils::permission::{Action, Subject};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct UserService {
    repo: Arc<UserRepository>,
    department_repo: Arc<DepartmentRepository>,
}

impl UserService {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            repo: Arc::new(UserRepository::new(db_pool.clone())),
            department_repo: Arc::new(DepartmentRepository::new(db_pool)),
        }
    }

    pub async fn create_user(
        &self,
        admin: &AuthenticatedUser,
        request: CreateUserRequest,
    ) -> AppResult<UserResponse> {
        admin.ensure(Action::ManageUsers, &Subject::none())?;

        if self.repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict(
                "A user with this email already exists".to_string(),
            ));
        }
        if let Some(department_id) = request.department_id {
            if self.department_repo.find_by_id(department_id).await?.is_none() {
                return Err(AppError::ValidationError(format!(
                    "Department {} does not exist",
                    department_id
                )));
            }
        }

        let user = self.repo.create(request.into()).await?;
        info!(
            user_id = %user.id,
            role = %user.role,
            created_by = %admin.user_id(),
            "User created"
        );
        Ok(user.into())
    }

    /// 本人または管理者のみ参照できる
    pub async fn get_user(&self, requester: &AuthenticatedUser, id: Uuid) -> AppResult<UserResponse> {
        requester.ensure(Action::ViewUser, &Subject::owned_by(id))?;

        self.repo
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// 論理削除。無効化されたユーザーは認証できなくなる。
    pub async fn deactivate_user(
        &self,
        admin: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<UserResponse> {
        admin.ensure(Action::ManageUsers, &Subject::none())?;

        if admin.user_id() == id {
            return Err(AppError::BadRequest(
                "Administrators cannot deactivate their own account".to_string(),
            ));
        }

        let user = self
            .repo
            .set_active(id, false)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        info!(user_id = %id, deactivated_by = %admin.user_id(), "User deactivated");
        Ok(user.into())
    }
}
