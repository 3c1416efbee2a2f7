// src/api/handlers/user_handler.rs

use crate::api::dto::user_dto::CreateUserRequest;
use crate::api::AppState;
use crate::error::AppResult;
use crate::extractors::{ValidatedJson, ValidatedUuid};
use crate::middleware::auth::AuthenticatedUser;
use crate::types::ApiResponse;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};

/// ユーザー作成（管理者）
pub async fn create_user_handler(
    State(app_state): State<AppState>,
    admin: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let user = app_state.user_service.create_user(&admin, payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success(user).with_message("User created successfully"),
    ))
}

pub async fn get_user_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<impl IntoResponse> {
    let found = app_state.user_service.get_user(&user, id).await?;
    Ok(ApiResponse::success(found))
}

pub async fn deactivate_user_handler(
    State(app_state): State<AppState>,
    admin: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<impl IntoResponse> {
    let user = app_state.user_service.deactivate_user(&admin, id).await?;
    Ok(ApiResponse::success(user).with_message("User deactivated successfully"))
}

pub fn user_router(app_state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_user_handler))
        .route("/users/{id}", get(get_user_handler))
        .route("/users/{id}/deactivate", patch(deactivate_user_handler))
        .with_state(app_state)
}
