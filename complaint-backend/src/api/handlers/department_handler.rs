// src/api/handlers/department_handler.rs

use crate::api::dto::department_dto::{
    AddStaffRequest, CreateDepartmentRequest, DepartmentListQuery, DepartmentLocationQuery,
    UpdateDepartmentRequest,
};
use crate::api::AppState;
use crate::domain::complaint_category::ComplaintCategory;
use crate::error::AppResult;
use crate::extractors::{ValidatedJson, ValidatedMultiPath, ValidatedQuery, ValidatedUuid};
use crate::middleware::auth::AuthenticatedUser;
use crate::types::{ApiResponse, PaginationQuery};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use tracing::info;
use uuid::Uuid;

// --- 公開エンドポイント ---

pub async fn list_departments_handler(
    State(app_state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DepartmentListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = app_state.department_service.list_departments(&query).await?;
    Ok(ApiResponse::paginated(page))
}

/// 地点をサービスエリアに含む部署
pub async fn departments_by_location_handler(
    State(app_state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DepartmentLocationQuery>,
) -> AppResult<impl IntoResponse> {
    let point = query.point()?;
    let departments = app_state.department_service.departments_at(&point).await?;
    Ok(ApiResponse::list(departments))
}

pub async fn get_department_handler(
    State(app_state): State<AppState>,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<impl IntoResponse> {
    let department = app_state.department_service.get_department(id).await?;
    Ok(ApiResponse::success(department))
}

pub async fn department_sla_handler(
    State(app_state): State<AppState>,
    ValidatedMultiPath((id, category)): ValidatedMultiPath<(Uuid, ComplaintCategory)>,
) -> AppResult<impl IntoResponse> {
    let sla = app_state.department_service.sla_for(id, category).await?;
    Ok(ApiResponse::success(sla))
}

// --- 管理者 ---

pub async fn create_department_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CreateDepartmentRequest>,
) -> AppResult<impl IntoResponse> {
    let department = app_state
        .department_service
        .create_department(&user, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success(department).with_message("Department created successfully"),
    ))
}

pub async fn update_department_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
    ValidatedJson(payload): ValidatedJson<UpdateDepartmentRequest>,
) -> AppResult<impl IntoResponse> {
    let department = app_state
        .department_service
        .update_department(&user, id, payload)
        .await?;
    Ok(ApiResponse::success(department).with_message("Department updated successfully"))
}

pub async fn delete_department_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<impl IntoResponse> {
    app_state
        .department_service
        .deactivate_department(&user, id)
        .await?;
    Ok(ApiResponse::message("Department deactivated successfully"))
}

pub async fn add_staff_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
    ValidatedJson(payload): ValidatedJson<AddStaffRequest>,
) -> AppResult<impl IntoResponse> {
    let department = app_state
        .department_service
        .add_staff(&user, id, payload)
        .await?;
    Ok(ApiResponse::success(department).with_message("Staff member added successfully"))
}

pub async fn remove_staff_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedMultiPath((id, user_id)): ValidatedMultiPath<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let department = app_state
        .department_service
        .remove_staff(&user, id, user_id)
        .await?;

    info!(department_id = %id, %user_id, removed_by = %user.user_id(), "Staff removal completed");
    Ok(ApiResponse::success(department).with_message("Staff member removed successfully"))
}

// --- 管理者・プロバイダー ---

pub async fn department_stats_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<impl IntoResponse> {
    let stats = app_state
        .department_service
        .department_stats(&user, id)
        .await?;
    Ok(ApiResponse::success(stats))
}

pub async fn department_complaints_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
    ValidatedQuery(pagination): ValidatedQuery<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let page = app_state
        .department_service
        .department_complaints(&user, id, &pagination)
        .await?;
    Ok(ApiResponse::paginated(page))
}

pub fn department_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/departments",
            get(list_departments_handler).post(create_department_handler),
        )
        .route("/departments/location", get(departments_by_location_handler))
        .route(
            "/departments/{id}",
            get(get_department_handler)
                .put(update_department_handler)
                .delete(delete_department_handler),
        )
        .route(
            "/departments/{id}/sla/{category}",
            get(department_sla_handler),
        )
        .route("/departments/{id}/staff", post(add_staff_handler))
        .route(
            "/departments/{id}/staff/{user_id}",
            delete(remove_staff_handler),
        )
        .route("/departments/{id}/stats", get(department_stats_handler))
        .route(
            "/departments/{id}/complaints",
            get(department_complaints_handler),
        )
        .with_state(app_state)
}
