// src/api/handlers/complaint_handler.rs

use crate::api::dto::complaint_dto::{
    AddAttachmentRequest, AddComplaintUpdateRequest, AssignComplaintRequest, ComplaintListQuery,
    ComplaintLocationQuery, CreateComplaintRequest, OwnComplaintsQuery, RateComplaintRequest,
    UpdateComplaintRequest,
};
use crate::api::AppState;
use crate::error::AppResult;
use crate::extractors::{ValidatedJson, ValidatedQuery, ValidatedUuid};
use crate::middleware::auth::AuthenticatedUser;
use crate::repository::complaint_repository::ComplaintSortField;
use crate::types::{ApiResponse, SortKey};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use tracing::info;

// --- 公開エンドポイント ---

/// 苦情一覧（フィルタ・ソート・ページネーション）
pub async fn list_complaints_handler(
    State(app_state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ComplaintListQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = query.to_filter()?;
    let sort = match query.sort.as_deref() {
        Some(raw) => SortKey::parse_list(raw, ComplaintSortField::from_param)?,
        None => ComplaintSortField::default_sort(),
    };

    let page = app_state
        .complaint_service
        .search(&filter, &sort, &query.pagination())
        .await?;
    Ok(ApiResponse::paginated(page))
}

/// 地点周辺の苦情（地図表示用）
pub async fn complaints_near_handler(
    State(app_state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ComplaintLocationQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = query.to_filter()?;
    let complaints = app_state.complaint_service.list_near(&filter).await?;
    Ok(ApiResponse::list(complaints))
}

// --- 認証が必要なエンドポイント ---

pub async fn create_complaint_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CreateComplaintRequest>,
) -> AppResult<impl IntoResponse> {
    let created = app_state
        .complaint_service
        .create_complaint(&user, payload)
        .await?;

    info!(
        user_id = %user.user_id(),
        complaint_id = %created.complaint.id,
        "Complaint submitted"
    );
    Ok((
        StatusCode::CREATED,
        ApiResponse::success(created).with_message("Complaint submitted successfully"),
    ))
}

pub async fn get_complaint_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<impl IntoResponse> {
    let detail = app_state.complaint_service.view_complaint(&user, id).await?;
    Ok(ApiResponse::success(detail))
}

pub async fn update_complaint_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
    ValidatedJson(payload): ValidatedJson<UpdateComplaintRequest>,
) -> AppResult<impl IntoResponse> {
    let updated = app_state
        .complaint_service
        .update_complaint(&user, id, payload)
        .await?;
    Ok(ApiResponse::success(updated).with_message("Complaint updated successfully"))
}

pub async fn delete_complaint_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<impl IntoResponse> {
    app_state
        .complaint_service
        .delete_complaint(&user, id)
        .await?;

    info!(user_id = %user.user_id(), complaint_id = %id, "Complaint deleted");
    Ok(ApiResponse::message("Complaint deleted successfully"))
}

pub async fn add_update_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
    ValidatedJson(payload): ValidatedJson<AddComplaintUpdateRequest>,
) -> AppResult<impl IntoResponse> {
    let detail = app_state
        .complaint_service
        .add_update(&user, id, payload)
        .await?;
    Ok(ApiResponse::success(detail).with_message("Update added successfully"))
}

pub async fn rate_complaint_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
    ValidatedJson(payload): ValidatedJson<RateComplaintRequest>,
) -> AppResult<impl IntoResponse> {
    let rated = app_state
        .complaint_service
        .rate_complaint(&user, id, payload)
        .await?;
    Ok(ApiResponse::success(rated).with_message("Complaint rated successfully"))
}

pub async fn assign_complaint_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
    ValidatedJson(payload): ValidatedJson<AssignComplaintRequest>,
) -> AppResult<impl IntoResponse> {
    let assigned = app_state
        .complaint_service
        .assign_complaint(&user, id, payload)
        .await?;
    Ok(ApiResponse::success(assigned).with_message("Complaint assigned successfully"))
}

pub async fn add_attachment_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
    ValidatedJson(payload): ValidatedJson<AddAttachmentRequest>,
) -> AppResult<impl IntoResponse> {
    let detail = app_state
        .complaint_service
        .add_attachment(&user, id, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success(detail).with_message("Attachment added successfully"),
    ))
}

/// 自分が提出した苦情
pub async fn my_complaints_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<OwnComplaintsQuery>,
) -> AppResult<impl IntoResponse> {
    let page = app_state
        .complaint_service
        .list_submitted_by(&user, query.to_filter(), &query.pagination())
        .await?;
    Ok(ApiResponse::paginated(page))
}

/// 自分に割り当てられた苦情（プロバイダー）
pub async fn assigned_complaints_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<OwnComplaintsQuery>,
) -> AppResult<impl IntoResponse> {
    let page = app_state
        .complaint_service
        .list_assigned_to(&user, query.to_filter(), &query.pagination())
        .await?;
    Ok(ApiResponse::paginated(page))
}

/// 全体の集計
pub async fn complaint_analytics_handler(
    State(app_state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let analytics = app_state.analytics_service.complaint_analytics().await?;
    Ok(ApiResponse::success(analytics))
}

pub fn complaint_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/complaints",
            get(list_complaints_handler).post(create_complaint_handler),
        )
        .route("/complaints/location", get(complaints_near_handler))
        .route("/complaints/analytics", get(complaint_analytics_handler))
        .route("/complaints/my", get(my_complaints_handler))
        .route("/complaints/assigned", get(assigned_complaints_handler))
        .route(
            "/complaints/{id}",
            get(get_complaint_handler)
                .put(update_complaint_handler)
                .delete(delete_complaint_handler),
        )
        .route("/complaints/{id}/updates", post(add_update_handler))
        .route("/complaints/{id}/rate", post(rate_complaint_handler))
        .route("/complaints/{id}/assign", put(assign_complaint_handler))
        .route("/complaints/{id}/attachments", post(add_attachment_handler))
        .with_state(app_state)
}
