use axum::{extract::State, http::Uri, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{api::AppState, error::AppError, types::ApiResponse};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    pub api_version: String,
    pub realtime_rooms: usize,
}

pub async fn health_handler(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<HealthResponse>>, AppError> {
    let config = &app_state.config;

    Ok(Json(
        ApiResponse::success(HealthResponse {
            status: "OK".to_string(),
            timestamp: Utc::now(),
            environment: config.environment.clone(),
            api_version: config.api_version.clone(),
            realtime_rooms: app_state.notifications.room_count().await,
        })
        .with_message("Service is healthy"),
    ))
}

/// どのルートにも一致しないリクエスト
pub async fn not_found_handler(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}

pub fn system_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(app_state)
}
