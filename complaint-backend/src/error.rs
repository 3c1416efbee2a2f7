// src/error.rs

use crate::domain::complaint_category::ComplaintCategory;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("{0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    #[error("Failed to parse UUID: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("No active department handles category '{0}'")]
    NoDepartmentForCategory(ComplaintCategory),

    #[error("Invalid assignee: {0}")]
    InvalidAssignee(String),

    #[error("Complaint must be resolved before rating")]
    ComplaintNotResolved,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DbErr(DbErr::RecordNotFound(_)) | AppError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::ValidationError(_)
            | AppError::ValidationFailure(_)
            | AppError::UuidError(_)
            | AppError::BadRequest(_)
            | AppError::NoDepartmentForCategory(_)
            | AppError::InvalidAssignee(_)
            | AppError::ComplaintNotResolved => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::DbErr(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// クライアントに返すエラー種別
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::DbErr(DbErr::RecordNotFound(_)) | AppError::NotFound(_) => "not_found",
            AppError::DbErr(_) => "database_error",
            AppError::ValidationError(_) => "validation_error",
            AppError::ValidationFailure(_) => "validation_errors",
            AppError::UuidError(_) => "invalid_uuid",
            AppError::BadRequest(_) => "bad_request",
            AppError::NoDepartmentForCategory(_) => "no_department_for_category",
            AppError::InvalidAssignee(_) => "invalid_assignee",
            AppError::ComplaintNotResolved => "complaint_not_resolved",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::TooManyRequests => "too_many_requests",
            AppError::InternalServerError(_) => "internal_server_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::DbErr(DbErr::RecordNotFound(_)) => {
                "The requested resource was not found".to_string()
            }
            // 内部の詳細はログにだけ出す
            AppError::DbErr(_) | AppError::InternalServerError(_) => {
                "An internal server error occurred".to_string()
            }
            AppError::ValidationFailure(_) => "Validation failed".to_string(),
            AppError::NotFound(message)
            | AppError::ValidationError(message)
            | AppError::BadRequest(message)
            | AppError::InvalidAssignee(message)
            | AppError::Unauthorized(message)
            | AppError::Forbidden(message)
            | AppError::Conflict(message) => message.clone(),
            AppError::TooManyRequests => {
                "Too many requests from this IP, please try again later".to_string()
            }
            other => other.to_string(),
        }
    }
}

fn field_errors(errors: &ValidationErrors) -> HashMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| format!("Invalid {}", field), |m| m.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

// axum でエラーをHTTPレスポンスに変換するための実装
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::DbErr(err) => tracing::error!(error = ?err, "Database error"),
            AppError::InternalServerError(message) => {
                tracing::error!(error = %message, "Internal server error")
            }
            _ => tracing::debug!(status = %status, error = %self, "Request failed"),
        }

        let validation_errors = match &self {
            AppError::ValidationFailure(errors) => Some(field_errors(errors)),
            _ => None,
        };

        let body = ErrorResponse {
            success: false,
            error: self.client_message(),
            error_type: self.error_type().to_string(),
            validation_errors,
        };

        (status, Json(body)).into_response()
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, Vec<String>>>,
}
