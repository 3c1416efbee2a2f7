// src/api/dto/user_dto.rs

use crate::domain::user_model;
use crate::domain::user_role::UserRole;
use crate::repository::user_repository::NewUser;
use crate::utils::validation::{validate_not_blank, validate_phone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = validate_not_blank)
    )]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = validate_phone))]
    pub phone: Option<String>,

    #[serde(default)]
    pub role: UserRole,

    pub department_id: Option<Uuid>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            email: request.email,
            phone: request.phone,
            role: request.role,
            department_id: request.department_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub department: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user_model::Model> for UserResponse {
    fn from(model: user_model::Model) -> Self {
        Self {
            id: model.id,
            role: model.role(),
            name: model.name,
            email: model.email,
            phone: model.phone,
            is_active: model.is_active,
            department: model.department_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// 苦情に埋め込む投稿者・担当者の概要
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<&user_model::Model> for UserSummary {
    fn from(model: &user_model::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            email: model.email.clone(),
            phone: model.phone.clone(),
        }
    }
}
