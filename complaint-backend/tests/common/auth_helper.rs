// tests/common/auth_helper.rs

use complaint_backend::{
    api::AppState,
    domain::{user_model, user_role::UserRole},
    repository::user_repository::{NewUser, UserRepository},
};
use uuid::Uuid;

/// テスト用のユーザー情報
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub access_token: String,
    pub model: user_model::Model,
}

/// ユーザーディレクトリに直接登録し、アクセストークンを発行する
pub async fn create_user(state: &AppState, role: UserRole) -> TestUser {
    let suffix = &Uuid::new_v4().to_string()[..8];
    let repo = UserRepository::new(state.db.clone());
    let model = repo
        .create(NewUser {
            name: format!("{} {}", role.as_str(), suffix),
            email: format!("{}-{}@example.com", role.as_str(), suffix),
            phone: None,
            role,
            department_id: None,
        })
        .await
        .unwrap();

    let access_token = state
        .jwt_manager
        .generate_access_token(model.id, role)
        .unwrap();

    TestUser {
        id: model.id,
        email: model.email.clone(),
        role,
        access_token,
        model,
    }
}

pub async fn create_admin(state: &AppState) -> TestUser {
    create_user(state, UserRole::Admin).await
}

pub async fn create_provider(state: &AppState) -> TestUser {
    create_user(state, UserRole::Provider).await
}

pub async fn create_citizen(state: &AppState) -> TestUser {
    create_user(state, UserRole::Citizen).await
}
