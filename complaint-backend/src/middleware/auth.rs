// src/middleware/auth.rs

use crate::api::AppState;
use crate::domain::user_model;
use crate::domain::user_role::UserRole;
use crate::error::AppError;
use crate::utils::permission::{Action, PermissionChecker, Subject};
use axum::extract::{FromRequestParts, Request};
use axum::http::{header, request::Parts, HeaderMap, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use uuid::Uuid;

/// アクセストークンを保持するCookie名
pub const ACCESS_TOKEN_COOKIE: &str = "token";

/// 認証済みのリクエスト元。ロールはユーザーディレクトリの値。
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: user_model::Model,
}

impl AuthenticatedUser {
    pub fn new(user: user_model::Model) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role()
    }

    pub fn ensure(&self, action: Action, subject: &Subject) -> Result<(), AppError> {
        PermissionChecker::ensure(action, self.role(), self.user_id(), subject)
    }
}

/// Authorizationヘッダー、なければCookieからトークンを取得
fn extract_token(headers: &HeaderMap, cookie_jar: &CookieJar) -> Option<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    let cookie_token = cookie_jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty());

    auth_header.or(cookie_token)
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        let path = parts.uri.path().to_string();
        let cookie_jar = CookieJar::from_headers(&parts.headers);

        let token = extract_token(&parts.headers, &cookie_jar).ok_or_else(|| {
            warn!(path = %path, "Missing authentication token");
            AppError::Unauthorized("Not authorized to access this route".to_string())
        })?;

        let claims = state.jwt_manager.verify_access_token(&token).map_err(|e| {
            warn!(path = %path, error = %e, "Invalid access token");
            AppError::Unauthorized("Not authorized to access this route".to_string())
        })?;

        let user_id = claims.user_id().map_err(|_| {
            warn!(path = %path, "Token subject is not a user id");
            AppError::Unauthorized("Not authorized to access this route".to_string())
        })?;

        let user = state
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                warn!(path = %path, %user_id, "Token refers to an unknown user");
                AppError::Unauthorized("No user found with this token".to_string())
            })?;

        if !user.can_authenticate() {
            warn!(path = %path, %user_id, "Access attempt with inactive account");
            return Err(AppError::Unauthorized(
                "User account is deactivated".to_string(),
            ));
        }

        let authenticated = AuthenticatedUser::new(user);
        parts.extensions.insert(authenticated.clone());
        Ok(authenticated)
    }
}

/// CORS ミドルウェア設定
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true) // Cookie送信を許可
        .max_age(Duration::from_secs(3600))
}

/// セキュリティヘッダーミドルウェア
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}
