// src/api/mod.rs
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::logging::{inject_request_context, logging_middleware};
use crate::middleware::auth::{cors_layer, security_headers_middleware};
use crate::middleware::rate_limit::{rate_limit_middleware, RateLimitConfig, RateLimitStorage};
use crate::repository::user_repository::UserRepository;
use crate::service::{
    analytics_service::AnalyticsService, complaint_service::ComplaintService,
    department_service::DepartmentService, notification_service::NotificationHub,
    user_service::UserService,
};
use crate::utils::jwt::{JwtError, JwtManager};
use axum::{middleware as axum_middleware, Router};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub mod dto;
pub mod handlers;

use handlers::{
    complaint_handler::complaint_router, department_handler::department_router,
    realtime_handler::realtime_router, system_handler::not_found_handler,
    system_handler::system_router, user_handler::user_router,
};

/// 統一されたアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub complaint_service: Arc<ComplaintService>,
    pub department_service: Arc<DepartmentService>,
    pub user_service: Arc<UserService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub notifications: Arc<NotificationHub>,
    pub user_repository: Arc<UserRepository>,
    pub jwt_manager: Arc<JwtManager>,
    pub db: DbPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DbPool, config: &AppConfig) -> Result<Self, JwtError> {
        Self::with_hub(db, config, Arc::new(NotificationHub::new()))
    }

    /// 通知ハブを外から渡す（テストで購読側を握るため）
    pub fn with_hub(
        db: DbPool,
        config: &AppConfig,
        notifications: Arc<NotificationHub>,
    ) -> Result<Self, JwtError> {
        let jwt_manager = Arc::new(JwtManager::new(config.jwt.clone())?);
        let complaint_service = Arc::new(ComplaintService::new(
            db.clone(),
            notifications.clone(),
        ));

        Ok(Self {
            department_service: Arc::new(DepartmentService::new(
                db.clone(),
                complaint_service.clone(),
            )),
            complaint_service,
            user_service: Arc::new(UserService::new(db.clone())),
            analytics_service: Arc::new(AnalyticsService::new(db.clone())),
            notifications,
            user_repository: Arc::new(UserRepository::new(db.clone())),
            jwt_manager,
            db,
            config: Arc::new(config.clone()),
        })
    }
}

/// すべてのルートとミドルウェアを組み立てる
///
/// REST APIは `/api/{version}` 配下。`/health` と `/ws` はプレフィックスの外。
pub fn build_router(app_state: AppState) -> Router {
    let config = app_state.config.clone();
    let rate_limiter = RateLimitStorage::new(RateLimitConfig::from(&config.rate_limit));

    let api_routes = Router::new()
        .merge(complaint_router(app_state.clone()))
        .merge(department_router(app_state.clone()))
        .merge(user_router(app_state.clone()))
        .layer(axum_middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    Router::new()
        .nest(&config.api_prefix(), api_routes)
        .merge(system_router(app_state.clone()))
        .merge(realtime_router(app_state))
        .fallback(not_found_handler)
        .layer(RequestBodyLimitLayer::new(config.server.body_limit))
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(axum_middleware::from_fn(inject_request_context))
}
