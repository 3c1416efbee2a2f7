// tests/common/app_helper.rs

use axum::Router;
use complaint_backend::{
    api::{build_router, AppState},
    config::AppConfig,
    service::notification_service::NotificationHub,
};
use std::sync::Arc;

use crate::common;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: common::db::TestDatabase,
}

/// 全ルートを備えたアプリのセットアップ
pub async fn setup_app() -> TestApp {
    setup_app_with_config(AppConfig::for_testing()).await
}

pub async fn setup_app_with_config(config: AppConfig) -> TestApp {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;

    let state = AppState::with_hub(
        db.connection.clone(),
        &config,
        Arc::new(NotificationHub::new()),
    )
    .unwrap();
    let router = build_router(state.clone());

    TestApp { router, state, db }
}
