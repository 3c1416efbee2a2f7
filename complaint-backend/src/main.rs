// src/main.rs
use complaint_backend::api::{build_router, AppState};
use complaint_backend::config::AppConfig;
use complaint_backend::db::create_db_pool;
use migration::{Migrator, MigratorTrait};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // トレーシングの設定
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "complaint_backend=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Starting Complaint Backend server...");

    let app_config = AppConfig::from_env()?;
    tracing::info!(
        environment = %app_config.environment,
        api_prefix = %app_config.api_prefix(),
        "Configuration loaded"
    );

    let db_pool = create_db_pool(&app_config).await?;
    tracing::info!("Database pool created successfully.");

    Migrator::up(&db_pool, None).await?;
    tracing::info!("Database migrations applied.");

    let app_state = AppState::new(db_pool, &app_config)?;
    let app_router = build_router(app_state);

    let addr = app_config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Router configured. Server listening on {}", addr);

    axum::serve(
        listener,
        app_router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
