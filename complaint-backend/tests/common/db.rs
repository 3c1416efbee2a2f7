//! Async TestDatabase helper backed by in-memory SQLite.

use complaint_backend::db::connect;
use migration::Migrator;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    /// テストごとに独立したデータベースを作成してマイグレーションを適用する
    pub async fn new() -> Self {
        let connection = connect("sqlite::memory:").await.unwrap();
        Migrator::up(&connection, None).await.unwrap();

        Self { connection }
    }
}
