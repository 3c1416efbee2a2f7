// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// ユーザーディレクトリ
mod m20250801_000001_create_users_table;

// 部署レジストリ
mod m20250801_000002_create_departments_table;
mod m20250801_000003_create_department_staff_table;

// 苦情ストア
mod m20250801_000004_create_complaints_table;
mod m20250801_000005_create_complaint_updates_table;
mod m20250801_000006_create_complaint_attachments_table;
mod m20250801_000007_add_complaint_query_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. 依存関係のないテーブル
            Box::new(m20250801_000001_create_users_table::Migration),
            // 2. usersに依存するテーブル
            Box::new(m20250801_000002_create_departments_table::Migration),
            Box::new(m20250801_000003_create_department_staff_table::Migration),
            // 3. users / departmentsに依存するテーブル
            Box::new(m20250801_000004_create_complaints_table::Migration),
            Box::new(m20250801_000005_create_complaint_updates_table::Migration),
            Box::new(m20250801_000006_create_complaint_attachments_table::Migration),
            // 4. 検索・ソート用インデックス
            Box::new(m20250801_000007_add_complaint_query_indexes::Migration),
        ]
    }
}
