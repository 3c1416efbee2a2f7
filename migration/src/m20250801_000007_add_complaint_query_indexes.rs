use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 一覧のデフォルトソート（-createdAt）用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_complaints_created_at")
                    .table(Complaints::Table)
                    .col(Complaints::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_complaints_status_category")
                    .table(Complaints::Table)
                    .col(Complaints::Status)
                    .col(Complaints::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_complaints_department_id")
                    .table(Complaints::Table)
                    .col(Complaints::DepartmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_complaints_submitted_by")
                    .table(Complaints::Table)
                    .col(Complaints::SubmittedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_complaints_assigned_to")
                    .table(Complaints::Table)
                    .col(Complaints::AssignedTo)
                    .to_owned(),
            )
            .await?;

        // 半径検索の事前絞り込み（緯度経度のバウンディングボックス）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_complaints_lat_lng")
                    .table(Complaints::Table)
                    .col(Complaints::Latitude)
                    .col(Complaints::Longitude)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_complaints_created_at",
            "idx_complaints_status_category",
            "idx_complaints_department_id",
            "idx_complaints_submitted_by",
            "idx_complaints_assigned_to",
            "idx_complaints_lat_lng",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table(Complaints::Table)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Complaints {
    Table,
    CreatedAt,
    Status,
    Category,
    DepartmentId,
    SubmittedBy,
    AssignedTo,
    Latitude,
    Longitude,
}
