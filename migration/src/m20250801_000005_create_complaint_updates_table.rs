use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComplaintUpdates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintUpdates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintUpdates::ComplaintId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplaintUpdates::Message).text().not_null())
                    .col(ColumnDef::new(ComplaintUpdates::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(ComplaintUpdates::UpdateType)
                            .string_len(32)
                            .not_null()
                            .default("progress_update"),
                    )
                    .col(
                        ColumnDef::new(ComplaintUpdates::IsInternal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ComplaintUpdates::Attachments)
                            .json()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintUpdates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_updates_complaint_id")
                            .from(ComplaintUpdates::Table, ComplaintUpdates::ComplaintId)
                            .to(Complaints::Table, Complaints::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_updates_created_by")
                            .from(ComplaintUpdates::Table, ComplaintUpdates::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_complaint_updates_complaint_id_created_at")
                    .table(ComplaintUpdates::Table)
                    .col(ComplaintUpdates::ComplaintId)
                    .col(ComplaintUpdates::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComplaintUpdates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ComplaintUpdates {
    Table,
    Id,
    ComplaintId,
    Message,
    CreatedBy,
    UpdateType,
    IsInternal,
    Attachments,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Complaints {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
