use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComplaintAttachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintAttachments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintAttachments::ComplaintId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintAttachments::Filename)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplaintAttachments::Url).text().not_null())
                    .col(
                        ColumnDef::new(ComplaintAttachments::AttachmentType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintAttachments::Size)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ComplaintAttachments::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_attachments_complaint_id")
                            .from(
                                ComplaintAttachments::Table,
                                ComplaintAttachments::ComplaintId,
                            )
                            .to(Complaints::Table, Complaints::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_complaint_attachments_complaint_id")
                    .table(ComplaintAttachments::Table)
                    .col(ComplaintAttachments::ComplaintId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComplaintAttachments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ComplaintAttachments {
    Table,
    Id,
    ComplaintId,
    Filename,
    Url,
    AttachmentType,
    Size,
    UploadedAt,
}

#[derive(DeriveIden)]
enum Complaints {
    Table,
    Id,
}
