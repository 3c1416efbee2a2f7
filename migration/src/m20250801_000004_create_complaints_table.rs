use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Complaints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Complaints::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Complaints::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Complaints::Description).text().not_null())
                    .col(ColumnDef::new(Complaints::Category).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Complaints::Priority)
                            .string_len(16)
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(Complaints::Status)
                            .string_len(20)
                            .not_null()
                            .default("submitted"),
                    )
                    .col(
                        ColumnDef::new(Complaints::IsEmergency)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Complaints::Latitude).double().not_null())
                    .col(ColumnDef::new(Complaints::Longitude).double().not_null())
                    .col(ColumnDef::new(Complaints::Address).string_len(255).not_null())
                    .col(ColumnDef::new(Complaints::City).string_len(100).null())
                    .col(ColumnDef::new(Complaints::Region).string_len(100).null())
                    .col(ColumnDef::new(Complaints::SubmittedBy).uuid().not_null())
                    .col(ColumnDef::new(Complaints::AssignedTo).uuid().null())
                    .col(ColumnDef::new(Complaints::DepartmentId).uuid().not_null())
                    .col(
                        ColumnDef::new(Complaints::ViewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Complaints::Rating).integer().null())
                    .col(ColumnDef::new(Complaints::Feedback).text().null())
                    .col(
                        ColumnDef::new(Complaints::ResolvedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Complaints::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Complaints::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaints_submitted_by")
                            .from(Complaints::Table, Complaints::SubmittedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaints_assigned_to")
                            .from(Complaints::Table, Complaints::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaints_department_id")
                            .from(Complaints::Table, Complaints::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Complaints::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Complaints {
    Table,
    Id,
    Title,
    Description,
    Category,
    Priority,
    Status,
    IsEmergency,
    Latitude,
    Longitude,
    Address,
    City,
    Region,
    SubmittedBy,
    AssignedTo,
    DepartmentId,
    ViewCount,
    Rating,
    Feedback,
    ResolvedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
}
