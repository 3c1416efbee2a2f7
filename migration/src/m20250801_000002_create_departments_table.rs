use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Departments::Name)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Departments::Description).text().not_null())
                    // カテゴリ・連絡先・営業時間・SLA・サービスエリアはJSONで保持
                    .col(ColumnDef::new(Departments::Categories).json().not_null())
                    .col(ColumnDef::new(Departments::ContactInfo).json().not_null())
                    .col(ColumnDef::new(Departments::WorkingHours).json().not_null())
                    .col(ColumnDef::new(Departments::Sla).json().not_null())
                    .col(ColumnDef::new(Departments::ServiceAreas).json().not_null())
                    .col(ColumnDef::new(Departments::Tags).json().not_null())
                    .col(ColumnDef::new(Departments::HeadUserId).uuid().null())
                    .col(ColumnDef::new(Departments::BudgetAnnual).double().null())
                    .col(
                        ColumnDef::new(Departments::BudgetAllocated)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Departments::BudgetSpent)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Departments::AverageResponseTime)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Departments::AverageResolutionTime)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Departments::SatisfactionRating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Departments::TotalComplaintsHandled)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Departments::ResolvedComplaints)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Departments::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Departments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Departments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_departments_head_user_id")
                            .from(Departments::Table, Departments::HeadUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_departments_is_active_created_at")
                    .table(Departments::Table)
                    .col(Departments::IsActive)
                    .col(Departments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
    Name,
    Description,
    Categories,
    ContactInfo,
    WorkingHours,
    Sla,
    ServiceAreas,
    Tags,
    HeadUserId,
    BudgetAnnual,
    BudgetAllocated,
    BudgetSpent,
    AverageResponseTime,
    AverageResolutionTime,
    SatisfactionRating,
    TotalComplaintsHandled,
    ResolvedComplaints,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
