use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DepartmentStaff::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DepartmentStaff::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DepartmentStaff::DepartmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DepartmentStaff::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(DepartmentStaff::Position)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepartmentStaff::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(DepartmentStaff::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_staff_department_id")
                            .from(DepartmentStaff::Table, DepartmentStaff::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_staff_user_id")
                            .from(DepartmentStaff::Table, DepartmentStaff::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一部署に同じユーザーは1行のみ
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_department_staff_department_user")
                    .table(DepartmentStaff::Table)
                    .col(DepartmentStaff::DepartmentId)
                    .col(DepartmentStaff::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DepartmentStaff::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DepartmentStaff {
    Table,
    Id,
    DepartmentId,
    UserId,
    Position,
    IsActive,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
