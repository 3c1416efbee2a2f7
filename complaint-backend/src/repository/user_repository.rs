// src/repository/user_repository.rs

use crate::domain::user_model::{self, ActiveModel as UserActiveModel, Entity as UserEntity};
use crate::domain::user_role::UserRole;
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

/// 新規ユーザーの入力
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DbConn,
}

impl UserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// ユーザーをIDで検索
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find_by_id(id).one(&self.db).await
    }

    /// ユーザーをメールアドレスで検索
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find()
            .filter(user_model::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<user_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        UserEntity::find()
            .filter(user_model::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
    }

    pub async fn create(&self, input: NewUser) -> Result<user_model::Model, DbErr> {
        let active = UserActiveModel {
            name: Set(input.name),
            email: Set(input.email.to_lowercase()),
            phone: Set(input.phone),
            role: Set(input.role.to_string()),
            department_id: Set(input.department_id),
            ..UserActiveModel::new()
        };
        active.insert(&self.db).await
    }

    /// 有効・無効を切り替える（ユーザーは物理削除しない）
    pub async fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<user_model::Model>, DbErr> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: UserActiveModel = user.into();
        active.is_active = Set(is_active);
        active.update(&self.db).await.map(Some)
    }

    pub async fn set_department(
        &self,
        id: Uuid,
        department_id: Option<Uuid>,
    ) -> Result<(), DbErr> {
        UserEntity::update_many()
            .col_expr(
                user_model::Column::DepartmentId,
                sea_orm::sea_query::Expr::value(department_id),
            )
            .filter(user_model::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
