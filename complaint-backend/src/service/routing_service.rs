// src/service/routing_service.rs

use crate::domain::complaint_category::ComplaintCategory;
use crate::domain::department_model;
use crate::error::{AppError, AppResult};
use crate::repository::department_repository::DepartmentRepository;
use std::sync::Arc;
use tracing::{info, warn};

/// 登録順に並んだ部署から、カテゴリを担当する最初の有効な部署を選ぶ
pub fn select_department(
    departments: &[department_model::Model],
    category: ComplaintCategory,
) -> Option<&department_model::Model> {
    departments
        .iter()
        .find(|department| department.is_active && department.handles_category(category))
}

/// 苦情カテゴリから担当部署を決める
///
/// サービスエリアは参照しない。負荷分散や地理的な優先付けもしない。
pub struct DepartmentRouter {
    department_repo: Arc<DepartmentRepository>,
}

impl DepartmentRouter {
    pub fn new(department_repo: Arc<DepartmentRepository>) -> Self {
        Self { department_repo }
    }

    pub async fn route(&self, category: ComplaintCategory) -> AppResult<department_model::Model> {
        let departments = self.department_repo.find_in_insertion_order(Some(true)).await?;

        match select_department(&departments, category) {
            Some(department) => {
                info!(
                    category = %category,
                    department_id = %department.id,
                    department = %department.name,
                    "Complaint routed"
                );
                Ok(department.clone())
            }
            None => {
                warn!(category = %category, "No active department handles category");
                Err(AppError::NoDepartmentForCategory(category))
            }
        }
    }
}
