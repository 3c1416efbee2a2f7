// src/utils/permission.rs

use crate::domain::user_role::UserRole;
use crate::error::AppError;
use uuid::Uuid;

/// 認可の対象となる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateComplaint,
    ViewComplaint,
    ListOwnComplaints,
    ListAssignedComplaints,
    UpdateComplaint,
    DeleteComplaint,
    AddComplaintUpdate,
    RateComplaint,
    AssignComplaint,
    AddAttachment,
    ManageDepartments,
    ViewDepartmentStats,
    ManageUsers,
    ViewUser,
}

/// 条件付き許可の判定方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    None,
    /// 対象の所有者（苦情の投稿者、ユーザー本人）
    Owner,
    /// 対象の担当者、または未割り当て
    AssigneeOrUnassigned,
}

#[derive(Debug, Clone, Copy)]
pub struct PermissionRule {
    /// 無条件に許可されるロール
    pub roles: &'static [UserRole],
    /// 条件を満たした場合に許可されるロール
    pub conditional_roles: &'static [UserRole],
    pub condition: Condition,
}

const ALL: &[UserRole] = &[UserRole::Citizen, UserRole::Provider, UserRole::Admin];
const ADMIN: &[UserRole] = &[UserRole::Admin];
const STAFF: &[UserRole] = &[UserRole::Provider, UserRole::Admin];
const NOBODY: &[UserRole] = &[];

impl Action {
    pub fn rule(self) -> PermissionRule {
        let (roles, conditional_roles, condition) = match self {
            Action::CreateComplaint | Action::ViewComplaint | Action::ListOwnComplaints => {
                (ALL, NOBODY, Condition::None)
            }
            Action::ListAssignedComplaints
            | Action::AssignComplaint
            | Action::ViewDepartmentStats => (STAFF, NOBODY, Condition::None),
            Action::UpdateComplaint
            | Action::DeleteComplaint
            | Action::RateComplaint
            | Action::AddAttachment
            | Action::ViewUser => (ADMIN, ALL, Condition::Owner),
            Action::AddComplaintUpdate => (
                ADMIN,
                &[UserRole::Provider] as &[UserRole],
                Condition::AssigneeOrUnassigned,
            ),
            Action::ManageDepartments | Action::ManageUsers => (ADMIN, NOBODY, Condition::None),
        };

        PermissionRule {
            roles,
            conditional_roles,
            condition,
        }
    }
}

/// 操作対象の所有・担当情報
#[derive(Debug, Clone, Copy, Default)]
pub struct Subject {
    pub owner_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
}

impl Subject {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn owned_by(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
            assignee_id: None,
        }
    }

    pub fn with_assignee(mut self, assignee_id: Option<Uuid>) -> Self {
        self.assignee_id = assignee_id;
        self
    }
}

/// 統合された権限チェック機能
pub struct PermissionChecker;

impl PermissionChecker {
    pub fn is_allowed(action: Action, role: UserRole, user_id: Uuid, subject: &Subject) -> bool {
        let rule = action.rule();
        if rule.roles.contains(&role) {
            return true;
        }
        if !rule.conditional_roles.contains(&role) {
            return false;
        }

        match rule.condition {
            Condition::None => false,
            Condition::Owner => subject.owner_id == Some(user_id),
            Condition::AssigneeOrUnassigned => match subject.assignee_id {
                Some(assignee) => assignee == user_id,
                None => true,
            },
        }
    }

    pub fn ensure(
        action: Action,
        role: UserRole,
        user_id: Uuid,
        subject: &Subject,
    ) -> Result<(), AppError> {
        if Self::is_allowed(action, role, user_id, subject) {
            Ok(())
        } else {
            tracing::warn!(?action, %role, %user_id, "Permission denied");
            Err(AppError::Forbidden(format!(
                "User role '{}' is not authorized to access this route",
                role
            )))
        }
    }
}
