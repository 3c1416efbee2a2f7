// complaint-backend/src/domain/user_role.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// ユーザーロール（閉じた集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Citizen,
    Provider,
    Admin,
}

impl UserRole {
    /// 文字列からロールを解析
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "citizen" => Some(Self::Citizen),
            "provider" => Some(Self::Provider),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// ロール名を文字列として取得
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Provider => "provider",
            Self::Admin => "admin",
        }
    }

}

impl Default for UserRole {
    fn default() -> Self {
        Self::Citizen
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s).ok_or_else(|| {
            format!(
                "Invalid role: '{}'. Valid roles are: citizen, provider, admin",
                s
            )
        })
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!(UserRole::from_str("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("provider"), Some(UserRole::Provider));
        assert_eq!(UserRole::from_str("citizen"), Some(UserRole::Citizen));
        assert_eq!(UserRole::from_str("member"), None);
    }
}
