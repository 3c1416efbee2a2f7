// complaint-backend/src/domain/complaint_priority.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// 苦情の優先度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl ComplaintPriority {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::Low, Self::Medium, Self::High, Self::Critical]
    }

    /// 緊急フラグを考慮した実効優先度。緊急案件は常に最上位。
    pub fn effective(requested: Option<Self>, is_emergency: bool) -> Self {
        if is_emergency {
            Self::Critical
        } else {
            requested.unwrap_or_default()
        }
    }
}

impl Default for ComplaintPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for ComplaintPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ComplaintPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s).ok_or_else(|| {
            format!(
                "Invalid priority: '{}'. Valid priorities are: low, medium, high, critical",
                s
            )
        })
    }
}

impl From<ComplaintPriority> for String {
    fn from(priority: ComplaintPriority) -> Self {
        priority.as_str().to_string()
    }
}
