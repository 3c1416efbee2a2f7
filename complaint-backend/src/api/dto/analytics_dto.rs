// src/api/dto/analytics_dto.rs

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub total_complaints: u64,
    pub resolved_complaints: u64,
    pub pending_complaints: u64,
    pub emergency_complaints: u64,
    /// 解決率（%）
    pub resolution_rate: f64,
    pub average_rating: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoryStat {
    pub category: String,
    pub count: i64,
    pub resolved: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusStat {
    pub status: String,
    pub count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTrend {
    pub year: i32,
    pub month: u32,
    pub complaints: u64,
    pub resolved: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintAnalyticsResponse {
    #[serde(flatten)]
    pub overview: AnalyticsOverview,
    pub category_stats: Vec<CategoryStat>,
    pub status_stats: Vec<StatusStat>,
    /// 新しい月から最大12件
    pub monthly_trends: Vec<MonthlyTrend>,
}
