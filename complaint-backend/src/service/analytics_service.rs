// src/service/analytics_service.rs

use crate::api::dto::analytics_dto::{
    AnalyticsOverview, CategoryStat, ComplaintAnalyticsResponse, MonthlyTrend, StatusStat,
};
use crate::db::DbPool;
use crate::domain::complaint_status::ComplaintStatus;
use crate::error::AppResult;
use crate::repository::complaint_repository::{
    ComplaintFilter, ComplaintRepository, CreatedStatusRow, StatusCountRow,
};
use chrono::Datelike;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// 月次推移で返す期間数
pub const MONTHLY_TREND_PERIODS: usize = 12;

pub struct AnalyticsService {
    repo: Arc<ComplaintRepository>,
}

/// (年, 月) ごとの件数と、そのうち現在解決済みの件数。新しい月から。
pub fn monthly_trends(rows: &[CreatedStatusRow], periods: usize) -> Vec<MonthlyTrend> {
    let mut buckets: BTreeMap<(i32, u32), (u64, u64)> = BTreeMap::new();
    for row in rows {
        let entry = buckets
            .entry((row.created_at.year(), row.created_at.month()))
            .or_default();
        entry.0 += 1;
        if row.status == ComplaintStatus::Resolved.as_str() {
            entry.1 += 1;
        }
    }

    buckets
        .into_iter()
        .rev()
        .take(periods)
        .map(|((year, month), (complaints, resolved))| MonthlyTrend {
            year,
            month,
            complaints,
            resolved,
        })
        .collect()
}

fn overview_from(
    status_rows: &[StatusCountRow],
    emergency: u64,
    average_rating: Option<f64>,
) -> AnalyticsOverview {
    let count_of = |predicate: fn(ComplaintStatus) -> bool| -> u64 {
        status_rows
            .iter()
            .filter(|row| ComplaintStatus::from_str(&row.status).is_some_and(predicate))
            .map(|row| row.count.max(0) as u64)
            .sum()
    };

    let total: u64 = status_rows.iter().map(|row| row.count.max(0) as u64).sum();
    let resolved = count_of(|status| status.is_resolved());
    let pending = count_of(|status| status.is_pending());
    let resolution_rate = if total == 0 {
        0.0
    } else {
        ((resolved as f64 / total as f64) * 10000.0).round() / 100.0
    };

    AnalyticsOverview {
        total_complaints: total,
        resolved_complaints: resolved,
        pending_complaints: pending,
        emergency_complaints: emergency,
        resolution_rate,
        average_rating: average_rating.map(|rating| (rating * 100.0).round() / 100.0),
    }
}

impl AnalyticsService {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            repo: Arc::new(ComplaintRepository::new(db_pool)),
        }
    }

    /// リクエストごとに全件から再集計する
    pub async fn complaint_analytics(&self) -> AppResult<ComplaintAnalyticsResponse> {
        let all = ComplaintFilter::default();
        let status_rows = self.repo.count_by_status(&all).await?;
        let emergency = self
            .repo
            .count(&ComplaintFilter {
                is_emergency: Some(true),
                ..ComplaintFilter::default()
            })
            .await?;
        let average_rating = self.repo.average_rating(&all).await?;

        let category_stats = self
            .repo
            .count_by_category()
            .await?
            .into_iter()
            .map(|row| CategoryStat {
                category: row.category,
                count: row.count,
                resolved: row.resolved,
            })
            .collect();
        let monthly = monthly_trends(
            &self.repo.created_and_status().await?,
            MONTHLY_TREND_PERIODS,
        );

        let overview = overview_from(&status_rows, emergency, average_rating);
        debug!(
            total = overview.total_complaints,
            periods = monthly.len(),
            "Complaint analytics computed"
        );

        Ok(ComplaintAnalyticsResponse {
            overview,
            category_stats,
            status_stats: status_rows
                .into_iter()
                .map(|row| StatusStat {
                    status: row.status,
                    count: row.count,
                })
                .collect(),
            monthly_trends: monthly,
        })
    }
}
