// src/api/dto/complaint_dto.rs

use crate::api::dto::department_dto::DepartmentSummary;
use crate::api::dto::user_dto::UserSummary;
use crate::domain::complaint_attachment_model::{self, AttachmentType};
use crate::domain::complaint_category::ComplaintCategory;
use crate::domain::complaint_model;
use crate::domain::complaint_priority::ComplaintPriority;
use crate::domain::complaint_status::ComplaintStatus;
use crate::domain::complaint_update_model::{self, UpdateType};
use crate::domain::geo::GeoPoint;
use crate::error::{AppError, AppResult};
use crate::repository::complaint_repository::{ComplaintFilter, NearFilter};
use crate::types::query::deserialize_u32_from_string;
use crate::types::query::DEFAULT_PAGE_SIZE;
use crate::types::PaginationQuery;
use crate::utils::validation::{validate_lng_lat, validate_not_blank};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 半径の既定値（km）
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn parse_date(name: &str, raw: &str, end_of_day: bool) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| {
            if end_of_day {
                date.and_hms_milli_opt(23, 59, 59, 999)
            } else {
                date.and_hms_opt(0, 0, 0)
            }
        })
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::ValidationError(format!("Invalid {}: '{}'", name, raw)))
}

/// RFC 3339 または `YYYY-MM-DD`（UTCの0時）を受け付ける
pub fn parse_date_param(name: &str, raw: &str) -> AppResult<DateTime<Utc>> {
    parse_date(name, raw, false)
}

/// 終了日。`YYYY-MM-DD` はその日の終わり（23:59:59.999 UTC）まで含める
pub fn parse_end_date_param(name: &str, raw: &str) -> AppResult<DateTime<Utc>> {
    parse_date(name, raw, true)
}

fn near_filter(
    lat: Option<f64>,
    lng: Option<f64>,
    radius: Option<f64>,
) -> AppResult<Option<NearFilter>> {
    match (lat, lng) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            let center = GeoPoint::new(lat, lng);
            if !center.is_valid() {
                return Err(AppError::ValidationError(
                    "Latitude must be within [-90, 90] and longitude within [-180, 180]"
                        .to_string(),
                ));
            }
            let radius_km = radius.unwrap_or(DEFAULT_RADIUS_KM);
            if !radius_km.is_finite() || radius_km <= 0.0 {
                return Err(AppError::ValidationError(
                    "Radius must be a positive number of kilometres".to_string(),
                ));
            }
            Ok(Some(NearFilter { center, radius_km }))
        }
        _ => Err(AppError::ValidationError(
            "Latitude and longitude are required".to_string(),
        )),
    }
}

// --- Request DTOs ---

/// 位置情報（座標は GeoJSON 順の `[lng, lat]`）
#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct LocationInput {
    #[validate(custom(function = validate_lng_lat))]
    pub coordinates: [f64; 2],

    #[validate(
        length(min = 1, max = 255, message = "Address must be between 1 and 255 characters"),
        custom(function = validate_not_blank)
    )]
    pub address: String,

    #[validate(length(max = 100, message = "City must not exceed 100 characters"))]
    pub city: Option<String>,

    #[validate(length(max = 100, message = "Region must not exceed 100 characters"))]
    pub region: Option<String>,
}

impl LocationInput {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.coordinates[1], self.coordinates[0])
    }
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = validate_not_blank)
    )]
    pub title: String,

    #[validate(
        length(min = 1, max = 2000, message = "Description must be between 1 and 2000 characters"),
        custom(function = validate_not_blank)
    )]
    pub description: String,

    pub category: ComplaintCategory,

    pub priority: Option<ComplaintPriority>,

    #[serde(default)]
    pub is_emergency: bool,

    #[validate(nested)]
    pub location: LocationInput,
}

/// 汎用更新。部署は作成時に決まり、ここでは変更できない。
#[derive(Deserialize, Serialize, Debug, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComplaintRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = validate_not_blank)
    )]
    pub title: Option<String>,

    #[validate(length(
        min = 1,
        max = 2000,
        message = "Description must be between 1 and 2000 characters"
    ))]
    pub description: Option<String>,

    pub category: Option<ComplaintCategory>,
    pub priority: Option<ComplaintPriority>,
    pub status: Option<ComplaintStatus>,
    pub is_emergency: Option<bool>,

    #[validate(nested)]
    pub location: Option<LocationInput>,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddComplaintUpdateRequest {
    #[validate(
        length(min = 1, max = 1000, message = "Message must be between 1 and 1000 characters"),
        custom(function = validate_not_blank)
    )]
    pub message: String,

    #[serde(rename = "type", default)]
    pub update_type: UpdateType,

    #[serde(default)]
    pub is_internal: bool,

    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct RateComplaintRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 500, message = "Feedback must not exceed 500 characters"))]
    pub feedback: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignComplaintRequest {
    pub assigned_to: Uuid,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct AddAttachmentRequest {
    #[validate(
        length(min = 1, max = 255, message = "Filename must be between 1 and 255 characters"),
        custom(function = validate_not_blank)
    )]
    pub filename: String,

    #[validate(url(message = "Attachment url must be a valid URL"))]
    pub url: String,

    #[serde(rename = "type")]
    pub attachment_type: AttachmentType,

    #[serde(default)]
    #[validate(range(min = 0, message = "Size must not be negative"))]
    pub size: i64,
}

// --- Query DTOs ---

/// 公開一覧のクエリ
#[derive(Deserialize, Debug, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintListQuery {
    pub status: Option<ComplaintStatus>,
    pub category: Option<ComplaintCategory>,
    pub priority: Option<ComplaintPriority>,
    pub is_emergency: Option<bool>,
    pub department: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
    #[serde(default = "default_page", deserialize_with = "deserialize_u32_from_string")]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "deserialize_u32_from_string")]
    pub limit: u32,
    pub sort: Option<String>,
}

impl ComplaintListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.limit)
    }

    pub fn to_filter(&self) -> AppResult<ComplaintFilter> {
        let created_from = self
            .start_date
            .as_deref()
            .map(|raw| parse_date_param("startDate", raw))
            .transpose()?;
        let created_to = self
            .end_date
            .as_deref()
            .map(|raw| parse_end_date_param("endDate", raw))
            .transpose()?;

        Ok(ComplaintFilter {
            status: self.status,
            category: self.category,
            priority: self.priority,
            is_emergency: self.is_emergency,
            department_id: self.department,
            created_from,
            created_to,
            near: near_filter(self.lat, self.lng, self.radius)?,
            ..ComplaintFilter::default()
        })
    }
}

/// 半径検索のクエリ（緯度経度は必須）
#[derive(Deserialize, Debug, Default, Validate)]
pub struct ComplaintLocationQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
    pub status: Option<ComplaintStatus>,
    pub category: Option<ComplaintCategory>,
}

impl ComplaintLocationQuery {
    pub fn to_filter(&self) -> AppResult<ComplaintFilter> {
        if self.lat.is_none() || self.lng.is_none() {
            return Err(AppError::ValidationError(
                "Latitude and longitude are required".to_string(),
            ));
        }
        Ok(ComplaintFilter {
            status: self.status,
            category: self.category,
            near: near_filter(self.lat, self.lng, self.radius)?,
            ..ComplaintFilter::default()
        })
    }
}

/// 自分の苦情・担当苦情のクエリ
#[derive(Deserialize, Debug, Default, Validate)]
pub struct OwnComplaintsQuery {
    pub status: Option<ComplaintStatus>,
    pub category: Option<ComplaintCategory>,
    pub priority: Option<ComplaintPriority>,
    #[serde(default = "default_page", deserialize_with = "deserialize_u32_from_string")]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "deserialize_u32_from_string")]
    pub limit: u32,
}

impl OwnComplaintsQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.limit)
    }

    pub fn to_filter(&self) -> ComplaintFilter {
        ComplaintFilter {
            status: self.status,
            category: self.category,
            priority: self.priority,
            ..ComplaintFilter::default()
        }
    }
}

// --- Response DTOs ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComplaintLocation {
    #[serde(rename = "type")]
    pub geometry_type: String,
    /// `[lng, lat]`
    pub coordinates: [f64; 2],
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
    pub status: ComplaintStatus,
    pub is_emergency: bool,
    pub location: ComplaintLocation,
    pub submitted_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub department: Uuid,
    pub view_count: i32,
    pub rating: Option<i32>,
    pub feedback: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<complaint_model::Model> for ComplaintResponse {
    fn from(model: complaint_model::Model) -> Self {
        Self {
            id: model.id,
            category: model.category(),
            priority: model.priority(),
            status: model.status(),
            location: ComplaintLocation {
                geometry_type: "Point".to_string(),
                coordinates: [model.longitude, model.latitude],
                address: model.address,
                city: model.city,
                region: model.region,
            },
            title: model.title,
            description: model.description,
            is_emergency: model.is_emergency,
            submitted_by: model.submitted_by,
            assigned_to: model.assigned_to,
            department: model.department_id,
            view_count: model.view_count,
            rating: model.rating,
            feedback: model.feedback,
            resolved_at: model.resolved_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintUpdateResponse {
    pub id: Uuid,
    pub message: String,
    pub created_by: Uuid,
    #[serde(rename = "type")]
    pub update_type: UpdateType,
    pub is_internal: bool,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<complaint_update_model::Model> for ComplaintUpdateResponse {
    fn from(model: complaint_update_model::Model) -> Self {
        Self {
            id: model.id,
            update_type: model.update_type(),
            attachments: model.attachment_urls(),
            message: model.message,
            created_by: model.created_by,
            is_internal: model.is_internal,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub id: Uuid,
    pub filename: String,
    pub url: String,
    #[serde(rename = "type")]
    pub attachment_type: Option<AttachmentType>,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<complaint_attachment_model::Model> for AttachmentResponse {
    fn from(model: complaint_attachment_model::Model) -> Self {
        Self {
            id: model.id,
            attachment_type: AttachmentType::from_str(&model.attachment_type),
            filename: model.filename,
            url: model.url,
            size: model.size,
            uploaded_at: model.uploaded_at,
        }
    }
}

/// 一覧用。関連ユーザーと部署の概要を含む
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintListItem {
    #[serde(flatten)]
    pub complaint: ComplaintResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitter: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_info: Option<DepartmentSummary>,
}

/// 詳細。更新ログと添付を含む
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDetailResponse {
    #[serde(flatten)]
    pub summary: ComplaintListItem,
    pub updates: Vec<ComplaintUpdateResponse>,
    pub attachments: Vec<AttachmentResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_param() {
        let date = parse_date_param("startDate", "2025-03-01").unwrap();
        assert_eq!(date.to_rfc3339(), "2025-03-01T00:00:00+00:00");

        let dt = parse_date_param("endDate", "2025-03-01T12:30:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-01T12:30:00+00:00");

        assert!(parse_date_param("startDate", "yesterday").is_err());
    }

    #[test]
    fn test_end_date_covers_whole_day() {
        let end = parse_end_date_param("endDate", "2025-03-01").unwrap();
        assert_eq!(end.to_rfc3339(), "2025-03-01T23:59:59.999+00:00");

        // 時刻付きはそのまま
        let exact = parse_end_date_param("endDate", "2025-03-01T12:30:00Z").unwrap();
        assert_eq!(exact.to_rfc3339(), "2025-03-01T12:30:00+00:00");
        assert!(parse_end_date_param("endDate", "2025-13-01").is_err());

        let query = ComplaintListQuery {
            start_date: Some("2025-03-01".to_string()),
            end_date: Some("2025-03-01".to_string()),
            ..ComplaintListQuery::default()
        };
        let filter = query.to_filter().unwrap();
        let afternoon = "2025-03-01T18:45:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(filter.created_from.unwrap() <= afternoon);
        assert!(afternoon <= filter.created_to.unwrap());
    }

    #[test]
    fn test_list_query_near_filter() {
        let query = ComplaintListQuery {
            lat: Some(40.71),
            lng: Some(-74.0),
            ..ComplaintListQuery::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.near.unwrap().radius_km, DEFAULT_RADIUS_KM);

        let partial = ComplaintListQuery {
            lat: Some(40.71),
            ..ComplaintListQuery::default()
        };
        assert!(partial.to_filter().is_err());
    }

    #[test]
    fn test_location_query_requires_coordinates() {
        let query = ComplaintLocationQuery::default();
        assert!(matches!(
            query.to_filter(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_create_request_validation() {
        let request: CreateComplaintRequest = serde_json::from_value(serde_json::json!({
            "title": "Pothole on Main Street",
            "description": "Large pothole near the intersection",
            "category": "roads",
            "location": { "coordinates": [-74.006, 40.7128], "address": "123 Main Street" }
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert!(!request.is_emergency);

        let invalid: CreateComplaintRequest = serde_json::from_value(serde_json::json!({
            "title": "  ",
            "description": "x",
            "category": "roads",
            "location": { "coordinates": [-274.0, 40.0], "address": "somewhere" }
        }))
        .unwrap();
        let errors = invalid.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(errors.errors().contains_key("location"));
    }

    #[test]
    fn test_rate_request_range() {
        let request = RateComplaintRequest {
            rating: 6,
            feedback: None,
        };
        assert!(request.validate().is_err());
    }
}
