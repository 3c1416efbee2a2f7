// src/api/dto/department_dto.rs

use crate::domain::complaint_category::ComplaintCategory;
use crate::domain::department_model::{
    self, ContactInfo, PolygonGeometry, ServiceArea, SlaTarget, WorkingHours,
};
use crate::domain::department_staff_model;
use crate::domain::geo::GeoPoint;
use crate::error::{AppError, AppResult};
use crate::repository::department_repository::{DepartmentChanges, NewDepartment};
use crate::types::query::{deserialize_u32_from_string, DEFAULT_PAGE_SIZE};
use crate::types::PaginationQuery;
use crate::utils::validation::{
    normalize_tags, validate_contact_email, validate_not_blank, validate_phone,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// 指定なし（None）と null（Some(None)）を区別する
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn dedup_categories(categories: Vec<ComplaintCategory>) -> Vec<ComplaintCategory> {
    let mut unique = Vec::with_capacity(categories.len());
    for category in categories {
        if !unique.contains(&category) {
            unique.push(category);
        }
    }
    unique
}

/// 閉じたリングで、各点が有効な `[lng, lat]` であること
fn validate_polygon(polygon: &PolygonGeometry) -> Result<(), ValidationError> {
    let invalid = |message: &'static str| {
        let mut err = ValidationError::new("invalid_polygon");
        err.message = Some(message.into());
        err
    };

    if polygon.geometry_type != "Polygon" {
        return Err(invalid("Service area boundaries must be a Polygon"));
    }
    if polygon.coordinates.is_empty() {
        return Err(invalid("Polygon must have an outer ring"));
    }
    for ring in &polygon.coordinates {
        if ring.len() < 4 || ring.first() != ring.last() {
            return Err(invalid(
                "Polygon rings must be closed and have at least four positions",
            ));
        }
        if ring
            .iter()
            .any(|[lng, lat]| !GeoPoint::new(*lat, *lng).is_valid())
        {
            return Err(invalid("Polygon positions must be valid [lng, lat] pairs"));
        }
    }
    Ok(())
}

// --- Request DTOs ---

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoInput {
    #[validate(custom(function = validate_contact_email))]
    pub email: String,

    #[validate(custom(function = validate_phone))]
    pub phone: String,

    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub address: String,

    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,

    #[validate(custom(function = validate_phone))]
    pub emergency_contact: Option<String>,
}

impl From<ContactInfoInput> for ContactInfo {
    fn from(input: ContactInfoInput) -> Self {
        Self {
            email: input.email.to_lowercase(),
            phone: input.phone,
            address: input.address,
            website: input.website,
            emergency_contact: input.emergency_contact,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SlaTargetInput {
    pub category: ComplaintCategory,

    #[validate(range(min = 0.0, message = "Response time must not be negative"))]
    pub response_time: f64,

    #[validate(range(min = 0.0, message = "Resolution time must not be negative"))]
    pub resolution_time: f64,

    #[validate(range(min = 0.0, message = "Emergency response time must not be negative"))]
    pub emergency_response_time: f64,
}

impl From<SlaTargetInput> for SlaTarget {
    fn from(input: SlaTargetInput) -> Self {
        Self {
            category: input.category,
            response_time: input.response_time,
            resolution_time: input.resolution_time,
            emergency_response_time: input.emergency_response_time,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct ServiceAreaInput {
    #[validate(length(min = 1, max = 100, message = "Service area name is required"))]
    pub name: String,

    #[validate(custom(function = validate_polygon))]
    pub boundaries: PolygonGeometry,
}

impl From<ServiceAreaInput> for ServiceArea {
    fn from(input: ServiceAreaInput) -> Self {
        Self {
            name: input.name,
            boundaries: input.boundaries,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
pub struct BudgetInput {
    #[validate(range(min = 0.0, message = "Annual budget must not be negative"))]
    pub annual: Option<f64>,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Allocated budget must not be negative"))]
    pub allocated: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Spent budget must not be negative"))]
    pub spent: f64,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentRequest {
    #[validate(
        length(min = 1, max = 100, message = "Department name cannot exceed 100 characters"),
        custom(function = validate_not_blank)
    )]
    pub name: String,

    #[validate(
        length(min = 1, max = 500, message = "Description cannot exceed 500 characters"),
        custom(function = validate_not_blank)
    )]
    pub description: String,

    #[validate(length(min = 1, message = "At least one category is required"))]
    pub categories: Vec<ComplaintCategory>,

    #[validate(nested)]
    pub contact_info: ContactInfoInput,

    #[serde(default)]
    pub working_hours: WorkingHours,

    #[serde(default)]
    #[validate(nested)]
    pub sla: Vec<SlaTargetInput>,

    #[serde(default)]
    #[validate(nested)]
    pub service_areas: Vec<ServiceAreaInput>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub head_user_id: Option<Uuid>,

    #[serde(default)]
    #[validate(nested)]
    pub budget: BudgetInput,
}

impl From<CreateDepartmentRequest> for NewDepartment {
    fn from(request: CreateDepartmentRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            description: request.description,
            categories: dedup_categories(request.categories),
            contact_info: request.contact_info.into(),
            working_hours: request.working_hours,
            sla: request.sla.into_iter().map(Into::into).collect(),
            service_areas: request.service_areas.into_iter().map(Into::into).collect(),
            tags: normalize_tags(&request.tags),
            head_user_id: request.head_user_id,
            budget_annual: request.budget.annual,
            budget_allocated: request.budget.allocated,
            budget_spent: request.budget.spent,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentRequest {
    #[validate(
        length(min = 1, max = 100, message = "Department name cannot exceed 100 characters"),
        custom(function = validate_not_blank)
    )]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 1, message = "At least one category is required"))]
    pub categories: Option<Vec<ComplaintCategory>>,

    #[validate(nested)]
    pub contact_info: Option<ContactInfoInput>,

    pub working_hours: Option<WorkingHours>,

    #[validate(nested)]
    pub sla: Option<Vec<SlaTargetInput>>,

    #[validate(nested)]
    pub service_areas: Option<Vec<ServiceAreaInput>>,

    pub tags: Option<Vec<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub head_user_id: Option<Option<Uuid>>,

    #[validate(nested)]
    pub budget: Option<BudgetInput>,

    pub is_active: Option<bool>,
}

impl From<UpdateDepartmentRequest> for DepartmentChanges {
    fn from(request: UpdateDepartmentRequest) -> Self {
        let (budget_annual, budget_allocated, budget_spent) = match request.budget {
            Some(budget) => (budget.annual, Some(budget.allocated), Some(budget.spent)),
            None => (None, None, None),
        };
        Self {
            name: request.name.map(|name| name.trim().to_string()),
            description: request.description,
            categories: request.categories.map(dedup_categories),
            contact_info: request.contact_info.map(Into::into),
            working_hours: request.working_hours,
            sla: request
                .sla
                .map(|sla| sla.into_iter().map(Into::into).collect()),
            service_areas: request
                .service_areas
                .map(|areas| areas.into_iter().map(Into::into).collect()),
            tags: request.tags.map(|tags| normalize_tags(&tags)),
            head_user_id: request.head_user_id,
            budget_annual,
            budget_allocated,
            budget_spent,
            is_active: request.is_active,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddStaffRequest {
    pub user_id: Uuid,

    #[validate(
        length(min = 1, max = 100, message = "Position must be between 1 and 100 characters"),
        custom(function = validate_not_blank)
    )]
    pub position: String,
}

// --- Query DTOs ---

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Deserialize, Debug, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentListQuery {
    pub category: Option<ComplaintCategory>,
    /// 未指定なら有効な部署のみ
    pub is_active: Option<bool>,
    #[serde(default = "default_page", deserialize_with = "deserialize_u32_from_string")]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "deserialize_u32_from_string")]
    pub limit: u32,
}

impl DepartmentListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.limit)
    }
}

#[derive(Deserialize, Debug, Default, Validate)]
pub struct DepartmentLocationQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl DepartmentLocationQuery {
    pub fn point(&self) -> AppResult<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if GeoPoint::new(lat, lng).is_valid() => {
                Ok(GeoPoint::new(lat, lng))
            }
            (Some(_), Some(_)) => Err(AppError::ValidationError(
                "Latitude must be within [-90, 90] and longitude within [-180, 180]".to_string(),
            )),
            _ => Err(AppError::ValidationError(
                "Latitude and longitude are required".to_string(),
            )),
        }
    }
}

// --- Response DTOs ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BudgetResponse {
    pub annual: Option<f64>,
    pub allocated: f64,
    pub spent: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResponse {
    pub average_response_time: f64,
    pub average_resolution_time: f64,
    pub satisfaction_rating: f64,
    pub total_complaints_handled: i32,
    pub resolved_complaints: i32,
    pub resolution_rate: f64,
}

impl From<&department_model::Model> for PerformanceResponse {
    fn from(model: &department_model::Model) -> Self {
        Self {
            average_response_time: model.average_response_time,
            average_resolution_time: model.average_resolution_time,
            satisfaction_rating: model.satisfaction_rating,
            total_complaints_handled: model.total_complaints_handled,
            resolved_complaints: model.resolved_complaints,
            resolution_rate: model.resolution_rate(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StaffMemberResponse {
    pub user_id: Uuid,
    pub position: String,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<department_staff_model::Model> for StaffMemberResponse {
    fn from(model: department_staff_model::Model) -> Self {
        Self {
            user_id: model.user_id,
            position: model.position,
            is_active: model.is_active,
            joined_at: model.joined_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub categories: Vec<ComplaintCategory>,
    pub contact_info: Option<ContactInfo>,
    pub working_hours: WorkingHours,
    pub sla: Vec<SlaTarget>,
    pub service_areas: Vec<ServiceArea>,
    pub tags: Vec<String>,
    pub head: Option<Uuid>,
    pub budget: BudgetResponse,
    pub performance: PerformanceResponse,
    pub active_staff_count: u64,
    pub resolution_rate: f64,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff: Option<Vec<StaffMemberResponse>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DepartmentResponse {
    pub fn new(model: department_model::Model, active_staff_count: u64) -> Self {
        Self {
            id: model.id,
            categories: model.category_list(),
            contact_info: model.contact(),
            working_hours: model.schedule(),
            sla: model.sla_targets(),
            service_areas: model.service_area_list(),
            tags: model.tag_list(),
            head: model.head_user_id,
            budget: BudgetResponse {
                annual: model.budget_annual,
                allocated: model.budget_allocated,
                spent: model.budget_spent,
            },
            performance: PerformanceResponse::from(&model),
            active_staff_count,
            resolution_rate: model.resolution_rate(),
            is_active: model.is_active,
            staff: None,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub fn with_staff(mut self, staff: Vec<department_staff_model::Model>) -> Self {
        self.staff = Some(staff.into_iter().map(Into::into).collect());
        self
    }
}

/// 苦情詳細などに埋め込む部署概要
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub id: Uuid,
    pub name: String,
    pub contact_info: Option<ContactInfo>,
}

impl From<&department_model::Model> for DepartmentSummary {
    fn from(model: &department_model::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            contact_info: model.contact(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentComplaintStats {
    pub total: u64,
    pub by_status: BTreeMap<String, i64>,
    pub average_rating: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStatsResponse {
    pub department: DepartmentSummary,
    pub complaints: DepartmentComplaintStats,
    pub performance: PerformanceResponse,
    pub active_staff_count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SlaResponse {
    pub department: Uuid,
    #[serde(flatten)]
    pub target: SlaTarget,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_body() -> serde_json::Value {
        json!({
            "name": "Water Department",
            "description": "Water supply and quality",
            "categories": ["water", "drainage"],
            "contactInfo": {
                "email": "water@city.gov",
                "phone": "+1-555-0101",
                "address": "1 Municipal Plaza"
            },
            "tags": ["Utilities", "utilities", " Water "]
        })
    }

    #[test]
    fn test_create_request_defaults_and_tags() {
        let request: CreateDepartmentRequest = serde_json::from_value(create_body()).unwrap();
        assert!(request.validate().is_ok());

        let new_department = NewDepartment::from(request);
        assert_eq!(new_department.tags, vec!["utilities", "water"]);
        assert!(new_department.working_hours.saturday.is_closed);
        assert_eq!(new_department.budget_allocated, 0.0);
    }

    #[test]
    fn test_contact_validation() {
        let mut body = create_body();
        body["contactInfo"]["email"] = json!("not-an-email");
        body["contactInfo"]["phone"] = json!("call me");
        let request: CreateDepartmentRequest = serde_json::from_value(body).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("contact_info"));
    }

    #[test]
    fn test_polygon_must_be_closed() {
        let open = PolygonGeometry {
            geometry_type: "Polygon".to_string(),
            coordinates: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]],
        };
        assert!(validate_polygon(&open).is_err());

        let closed = PolygonGeometry {
            geometry_type: "Polygon".to_string(),
            coordinates: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
        };
        assert!(validate_polygon(&closed).is_ok());
    }

    #[test]
    fn test_update_head_user_can_be_cleared() {
        let request: UpdateDepartmentRequest =
            serde_json::from_value(json!({ "headUserId": null })).unwrap();
        assert_eq!(request.head_user_id, Some(None));

        let untouched: UpdateDepartmentRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(untouched.head_user_id, None);
    }

    #[test]
    fn test_location_query_requires_both_coordinates() {
        let query = DepartmentLocationQuery {
            lat: Some(40.7),
            lng: None,
        };
        assert!(query.point().is_err());
    }
}
