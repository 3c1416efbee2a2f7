// complaint-backend/src/domain/department_model.rs

use super::complaint_category::ComplaintCategory;
use super::geo::{polygon_contains, GeoPoint};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub categories: Json,
    pub contact_info: Json,
    pub working_hours: Json,
    pub sla: Json,
    pub service_areas: Json,
    pub tags: Json,
    #[sea_orm(nullable)]
    pub head_user_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub budget_annual: Option<f64>,
    pub budget_allocated: f64,
    pub budget_spent: f64,
    pub average_response_time: f64,
    pub average_resolution_time: f64,
    pub satisfaction_rating: f64,
    pub total_complaints_handled: i32,
    pub resolved_complaints: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::department_staff_model::Entity")]
    Staff,
    #[sea_orm(has_many = "super::complaint_model::Entity")]
    Complaints,
}

impl Related<super::department_staff_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl Related<super::complaint_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Complaints.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            budget_allocated: Set(0.0),
            budget_spent: Set(0.0),
            average_response_time: Set(0.0),
            average_resolution_time: Set(0.0),
            satisfaction_rating: Set(0.0),
            total_complaints_handled: Set(0),
            resolved_complaints: Set(0),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

// --- JSONカラムに保持する値オブジェクト ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub is_closed: bool,
}

impl DaySchedule {
    fn open(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            is_closed: false,
        }
    }

    fn closed() -> Self {
        Self {
            start: String::new(),
            end: String::new(),
            is_closed: true,
        }
    }
}

/// 週間の営業時間表。未指定の曜日は平日9-17時、土日休み。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    #[serde(default = "weekday_default")]
    pub monday: DaySchedule,
    #[serde(default = "weekday_default")]
    pub tuesday: DaySchedule,
    #[serde(default = "weekday_default")]
    pub wednesday: DaySchedule,
    #[serde(default = "weekday_default")]
    pub thursday: DaySchedule,
    #[serde(default = "weekday_default")]
    pub friday: DaySchedule,
    #[serde(default = "DaySchedule::closed")]
    pub saturday: DaySchedule,
    #[serde(default = "DaySchedule::closed")]
    pub sunday: DaySchedule,
}

fn weekday_default() -> DaySchedule {
    DaySchedule::open("09:00", "17:00")
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            monday: weekday_default(),
            tuesday: weekday_default(),
            wednesday: weekday_default(),
            thursday: weekday_default(),
            friday: weekday_default(),
            saturday: DaySchedule::closed(),
            sunday: DaySchedule::closed(),
        }
    }
}

impl WorkingHours {
    pub fn days(&self) -> [(&'static str, &DaySchedule); 7] {
        [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
            ("sunday", &self.sunday),
        ]
    }
}

/// カテゴリごとのSLA目標（単位: 時間）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaTarget {
    pub category: ComplaintCategory,
    pub response_time: f64,
    pub resolution_time: f64,
    pub emergency_response_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type", default = "polygon_type")]
    pub geometry_type: String,
    /// GeoJSON互換: 外周リング + 穴。各点は `[lng, lat]`。
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

fn polygon_type() -> String {
    "Polygon".to_string()
}

impl PolygonGeometry {
    /// 外周に含まれ、どの穴にも含まれない
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let Some((outer, holes)) = self.coordinates.split_first() else {
            return false;
        };
        polygon_contains(outer, point) && !holes.iter().any(|hole| polygon_contains(hole, point))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceArea {
    pub name: String,
    pub boundaries: PolygonGeometry,
}

// --- JSONカラムのデコードと派生値 ---

impl Model {
    pub fn category_list(&self) -> Vec<ComplaintCategory> {
        serde_json::from_value(self.categories.clone()).unwrap_or_default()
    }

    /// 指定カテゴリを担当しているか
    pub fn handles_category(&self, category: ComplaintCategory) -> bool {
        self.category_list().contains(&category)
    }

    pub fn contact(&self) -> Option<ContactInfo> {
        serde_json::from_value(self.contact_info.clone()).ok()
    }

    pub fn schedule(&self) -> WorkingHours {
        serde_json::from_value(self.working_hours.clone()).unwrap_or_default()
    }

    pub fn sla_targets(&self) -> Vec<SlaTarget> {
        serde_json::from_value(self.sla.clone()).unwrap_or_default()
    }

    /// カテゴリのSLAを取得
    pub fn get_sla(&self, category: ComplaintCategory) -> Option<SlaTarget> {
        self.sla_targets()
            .into_iter()
            .find(|target| target.category == category)
    }

    pub fn service_area_list(&self) -> Vec<ServiceArea> {
        serde_json::from_value(self.service_areas.clone()).unwrap_or_default()
    }

    /// サービスエリアのいずれかに点が含まれるか
    pub fn covers_location(&self, point: &GeoPoint) -> bool {
        self.service_area_list()
            .iter()
            .any(|area| area.boundaries.contains(point))
    }

    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_value(self.tags.clone()).unwrap_or_default()
    }

    /// 解決率（%）
    pub fn resolution_rate(&self) -> f64 {
        if self.total_complaints_handled == 0 {
            return 0.0;
        }
        f64::from(self.resolved_complaints) / f64::from(self.total_complaints_handled) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_model() -> Model {
        Model {
            id: Uuid::new_v4(),
            name: "Water & Utilities Department".to_string(),
            description: "Managing water supply".to_string(),
            categories: json!(["water", "sanitation"]),
            contact_info: json!({
                "email": "water@city.gov",
                "phone": "+1-555-2000",
                "address": "456 Utility Street"
            }),
            working_hours: json!({ "saturday": { "start": "08:00", "end": "12:00", "isClosed": false } }),
            sla: json!([
                { "category": "water", "responseTime": 4.0, "resolutionTime": 24.0, "emergencyResponseTime": 1.0 }
            ]),
            service_areas: json!([
                {
                    "name": "Downtown",
                    "boundaries": {
                        "type": "Polygon",
                        "coordinates": [[[-74.1, 40.6], [-73.9, 40.6], [-73.9, 40.8], [-74.1, 40.8], [-74.1, 40.6]]]
                    }
                }
            ]),
            tags: json!(["utilities"]),
            head_user_id: None,
            budget_annual: Some(1_000_000.0),
            budget_allocated: 0.0,
            budget_spent: 0.0,
            average_response_time: 0.0,
            average_resolution_time: 0.0,
            satisfaction_rating: 0.0,
            total_complaints_handled: 4,
            resolved_complaints: 1,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_handles_category() {
        let model = sample_model();
        assert!(model.handles_category(ComplaintCategory::Water));
        assert!(model.handles_category(ComplaintCategory::Sanitation));
        assert!(!model.handles_category(ComplaintCategory::Roads));
    }

    #[test]
    fn test_get_sla() {
        let model = sample_model();
        let sla = model.get_sla(ComplaintCategory::Water).unwrap();
        assert_eq!(sla.response_time, 4.0);
        assert!(model.get_sla(ComplaintCategory::Sanitation).is_none());
    }

    #[test]
    fn test_working_hours_defaults_fill_missing_days() {
        let hours = sample_model().schedule();
        assert_eq!(hours.monday.start, "09:00");
        assert!(!hours.saturday.is_closed);
        assert!(hours.sunday.is_closed);
    }

    #[test]
    fn test_covers_location() {
        let model = sample_model();
        assert!(model.covers_location(&GeoPoint::new(40.7128, -74.0060)));
        assert!(!model.covers_location(&GeoPoint::new(34.05, -118.24)));
    }

    #[test]
    fn test_resolution_rate() {
        let mut model = sample_model();
        assert_eq!(model.resolution_rate(), 25.0);
        model.total_complaints_handled = 0;
        assert_eq!(model.resolution_rate(), 0.0);
    }
}
