// tests/common/test_data.rs

use axum::{http::StatusCode, Router};
use serde_json::{json, Value};

use super::request::{create_request, send};

pub const API: &str = "/api/v1";

pub fn department_payload(name: &str, categories: &[&str]) -> Value {
    json!({
        "name": name,
        "description": format!("{} handles municipal issues", name),
        "categories": categories,
        "contactInfo": {
            "email": "dept@city.gov",
            "phone": "+1-555-1000",
            "address": "1 City Hall Plaza"
        },
        "sla": categories.iter().map(|category| json!({
            "category": category,
            "responseTime": 8,
            "resolutionTime": 48,
            "emergencyResponseTime": 2
        })).collect::<Vec<_>>()
    })
}

pub fn complaint_payload(title: &str, category: &str, is_emergency: bool) -> Value {
    let mut payload = complaint_payload_at(title, category, -74.0060, 40.7128);
    payload["isEmergency"] = json!(is_emergency);
    payload
}

/// 任意の座標 `[lng, lat]` で苦情ペイロードを作る
pub fn complaint_payload_at(title: &str, category: &str, lng: f64, lat: f64) -> Value {
    json!({
        "title": title,
        "description": "Reported by a resident during the morning commute",
        "category": category,
        "priority": "low",
        "isEmergency": false,
        "location": {
            "coordinates": [lng, lat],
            "address": "123 Main Street",
            "city": "New York",
            "region": "NY"
        }
    })
}

/// 部署を作成して `data` を返す
pub async fn create_department(
    app: &Router,
    admin_token: &str,
    name: &str,
    categories: &[&str],
) -> Value {
    let (status, body) = send(
        app,
        create_request(
            "POST",
            &format!("{}/departments", API),
            admin_token,
            &department_payload(name, categories),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"].clone()
}

/// 苦情を作成して `data` を返す
pub async fn create_complaint(app: &Router, token: &str, title: &str, category: &str) -> Value {
    let (status, body) = send(
        app,
        create_request(
            "POST",
            &format!("{}/complaints", API),
            token,
            &complaint_payload(title, category, false),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"].clone()
}
