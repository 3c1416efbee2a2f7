// tests/complaint_api_tests.rs

mod common;

use axum::http::StatusCode;
use common::app_helper::setup_app;
use common::auth_helper::{create_admin, create_citizen, create_provider};
use common::request::{authed_get, create_request, public_get, send};
use common::test_data::{
    complaint_payload, complaint_payload_at, create_complaint, create_department, API,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn ids(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_complaint_routed_to_first_department_handling_category() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;

    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    let utilities = create_department(
        &app.router,
        &admin.access_token,
        "Utilities",
        &["water", "electricity"],
    )
    .await;
    create_department(&app.router, &admin.access_token, "Water Board", &["water"]).await;

    let complaint =
        create_complaint(&app.router, &citizen.access_token, "Burst pipe", "water").await;

    assert_eq!(complaint["department"], utilities["id"]);
    assert_eq!(complaint["departmentInfo"]["name"], "Utilities");
    assert_eq!(complaint["status"], "submitted");
    assert_eq!(complaint["submittedBy"], json!(citizen.id));
    assert_eq!(complaint["location"]["type"], "Point");
    assert_eq!(complaint["viewCount"], 0);
}

#[tokio::test]
async fn test_emergency_complaint_is_always_critical() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Utilities", &["water"]).await;

    let (status, body) = send(
        &app.router,
        create_request(
            "POST",
            &format!("{}/complaints", API),
            &citizen.access_token,
            &complaint_payload("Flooded basement", "water", true),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["priority"], "critical");
    assert_eq!(body["data"]["isEmergency"], true);

    // 更新で緊急にした場合も critical になる
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app.router,
        create_request(
            "PUT",
            &format!("{}/complaints/{}", API, id),
            &citizen.access_token,
            &json!({ "isEmergency": false, "priority": "low" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app.router,
        create_request(
            "PUT",
            &format!("{}/complaints/{}", API, id),
            &citizen.access_token,
            &json!({ "isEmergency": true }),
        ),
    )
    .await;
    assert_eq!(body["data"]["priority"], "critical");
}

#[tokio::test]
async fn test_no_department_for_category_returns_bad_request() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;

    let (status, body) = send(
        &app.router,
        create_request(
            "POST",
            &format!("{}/complaints", API),
            &citizen.access_token,
            &complaint_payload("Burst pipe", "water", true),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "no_department_for_category");
}

#[tokio::test]
async fn test_create_complaint_requires_authentication() {
    let app = setup_app().await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri(format!("{}/complaints", API))
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from(
            complaint_payload("Pothole", "roads", false).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "unauthorized");
}

#[tokio::test]
async fn test_create_complaint_validation_errors() {
    let app = setup_app().await;
    let citizen = create_citizen(&app.state).await;

    let mut payload = complaint_payload("", "roads", false);
    payload["location"]["coordinates"] = json!([200.0, 40.0]);

    let (status, body) = send(
        &app.router,
        create_request(
            "POST",
            &format!("{}/complaints", API),
            &citizen.access_token,
            &payload,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_errors");
    assert!(body["validation_errors"]["title"].is_array());
}

#[tokio::test]
async fn test_rating_requires_resolved_status() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    let complaint = create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;
    let id = complaint["id"].as_str().unwrap();

    let rate = json!({ "rating": 5, "feedback": "Fixed quickly" });
    let (status, body) = send(
        &app.router,
        create_request(
            "POST",
            &format!("{}/complaints/{}/rate", API, id),
            &citizen.access_token,
            &rate,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "complaint_not_resolved");

    let (status, body) = send(
        &app.router,
        create_request(
            "PUT",
            &format!("{}/complaints/{}", API, id),
            &admin.access_token,
            &json!({ "status": "resolved" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "resolved");
    assert!(body["data"]["resolvedAt"].is_string());

    let (status, body) = send(
        &app.router,
        create_request(
            "POST",
            &format!("{}/complaints/{}/rate", API, id),
            &citizen.access_token,
            &rate,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating"], 5);
    assert_eq!(body["data"]["feedback"], "Fixed quickly");
}

#[tokio::test]
async fn test_rating_out_of_range_is_rejected() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    let complaint = create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;

    let (status, body) = send(
        &app.router,
        create_request(
            "POST",
            &format!("{}/complaints/{}/rate", API, complaint["id"].as_str().unwrap()),
            &citizen.access_token,
            &json!({ "rating": 6 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["validation_errors"]["rating"].is_array());
}

#[tokio::test]
async fn test_assignment_requires_provider_and_sets_under_review() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    let provider = create_provider(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    let complaint = create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;
    let uri = format!("{}/complaints/{}/assign", API, complaint["id"].as_str().unwrap());

    // 市民は割り当てできない
    let (status, _) = send(
        &app.router,
        create_request(
            "PUT",
            &uri,
            &citizen.access_token,
            &json!({ "assignedTo": provider.id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 割り当て先はプロバイダーのみ
    let (status, body) = send(
        &app.router,
        create_request(
            "PUT",
            &uri,
            &admin.access_token,
            &json!({ "assignedTo": citizen.id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_assignee");

    let (status, body) = send(
        &app.router,
        create_request(
            "PUT",
            &uri,
            &admin.access_token,
            &json!({ "assignedTo": provider.id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "under_review");
    assert_eq!(body["data"]["assignedTo"], json!(provider.id));
    assert_eq!(body["data"]["assignee"]["id"], json!(provider.id));

    // 割り当てられた苦情の一覧
    let (status, body) = send(
        &app.router,
        authed_get(&format!("{}/complaints/assigned", API), &provider.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_concurrent_assignments_end_in_one_of_the_writes() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    let first = create_provider(&app.state).await;
    let second = create_provider(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    let complaint = create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;
    let id = complaint["id"].as_str().unwrap().to_string();
    let uri = format!("{}/complaints/{}/assign", API, id);

    let request_a = create_request(
        "PUT",
        &uri,
        &admin.access_token,
        &json!({ "assignedTo": first.id }),
    );
    let request_b = create_request(
        "PUT",
        &uri,
        &admin.access_token,
        &json!({ "assignedTo": second.id }),
    );
    let (a, b) = tokio::join!(
        app.router.clone().oneshot(request_a),
        app.router.clone().oneshot(request_b)
    );
    assert_eq!(a.unwrap().status(), StatusCode::OK);
    assert_eq!(b.unwrap().status(), StatusCode::OK);

    let (_, body) = send(
        &app.router,
        authed_get(&format!("{}/complaints/{}", API, id), &admin.access_token),
    )
    .await;
    let assigned = body["data"]["assignedTo"].clone();
    assert!(assigned == json!(first.id) || assigned == json!(second.id));
    assert_eq!(body["data"]["status"], "under_review");
}

#[tokio::test]
async fn test_pagination_second_page_follows_created_at_order() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;

    for i in 0..30 {
        create_complaint(
            &app.router,
            &citizen.access_token,
            &format!("Pothole #{}", i),
            "roads",
        )
        .await;
    }

    let (status, all) = send(
        &app.router,
        public_get(&format!("{}/complaints?limit=100&sort=-createdAt", API)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["total"], 30);
    let ordered = ids(&all["data"]);

    let (status, page_two) = send(
        &app.router,
        public_get(&format!("{}/complaints?page=2&limit=25", API)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page_two["count"], 5);
    assert_eq!(page_two["total"], 30);
    assert_eq!(ids(&page_two["data"]), ordered[25..].to_vec());
    assert_eq!(page_two["pagination"]["prev"]["page"], 1);
    assert!(page_two["pagination"].get("next").is_none());

    let (_, page_one) = send(
        &app.router,
        public_get(&format!("{}/complaints?page=1&limit=25", API)),
    )
    .await;
    assert_eq!(page_one["pagination"]["next"]["page"], 2);
    assert_eq!(ids(&page_one["data"]), ordered[..25].to_vec());
}

#[tokio::test]
async fn test_list_filters_and_sort_validation() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(
        &app.router,
        &admin.access_token,
        "Public Works",
        &["roads", "water"],
    )
    .await;
    create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;
    create_complaint(&app.router, &citizen.access_token, "Leak", "water").await;

    let (_, body) = send(
        &app.router,
        public_get(&format!("{}/complaints?category=water", API)),
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "Leak");

    let (_, body) = send(
        &app.router,
        public_get(&format!("{}/complaints?sort=title", API)),
    )
    .await;
    assert_eq!(body["data"][0]["title"], "Leak");
    assert_eq!(body["data"][1]["title"], "Pothole");

    let (status, body) = send(
        &app.router,
        public_get(&format!("{}/complaints?sort=password", API)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");

    // 半径検索（NYC周辺）
    let (_, body) = send(
        &app.router,
        public_get(&format!(
            "{}/complaints?lat=40.7128&lng=-74.0060&radius=1",
            API
        )),
    )
    .await;
    assert_eq!(body["total"], 2);

    let (_, body) = send(
        &app.router,
        public_get(&format!(
            "{}/complaints?lat=51.5074&lng=-0.1278&radius=5",
            API
        )),
    )
    .await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_radius_search_across_dateline_and_high_latitudes() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;

    for (title, lng, lat) in [
        ("Dateline east", 179.9, 0.0),
        ("Dateline west", -179.9, 0.0),
        ("Arctic", 41.0, 75.1),
        ("Greenwich", 0.0, 0.0),
    ] {
        let (status, body) = send(
            &app.router,
            create_request(
                "POST",
                &format!("{}/complaints", API),
                &citizen.access_token,
                &complaint_payload_at(title, "roads", lng, lat),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let titles = |body: &Value| -> Vec<String> {
        let mut titles: Vec<String> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["title"].as_str().unwrap().to_string())
            .collect();
        titles.sort();
        titles
    };

    // 日付変更線の両側
    let (_, body) = send(
        &app.router,
        public_get(&format!("{}/complaints?lat=0&lng=179.95&radius=50", API)),
    )
    .await;
    assert_eq!(body["total"], 2);
    assert_eq!(titles(&body), vec!["Dateline east", "Dateline west"]);

    let (status, body) = send(
        &app.router,
        public_get(&format!(
            "{}/complaints/location?lat=0&lng=-179.95&radius=50",
            API
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    // 高緯度では経度方向の幅が広がる（約1444km）
    let (_, body) = send(
        &app.router,
        public_get(&format!("{}/complaints?lat=70&lng=0&radius=1500", API)),
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(titles(&body), vec!["Arctic"]);

    // 極を越える円
    let (_, body) = send(
        &app.router,
        public_get(&format!(
            "{}/complaints/location?lat=85&lng=-139&radius=2500",
            API
        )),
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "Arctic");

    // 地球半周を超える半径は全件
    let (_, body) = send(
        &app.router,
        public_get(&format!("{}/complaints?lat=0&lng=0&radius=20100", API)),
    )
    .await;
    assert_eq!(body["total"], 4);
}

#[tokio::test]
async fn test_location_query_requires_coordinates() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;

    let (status, _) = send(
        &app.router,
        public_get(&format!("{}/complaints/location?lat=40.7", API)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app.router,
        public_get(&format!(
            "{}/complaints/location?lat=40.7130&lng=-74.0062",
            API
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_viewing_increments_view_count_by_one() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    let complaint = create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;
    let uri = format!("{}/complaints/{}", API, complaint["id"].as_str().unwrap());

    for expected in 1..=3 {
        let (status, body) = send(&app.router, authed_get(&uri, &citizen.access_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["viewCount"], expected);
    }
}

#[tokio::test]
async fn test_update_log_permissions_and_internal_visibility() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    let provider = create_provider(&app.state).await;
    let other_provider = create_provider(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    let complaint = create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;
    let id = complaint["id"].as_str().unwrap();
    let updates_uri = format!("{}/complaints/{}/updates", API, id);

    // 市民は更新ログを追加できない
    let (status, _) = send(
        &app.router,
        create_request(
            "POST",
            &updates_uri,
            &citizen.access_token,
            &json!({ "message": "Any news?" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    send(
        &app.router,
        create_request(
            "PUT",
            &format!("{}/complaints/{}/assign", API, id),
            &admin.access_token,
            &json!({ "assignedTo": provider.id }),
        ),
    )
    .await;

    // 担当外のプロバイダーは追加できない
    let (status, _) = send(
        &app.router,
        create_request(
            "POST",
            &updates_uri,
            &other_provider.access_token,
            &json!({ "message": "On it" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app.router,
        create_request(
            "POST",
            &updates_uri,
            &provider.access_token,
            &json!({ "message": "Crew dispatched" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app.router,
        create_request(
            "POST",
            &updates_uri,
            &provider.access_token,
            &json!({ "message": "Needs asphalt order", "isInternal": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updates"].as_array().unwrap().len(), 2);

    let uri = format!("{}/complaints/{}", API, id);
    let (_, body) = send(&app.router, authed_get(&uri, &citizen.access_token)).await;
    let updates = body["data"]["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["message"], "Crew dispatched");

    let (_, body) = send(&app.router, authed_get(&uri, &admin.access_token)).await;
    assert_eq!(body["data"]["updates"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_owner_only_update_delete_and_attachments() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let owner = create_citizen(&app.state).await;
    let stranger = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    let complaint = create_complaint(&app.router, &owner.access_token, "Pothole", "roads").await;
    let uri = format!("{}/complaints/{}", API, complaint["id"].as_str().unwrap());

    let (status, _) = send(
        &app.router,
        create_request("PUT", &uri, &stranger.access_token, &json!({ "title": "Mine" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let attachment = json!({
        "filename": "pothole.jpg",
        "url": "https://cdn.example.com/pothole.jpg",
        "type": "image",
        "size": 2048
    });
    let (status, body) = send(
        &app.router,
        create_request(
            "POST",
            &format!("{}/attachments", uri),
            &owner.access_token,
            &attachment,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["attachments"][0]["filename"], "pothole.jpg");

    let (status, _) = send(
        &app.router,
        common::request::authed_delete(&uri, &stranger.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app.router,
        common::request::authed_delete(&uri, &owner.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app.router, authed_get(&uri, &owner.access_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_my_complaints_only_lists_own_submissions() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let alice = create_citizen(&app.state).await;
    let bob = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    create_complaint(&app.router, &alice.access_token, "Pothole", "roads").await;
    create_complaint(&app.router, &alice.access_token, "Cracked curb", "roads").await;
    create_complaint(&app.router, &bob.access_token, "Sinkhole", "roads").await;

    let (status, body) = send(
        &app.router,
        authed_get(&format!("{}/complaints/my", API), &alice.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    // 市民は割り当て一覧を見られない
    let (status, _) = send(
        &app.router,
        authed_get(&format!("{}/complaints/assigned", API), &alice.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_complaint_id_is_bad_request() {
    let app = setup_app().await;
    let citizen = create_citizen(&app.state).await;

    let (status, body) = send(
        &app.router,
        authed_get(&format!("{}/complaints/not-a-uuid", API), &citizen.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_analytics_overview() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(
        &app.router,
        &admin.access_token,
        "Public Works",
        &["roads", "water"],
    )
    .await;
    let pothole = create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;
    create_complaint(&app.router, &citizen.access_token, "Leak", "water").await;
    send(
        &app.router,
        create_request(
            "PUT",
            &format!("{}/complaints/{}", API, pothole["id"].as_str().unwrap()),
            &admin.access_token,
            &json!({ "status": "resolved" }),
        ),
    )
    .await;

    let (status, body) = send(&app.router, public_get(&format!("{}/complaints/analytics", API))).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["totalComplaints"], 2);
    assert_eq!(data["resolvedComplaints"], 1);
    assert_eq!(data["resolutionRate"], 50.0);
    assert_eq!(data["categoryStats"].as_array().unwrap().len(), 2);
    assert_eq!(data["monthlyTrends"][0]["complaints"], 2);
    assert_eq!(data["monthlyTrends"][0]["resolved"], 1);
}
