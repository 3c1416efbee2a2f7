// tests/realtime_tests.rs

mod common;

use common::app_helper::setup_app;
use common::auth_helper::{create_admin, create_citizen, create_provider};
use common::request::{create_request, send};
use common::test_data::{complaint_payload, create_complaint, create_department, API};
use complaint_backend::api::handlers::realtime_handler::admit_room;
use complaint_backend::domain::complaint_status::ComplaintStatus;
use complaint_backend::domain::user_role::UserRole;
use complaint_backend::service::notification_service::{RealtimeEvent, Room};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

async fn next_event(receiver: &mut broadcast::Receiver<Arc<RealtimeEvent>>) -> Arc<RealtimeEvent> {
    tokio::time::timeout(Duration::from_secs(2), receiver.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed")
}

fn assert_silent(receiver: &mut broadcast::Receiver<Arc<RealtimeEvent>>) {
    assert!(matches!(
        receiver.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn test_new_complaint_reaches_admin_room_only() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;

    let mut admins = app.state.notifications.subscribe(Room::Role(UserRole::Admin)).await;
    let mut providers = app
        .state
        .notifications
        .subscribe(Room::Role(UserRole::Provider))
        .await;

    let complaint = create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;

    match next_event(&mut admins).await.as_ref() {
        RealtimeEvent::NewComplaint(notice) => {
            assert_eq!(notice.complaint.id.to_string(), complaint["id"].as_str().unwrap());
            assert_eq!(notice.message, "New complaint submitted");
        }
        other => panic!("unexpected event: {}", other.name()),
    }
    assert_silent(&mut providers);
}

#[tokio::test]
async fn test_emergency_complaint_alerts_providers() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Utilities", &["water"]).await;

    let mut admins = app.state.notifications.subscribe(Room::Role(UserRole::Admin)).await;
    let mut providers = app
        .state
        .notifications
        .subscribe(Room::Role(UserRole::Provider))
        .await;

    let (status, _) = send(
        &app.router,
        create_request(
            "POST",
            &format!("{}/complaints", API),
            &citizen.access_token,
            &complaint_payload("Main burst", "water", true),
        ),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::CREATED);

    match next_event(&mut admins).await.as_ref() {
        RealtimeEvent::NewComplaint(notice) => {
            assert!(notice.complaint.is_emergency);
            assert_eq!(notice.message, "New emergency complaint submitted");
        }
        other => panic!("unexpected event: {}", other.name()),
    }
    match next_event(&mut providers).await.as_ref() {
        RealtimeEvent::EmergencyComplaint(notice) => {
            assert_eq!(notice.complaint.title, "Main burst");
        }
        other => panic!("unexpected event: {}", other.name()),
    }
}

#[tokio::test]
async fn test_complaint_room_receives_updates_status_and_assignment() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    let provider = create_provider(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    let complaint = create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;
    let id: Uuid = complaint["id"].as_str().unwrap().parse().unwrap();

    let mut room = app.state.notifications.subscribe(Room::Complaint(id)).await;
    let mut citizens = app
        .state
        .notifications
        .subscribe(Room::Role(UserRole::Citizen))
        .await;
    let mut other_room = app
        .state
        .notifications
        .subscribe(Room::Complaint(Uuid::new_v4()))
        .await;

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
    match next_event(&mut room).await.as_ref() {
        RealtimeEvent::AssignmentUpdate(notice) => {
            assert_eq!(notice.assigned_to, provider.id);
            assert_eq!(notice.complaint.status, ComplaintStatus::UnderReview);
        }
        other => panic!("unexpected event: {}", other.name()),
    }

    send(
        &app.router,
        create_request(
            "POST",
            &format!("{}/complaints/{}/updates", API, id),
            &provider.access_token,
            &json!({ "message": "Crew dispatched" }),
        ),
    )
    .await;
    match next_event(&mut room).await.as_ref() {
        RealtimeEvent::NewUpdate(notice) => {
            assert_eq!(notice.complaint, id);
            assert_eq!(notice.update.message, "Crew dispatched");
        }
        other => panic!("unexpected event: {}", other.name()),
    }

    send(
        &app.router,
        create_request(
            "PUT",
            &format!("{}/complaints/{}", API, id),
            &admin.access_token,
            &json!({ "status": "in_progress" }),
        ),
    )
    .await;
    match next_event(&mut room).await.as_ref() {
        RealtimeEvent::StatusUpdate(notice) => {
            assert_eq!(notice.old_status, ComplaintStatus::UnderReview);
            assert_eq!(notice.new_status, ComplaintStatus::InProgress);
        }
        other => panic!("unexpected event: {}", other.name()),
    }
    match next_event(&mut citizens).await.as_ref() {
        RealtimeEvent::ComplaintUpdate(notice) => {
            assert_eq!(notice.complaint_id, id);
            assert_eq!(notice.status, ComplaintStatus::InProgress);
        }
        other => panic!("unexpected event: {}", other.name()),
    }

    assert_silent(&mut other_room);
}

#[tokio::test]
async fn test_update_without_status_change_publishes_nothing() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    let complaint = create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;
    let id: Uuid = complaint["id"].as_str().unwrap().parse().unwrap();

    let mut room = app.state.notifications.subscribe(Room::Complaint(id)).await;

    let (status, _) = send(
        &app.router,
        create_request(
            "PUT",
            &format!("{}/complaints/{}", API, id),
            &citizen.access_token,
            &json!({ "title": "Deep pothole", "status": "submitted" }),
        ),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);

    assert_silent(&mut room);
}

#[tokio::test]
async fn test_complaint_rooms_require_existing_complaint() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    create_department(&app.router, &admin.access_token, "Roads", &["roads"]).await;
    let complaint = create_complaint(&app.router, &citizen.access_token, "Pothole", "roads").await;
    let id: Uuid = complaint["id"].as_str().unwrap().parse().unwrap();

    assert!(admit_room(&app.state, Room::Complaint(id)).await);
    assert!(admit_room(&app.state, Room::Role(UserRole::Provider)).await);

    for _ in 0..50 {
        assert!(!admit_room(&app.state, Room::Complaint(Uuid::new_v4())).await);
    }
    assert_eq!(app.state.notifications.room_count().await, 0);
}
