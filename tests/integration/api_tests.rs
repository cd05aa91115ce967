//! API integration tests: bookings, slots and shifts over HTTP

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::spawn_app;

const DAY: &str = "2025-01-13";

fn booking(app: &common::TestApp, staff: usize, start_at: &str, phone: &str) -> Value {
    json!({
        "service_id": app.service_id,
        "staff_id": app.staff_ids[staff],
        "start_at": start_at,
        "customer_phone": phone,
        "customer_name": "Jane",
        "customer_email": "jane@example.com"
    })
}

fn shift(app: &common::TestApp, staff: usize, start: &str, end: &str) -> Value {
    json!({
        "staff_id": app.staff_ids[staff],
        "shift_date": DAY,
        "start_time": start,
        "end_time": end,
        "created_by": "manager"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_booking_conflicts() {
    let app = spawn_app().await;
    let path = format!("/businesses/{}/bookings", app.business_id);

    let (status, first) = app
        .post(&path, booking(&app, 0, "2025-01-13T10:00:00Z", "555-0100"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["end_at"], "2025-01-13T10:30:00Z");

    // Same slot again
    let (status, body) = app
        .post(&path, booking(&app, 0, "2025-01-13T10:00:00Z", "555-0101"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "SlotUnavailable");

    // Partial overlap
    let (status, _) = app
        .post(&path, booking(&app, 0, "2025-01-13T10:15:00Z", "555-0101"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Back to back is fine
    let (status, _) = app
        .post(&path, booking(&app, 0, "2025-01-13T10:30:00Z", "555-0101"))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Other staff member, same time
    let (status, _) = app
        .post(&path, booking(&app, 1, "2025-01-13T10:00:00Z", "555-0102"))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, list) = app.get(&format!("{}?start_date={}&end_date={}", path, DAY, DAY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_returning_client_is_reused() {
    let app = spawn_app().await;
    let path = format!("/businesses/{}/bookings", app.business_id);

    let (_, a) = app
        .post(&path, booking(&app, 0, "2025-01-13T09:00:00Z", "555-0199"))
        .await;
    let (_, b) = app
        .post(&path, booking(&app, 0, "2025-01-13T11:00:00Z", "555-0199"))
        .await;
    assert_eq!(a["client_id"], b["client_id"]);
}

#[tokio::test]
async fn test_booking_ownership_and_validation() {
    let app = spawn_app().await;
    let path = format!("/businesses/{}/bookings", app.business_id);

    let mut body = booking(&app, 0, "2025-01-13T10:00:00Z", "555-0100");
    body["service_id"] = json!(app.foreign_service_id);
    let (status, body) = app.post(&path, body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotOwned");

    let mut body = booking(&app, 0, "2025-01-13T10:00:00Z", "555-0100");
    body["staff_id"] = json!(uuid::Uuid::new_v4());
    let (status, _) = app.post(&path, body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut body = booking(&app, 0, "2025-01-13T10:00:00Z", "555-0100");
    body["customer_email"] = json!("not-an-email");
    let (status, _) = app.post(&path, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_booking_frees_slot() {
    let app = spawn_app().await;
    let path = format!("/businesses/{}/bookings", app.business_id);

    let (_, created) = app
        .post(&path, booking(&app, 0, "2025-01-13T10:00:00Z", "555-0100"))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = app
        .call(axum::http::Method::DELETE, &format!("{}/{}", path, id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .post(&path, booking(&app, 0, "2025-01-13T10:00:00Z", "555-0100"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_slots_skip_bookings() {
    let app = spawn_app().await;
    let (status, _) = app.post("/schedules/shifts", shift(&app, 0, "09:00", "12:00")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post(
            &format!("/businesses/{}/bookings", app.business_id),
            booking(&app, 0, "2025-01-13T10:00:00Z", "555-0100"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, slots) = app
        .get(&format!(
            "/businesses/{}/slots?day={}&staff_id={}",
            app.business_id, DAY, app.staff_ids[0]
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let starts: Vec<&str> = slots
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_str().unwrap())
        .collect();
    assert_eq!(
        starts,
        vec![
            "2025-01-13T09:00:00Z",
            "2025-01-13T09:15:00Z",
            "2025-01-13T09:30:00Z",
            "2025-01-13T10:30:00Z",
            "2025-01-13T10:45:00Z",
            "2025-01-13T11:00:00Z",
            "2025-01-13T11:15:00Z",
            "2025-01-13T11:30:00Z",
        ]
    );
}

#[tokio::test]
async fn test_slots_use_service_duration() {
    let app = spawn_app().await;
    app.post("/schedules/shifts", shift(&app, 0, "09:00", "10:00")).await;

    let (_, slots) = app
        .get(&format!(
            "/businesses/{}/slots?day={}&staff_id={}&service_id={}",
            app.business_id, DAY, app.staff_ids[0], app.service_id
        ))
        .await;
    // 30 minute service in a one hour shift, 15 minute step
    assert_eq!(slots.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_shift_overlap_rules() {
    let app = spawn_app().await;

    let (status, _) = app.post("/schedules/shifts", shift(&app, 0, "09:00", "13:00")).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.post("/schedules/shifts", shift(&app, 0, "13:00", "17:00")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/schedules/shifts", shift(&app, 0, "12:00", "14:00")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().starts_with("shift conflicts with existing shift"));

    // Another staff member is unaffected
    let (status, _) = app.post("/schedules/shifts", shift(&app, 1, "12:00", "14:00")).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_shift_validation() {
    let app = spawn_app().await;

    let (status, _) = app.post("/schedules/shifts", shift(&app, 0, "9am", "17:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/schedules/shifts", shift(&app, 0, "17:00", "09:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = shift(&app, 0, "09:00", "17:00");
    body["break_start"] = json!("08:00");
    body["break_end"] = json!("09:30");
    let (status, _) = app.post("/schedules/shifts", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_day_schedule_hours_exclude_break() {
    let app = spawn_app().await;
    let mut body = shift(&app, 0, "09:00", "18:00");
    body["break_start"] = json!("12:00");
    body["break_end"] = json!("13:00");
    let (status, created) = app.post("/schedules/shifts", body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["break_start"], "12:00");

    let (status, day) = app
        .get(&format!("/staff/{}/schedule/day?date={}", app.staff_ids[0], DAY))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["total_hours"], 8.0);
    assert_eq!(day["day_of_week"], "Monday");
}

#[tokio::test]
async fn test_check_availability_reports_reason() {
    let app = spawn_app().await;
    let mut body = shift(&app, 0, "09:00", "18:00");
    body["break_start"] = json!("12:00");
    body["break_end"] = json!("13:00");
    app.post("/schedules/shifts", body).await;

    let base = format!("/staff/{}/availability?date={}", app.staff_ids[0], DAY);

    let (status, free) = app.get(&format!("{}&start_time=10:00&end_time=11:00", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(free["is_available"], true);

    let (_, on_break) = app.get(&format!("{}&start_time=12:30&end_time=13:30", base)).await;
    assert_eq!(on_break["is_available"], false);
    assert_eq!(on_break["reason"], "requested time overlaps a break");

    let (_, available) = app
        .get(&format!(
            "/businesses/{}/available-staff?date={}&start_time=10:00&end_time=11:00",
            app.business_id, DAY
        ))
        .await;
    let available = available.as_array().unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0]["staff_id"], json!(app.staff_ids[0]));
}

#[tokio::test]
async fn test_bulk_delete_is_all_or_nothing() {
    let app = spawn_app().await;
    let (_, created) = app.post("/schedules/shifts", shift(&app, 0, "09:00", "12:00")).await;
    let id = created["id"].clone();

    let (status, _) = app
        .post(
            "/schedules/shifts/bulk-delete",
            json!({ "shift_ids": [id, uuid::Uuid::new_v4()], "action_by": "manager" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get(&format!("/schedules/shifts/{}", id.as_str().unwrap())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/schedules/shifts/bulk-delete",
            json!({ "shift_ids": [id], "action_by": "manager" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_bulk_update_reports_each_item() {
    let app = spawn_app().await;
    let (_, morning) = app.post("/schedules/shifts", shift(&app, 0, "09:00", "12:00")).await;
    let (_, afternoon) = app.post("/schedules/shifts", shift(&app, 0, "13:00", "17:00")).await;

    let (status, results) = app
        .put(
            "/schedules/shifts/bulk",
            json!({
                "updates": [
                    { "shift_id": morning["id"], "update": { "end_time": "12:30", "updated_by": "manager" } },
                    { "shift_id": afternoon["id"], "update": { "start_time": "11:00", "updated_by": "manager" } }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let results = results.as_array().unwrap();
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["shift"]["end_time"], "12:30");
    assert_eq!(results[1]["success"], false);
    assert!(results[1]["error"].is_string());
}

#[tokio::test]
async fn test_disable_shift_is_logged() {
    let app = spawn_app().await;
    let (_, created) = app.post("/schedules/shifts", shift(&app, 0, "09:00", "17:00")).await;
    let id = created["id"].as_str().unwrap();

    let (status, disabled) = app
        .put(
            &format!("/schedules/shifts/{}/availability", id),
            json!({ "is_available": false, "reason": "sick", "action_by": "manager" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(disabled["is_available"], false);
    assert_eq!(disabled["is_manually_disabled"], true);

    let (status, logs) = app
        .get(&format!("/staff/{}/availability-logs", app.staff_ids[0]))
        .await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"disabled"));
    assert!(actions.contains(&"shift_created"));

    // A disabled shift gives no slots
    let (_, slots) = app
        .get(&format!(
            "/businesses/{}/slots?day={}&staff_id={}",
            app.business_id, DAY, app.staff_ids[0]
        ))
        .await;
    assert!(slots.as_array().unwrap().is_empty());
}
