//! Schedule generation, copy, time off and conflict detection over HTTP

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{spawn_app, TestApp};

/// Monday to Friday, 09:00-17:00 with a lunch break
fn weekday_schedule() -> Value {
    let off = json!({ "is_working_day": false });
    let work = json!({
        "is_working_day": true,
        "start_time": "09:00",
        "end_time": "17:00",
        "break_start": "12:00",
        "break_end": "13:00"
    });
    json!([off, work, work, work, work, work, off])
}

async fn create_default_template(app: &TestApp, staff: usize) -> Value {
    let (status, template) = app
        .post(
            "/schedules/templates",
            json!({
                "staff_id": app.staff_ids[staff],
                "name": "Standard week",
                "is_default": true,
                "schedule": weekday_schedule()
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    template
}

async fn generate(app: &TestApp, start: &str, end: &str) -> (StatusCode, Value) {
    app.post(
        "/schedules/generate",
        json!({
            "staff_ids": [app.staff_ids[0]],
            "start_date": start,
            "end_date": end,
            "generated_by": "manager"
        }),
    )
    .await
}

async fn shifts_between(app: &TestApp, start: &str, end: &str) -> Vec<Value> {
    let (status, shifts) = app
        .get(&format!(
            "/staff/{}/shifts?start_date={}&end_date={}",
            app.staff_ids[0], start, end
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    shifts.as_array().unwrap().clone()
}

#[tokio::test]
async fn test_generate_is_idempotent() {
    let app = spawn_app().await;
    create_default_template(&app, 0).await;

    let (status, body) = generate(&app, "2025-01-13", "2025-01-19").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 5);

    let (status, body) = generate(&app, "2025-01-13", "2025-01-19").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 0);

    let shifts = shifts_between(&app, "2025-01-13", "2025-01-19").await;
    assert_eq!(shifts.len(), 5);
    assert_eq!(shifts[0]["shift_date"], "2025-01-13");
    assert_eq!(shifts[0]["break_start"], "12:00");
    assert_eq!(shifts[4]["shift_date"], "2025-01-17");
}

#[tokio::test]
async fn test_generate_without_template_is_not_found() {
    let app = spawn_app().await;
    let (status, _) = generate(&app, "2025-01-13", "2025-01-19").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_rejects_inverted_range() {
    let app = spawn_app().await;
    create_default_template(&app, 0).await;
    let (status, _) = generate(&app, "2025-01-19", "2025-01-13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_copy_two_weeks_later_skips_occupied_dates() {
    let app = spawn_app().await;
    create_default_template(&app, 0).await;
    generate(&app, "2025-01-13", "2025-01-19").await;

    // One target date is already taken
    let (status, _) = app
        .post(
            "/schedules/shifts",
            json!({
                "staff_id": app.staff_ids[0],
                "shift_date": "2025-01-29",
                "start_time": "07:00",
                "end_time": "08:00",
                "created_by": "manager"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let copy = json!({
        "staff_ids": [app.staff_ids[0]],
        "source_start_date": "2025-01-13",
        "source_end_date": "2025-01-19",
        "target_start_date": "2025-01-27",
        "action_by": "manager"
    });
    let (status, body) = app.post("/schedules/copy", copy.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 4);

    let target = shifts_between(&app, "2025-01-27", "2025-02-02").await;
    let dates: Vec<&str> = target.iter().map(|s| s["shift_date"].as_str().unwrap()).collect();
    assert_eq!(
        dates,
        vec!["2025-01-27", "2025-01-28", "2025-01-29", "2025-01-30", "2025-01-31"]
    );
    assert_eq!(target[2]["start_time"], "07:00");

    let (_, body) = app.post("/schedules/copy", copy).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_set_default_template_moves_flag() {
    let app = spawn_app().await;
    let first = create_default_template(&app, 0).await;
    let second = create_default_template(&app, 0).await;

    let (_, refreshed) = app
        .get(&format!("/schedules/templates/{}", first["id"].as_str().unwrap()))
        .await;
    assert_eq!(refreshed["is_default"], false);

    let (status, promoted) = app
        .post(
            &format!("/schedules/templates/{}/default", first["id"].as_str().unwrap()),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["is_default"], true);

    let (_, listed) = app.get(&format!("/staff/{}/templates", app.staff_ids[0])).await;
    let defaults: Vec<&Value> = listed
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["is_default"] == true)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0]["id"], first["id"]);
    assert_ne!(defaults[0]["id"], second["id"]);
}

#[tokio::test]
async fn test_invalid_template_is_rejected() {
    let app = spawn_app().await;
    let mut schedule = weekday_schedule();
    schedule[1] = json!({ "is_working_day": true, "start_time": "09:00" });

    let (status, _) = app
        .post(
            "/schedules/templates",
            json!({
                "staff_id": app.staff_ids[0],
                "name": "Broken",
                "schedule": schedule
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_approved_time_off_blocks_slots_and_raises_conflict() {
    let app = spawn_app().await;
    create_default_template(&app, 0).await;
    generate(&app, "2025-01-13", "2025-01-19").await;

    let (status, request) = app
        .post(
            "/time-off",
            json!({
                "staff_id": app.staff_ids[0],
                "start_date": "2025-01-14",
                "end_date": "2025-01-14",
                "type": "sick_leave",
                "reason": "flu",
                "requested_by": "alice"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "pending");
    let request_id = request["id"].as_str().unwrap().to_string();

    let slots_path = format!(
        "/businesses/{}/slots?day=2025-01-14&staff_id={}",
        app.business_id, app.staff_ids[0]
    );
    let (_, slots) = app.get(&slots_path).await;
    assert!(!slots.as_array().unwrap().is_empty());

    let (status, approved) = app
        .put(
            &format!("/time-off/{}", request_id),
            json!({ "status": "approved", "approved_by": "manager" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approved["processed_at"].is_string());

    let (_, slots) = app.get(&slots_path).await;
    assert!(slots.as_array().unwrap().is_empty());

    let detect = json!({ "start_date": "2025-01-13", "end_date": "2025-01-19" });
    let detect_path = format!("/businesses/{}/conflicts/detect", app.business_id);
    let (status, found) = app.post(&detect_path, detect.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let found = found.as_array().unwrap().clone();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["conflict_type"], "time_off_conflict");
    assert_eq!(found[0]["conflict_date"], "2025-01-14");

    // Already open, not recorded twice
    let (_, again) = app.post(&detect_path, detect).await;
    assert!(again.as_array().unwrap().is_empty());

    let (status, resolved) = app
        .put(
            &format!("/conflicts/{}/resolve", found[0]["id"].as_str().unwrap()),
            json!({ "status": "resolved", "resolved_by": "manager" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "resolved");

    let (_, open) = app
        .get(&format!("/businesses/{}/conflicts?status=open", app.business_id))
        .await;
    assert!(open.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_half_day_requires_single_day() {
    let app = spawn_app().await;
    let (status, _) = app
        .post(
            "/time-off",
            json!({
                "staff_id": app.staff_ids[0],
                "start_date": "2025-01-14",
                "end_date": "2025-01-15",
                "type": "personal_day",
                "reason": "errand",
                "is_half_day": true,
                "half_day_type": "morning",
                "requested_by": "alice"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_weekly_view_and_stats() {
    let app = spawn_app().await;
    create_default_template(&app, 0).await;
    generate(&app, "2025-01-13", "2025-01-19").await;

    let (status, view) = app
        .get(&format!(
            "/businesses/{}/schedule/week?week_start=2025-01-13",
            app.business_id
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["week_end_date"], "2025-01-19");
    let schedules = view["staff_schedules"].as_array().unwrap();
    assert_eq!(schedules.len(), 2);
    let alice = schedules
        .iter()
        .find(|s| s["staff_id"] == json!(app.staff_ids[0]))
        .unwrap();
    assert_eq!(alice["total_hours"], 35.0);

    let (status, stats) = app
        .get(&format!(
            "/staff/{}/stats?start_date=2025-01-13&end_date=2025-01-19",
            app.staff_ids[0]
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_shifts"], 5);
    assert_eq!(stats["total_working_hours"], 35.0);
    assert_eq!(stats["average_hours_per_shift"], 7.0);

    let (status, business) = app
        .get(&format!(
            "/businesses/{}/stats?start_date=2025-01-13&end_date=2025-01-19&include_staff_breakdown=true",
            app.business_id
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(business["total_staff"], 2);
    assert_eq!(business["total_shifts"], 5);
    assert_eq!(business["average_hours_per_staff"], 17.5);
    assert_eq!(business["staff_breakdown"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_quick_disable_then_enable() {
    let app = spawn_app().await;
    create_default_template(&app, 0).await;
    generate(&app, "2025-01-13", "2025-01-19").await;

    let action = json!({ "date": "2025-01-15", "reason": "training", "action_by": "manager" });
    let (status, body) = app
        .post(&format!("/staff/{}/disable", app.staff_ids[0]), action.clone())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (_, check) = app
        .get(&format!(
            "/staff/{}/availability?date=2025-01-15&start_time=10:00&end_time=11:00",
            app.staff_ids[0]
        ))
        .await;
    assert_eq!(check["is_available"], false);
    assert_eq!(check["reason"], "shift is disabled");

    let (_, body) = app
        .post(&format!("/staff/{}/enable", app.staff_ids[0]), action)
        .await;
    assert_eq!(body["count"], 1);
}

async fn manual_shift(app: &TestApp, date: &str, start: &str, end: &str) {
    let (status, _) = app
        .post(
            "/schedules/shifts",
            json!({
                "staff_id": app.staff_ids[0],
                "shift_date": date,
                "start_time": start,
                "end_time": end,
                "created_by": "manager"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn generate_overwriting(app: &TestApp) -> (StatusCode, Value) {
    app.post(
        "/schedules/generate",
        json!({
            "staff_ids": [app.staff_ids[0]],
            "start_date": "2025-01-13",
            "end_date": "2025-01-19",
            "overwrite_existing": true,
            "generated_by": "manager"
        }),
    )
    .await
}

async fn copy_overwriting(app: &TestApp) -> (StatusCode, Value) {
    app.post(
        "/schedules/copy",
        json!({
            "staff_ids": [app.staff_ids[0]],
            "source_start_date": "2025-01-13",
            "source_end_date": "2025-01-19",
            "target_start_date": "2025-01-27",
            "overwrite_existing": true,
            "action_by": "manager"
        }),
    )
    .await
}

#[tokio::test]
async fn test_generate_with_overwrite_adds_to_occupied_dates() {
    let app = spawn_app().await;
    create_default_template(&app, 0).await;
    manual_shift(&app, "2025-01-14", "07:00", "08:00").await;

    let (status, body) = generate_overwriting(&app).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 5);

    let tuesday = shifts_between(&app, "2025-01-14", "2025-01-14").await;
    assert_eq!(tuesday.len(), 2);
    assert_eq!(tuesday[0]["start_time"], "07:00");
    assert_eq!(tuesday[1]["start_time"], "09:00");
}

#[tokio::test]
async fn test_generate_with_overwrite_fails_whole_on_overlap() {
    let app = spawn_app().await;
    create_default_template(&app, 0).await;
    manual_shift(&app, "2025-01-15", "16:00", "18:00").await;

    let (status, body) = generate_overwriting(&app).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "SlotUnavailable");

    let week = shifts_between(&app, "2025-01-13", "2025-01-19").await;
    assert_eq!(week.len(), 1);
    assert_eq!(week[0]["start_time"], "16:00");
}

#[tokio::test]
async fn test_copy_with_overwrite_adds_to_occupied_dates() {
    let app = spawn_app().await;
    create_default_template(&app, 0).await;
    generate(&app, "2025-01-13", "2025-01-19").await;
    manual_shift(&app, "2025-01-29", "07:00", "08:00").await;

    let (status, body) = copy_overwriting(&app).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 5);

    let wednesday = shifts_between(&app, "2025-01-29", "2025-01-29").await;
    assert_eq!(wednesday.len(), 2);
    assert_eq!(shifts_between(&app, "2025-01-27", "2025-02-02").await.len(), 6);
}

#[tokio::test]
async fn test_copy_with_overwrite_fails_whole_on_overlap() {
    let app = spawn_app().await;
    create_default_template(&app, 0).await;
    generate(&app, "2025-01-13", "2025-01-19").await;
    manual_shift(&app, "2025-01-29", "16:00", "18:00").await;

    let (status, _) = copy_overwriting(&app).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let target = shifts_between(&app, "2025-01-27", "2025-02-02").await;
    assert_eq!(target.len(), 1);
    assert_eq!(target[0]["shift_date"], "2025-01-29");
}
