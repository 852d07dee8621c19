//! HTTP-level integration tests for the activities API: CRUD, pagination,
//! bulk creation, proof uploads, and CSV import/export.

mod common;

use axum::http::{header, StatusCode};
use common::{
    assert_error_envelope, body_json, body_text, delete_auth, get_auth, post_json_auth,
    post_multipart_auth,
};
use sqlx::PgPool;

fn token() -> String {
    common::access_token_for(uuid::Uuid::new_v4(), "intern@example.com")
}

fn sample_activity(title: &str) -> serde_json::Value {
    serde_json::json!({
        "author": "susilo",
        "date": "2025-03-14",
        "title": title,
        "category": "general-activity",
        "start_time": "08:00",
        "end_time": "10:00",
        "work_mode": "online",
        "location": "HQ office",
        "description": "Daily standup and code review",
    })
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_single_activity_from_json(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let response =
        post_json_auth(app, "/api/activities", sample_activity("Weekly sync"), &token()).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["title"], "Weekly sync");
    assert_eq!(json["data"]["category"], "general-activity");
    assert!(json["data"]["id"].is_string());
    assert!(json["data"]["proof"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_invalid_fields_with_violations(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let mut body = sample_activity("Weekly sync");
    body["start_time"] = "09:00".into();
    body["end_time"] = "08:00".into();
    let response = post_json_auth(app, "/api/activities", body, &token()).await;

    let json = assert_error_envelope(response, StatusCode::BAD_REQUEST).await;
    let fields: Vec<&str> = json["details"]
        .as_array()
        .expect("details must be an array")
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["end_time"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_unsupported_content_type(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/activities")
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::AUTHORIZATION, format!("Bearer {}", token()))
        .body(axum::body::Body::from("hello"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_error_envelope(response, StatusCode::BAD_REQUEST).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_from_multipart_stores_the_proof_file(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let fields = [
        ("author", "susilo"),
        ("date", "2025-03-14"),
        ("title", "Weekly sync"),
        ("category", "official-report"),
        ("start_time", "08:00"),
        ("end_time", "10:00"),
        ("work_mode", "offline"),
        ("location", "HQ office"),
    ];
    let file = Some(("proof", "receipt.png", "image/png", b"png-bytes".as_slice()));
    let response =
        post_multipart_auth(app, "/api/activities", "POST", &fields, file, &token()).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let proof = json["data"]["proof"].as_str().expect("proof reference");
    assert!(proof.starts_with("/uploads/activities/"));
    assert!(proof.ends_with(".png"));
}

// ---------------------------------------------------------------------------
// Bulk create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn bulk_create_is_all_or_nothing(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let mut bad = sample_activity("Broken item");
    bad["end_time"] = "07:00".into();
    let batch = serde_json::json!([
        sample_activity("First"),
        sample_activity("Second"),
        bad,
    ]);
    let response = post_json_auth(app.clone(), "/api/activities", batch, &token()).await;

    let json = assert_error_envelope(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["details"]["index"], 2);

    // Nothing was persisted, so the author still has no records.
    let response = get_auth(app, "/api/activities/susilo", &token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bulk_create_persists_every_item(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let batch = serde_json::json!([sample_activity("First"), sample_activity("Second")]);
    let response = post_json_auth(app.clone(), "/api/activities", batch, &token()).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = get_auth(app, "/api/activities/susilo", &token()).await;
    let json = body_json(response).await;
    assert_eq!(json["pagination"]["total"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bulk_create_rejects_an_empty_array(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let response =
        post_json_auth(app, "/api/activities", serde_json::json!([]), &token()).await;

    assert_error_envelope(response, StatusCode::BAD_REQUEST).await;
}

// ---------------------------------------------------------------------------
// List and pagination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn list_paginates_newest_first(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    for i in 1..=5 {
        let response = post_json_auth(
            app.clone(),
            "/api/activities",
            sample_activity(&format!("Entry {i}")),
            &token(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(
        app.clone(),
        "/api/activities/susilo?page=1&limit=2",
        &token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["limit"], 2);
    assert_eq!(json["pagination"]["total"], 5);
    assert_eq!(json["pagination"]["pages"], 3);
    let titles: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Entry 5", "Entry 4"]);

    let response = get_auth(
        app.clone(),
        "/api/activities/susilo?page=3&limit=2",
        &token(),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    // Beyond the last page: empty list, not an error.
    let response = get_auth(app, "/api/activities/susilo?page=9&limit=2", &token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_for_unknown_author_is_404(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let response = get_auth(app, "/api/activities/nobody", &token()).await;

    assert_error_envelope(response, StatusCode::NOT_FOUND).await;
}

// ---------------------------------------------------------------------------
// Update and delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn update_changes_only_the_submitted_fields(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/activities",
        sample_activity("Before"),
        &token(),
    )
    .await;
    let created = body_json(response).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let fields = [("title", "After"), ("work_mode", "hybrid")];
    let response = post_multipart_auth(
        app,
        &format!("/api/activities/update/{id}"),
        "PUT",
        &fields,
        None,
        &token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "After");
    assert_eq!(json["data"]["work_mode"], "hybrid");
    // Untouched fields keep their values.
    assert_eq!(json["data"]["location"], "HQ office");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_rechecks_time_ordering_when_both_times_are_sent(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/activities",
        sample_activity("Timed"),
        &token(),
    )
    .await;
    let created = body_json(response).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let fields = [("start_time", "10:00"), ("end_time", "09:00")];
    let response = post_multipart_auth(
        app,
        &format!("/api/activities/update/{id}"),
        "PUT",
        &fields,
        None,
        &token(),
    )
    .await;

    assert_error_envelope(response, StatusCode::BAD_REQUEST).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_of_missing_activity_is_404(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let id = uuid::Uuid::new_v4();
    let fields = [("title", "Ghost")];
    let response = post_multipart_auth(
        app,
        &format!("/api/activities/update/{id}"),
        "PUT",
        &fields,
        None,
        &token(),
    )
    .await;

    assert_error_envelope(response, StatusCode::NOT_FOUND).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_removes_the_record(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/activities",
        sample_activity("Disposable"),
        &token(),
    )
    .await;
    let created = body_json(response).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = delete_auth(
        app.clone(),
        &format!("/api/activities/delete/{id}"),
        &token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);

    // Deleting the same record twice is a 404.
    let response = delete_auth(app, &format!("/api/activities/delete/{id}"), &token()).await;
    assert_error_envelope(response, StatusCode::NOT_FOUND).await;
}

// ---------------------------------------------------------------------------
// CSV export and import
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn export_produces_the_csv_grammar(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/activities",
        sample_activity("Exported entry"),
        &token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(app, "/api/activities/susilo/export", &token()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let text = body_text(response).await;
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "date,start_time,end_time,title,category,work_mode,location,description"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("2025-03-14,08:00,10:00,Exported entry,general-activity"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn export_for_unknown_author_is_404(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let response = get_auth(app, "/api/activities/nobody/export", &token()).await;

    assert_error_envelope(response, StatusCode::NOT_FOUND).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn import_creates_records_from_csv(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let csv = "date,start_time,end_time,title,category,work_mode,location,description\n\
               2025-03-14,08:00,10:00,Imported one,general-activity,online,HQ office,\n\
               2025-03-15,13:00,15:00,Imported two,exam-report,hybrid,Campus lab,Midterm\n";
    let file = Some(("file", "logbook.csv", "text/csv", csv.as_bytes()));
    let response = post_multipart_auth(
        app.clone(),
        "/api/activities/import",
        "POST",
        &[("author", "susilo")],
        file,
        &token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = get_auth(app, "/api/activities/susilo", &token()).await;
    let json = body_json(response).await;
    assert_eq!(json["pagination"]["total"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn import_rejects_malformed_rows_by_line_number(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    // Row 3 has seven columns instead of eight.
    let csv = "date,start_time,end_time,title,category,work_mode,location,description\n\
               2025-03-14,08:00,10:00,Fine,general-activity,online,HQ office,\n\
               2025-03-15,13:00,15:00,Broken,exam-report,hybrid,Campus lab\n";
    let file = Some(("file", "logbook.csv", "text/csv", csv.as_bytes()));
    let response = post_multipart_auth(
        app.clone(),
        "/api/activities/import",
        "POST",
        &[("author", "susilo")],
        file,
        &token(),
    )
    .await;

    let json = assert_error_envelope(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["details"][0]["row"], 3);

    // Nothing was created.
    let response = get_auth(app, "/api/activities/susilo", &token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn import_without_a_file_part_is_400(pool: PgPool) {
    let (_uploads, app) = common::build_test_app(pool);

    let response = post_multipart_auth(
        app,
        "/api/activities/import",
        "POST",
        &[("author", "susilo")],
        None,
        &token(),
    )
    .await;

    assert_error_envelope(response, StatusCode::BAD_REQUEST).await;
}
