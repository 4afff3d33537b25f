//! Router-level tests: every request goes through the real middleware and
//! handlers against an in-memory database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use mindful_api::auth::{AppState, AppStateInner};
use mindful_api::mailer::Mailer;
use mindful_api::routes::router;
use mindful_db::Database;

// =============================================================================
// Helpers
// =============================================================================

const SECRET: &str = "test-secret";

fn state_with(mailer: Mailer) -> AppState {
    let db = Database::open_in_memory().expect("in-memory db");
    db.seed_defaults().expect("seed");
    Arc::new(AppStateInner {
        db,
        jwt_secret: SECRET.into(),
        token_ttl: chrono::Duration::hours(1),
        mailer,
    })
}

fn state() -> AppState {
    state_with(Mailer::log_only("welcome@mindfulcampus.com", "http://localhost:3000"))
}

fn app() -> Router {
    router(state())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "s3cret-pass",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "university": "State U"
        })),
    )
    .await
}

async fn login_token(app: &Router, email: &str) -> String {
    let (status, body) = register(app, email).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    login_existing(app, email).await
}

async fn login_existing(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "s3cret-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

// =============================================================================
// Health & auth
// =============================================================================

#[tokio::test]
async fn health_reports_rule_based_provider() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["aiProvider"], "rule-based");
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = app();
    let (status, body) = register(&app, "ada@example.edu").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "ada@example.edu");

    let token = login_existing(&app, "ada@example.edu").await;
    let (status, profile) = send(&app, "GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "ada@example.edu");
    assert_eq!(profile["first_name"], "Ada");
    assert_eq!(profile["id"], body["user"]["id"]);
    assert!(profile.get("password").is_none());
}

#[tokio::test]
async fn register_rejects_missing_fields_and_duplicates() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "x@example.edu", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("firstName"));

    assert_eq!(register(&app, "dup@example.edu").await.0, StatusCode::CREATED);
    assert_eq!(register(&app, "dup@example.edu").await.0, StatusCode::CONFLICT);
}

#[tokio::test]
async fn registration_succeeds_when_the_mail_relay_is_down() {
    let app = router(state_with(Mailer::webhook(
        "welcome@mindfulcampus.com",
        "http://localhost:3000",
        "http://127.0.0.1:9/send",
    )));

    let (status, body) = register(&app, "offline@example.edu").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    login_existing(&app, "offline@example.edu").await;
}

#[tokio::test]
async fn concurrent_registrations_conflict_cleanly() {
    let app = app();
    let (a, b) = tokio::join!(
        register(&app, "race@example.edu"),
        register(&app, "race@example.edu")
    );
    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn extra_login_fields_are_ignored() {
    let app = app();
    register(&app, "extra@example.edu").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "extra@example.edu", "password": "s3cret-pass", "remember": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_unauthorized() {
    let app = app();
    register(&app, "ada@example.edu").await;

    for (email, password) in [("ada@example.edu", "nope"), ("ghost@example.edu", "s3cret-pass")] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/mood", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No token provided");

    let (status, body) = send(&app, "GET", "/api/mood", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    let forged = mindful_api::auth::create_token(
        "some-other-secret",
        chrono::Duration::hours(1),
        uuid::Uuid::new_v4(),
        "x@example.edu",
    )
    .unwrap();
    let (status, _) = send(&app, "GET", "/api/achievements", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn chat_classifies_stores_and_awards() {
    let app = app();
    let token = login_token(&app, "chat@example.edu").await;

    let (status, reply) = send(
        &app,
        "POST",
        "/api/chat",
        Some(&token),
        Some(json!({ "message": "I'm so stressed about my exam" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["category"], "academic");
    assert_eq!(reply["isCrisis"], false);
    assert_eq!(reply["suggestions"].as_array().unwrap().len(), 3);

    let (status, conversations) =
        send(&app, "GET", "/api/chat/conversations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let conversations = conversations.as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    let messages = conversations[0]["messages"].as_array().unwrap();
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "I'm so stressed about my exam");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(conversations[0]["crisis_detected"], false);

    let (_, achievements) = send(&app, "GET", "/api/achievements", Some(&token), None).await;
    assert_eq!(achievements["totalCount"], 1);
    assert_eq!(achievements["totalPoints"], 5);
    assert_eq!(achievements["achievements"][0]["achievement_name"], "Active Communicator");
}

#[tokio::test]
async fn crisis_message_is_flagged() {
    let app = app();
    let token = login_token(&app, "crisis@example.edu").await;

    let (status, reply) = send(
        &app,
        "POST",
        "/api/chat",
        Some(&token),
        Some(json!({ "message": "School is too much and I want to die" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["category"], "crisis");
    assert_eq!(reply["isCrisis"], true);

    let (_, conversations) = send(&app, "GET", "/api/chat/conversations", Some(&token), None).await;
    assert_eq!(conversations[0]["crisis_detected"], true);
}

#[tokio::test]
async fn empty_chat_message_is_rejected() {
    let app = app();
    let token = login_token(&app, "quiet@example.edu").await;
    let (status, _) = send(&app, "POST", "/api/chat", Some(&token), Some(json!({ "message": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, achievements) = send(&app, "GET", "/api/achievements", Some(&token), None).await;
    assert_eq!(achievements["totalCount"], 0);
}

#[tokio::test]
async fn broken_ledger_does_not_fail_chat_or_check_in() {
    let state = state();
    let app = router(state.clone());
    let token = login_token(&app, "ledger@example.edu").await;

    state
        .db
        .with_conn(|c| Ok(c.execute_batch("DROP TABLE achievements")?))
        .unwrap();

    let (status, reply) = send(
        &app,
        "POST",
        "/api/chat",
        Some(&token),
        Some(json!({ "message": "I can't sleep before my exam" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["category"], "academic");

    let (status, _) = send(
        &app,
        "POST",
        "/api/mood",
        Some(&token),
        Some(json!({ "moodScore": 6, "stressLevel": 4, "anxietyLevel": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, conversations) = send(&app, "GET", "/api/chat/conversations", Some(&token), None).await;
    assert_eq!(conversations.as_array().unwrap().len(), 1);
    let (_, entries) = send(&app, "GET", "/api/mood", Some(&token), None).await;
    assert_eq!(entries.as_array().unwrap().len(), 1);
}

// =============================================================================
// Mood
// =============================================================================

#[tokio::test]
async fn mood_entries_feed_stats_and_achievements() {
    let app = app();
    let token = login_token(&app, "mood@example.edu").await;

    for score in [4, 6, 8] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/mood",
            Some(&token),
            Some(json!({ "moodScore": score, "stressLevel": 5, "anxietyLevel": 3, "notes": "ok" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
    }

    let (status, entries) = send(&app, "GET", "/api/mood", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries.as_array().unwrap().len(), 3);
    assert_eq!(entries[0]["mood_score"], 8);

    let (status, stats) = send(&app, "GET", "/api/mood/stats?days=7", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalEntries"], 3);
    assert_eq!(stats["averageMood"], 6.0);
    assert_eq!(stats["streakDays"], 1);
    assert_eq!(stats["recentEntries"].as_array().unwrap().len(), 3);

    let (_, achievements) = send(&app, "GET", "/api/achievements", Some(&token), None).await;
    assert_eq!(achievements["totalPoints"], 30);
}

#[tokio::test]
async fn mood_stats_for_new_user_are_zero() {
    let app = app();
    let token = login_token(&app, "fresh@example.edu").await;
    let (status, stats) = send(&app, "GET", "/api/mood/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalEntries"], 0);
    assert_eq!(stats["streakDays"], 0);
    assert_eq!(stats["averageMood"], 0.0);
}

#[tokio::test]
async fn extreme_scores_keep_stats_readable() {
    let app = app();
    let token = login_token(&app, "huge@example.edu").await;
    for score in [i64::MAX, 1] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/mood",
            Some(&token),
            Some(json!({ "moodScore": score, "stressLevel": 1, "anxietyLevel": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, stats) = send(&app, "GET", "/api/mood/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalEntries"], 2);
    assert_eq!(stats["averageMood"].as_f64(), Some(2f64.powi(62)));

    let (status, _) = send(
        &app,
        "POST",
        "/api/achievements",
        Some(&token),
        Some(json!({ "achievementType": "manual", "achievementName": "Jackpot", "points": i64::MAX })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, achievements) = send(&app, "GET", "/api/achievements", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(achievements["totalPoints"], i64::MAX);
}

#[tokio::test]
async fn mood_entry_requires_all_scores() {
    let app = app();
    let token = login_token(&app, "partial@example.edu").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/mood",
        Some(&token),
        Some(json!({ "moodScore": 5, "stressLevel": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, entries) = send(&app, "GET", "/api/mood", Some(&token), None).await;
    assert!(entries.as_array().unwrap().is_empty());
}

// =============================================================================
// Resources & counselors
// =============================================================================

#[tokio::test]
async fn resources_are_public_and_filterable() {
    let app = app();
    let (status, all) = send(&app, "GET", "/api/resources", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 4);

    let (_, exercises) = send(&app, "GET", "/api/resources?type=exercise", None, None).await;
    assert_eq!(exercises.as_array().unwrap().len(), 2);

    let (_, sleep) = send(&app, "GET", "/api/resources?category=sleep&type=article", None, None).await;
    let sleep = sleep.as_array().unwrap();
    assert_eq!(sleep.len(), 1);
    assert_eq!(sleep[0]["title"], "Building Healthy Sleep Habits");

    let id = all[0]["id"].as_str().unwrap();
    let (status, one) = send(&app, "GET", &format!("/api/resources/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["id"], id);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "GET", &format!("/api/resources/{missing}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creating_resources_needs_auth() {
    let app = app();
    let body = json!({ "title": "Box Breathing", "content": "4-4-4-4", "type": "exercise", "category": "breathing" });

    let (status, _) = send(&app, "POST", "/api/resources", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login_token(&app, "author@example.edu").await;
    let (status, created) = send(&app, "POST", "/api/resources", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "exercise");

    let (_, all) = send(&app, "GET", "/api/resources?category=breathing", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn counselors_are_listed_by_name() {
    let app = app();
    let (status, counselors) = send(&app, "GET", "/api/counselors", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = counselors
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Dr. Emily Rodriguez", "Dr. Michael Chen", "Dr. Sarah Johnson"]);

    let token = login_token(&app, "admin@example.edu").await;
    let (status, created) = send(
        &app,
        "POST",
        "/api/counselors",
        Some(&token),
        Some(json!({
            "name": "Dr. Amy Adams",
            "email": "amy@example.edu",
            "specialization": "Grief",
            "university": "State U",
            "availability": "Mondays",
            "bio": "Grief counseling"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["id"].as_str().unwrap();
    let (status, one) = send(&app, "GET", &format!("/api/counselors/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["name"], "Dr. Amy Adams");
}

// =============================================================================
// Appointments
// =============================================================================

#[tokio::test]
async fn appointment_lifecycle() {
    let app = app();
    let token = login_token(&app, "patient@example.edu").await;
    let (_, counselors) = send(&app, "GET", "/api/counselors", None, None).await;
    let counselor_id = counselors[0]["id"].as_str().unwrap().to_string();

    let (status, created) = send(
        &app,
        "POST",
        "/api/appointments",
        Some(&token),
        Some(json!({
            "counselorId": counselor_id,
            "appointmentDate": "2024-05-01",
            "appointmentTime": "10:00",
            "notes": "first visit"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (_, list) = send(&app, "GET", "/api/appointments", Some(&token), None).await;
    assert_eq!(list[0]["status"], "scheduled");
    assert_eq!(list[0]["counselor_name"], "Dr. Emily Rodriguez");

    let status_uri = format!("/api/appointments/{id}/status");
    let (status, body) = send(&app, "PUT", &status_uri, Some(&token), Some(json!({ "status": "pending" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("pending"));

    let (_, one) = send(&app, "GET", &format!("/api/appointments/{id}"), Some(&token), None).await;
    assert_eq!(one["status"], "scheduled");

    let (status, body) = send(&app, "PUT", &status_uri, Some(&token), Some(json!({ "status": "completed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], "completed");

    let (_, one) = send(&app, "GET", &format!("/api/appointments/{id}"), Some(&token), None).await;
    assert_eq!(one["status"], "completed");
}

#[tokio::test]
async fn appointments_are_private_to_their_owner() {
    let app = app();
    let owner = login_token(&app, "owner@example.edu").await;
    let other = login_token(&app, "other@example.edu").await;

    let (_, created) = send(
        &app,
        "POST",
        "/api/appointments",
        Some(&owner),
        Some(json!({
            "counselorId": uuid::Uuid::new_v4(),
            "appointmentDate": "2024-06-01",
            "appointmentTime": "14:00"
        })),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send(&app, "GET", &format!("/api/appointments/{id}"), Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/appointments/{id}/status"),
        Some(&other),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, "GET", "/api/appointments", Some(&other), None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn appointment_requires_counselor_and_slot() {
    let app = app();
    let token = login_token(&app, "booker@example.edu").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/appointments",
        Some(&token),
        Some(json!({ "appointmentDate": "2024-06-01", "appointmentTime": "14:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/appointments",
        Some(&token),
        Some(json!({ "counselorId": uuid::Uuid::new_v4(), "appointmentDate": "" , "appointmentTime": "14:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Achievements
// =============================================================================

#[tokio::test]
async fn manual_achievements_add_to_total() {
    let app = app();
    let token = login_token(&app, "gamer@example.edu").await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/achievements",
        Some(&token),
        Some(json!({ "achievementType": "resource", "achievementName": "Bookworm", "points": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["points"], 15);

    let (status, _) = send(
        &app,
        "POST",
        "/api/achievements",
        Some(&token),
        Some(json!({ "achievementType": "resource", "achievementName": "Bookworm" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, all) = send(&app, "GET", "/api/achievements", Some(&token), None).await;
    assert_eq!(all["totalPoints"], 15);
    assert_eq!(all["totalCount"], 1);
}
