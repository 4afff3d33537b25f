use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};

use mindful_types::api::HealthResponse;

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{achievements, appointments, chat, counselors, mood, resources};

/// Build the `/api` router. Cross-cutting layers (CORS, tracing) are added
/// by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/resources", get(resources::list_resources))
        .route("/api/resources/{resource_id}", get(resources::get_resource))
        .route("/api/counselors", get(counselors::list_counselors))
        .route("/api/counselors/{counselor_id}", get(counselors::get_counselor))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/auth/profile", get(auth::profile))
        .route("/api/chat", post(chat::send_message))
        .route("/api/chat/conversations", get(chat::get_conversations))
        .route("/api/mood", post(mood::create_entry).get(mood::get_entries))
        .route("/api/mood/stats", get(mood::get_stats))
        .route("/api/resources", post(resources::create_resource))
        .route("/api/counselors", post(counselors::create_counselor))
        .route(
            "/api/appointments",
            post(appointments::create_appointment).get(appointments::list_appointments),
        )
        .route("/api/appointments/{appointment_id}", get(appointments::get_appointment))
        .route("/api/appointments/{appointment_id}/status", put(appointments::update_status))
        .route(
            "/api/achievements",
            get(achievements::get_achievements).post(achievements::create_achievement),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Mental Health Support Server is running",
        version: env!("CARGO_PKG_VERSION"),
        ai_provider: "rule-based",
    })
}
