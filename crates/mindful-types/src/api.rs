use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AppointmentStatus, Category};

// Envelopes and request bodies use camelCase; stored rows keep their
// snake_case column names on the wire.

// -- JWT Claims --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Health --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub ai_provider: &'static str,
}

// -- Auth --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub university: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub user: UserSummary,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// A user as returned to its owner. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub university: String,
    pub created_at: DateTime<Utc>,
}

// -- Chat --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub category: Category,
    pub message: String,
    pub is_crisis: bool,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub sentiment: String,
    pub crisis_detected: bool,
    pub created_at: DateTime<Utc>,
}

// -- Mood --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateMoodRequest {
    pub mood_score: Option<i64>,
    pub stress_level: Option<i64>,
    pub anxiety_level: Option<i64>,
    pub notes: Option<String>,
}

/// Shared `{ success, id }` acknowledgement for create endpoints.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_window_days")]
    pub days: u32,
}

fn default_window_days() -> u32 {
    30
}

#[derive(Debug, Clone, Serialize)]
pub struct MoodEntryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_score: i64,
    pub stress_level: i64,
    pub anxiety_level: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodStatsResponse {
    pub total_entries: usize,
    pub streak_days: u32,
    pub average_mood: f64,
    pub recent_entries: Vec<MoodEntryResponse>,
}

// -- Resources --

#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateResourceRequest {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

// -- Counselors --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateCounselorRequest {
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub university: String,
    pub availability: String,
    pub bio: String,
}

#[derive(Debug, Serialize)]
pub struct CounselorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub university: String,
    pub availability: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

// -- Appointments --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateAppointmentRequest {
    pub counselor_id: Option<Uuid>,
    pub appointment_date: String,
    pub appointment_time: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub counselor_id: Uuid,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counselor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

/// Status arrives as free text so an unknown value can be rejected with a
/// readable message instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusChange {
    pub id: Uuid,
    pub status: AppointmentStatus,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub appointment: StatusChange,
}

// -- Achievements --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateAchievementRequest {
    pub achievement_type: String,
    pub achievement_name: String,
    pub points: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AchievementResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_type: String,
    pub achievement_name: String,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementsResponse {
    pub achievements: Vec<AchievementResponse>,
    pub total_points: i64,
    pub total_count: usize,
}
