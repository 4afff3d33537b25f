//! Database row types. These map directly to SQLite rows and are kept
//! independent of the wire types in mindful-types.

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub university: String,
    pub created_at: String,
}

pub struct ConversationRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// JSON-encoded array of `{ role, content }` pairs.
    pub messages: String,
    pub sentiment: String,
    pub crisis_detected: bool,
    pub created_at: String,
}

pub struct MoodEntryRow {
    pub id: String,
    pub user_id: String,
    pub mood_score: i64,
    pub stress_level: i64,
    pub anxiety_level: i64,
    pub notes: Option<String>,
    pub created_at: String,
}

pub struct AchievementRow {
    pub id: String,
    pub user_id: String,
    pub achievement_type: String,
    pub achievement_name: String,
    pub points: i64,
    pub created_at: String,
}

pub struct ResourceRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub kind: String,
    pub category: String,
    pub created_at: String,
}

pub struct CounselorRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub university: String,
    pub availability: String,
    pub bio: String,
    pub created_at: String,
}

pub struct AppointmentRow {
    pub id: String,
    pub user_id: String,
    pub counselor_id: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: String,
    /// Joined from `counselors`; `None` when the counselor row is missing or
    /// the query did not join.
    pub counselor_name: Option<String>,
    pub specialization: Option<String>,
}

/// New user fields, minus the generated id.
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub university: &'a str,
}

pub struct NewMoodEntry<'a> {
    pub mood_score: i64,
    pub stress_level: i64,
    pub anxiety_level: i64,
    pub notes: Option<&'a str>,
}

pub struct NewResource<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub kind: &'a str,
    pub category: &'a str,
}

pub struct NewCounselor<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub specialization: &'a str,
    pub university: &'a str,
    pub availability: &'a str,
    pub bio: &'a str,
}

pub struct NewAppointment<'a> {
    pub counselor_id: &'a str,
    pub appointment_date: &'a str,
    pub appointment_time: &'a str,
    pub notes: Option<&'a str>,
}
