//! Row-to-wire conversions.
//!
//! Corrupt ids and timestamps are logged and replaced with defaults so one
//! bad row cannot fail a whole listing.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use mindful_db::models::{
    AchievementRow, AppointmentRow, ConversationRow, CounselorRow, MoodEntryRow, ResourceRow,
    UserRow,
};
use mindful_types::api::{
    AchievementResponse, AppointmentResponse, ChatMessage, ConversationResponse,
    CounselorResponse, MoodEntryResponse, ProfileResponse, ResourceResponse,
};
use mindful_types::models::AppointmentStatus;

pub fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, raw, e);
        Uuid::default()
    })
}

/// Parse a stored timestamp. SQLite writes `YYYY-MM-DD HH:MM:SS` without a
/// zone; those are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .ok()
}

fn timestamp(raw: &str, owner: &str) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt created_at '{}' on '{}'", raw, owner);
        DateTime::default()
    })
}

pub fn profile(row: UserRow) -> ProfileResponse {
    ProfileResponse {
        id: parse_id(&row.id, "user id"),
        created_at: timestamp(&row.created_at, &row.id),
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        university: row.university,
    }
}

pub fn conversation(row: ConversationRow) -> ConversationResponse {
    let messages: Vec<ChatMessage> = serde_json::from_str(&row.messages).unwrap_or_else(|e| {
        warn!("Corrupt messages on conversation '{}': {}", row.id, e);
        Vec::new()
    });

    ConversationResponse {
        id: parse_id(&row.id, "conversation id"),
        user_id: parse_id(&row.user_id, "user id"),
        created_at: timestamp(&row.created_at, &row.id),
        title: row.title,
        messages,
        sentiment: row.sentiment,
        crisis_detected: row.crisis_detected,
    }
}

pub fn mood_entry(row: MoodEntryRow) -> MoodEntryResponse {
    MoodEntryResponse {
        id: parse_id(&row.id, "mood entry id"),
        user_id: parse_id(&row.user_id, "user id"),
        created_at: timestamp(&row.created_at, &row.id),
        mood_score: row.mood_score,
        stress_level: row.stress_level,
        anxiety_level: row.anxiety_level,
        notes: row.notes,
    }
}

pub fn achievement(row: AchievementRow) -> AchievementResponse {
    AchievementResponse {
        id: parse_id(&row.id, "achievement id"),
        user_id: parse_id(&row.user_id, "user id"),
        created_at: timestamp(&row.created_at, &row.id),
        achievement_type: row.achievement_type,
        achievement_name: row.achievement_name,
        points: row.points,
    }
}

pub fn resource(row: ResourceRow) -> ResourceResponse {
    ResourceResponse {
        id: parse_id(&row.id, "resource id"),
        created_at: timestamp(&row.created_at, &row.id),
        title: row.title,
        content: row.content,
        kind: row.kind,
        category: row.category,
    }
}

pub fn counselor(row: CounselorRow) -> CounselorResponse {
    CounselorResponse {
        id: parse_id(&row.id, "counselor id"),
        created_at: timestamp(&row.created_at, &row.id),
        name: row.name,
        email: row.email,
        specialization: row.specialization,
        university: row.university,
        availability: row.availability,
        bio: row.bio,
    }
}

pub fn appointment(row: AppointmentRow) -> AppointmentResponse {
    // The column carries a CHECK constraint, so this only trips on a
    // hand-edited database.
    let status = row.status.parse().unwrap_or_else(|e| {
        warn!("Appointment '{}': {}", row.id, e);
        AppointmentStatus::Scheduled
    });

    AppointmentResponse {
        id: parse_id(&row.id, "appointment id"),
        user_id: parse_id(&row.user_id, "user id"),
        counselor_id: parse_id(&row.counselor_id, "counselor id"),
        created_at: timestamp(&row.created_at, &row.id),
        appointment_date: row.appointment_date,
        appointment_time: row.appointment_time,
        status,
        notes: row.notes,
        counselor_name: row.counselor_name,
        specialization: row.specialization,
    }
}
