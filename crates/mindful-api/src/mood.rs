use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Local;
use tracing::warn;
use uuid::Uuid;

use mindful_db::models::NewMoodEntry;
use mindful_types::api::{Claims, CreateMoodRequest, CreatedResponse, MoodStatsResponse, WindowQuery};
use mindful_wellness::streak::{self, MoodSummary};

use crate::achievements::{self, DAILY_CHECK_IN};
use crate::auth::AppState;
use crate::convert;
use crate::error::ApiError;

/// Entries echoed back in the stats payload.
const RECENT_ENTRIES: usize = 7;

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateMoodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Scores are stored as given; the 1-10 scale is a client convention.
    let (Some(mood_score), Some(stress_level), Some(anxiety_level)) =
        (req.mood_score, req.stress_level, req.anxiety_level)
    else {
        return Err(ApiError::validation(
            "moodScore, stressLevel and anxietyLevel are required",
        ));
    };

    let entry_id = Uuid::new_v4();
    let uid = claims.sub.to_string();
    state
        .db_call(move |db| {
            db.insert_mood_entry(
                &entry_id.to_string(),
                &uid,
                &NewMoodEntry {
                    mood_score,
                    stress_level,
                    anxiety_level,
                    notes: req.notes.as_deref(),
                },
            )
        })
        .await?;

    achievements::grant(&state, claims.sub, &DAILY_CHECK_IN).await;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            id: entry_id,
        }),
    ))
}

pub async fn get_entries(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let days = query.days;
    let rows = state
        .db_call(move |db| db.get_mood_entries(&uid, days))
        .await?;

    let entries: Vec<_> = rows.into_iter().map(convert::mood_entry).collect();
    Ok(Json(entries))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let days = query.days;
    let (rows, history) = state
        .db_call(move |db| Ok((db.get_mood_entries(&uid, days)?, db.get_mood_timestamps(&uid)?)))
        .await?;

    let history_days: Vec<_> = history
        .iter()
        .filter_map(|raw| {
            let parsed = convert::parse_timestamp(raw);
            if parsed.is_none() {
                warn!("Skipping unreadable mood timestamp '{}'", raw);
            }
            parsed
        })
        .map(streak::local_day)
        .collect();

    let scores: Vec<i64> = rows.iter().map(|r| r.mood_score).collect();
    let summary = MoodSummary::compute(&scores, history_days, Local::now().date_naive());

    let recent_entries = rows
        .into_iter()
        .take(RECENT_ENTRIES)
        .map(convert::mood_entry)
        .collect();

    Ok(Json(MoodStatsResponse {
        total_entries: summary.total_entries,
        streak_days: summary.streak_days,
        average_mood: summary.average_mood,
        recent_entries,
    }))
}
