use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, warn};
use uuid::Uuid;

use mindful_types::api::{AchievementsResponse, Claims, CreateAchievementRequest};

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, require_fields};

/// Points ledger entries granted as a side effect of other actions.
pub struct Award {
    pub kind: &'static str,
    pub name: &'static str,
    pub points: i64,
}

pub const ACTIVE_COMMUNICATOR: Award = Award {
    kind: "chat",
    name: "Active Communicator",
    points: 5,
};

pub const DAILY_CHECK_IN: Award = Award {
    kind: "tracking",
    name: "Daily Check-in",
    points: 10,
};

/// Append `award` to the user's ledger. A failure is logged and swallowed so
/// it never fails the action that earned the award.
pub async fn grant(state: &AppState, user_id: Uuid, award: &'static Award) {
    let uid = user_id.to_string();
    let result = state
        .db_call(move |db| {
            db.insert_achievement(
                &Uuid::new_v4().to_string(),
                &uid,
                award.kind,
                award.name,
                award.points,
            )
        })
        .await;

    match result {
        Ok(_) => debug!("Awarded '{}' to {}", award.name, user_id),
        Err(e) => warn!("Awarding '{}' to {} failed: {}", award.name, user_id, e),
    }
}

pub async fn get_achievements(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let (rows, total_points) = state
        .db_call(move |db| Ok((db.get_achievements(&uid)?, db.get_total_points(&uid)?)))
        .await?;

    let achievements: Vec<_> = rows.into_iter().map(convert::achievement).collect();

    Ok(Json(AchievementsResponse {
        total_count: achievements.len(),
        achievements,
        total_points,
    }))
}

pub async fn create_achievement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateAchievementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_fields(&[
        ("achievementType", &req.achievement_type),
        ("achievementName", &req.achievement_name),
    ])?;
    let points = req
        .points
        .ok_or_else(|| ApiError::validation("Missing required fields: points"))?;

    let uid = claims.sub.to_string();
    let row = state
        .db_call(move |db| {
            db.insert_achievement(
                &Uuid::new_v4().to_string(),
                &uid,
                &req.achievement_type,
                &req.achievement_name,
                points,
            )
        })
        .await?;

    Ok((StatusCode::CREATED, Json(convert::achievement(row))))
}
