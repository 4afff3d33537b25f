use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use mindful_db::models::NewCounselor;
use mindful_types::api::CreateCounselorRequest;

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, require_fields};

pub async fn list_counselors(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db_call(|db| db.get_counselors()).await?;
    let counselors: Vec<_> = rows.into_iter().map(convert::counselor).collect();
    Ok(Json(counselors))
}

pub async fn get_counselor(
    State(state): State<AppState>,
    Path(counselor_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let cid = counselor_id.to_string();
    let row = state
        .db_call(move |db| db.get_counselor(&cid))
        .await?
        .ok_or(ApiError::NotFound("Counselor"))?;

    Ok(Json(convert::counselor(row)))
}

pub async fn create_counselor(
    State(state): State<AppState>,
    Json(req): Json<CreateCounselorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_fields(&[("name", &req.name), ("email", &req.email)])?;

    let row = state
        .db_call(move |db| {
            db.insert_counselor(
                &Uuid::new_v4().to_string(),
                &NewCounselor {
                    name: &req.name,
                    email: &req.email,
                    specialization: &req.specialization,
                    university: &req.university,
                    availability: &req.availability,
                    bio: &req.bio,
                },
            )
        })
        .await?;

    Ok((StatusCode::CREATED, Json(convert::counselor(row))))
}
