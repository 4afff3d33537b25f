use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use mindful_db::models::NewAppointment;
use mindful_types::api::{
    Claims, CreateAppointmentRequest, CreatedResponse, StatusChange, UpdateStatusRequest,
    UpdateStatusResponse,
};
use mindful_types::models::AppointmentStatus;

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, require_fields};

/// Book an appointment. The counselor id is not checked against the
/// directory.
pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let counselor_id = req
        .counselor_id
        .ok_or_else(|| ApiError::validation("Missing required fields: counselorId"))?;
    require_fields(&[
        ("appointmentDate", &req.appointment_date),
        ("appointmentTime", &req.appointment_time),
    ])?;

    let appointment_id = Uuid::new_v4();
    let uid = claims.sub.to_string();
    state
        .db_call(move |db| {
            db.insert_appointment(
                &appointment_id.to_string(),
                &uid,
                &NewAppointment {
                    counselor_id: &counselor_id.to_string(),
                    appointment_date: &req.appointment_date,
                    appointment_time: &req.appointment_time,
                    notes: req.notes.as_deref(),
                },
            )
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            id: appointment_id,
        }),
    ))
}

pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let rows = state.db_call(move |db| db.get_appointments(&uid)).await?;
    let appointments: Vec<_> = rows.into_iter().map(convert::appointment).collect();
    Ok(Json(appointments))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(appointment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let aid = appointment_id.to_string();
    let row = state
        .db_call(move |db| db.get_appointment(&aid, &uid))
        .await?
        .ok_or(ApiError::NotFound("Appointment"))?;

    Ok(Json(convert::appointment(row)))
}

/// Overwrite an appointment's status. Anything outside
/// scheduled/completed/cancelled is rejected before the store is touched.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(appointment_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status: AppointmentStatus = req
        .status
        .trim()
        .parse()
        .map_err(|e: mindful_types::models::UnknownStatus| ApiError::validation(e.to_string()))?;

    let uid = claims.sub.to_string();
    let aid = appointment_id.to_string();
    let updated = state
        .db_call(move |db| db.update_appointment_status(&aid, &uid, status))
        .await?;

    if !updated {
        return Err(ApiError::NotFound("Appointment"));
    }

    info!("Appointment {} set to {}", appointment_id, status);

    Ok(Json(UpdateStatusResponse {
        success: true,
        appointment: StatusChange {
            id: appointment_id,
            status,
        },
    }))
}
