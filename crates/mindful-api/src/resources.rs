use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use mindful_db::models::NewResource;
use mindful_types::api::{CreateResourceRequest, ResourceQuery};

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, require_fields};

pub async fn list_resources(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // Empty query values (`?category=`) mean "no filter".
    let category = query.category.filter(|c| !c.is_empty());
    let kind = query.kind.filter(|k| !k.is_empty());

    let rows = state
        .db_call(move |db| db.get_resources(category.as_deref(), kind.as_deref()))
        .await?;

    let resources: Vec<_> = rows.into_iter().map(convert::resource).collect();
    Ok(Json(resources))
}

pub async fn get_resource(
    State(state): State<AppState>,
    Path(resource_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rid = resource_id.to_string();
    let row = state
        .db_call(move |db| db.get_resource(&rid))
        .await?
        .ok_or(ApiError::NotFound("Resource"))?;

    Ok(Json(convert::resource(row)))
}

/// Admin authoring endpoint; any authenticated user may call it.
pub async fn create_resource(
    State(state): State<AppState>,
    Json(req): Json<CreateResourceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_fields(&[("title", &req.title), ("content", &req.content)])?;

    let row = state
        .db_call(move |db| {
            db.insert_resource(
                &Uuid::new_v4().to_string(),
                &NewResource {
                    title: &req.title,
                    content: &req.content,
                    kind: &req.kind,
                    category: &req.category,
                },
            )
        })
        .await?;

    Ok((StatusCode::CREATED, Json(convert::resource(row))))
}
