use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::{
        auth::ActiveUser,
        walk::{SaveLocationRequest, WalkLocation, WalkStatus},
    },
    AppState,
};

use super::{db_error, fail, walks::fetch_walk, ApiError};

/// Ordered location log recorded during a walk.
pub async fn get_route(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(walk_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let walk = fetch_walk(&state, walk_id, &user).await?;

    let points: Vec<WalkLocation> = sqlx::query_as(
        "SELECT id, walk_id, lat, lng, recorded_at
         FROM walk_locations WHERE walk_id = $1
         ORDER BY recorded_at",
    )
    .bind(walk_id)
    .fetch_all(&state.db)
    .await
    .map_err(db_error)?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "walk_id": walk_id,
            "walk_status": walk.status,
            "points": points,
        },
    })))
}

pub async fn save_location(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(walk_id): Path<Uuid>,
    Json(body): Json<SaveLocationRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Some(lat) = body.lat else {
        return Err(fail(StatusCode::BAD_REQUEST, "Latitud requerida"));
    };
    let Some(lng) = body.lng else {
        return Err(fail(StatusCode::BAD_REQUEST, "Longitud requerida"));
    };
    if !(-90.0..=90.0).contains(&lat) {
        return Err(fail(
            StatusCode::BAD_REQUEST,
            "Latitud inválida (debe estar entre -90 y 90)",
        ));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(fail(
            StatusCode::BAD_REQUEST,
            "Longitud inválida (debe estar entre -180 y 180)",
        ));
    }

    let walk = fetch_walk(&state, walk_id, &user).await?;

    // Only the assigned walker logs positions, and only while walking.
    if user.auth.user_id != walk.walker_id {
        return Err(fail(
            StatusCode::FORBIDDEN,
            "Solo el paseador asignado puede registrar ubicaciones",
        ));
    }
    if walk.status() != WalkStatus::InProgress {
        return Err(fail(StatusCode::BAD_REQUEST, "El paseo no está en curso"));
    }

    let location: WalkLocation = sqlx::query_as(
        "INSERT INTO walk_locations (walk_id, lat, lng)
         VALUES ($1, $2, $3)
         RETURNING id, walk_id, lat, lng, recorded_at",
    )
    .bind(walk_id)
    .bind(lat)
    .bind(lng)
    .fetch_one(&state.db)
    .await
    .map_err(db_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Ubicación guardada exitosamente",
            "data": location,
        })),
    ))
}

pub async fn check_availability(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(walk_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let walk = fetch_walk(&state, walk_id, &user).await?;

    let points: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM walk_locations WHERE walk_id = $1")
        .bind(walk_id)
        .fetch_one(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "walk_id": walk_id,
            "available": points > 0,
            "points": points,
            "walk_status": walk.status,
        },
    })))
}
