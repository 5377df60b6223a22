use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::{
        auth::ActiveUser,
        walk::{CreateWalkRequest, UpdateWalkStatusRequest, Walk, WalkListQuery, WalkStatus, WALK_COLUMNS},
    },
    services::notify,
    AppState,
};

use super::{db_error, fail, is_staff, ApiError};

pub async fn create_walk(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<CreateWalkRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Some(walker_id) = body.walker_id else {
        return Err(fail(StatusCode::BAD_REQUEST, "El paseador es requerido"));
    };
    let Some(dog_name) = body.dog_name.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(fail(StatusCode::BAD_REQUEST, "El nombre del perro es requerido"));
    };
    let Some(scheduled_at) = body.scheduled_at else {
        return Err(fail(StatusCode::BAD_REQUEST, "La fecha del paseo es requerida"));
    };

    let walker: Option<(String, String)> =
        sqlx::query_as("SELECT role, status FROM users WHERE id = $1")
            .bind(walker_id)
            .fetch_optional(&state.db)
            .await
            .map_err(db_error)?;
    match walker {
        Some((role, status)) if role == "walker" && status == "active" => {}
        _ => return Err(fail(StatusCode::BAD_REQUEST, "Paseador inválido")),
    }

    let walk: Walk = sqlx::query_as(&format!(
        "INSERT INTO walks (client_id, walker_id, dog_name, scheduled_at)
         VALUES ($1, $2, $3, $4)
         RETURNING {WALK_COLUMNS}"
    ))
    .bind(user.auth.user_id)
    .bind(walker_id)
    .bind(dog_name)
    .bind(scheduled_at)
    .fetch_one(&state.db)
    .await
    .map_err(db_error)?;

    notify::push(
        state.db.clone(),
        walker_id,
        "Nuevo paseo asignado",
        &format!("Paseo para {} programado", walk.dog_name),
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Paseo creado exitosamente",
            "data": { "walk": walk },
        })),
    ))
}

/// Participants see their own walks; staff see everything.
pub async fn list_walks(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(q): Query<WalkListQuery>,
) -> Result<Json<Value>, ApiError> {
    if let Some(status) = q.status.as_deref() {
        status
            .parse::<WalkStatus>()
            .map_err(|_| fail(StatusCode::BAD_REQUEST, "Estado inválido"))?;
    }

    let walks: Vec<Walk> = if is_staff(&user.auth) {
        sqlx::query_as(&format!(
            "SELECT {WALK_COLUMNS} FROM walks
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY scheduled_at DESC"
        ))
        .bind(q.status.as_deref())
        .fetch_all(&state.db)
        .await
        .map_err(db_error)?
    } else {
        sqlx::query_as(&format!(
            "SELECT {WALK_COLUMNS} FROM walks
             WHERE (client_id = $1 OR walker_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY scheduled_at DESC"
        ))
        .bind(user.auth.user_id)
        .bind(q.status.as_deref())
        .fetch_all(&state.db)
        .await
        .map_err(db_error)?
    };

    Ok(Json(json!({
        "status": "success",
        "results": walks.len(),
        "data": { "walks": walks },
    })))
}

pub async fn get_walk(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let walk = fetch_walk(&state, id, &user).await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "walk": walk },
    })))
}

pub async fn update_status(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateWalkStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(raw) = body.status.as_deref() else {
        return Err(fail(StatusCode::BAD_REQUEST, "El estado es requerido"));
    };
    let next: WalkStatus = raw
        .parse()
        .map_err(|_| fail(StatusCode::BAD_REQUEST, "Estado inválido"))?;

    let walk = fetch_walk(&state, id, &user).await?;

    if !walk.status().can_transition_to(next) {
        return Err(fail(StatusCode::BAD_REQUEST, "Transición de estado inválida"));
    }

    // Stamp the lifecycle timestamp that matches the transition.
    let sql = match next {
        WalkStatus::InProgress => {
            format!("UPDATE walks SET status = $2, started_at = NOW() WHERE id = $1 RETURNING {WALK_COLUMNS}")
        }
        WalkStatus::Completed => {
            format!("UPDATE walks SET status = $2, ended_at = NOW() WHERE id = $1 RETURNING {WALK_COLUMNS}")
        }
        _ => format!("UPDATE walks SET status = $2 WHERE id = $1 RETURNING {WALK_COLUMNS}"),
    };

    let updated: Walk = sqlx::query_as(&sql)
        .bind(id)
        .bind(next.to_string())
        .fetch_one(&state.db)
        .await
        .map_err(db_error)?;

    // Tell the counterparty.
    let other = if user.auth.user_id == walk.client_id {
        walk.walker_id
    } else {
        walk.client_id
    };
    notify::push(
        state.db.clone(),
        other,
        "Paseo actualizado",
        &format!("El paseo de {} ahora está {}", walk.dog_name, next),
    );

    Ok(Json(json!({
        "status": "success",
        "message": "Estado del paseo actualizado",
        "data": { "walk": updated },
    })))
}

pub(crate) async fn fetch_walk(
    state: &AppState,
    id: Uuid,
    user: &ActiveUser,
) -> Result<Walk, ApiError> {
    let walk: Option<Walk> =
        sqlx::query_as(&format!("SELECT {WALK_COLUMNS} FROM walks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&state.db)
            .await
            .map_err(db_error)?;

    let Some(walk) = walk else {
        return Err(fail(StatusCode::NOT_FOUND, "Paseo no encontrado"));
    };
    if !walk.involves(user.auth.user_id) && !is_staff(&user.auth) {
        return Err(fail(StatusCode::FORBIDDEN, "Acceso denegado"));
    }
    Ok(walk)
}
