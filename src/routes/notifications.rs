use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::{auth::ActiveUser, notification::Notification},
    AppState,
};

use super::{db_error, fail, ApiError};

pub async fn list_notifications(
    State(state): State<AppState>,
    user: ActiveUser,
) -> Result<Json<Value>, ApiError> {
    let notifications: Vec<Notification> = sqlx::query_as(
        "SELECT id, user_id, title, body, read, created_at
         FROM notifications WHERE user_id = $1
         ORDER BY created_at DESC LIMIT 50",
    )
    .bind(user.auth.user_id)
    .fetch_all(&state.db)
    .await
    .map_err(db_error)?;

    Ok(Json(json!({
        "status": "success",
        "results": notifications.len(),
        "data": { "notifications": notifications },
    })))
}

pub async fn unread_count(
    State(state): State<AppState>,
    user: ActiveUser,
) -> Result<Json<Value>, ApiError> {
    let unread: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE")
            .bind(user.auth.user_id)
            .fetch_one(&state.db)
            .await
            .map_err(db_error)?;

    Ok(Json(json!({
        "status": "success",
        "data": { "unread": unread },
    })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let updated: Option<Uuid> = sqlx::query_scalar(
        "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2 RETURNING id",
    )
    .bind(id)
    .bind(user.auth.user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(db_error)?;

    if updated.is_none() {
        return Err(fail(StatusCode::NOT_FOUND, "Notificación no encontrada"));
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Notificación marcada como leída",
    })))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    user: ActiveUser,
) -> Result<Json<Value>, ApiError> {
    let res = sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
        .bind(user.auth.user_id)
        .execute(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Notificaciones marcadas como leídas",
        "data": { "updated": res.rows_affected() },
    })))
}
