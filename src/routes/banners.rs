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
        banner::{Banner, CreateBannerRequest},
    },
    AppState,
};

use super::{db_error, fail, require_admin, ApiError};

/// Public: active banners for the app home screen.
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let banners: Vec<Banner> = sqlx::query_as(
        "SELECT id, title, image_url, link_url, active, created_at
         FROM banners WHERE active = TRUE
         ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(db_error)?;

    Ok(Json(json!({
        "status": "success",
        "results": banners.len(),
        "data": { "banners": banners },
    })))
}

pub async fn create_banner(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<CreateBannerRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_admin(&user.auth)?;

    let (Some(title), Some(image_url)) = (
        body.title.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        body.image_url.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    ) else {
        return Err(fail(StatusCode::BAD_REQUEST, "Título e imagen son requeridos"));
    };

    let banner: Banner = sqlx::query_as(
        "INSERT INTO banners (title, image_url, link_url)
         VALUES ($1, $2, $3)
         RETURNING id, title, image_url, link_url, active, created_at",
    )
    .bind(title)
    .bind(image_url)
    .bind(body.link_url.as_deref())
    .fetch_one(&state.db)
    .await
    .map_err(db_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Banner creado exitosamente",
            "data": { "banner": banner },
        })),
    ))
}

pub async fn delete_banner(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user.auth)?;

    let res = sqlx::query("DELETE FROM banners WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(db_error)?;

    if res.rows_affected() == 0 {
        return Err(fail(StatusCode::NOT_FOUND, "Banner no encontrado"));
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Banner eliminado exitosamente",
    })))
}
