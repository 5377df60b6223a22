use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    models::{
        auth::ActiveUser,
        subscription::{SubscriptionSettings, UpdateSubscriptionRequest},
    },
    AppState,
};

use super::{db_error, ApiError};

pub async fn get_settings(
    State(state): State<AppState>,
    user: ActiveUser,
) -> Result<Json<Value>, ApiError> {
    let settings: Option<SubscriptionSettings> = sqlx::query_as(
        "SELECT user_id, push_enabled, email_enabled, walk_updates, promotions, updated_at
         FROM subscription_settings WHERE user_id = $1",
    )
    .bind(user.auth.user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(db_error)?;

    let settings = match settings {
        Some(s) => serde_json::to_value(s).unwrap_or_default(),
        // Defaults until the user saves a preference.
        None => json!({
            "user_id": user.auth.user_id,
            "push_enabled": true,
            "email_enabled": true,
            "walk_updates": true,
            "promotions": false,
        }),
    };

    Ok(Json(json!({
        "status": "success",
        "data": { "settings": settings },
    })))
}

pub async fn update_settings(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<UpdateSubscriptionRequest>,
) -> Result<Json<Value>, ApiError> {
    let settings: SubscriptionSettings = sqlx::query_as(
        "INSERT INTO subscription_settings (user_id, push_enabled, email_enabled, walk_updates, promotions)
         VALUES ($1, COALESCE($2, TRUE), COALESCE($3, TRUE), COALESCE($4, TRUE), COALESCE($5, FALSE))
         ON CONFLICT (user_id) DO UPDATE SET
             push_enabled = COALESCE($2, subscription_settings.push_enabled),
             email_enabled = COALESCE($3, subscription_settings.email_enabled),
             walk_updates = COALESCE($4, subscription_settings.walk_updates),
             promotions = COALESCE($5, subscription_settings.promotions),
             updated_at = NOW()
         RETURNING user_id, push_enabled, email_enabled, walk_updates, promotions, updated_at",
    )
    .bind(user.auth.user_id)
    .bind(body.push_enabled)
    .bind(body.email_enabled)
    .bind(body.walk_updates)
    .bind(body.promotions)
    .fetch_one(&state.db)
    .await
    .map_err(db_error)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Preferencias actualizadas exitosamente",
        "data": { "settings": settings },
    })))
}
