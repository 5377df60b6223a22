use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::{
        auth::ActiveUser,
        review::Review,
        user::{User, UserProfile, USER_COLUMNS},
    },
    AppState,
};

use super::{db_error, fail, ApiError};

/// Public directory of active walkers with their rating summary.
pub async fn list_walkers(
    State(state): State<AppState>,
    _user: ActiveUser,
) -> Result<Json<Value>, ApiError> {
    let rows = sqlx::query(
        "SELECT u.id, u.name, u.location, u.profile_image, u.created_at,
                AVG(r.rating)::FLOAT8 AS rating, COUNT(r.id) AS review_count
         FROM users u
         LEFT JOIN reviews r ON r.walker_id = u.id
         WHERE u.role = 'walker' AND u.status = 'active'
         GROUP BY u.id
         ORDER BY u.name",
    )
    .fetch_all(&state.db)
    .await
    .map_err(db_error)?;

    let walkers: Vec<Value> = rows
        .iter()
        .map(|row| {
            use sqlx::Row;
            json!({
                "id": row.get::<Uuid, _>("id"),
                "name": row.get::<String, _>("name"),
                "location": row.get::<Option<String>, _>("location"),
                "profile_image": row.get::<Option<String>, _>("profile_image"),
                "rating": row.get::<Option<f64>, _>("rating"),
                "review_count": row.get::<i64, _>("review_count"),
                "member_since": row.get::<DateTime<Utc>, _>("created_at"),
            })
        })
        .collect();

    Ok(Json(json!({
        "status": "success",
        "results": walkers.len(),
        "data": { "walkers": walkers },
    })))
}

pub async fn get_walker(
    State(state): State<AppState>,
    _user: ActiveUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let walker: Option<User> = sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = 'walker' AND status = 'active'"
    ))
    .bind(id)
    .fetch_optional(&state.db)
    .await
    .map_err(db_error)?;

    let Some(walker) = walker else {
        return Err(fail(StatusCode::NOT_FOUND, "Paseador no encontrado"));
    };

    let (rating, review_count): (Option<f64>, i64) = sqlx::query_as(
        "SELECT AVG(rating)::FLOAT8, COUNT(*) FROM reviews WHERE walker_id = $1",
    )
    .bind(id)
    .fetch_one(&state.db)
    .await
    .map_err(db_error)?;

    let recent_reviews: Vec<Review> = sqlx::query_as(
        "SELECT id, walk_id, client_id, walker_id, rating, comment, created_at
         FROM reviews WHERE walker_id = $1
         ORDER BY created_at DESC LIMIT 10",
    )
    .bind(id)
    .fetch_all(&state.db)
    .await
    .map_err(db_error)?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "walker": UserProfile::from(walker),
            "rating": rating,
            "review_count": review_count,
            "recent_reviews": recent_reviews,
        },
    })))
}
