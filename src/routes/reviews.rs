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
        review::{CreateReviewRequest, Review},
        walk::{Walk, WalkStatus, WALK_COLUMNS},
    },
    services::notify,
    AppState,
};

use super::{db_error, fail, ApiError};

const REVIEW_COLUMNS: &str = "id, walk_id, client_id, walker_id, rating, comment, created_at";

/// A client reviews a completed walk. One review per walk.
pub async fn create_review(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Some(walk_id) = body.walk_id else {
        return Err(fail(StatusCode::BAD_REQUEST, "El paseo es requerido"));
    };
    let Some(rating) = body.rating else {
        return Err(fail(StatusCode::BAD_REQUEST, "La calificación es requerida"));
    };
    if !(1..=5).contains(&rating) {
        return Err(fail(
            StatusCode::BAD_REQUEST,
            "La calificación debe estar entre 1 y 5",
        ));
    }

    let walk: Option<Walk> =
        sqlx::query_as(&format!("SELECT {WALK_COLUMNS} FROM walks WHERE id = $1"))
            .bind(walk_id)
            .fetch_optional(&state.db)
            .await
            .map_err(db_error)?;

    let Some(walk) = walk else {
        return Err(fail(StatusCode::NOT_FOUND, "Paseo no encontrado"));
    };
    if walk.client_id != user.auth.user_id {
        return Err(fail(
            StatusCode::FORBIDDEN,
            "Solo el cliente del paseo puede dejar una reseña",
        ));
    }
    if walk.status() != WalkStatus::Completed {
        return Err(fail(StatusCode::BAD_REQUEST, "El paseo aún no ha finalizado"));
    }

    let review: Option<Review> = sqlx::query_as(&format!(
        "INSERT INTO reviews (walk_id, client_id, walker_id, rating, comment)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (walk_id) DO NOTHING
         RETURNING {REVIEW_COLUMNS}"
    ))
    .bind(walk_id)
    .bind(walk.client_id)
    .bind(walk.walker_id)
    .bind(rating)
    .bind(body.comment.as_deref())
    .fetch_optional(&state.db)
    .await
    .map_err(db_error)?;

    let Some(review) = review else {
        return Err(fail(StatusCode::BAD_REQUEST, "Este paseo ya tiene una reseña"));
    };

    notify::push(
        state.db.clone(),
        walk.walker_id,
        "Nueva reseña recibida",
        &format!(
            "Recibiste {} estrellas por el paseo de {}",
            review.rating, walk.dog_name
        ),
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Reseña creada exitosamente",
            "data": { "review": review },
        })),
    ))
}

pub async fn list_for_walker(
    State(state): State<AppState>,
    _user: ActiveUser,
    Path(walker_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let (average_rating, count): (Option<f64>, i64) = sqlx::query_as(
        "SELECT AVG(rating)::FLOAT8, COUNT(*) FROM reviews WHERE walker_id = $1",
    )
    .bind(walker_id)
    .fetch_one(&state.db)
    .await
    .map_err(db_error)?;

    let reviews: Vec<Review> = sqlx::query_as(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE walker_id = $1 ORDER BY created_at DESC"
    ))
    .bind(walker_id)
    .fetch_all(&state.db)
    .await
    .map_err(db_error)?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "walker_id": walker_id,
            "average_rating": average_rating,
            "count": count,
            "reviews": reviews,
        },
    })))
}
