pub mod auth;
pub mod banners;
pub mod health;
pub mod index;
pub mod notifications;
pub mod reviews;
pub mod subscription;
pub mod tickets;
pub mod users;
pub mod walk_map;
pub mod walkers;
pub mod walks;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use crate::models::auth::AuthenticatedUser;
use crate::models::user::UserRole;

pub(crate) type ApiError = (StatusCode, Json<Value>);

/// Error envelope: "fail" for client errors, "error" for server errors.
pub(crate) fn fail(status: StatusCode, message: &str) -> ApiError {
    let kind = if status.is_client_error() { "fail" } else { "error" };
    (status, Json(json!({ "status": kind, "message": message })))
}

/// DB failures are logged server-side and surfaced as a generic message.
pub(crate) fn db_error(e: sqlx::Error) -> ApiError {
    tracing::error!("database error: {e}");
    fail(StatusCode::INTERNAL_SERVER_ERROR, "Error en la base de datos")
}

pub(crate) fn require_staff(user: &AuthenticatedUser) -> Result<(), ApiError> {
    match user.role {
        UserRole::Admin | UserRole::Support => Ok(()),
        _ => Err(fail(StatusCode::FORBIDDEN, "Acceso denegado")),
    }
}

pub(crate) fn require_admin(user: &AuthenticatedUser) -> Result<(), ApiError> {
    match user.role {
        UserRole::Admin => Ok(()),
        _ => Err(fail(StatusCode::FORBIDDEN, "Acceso denegado")),
    }
}

pub(crate) fn is_staff(user: &AuthenticatedUser) -> bool {
    matches!(user.role, UserRole::Admin | UserRole::Support)
}
