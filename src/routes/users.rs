use std::collections::HashMap;

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
        user::{
            ChangeStatusRequest, SearchUsersQuery, UpdateUserRequest, User, UserProfile, UserRole,
            UserStatus, USER_COLUMNS,
        },
    },
    services::password,
    AppState,
};

use super::{db_error, fail, require_admin, require_staff, ApiError};

pub async fn list_users(
    State(state): State<AppState>,
    _user: ActiveUser,
) -> Result<Json<Value>, ApiError> {
    let users: Vec<User> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"))
            .fetch_all(&state.db)
            .await
            .map_err(db_error)?;

    let profiles: Vec<UserProfile> = users.into_iter().map(UserProfile::from).collect();

    Ok(Json(json!({
        "status": "success",
        "results": profiles.len(),
        "data": { "users": profiles },
    })))
}

pub async fn search_users(
    State(state): State<AppState>,
    _user: ActiveUser,
    Query(q): Query<SearchUsersQuery>,
) -> Result<Json<Value>, ApiError> {
    if let Some(role) = q.role.as_deref() {
        role.parse::<UserRole>()
            .map_err(|_| fail(StatusCode::BAD_REQUEST, "Rol inválido"))?;
    }
    if let Some(status) = q.status.as_deref() {
        status
            .parse::<UserStatus>()
            .map_err(|_| fail(StatusCode::BAD_REQUEST, "Estado inválido"))?;
    }
    let limit = q.limit.unwrap_or(50).clamp(1, 200);

    let users: Vec<User> = sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%' OR email ILIKE '%' || $1 || '%')
           AND ($2::TEXT IS NULL OR role = $2)
           AND ($3::TEXT IS NULL OR status = $3)
         ORDER BY created_at DESC
         LIMIT $4"
    ))
    .bind(q.query.as_deref())
    .bind(q.role.as_deref())
    .bind(q.status.as_deref())
    .bind(limit)
    .fetch_all(&state.db)
    .await
    .map_err(db_error)?;

    let profiles: Vec<UserProfile> = users.into_iter().map(UserProfile::from).collect();

    Ok(Json(json!({
        "status": "success",
        "results": profiles.len(),
        "data": { "users": profiles },
    })))
}

pub async fn user_stats(
    State(state): State<AppState>,
    _user: ActiveUser,
) -> Result<Json<Value>, ApiError> {
    let rows: Vec<(String, String, i64)> =
        sqlx::query_as("SELECT role, status, COUNT(*) FROM users GROUP BY role, status")
            .fetch_all(&state.db)
            .await
            .map_err(db_error)?;

    let mut total = 0i64;
    let mut by_role: HashMap<String, i64> = HashMap::new();
    let mut by_status: HashMap<String, i64> = HashMap::new();
    for (role, status, count) in rows {
        total += count;
        *by_role.entry(role).or_default() += count;
        *by_status.entry(status).or_default() += count;
    }

    Ok(Json(json!({
        "status": "success",
        "data": { "total": total, "by_role": by_role, "by_status": by_status },
    })))
}

pub async fn get_user(
    State(state): State<AppState>,
    _user: ActiveUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let user: Option<User> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&state.db)
            .await
            .map_err(db_error)?;

    let Some(user) = user else {
        return Err(fail(StatusCode::NOT_FOUND, "Usuario no encontrado"));
    };

    Ok(Json(json!({
        "status": "success",
        "data": { "user": UserProfile::from(user) },
    })))
}

/// Partial update of a profile. Users edit themselves; staff can edit anyone.
pub async fn update_user(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(target_id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    if target_id != user.auth.user_id {
        require_staff(&user.auth)?;
    }

    if let Some(email) = body.email.as_deref() {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id != $2)")
                .bind(email)
                .bind(target_id)
                .fetch_one(&state.db)
                .await
                .map_err(db_error)?;
        if taken {
            return Err(fail(StatusCode::BAD_REQUEST, "El email ya está en uso"));
        }
    }

    let password_hash = match body.password.as_deref() {
        Some(p) if p.len() < password::MIN_PASSWORD_LEN => {
            return Err(fail(
                StatusCode::BAD_REQUEST,
                "La contraseña debe tener al menos 6 caracteres",
            ));
        }
        Some(p) => Some(password::hash(p).map_err(|e| {
            tracing::error!("password hash failed: {e}");
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Error al actualizar el usuario")
        })?),
        None => None,
    };

    // Build dynamic UPDATE — only update provided fields
    let mut sets: Vec<String> = vec![];
    if body.name.is_some() { sets.push("name = $__".into()); }
    if body.email.is_some() { sets.push("email = $__".into()); }
    if password_hash.is_some() { sets.push("password_hash = $__".into()); }
    if body.phone.is_some() { sets.push("phone = $__".into()); }
    if body.location.is_some() { sets.push("location = $__".into()); }
    if body.profile_image.is_some() { sets.push("profile_image = $__".into()); }

    if sets.is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Ninguna modificación proporcionada"));
    }

    // Replace $__ placeholders with sequential $n (starting at $2; $1 = id)
    let mut param_idx = 2usize;
    let sets_sql: Vec<String> = sets
        .iter()
        .map(|s| {
            let replaced = s.replace("$__", &format!("${param_idx}"));
            param_idx += 1;
            replaced
        })
        .collect();

    let sql = format!(
        "UPDATE users SET {}, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}",
        sets_sql.join(", ")
    );

    let mut q = sqlx::query_as::<_, User>(&sql).bind(target_id);
    if let Some(v) = &body.name { q = q.bind(v); }
    if let Some(v) = &body.email { q = q.bind(v); }
    if let Some(v) = &password_hash { q = q.bind(v); }
    if let Some(v) = &body.phone { q = q.bind(v); }
    if let Some(v) = &body.location { q = q.bind(v); }
    if let Some(v) = &body.profile_image { q = q.bind(v); }

    let updated = q
        .fetch_optional(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Usuario no encontrado"))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Usuario actualizado exitosamente",
        "data": { "user": UserProfile::from(updated) },
    })))
}

/// Soft delete: the account is marked inactive, never removed.
pub async fn delete_user(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(target_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if target_id != user.auth.user_id {
        require_admin(&user.auth)?;
    }

    let res = sqlx::query("UPDATE users SET status = 'inactive', updated_at = NOW() WHERE id = $1")
        .bind(target_id)
        .execute(&state.db)
        .await
        .map_err(db_error)?;

    if res.rows_affected() == 0 {
        return Err(fail(StatusCode::NOT_FOUND, "Usuario no encontrado"));
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Usuario eliminado exitosamente",
    })))
}

pub async fn change_status(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(target_id): Path<Uuid>,
    Json(body): Json<ChangeStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    require_staff(&user.auth)?;

    let Some(raw) = body.status.as_deref() else {
        return Err(fail(StatusCode::BAD_REQUEST, "El estado es requerido"));
    };
    let status: UserStatus = raw.parse().map_err(|_| {
        fail(
            StatusCode::BAD_REQUEST,
            "Estado inválido (active, inactive, suspended)",
        )
    })?;

    let updated: Option<Uuid> = sqlx::query_scalar(
        "UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING id",
    )
    .bind(target_id)
    .bind(status.to_string())
    .fetch_optional(&state.db)
    .await
    .map_err(db_error)?;

    if updated.is_none() {
        return Err(fail(StatusCode::NOT_FOUND, "Usuario no encontrado"));
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Estado de usuario actualizado",
    })))
}
