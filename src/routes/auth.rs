use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};

use crate::{
    middleware::auth::AuthError,
    models::{
        auth::AuthenticatedUser,
        user::{LoginRequest, RegisterRequest, User, UserProfile, UserRole, USER_COLUMNS},
    },
    services::{
        password,
        token::{extract_token, TokenError},
    },
    AppState,
};

use super::{db_error, fail, ApiError};

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        body.name.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        body.email.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        body.password.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(fail(
            StatusCode::BAD_REQUEST,
            "Email, contraseña y nombre son requeridos",
        ));
    };

    if password.len() < password::MIN_PASSWORD_LEN {
        return Err(fail(
            StatusCode::BAD_REQUEST,
            "La contraseña debe tener al menos 6 caracteres",
        ));
    }

    // Staff roles are provisioned out of band, never self-assigned.
    let role = match body.role.as_deref() {
        None => UserRole::Client,
        Some(raw) => match raw.parse::<UserRole>() {
            Ok(role @ (UserRole::Client | UserRole::Walker)) => role,
            _ => return Err(fail(StatusCode::BAD_REQUEST, "Rol inválido")),
        },
    };

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(&state.db)
        .await
        .map_err(db_error)?;
    if exists {
        return Err(fail(StatusCode::BAD_REQUEST, "El email ya está registrado"));
    }

    let password_hash = password::hash(password).map_err(|e| {
        tracing::error!("password hash failed: {e}");
        fail(StatusCode::INTERNAL_SERVER_ERROR, "Error al registrar el usuario")
    })?;

    let user: User = sqlx::query_as(&format!(
        "INSERT INTO users (email, password_hash, name, phone, location, role)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(email)
    .bind(&password_hash)
    .bind(name)
    .bind(body.phone.as_deref())
    .bind(body.location.as_deref())
    .bind(role.to_string())
    .fetch_one(&state.db)
    .await
    .map_err(db_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Usuario registrado exitosamente",
            "data": { "user": UserProfile::from(user) },
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(email), Some(password)) = (body.email.as_deref(), body.password.as_deref()) else {
        return Err(fail(StatusCode::BAD_REQUEST, "Email y contraseña son requeridos"));
    };

    let user: Option<User> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&state.db)
            .await
            .map_err(db_error)?;

    // Uniform rejection for unknown email and wrong password.
    let Some(user) = user else {
        return Err(fail(StatusCode::UNAUTHORIZED, "Credenciales incorrectas"));
    };
    if !password::verify(password, &user.password_hash) {
        return Err(fail(StatusCode::UNAUTHORIZED, "Credenciales incorrectas"));
    }
    if user.status != "active" {
        return Err(fail(StatusCode::UNAUTHORIZED, "Cuenta inactiva o suspendida"));
    }

    let token = state
        .tokens
        .issue(user.id, user.role(), &user.name, &user.email)
        .map_err(|e| {
            tracing::error!("token issue failed: {e}");
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Error al generar el token")
        })?;

    Ok(Json(json!({
        "status": "success",
        "message": "Login exitoso",
        "data": { "token": token, "user": UserProfile::from(user) },
    })))
}

pub async fn verify_token(user: AuthenticatedUser) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Token válido",
        "data": {
            "token_data": {
                "user_id": user.user_id,
                "role": user.role,
                "name": user.name,
                "email": user.email,
            }
        },
    }))
}

/// Reports whether the presented token is still a live session. Accepts both
/// the identity-bearing claims and the legacy tag-only payload.
pub async fn check_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = extract_token(auth_header).ok_or(AuthError::CredentialsMissing)?;

    match state.tokens.verify(token) {
        Ok(claims) => Ok(Json(json!({
            "status": "success",
            "message": "Sesión activa",
            "data": {
                "valid": true,
                "token_type": "access",
                "user_id": claims.sub,
                "expires_at": claims.exp,
            },
        }))),
        // Pre-identity tokens decode under the legacy shape.
        Err(TokenError::Malformed) => {
            let legacy = state.tokens.verify_legacy(token)?;
            Ok(Json(json!({
                "status": "success",
                "message": "Sesión activa (token heredado, sin identidad)",
                "data": {
                    "valid": true,
                    "token_type": "legacy",
                    "expires_at": legacy.exp,
                },
            })))
        }
        Err(e) => Err(e.into()),
    }
}

/// Exchange a still-valid token for a fresh one. The original token is not
/// invalidated; both remain usable until their own expiries (stateless
/// sessions, no server-side revocation).
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = extract_token(auth_header).ok_or(AuthError::CredentialsMissing)?;

    let refreshed = state.tokens.refresh(token)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Token renovado exitosamente",
        "data": { "token": refreshed },
    })))
}

/// Nothing to revoke server-side: sessions are stateless and the client
/// discards the token.
pub async fn logout(_user: AuthenticatedUser) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Sesión cerrada exitosamente",
    }))
}
