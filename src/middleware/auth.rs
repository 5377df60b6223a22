use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::auth::{ActiveUser, AuthenticatedUser};
use crate::models::user::{User, USER_COLUMNS};
use crate::services::token::{extract_token, TokenError, TokenService};
use crate::AppState;

/// Bound on the account re-check so a slow store cannot hang the gate.
const ACCOUNT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Rejection taxonomy for the authorization gate. Every failure maps to a
/// fixed user-facing message and a machine code, so clients can tell
/// "refresh the token" (expired) apart from "log in again" (malformed), and
/// a store outage apart from a deactivated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("No autorizado: credenciales no proporcionadas")]
    CredentialsMissing,
    #[error("Token inválido")]
    TokenMalformed,
    #[error("Token expirado")]
    TokenExpired,
    #[error("Error al verificar el token")]
    TokenInvalid,
    #[error("No autorizado: cuenta inactiva")]
    AccountInactive,
    #[error("Servicio no disponible, intente nuevamente")]
    UpstreamUnavailable,
    #[error("Error de configuración del servidor")]
    Misconfigured,
}

impl AuthError {
    pub fn status(self) -> StatusCode {
        match self {
            AuthError::CredentialsMissing
            | AuthError::TokenMalformed
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::AccountInactive => StatusCode::UNAUTHORIZED,
            AuthError::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            AuthError::CredentialsMissing => "credentials_missing",
            AuthError::TokenMalformed => "token_malformed",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenInvalid => "token_invalid",
            AuthError::AccountInactive => "account_inactive",
            AuthError::UpstreamUnavailable => "upstream_unavailable",
            AuthError::Misconfigured => "server_misconfigured",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed => AuthError::TokenMalformed,
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid => AuthError::TokenInvalid,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = if status.is_client_error() { "fail" } else { "error" };
        (
            status,
            Json(json!({ "status": kind, "message": self.to_string(), "code": self.code() })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = extract_token(auth_header).ok_or(AuthError::CredentialsMissing)?;

        let tokens = parts
            .extensions
            .get::<Arc<TokenService>>()
            .ok_or(AuthError::Misconfigured)?;

        let claims = tokens.verify(token)?;
        let user_id: Uuid = claims.sub.parse().map_err(|_| AuthError::TokenMalformed)?;

        Ok(AuthenticatedUser {
            user_id,
            role: claims.role,
            name: claims.name,
            email: claims.email,
        })
    }
}

impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = AuthenticatedUser::from_request_parts(parts, state).await?;
        let account = find_active_account(&state.db, auth.user_id).await?;
        Ok(ActiveUser { auth, account })
    }
}

/// Re-fetch the backing account to confirm it is still active, so a token
/// cannot outlive a deactivation. "Not found" and "not active" are identity
/// failures; a store error or timeout is an availability failure and must
/// never be conflated with them.
async fn find_active_account(pool: &PgPool, user_id: Uuid) -> Result<User, AuthError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND status = 'active'");
    let lookup = sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .fetch_optional(pool);

    match tokio::time::timeout(ACCOUNT_LOOKUP_TIMEOUT, lookup).await {
        Ok(Ok(Some(account))) => Ok(account),
        Ok(Ok(None)) => Err(AuthError::AccountInactive),
        Ok(Err(e)) => {
            tracing::error!("account lookup failed for {user_id}: {e}");
            Err(AuthError::UpstreamUnavailable)
        }
        Err(_) => {
            tracing::warn!(
                "account lookup for {user_id} timed out after {}s",
                ACCOUNT_LOOKUP_TIMEOUT.as_secs()
            );
            Err(AuthError::UpstreamUnavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::{body::Body, http::Request, routing::get, Extension, Router};
    use chrono::Utc;
    use tower::ServiceExt;

    use super::*;
    use crate::models::auth::Claims;
    use crate::models::user::UserRole;

    type Seen = Arc<Mutex<Option<AuthenticatedUser>>>;

    fn protected_app(tokens: Arc<TokenService>) -> (Router, Seen) {
        let seen: Seen = Arc::new(Mutex::new(None));
        let observer = seen.clone();
        let app = Router::new()
            .route(
                "/protected",
                get(move |user: AuthenticatedUser| async move {
                    *observer.lock().unwrap() = Some(user);
                    "ok"
                }),
            )
            .layer(Extension(tokens));
        (app, seen)
    }

    fn request(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new("gate-secret", Duration::from_secs(3600)))
    }

    #[tokio::test]
    async fn missing_credentials_rejected_before_handler() {
        let (app, seen) = protected_app(token_service());

        let res = app.oneshot(request(None)).await.unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn wrong_scheme_rejected() {
        let (app, seen) = protected_app(token_service());

        let res = app.oneshot(request(Some("Token abc.def.ghi"))).await.unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_claims() {
        let tokens = token_service();
        let id = Uuid::new_v4();
        let token = tokens
            .issue(id, UserRole::Walker, "Ana Gómez", "ana@example.com")
            .unwrap();
        let (app, seen) = protected_app(tokens);

        let res = app
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let user = seen.lock().unwrap().clone().expect("handler observed the claims");
        assert_eq!(user.user_id, id);
        assert_eq!(user.role, UserRole::Walker);
        assert_eq!(user.email, "ana@example.com");
    }

    #[tokio::test]
    async fn expired_token_rejected_before_handler() {
        let tokens = token_service();
        let now = Utc::now().timestamp() as usize;
        let token = tokens
            .sign(&Claims {
                sub: Uuid::new_v4().to_string(),
                role: UserRole::Client,
                name: "Juan".into(),
                email: "juan@example.com".into(),
                iat: now - 120,
                exp: now - 60,
            })
            .unwrap();
        let (app, seen) = protected_app(tokens);

        let res = app
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(seen.lock().unwrap().is_none());
    }

    #[test]
    fn failure_kinds_keep_fixed_codes_and_statuses() {
        assert_eq!(AuthError::CredentialsMissing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::TokenExpired.code(), "token_expired");
        assert_eq!(AuthError::TokenMalformed.code(), "token_malformed");
        assert_eq!(AuthError::UpstreamUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_ne!(AuthError::AccountInactive.code(), AuthError::UpstreamUnavailable.code());

        assert_eq!(AuthError::from(TokenError::Expired), AuthError::TokenExpired);
        assert_eq!(AuthError::from(TokenError::Malformed), AuthError::TokenMalformed);
        assert_eq!(AuthError::from(TokenError::Invalid), AuthError::TokenInvalid);
    }
}
