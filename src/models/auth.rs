use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{User, UserRole};

/// Claims embedded in the bearer token (canonical, identity-bearing shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user UUID
    pub role: UserRole,
    pub name: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

/// Payload of tokens minted by deployments that predate identity claims:
/// just a type tag and timestamps. Deprecated; carries no subject, so it is
/// only accepted by the session-check endpoint, never by the authorization
/// gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyClaims {
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: usize,
    pub exp: usize,
}

/// Extracted from the validated token, available via Axum extractors.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
    pub name: String,
    pub email: String,
}

/// Rich gate variant: the decoded claims plus the account row re-fetched at
/// request time, so a token cannot outlive a deactivated account.
#[derive(Debug, Clone)]
pub struct ActiveUser {
    pub auth: AuthenticatedUser,
    pub account: User,
}
