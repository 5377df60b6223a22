use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::models::auth::{Claims, LegacyClaims};
use crate::models::user::UserRole;

/// Verification failures, kept to exactly three kinds so callers can tell
/// "refresh the token" apart from "log in again".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Undecodable token or signature mismatch.
    #[error("Token inválido")]
    Malformed,
    /// Signature checks out but the expiry has passed.
    #[error("Token expirado")]
    Expired,
    /// Anything else that went wrong while signing or decoding.
    #[error("Error al verificar el token")]
    Invalid,
}

/// Issues and validates the bearer tokens that stand in for sessions.
/// Stateless: tokens are never stored server-side and cannot be revoked;
/// they die by client discard or expiry.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: u64,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds: ttl.as_secs(),
        }
    }

    /// Issue a token for an authenticated account, valid from now until
    /// now + TTL. Two calls for the same identity at different instants
    /// produce different tokens (fresh `iat`).
    pub fn issue(
        &self,
        user_id: Uuid,
        role: UserRole,
        name: &str,
        email: &str,
    ) -> Result<String, TokenError> {
        let now = Utc::now().timestamp() as usize;
        self.sign(&Claims {
            sub: user_id.to_string(),
            role,
            name: name.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + self.ttl_seconds as usize,
        })
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Verify signature and expiry, returning the claims exactly as issued.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(|e| map_decode_error(&e))
    }

    /// Accept tokens minted before identity claims existed. They carry no
    /// subject, so they only prove that a session was once opened; the
    /// authorization gate never accepts them.
    pub fn verify_legacy(&self, token: &str) -> Result<LegacyClaims, TokenError> {
        let claims = decode::<LegacyClaims>(token, &self.decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(|e| map_decode_error(&e))?;
        if claims.token_type != "access_token" {
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }

    /// Exchange a still-valid token for a fresh one carrying the same
    /// identity claims. Expired input is rejected: once a token lapses the
    /// client must log in again. The old token is not invalidated; it stays
    /// usable until its own expiry.
    pub fn refresh(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.verify(token)?;
        let now = Utc::now().timestamp() as usize;
        self.sign(&Claims {
            iat: now,
            exp: now + self.ttl_seconds as usize,
            ..claims
        })
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no clock grace window.
        validation.leeway = 0;
        validation
    }
}

/// Pull the token out of an `Authorization` header value. Only the exact
/// `Bearer <token>` shape is accepted: case-sensitive scheme, single space.
pub fn extract_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty() && !t.starts_with(' '))
}

fn map_decode_error(e: &jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;
    match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => TokenError::Malformed,
        _ => TokenError::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::from_secs(3600))
    }

    fn claims_with(iat: usize, exp: usize) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            role: UserRole::Client,
            name: "Juan Pérez".into(),
            email: "juan@example.com".into(),
            iat,
            exp,
        }
    }

    #[test]
    fn roundtrip_preserves_claims() {
        let svc = service();
        let id = Uuid::new_v4();
        let token = svc.issue(id, UserRole::Walker, "Ana Gómez", "ana@example.com").unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.role, UserRole::Walker);
        assert_eq!(claims.name, "Ana Gómez");
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn ttl_boundary() {
        let svc = TokenService::new("test-secret", Duration::from_secs(1));
        let token = svc
            .issue(Uuid::new_v4(), UserRole::Client, "Juan", "juan@example.com")
            .unwrap();

        assert!(svc.verify(&token).is_ok());

        std::thread::sleep(Duration::from_secs(2));
        assert_eq!(svc.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn expired_token_is_distinguishable() {
        let svc = service();
        let now = Utc::now().timestamp() as usize;
        let token = svc.sign(&claims_with(now - 120, now - 60)).unwrap();

        assert_eq!(svc.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn tampered_signature_is_malformed() {
        let svc = service();
        let token = svc
            .issue(Uuid::new_v4(), UserRole::Client, "Juan", "juan@example.com")
            .unwrap();

        let (head, sig) = token.rsplit_once('.').unwrap();
        let mut sig: Vec<char> = sig.chars().collect();
        sig[0] = if sig[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{head}.{}", sig.into_iter().collect::<String>());

        assert_eq!(svc.verify(&tampered).unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn token_from_another_secret_is_malformed() {
        let other = TokenService::new("another-secret", Duration::from_secs(3600));
        let token = other
            .issue(Uuid::new_v4(), UserRole::Client, "Juan", "juan@example.com")
            .unwrap();

        assert_eq!(service().verify(&token).unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            service().verify("not.a.token").unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn refresh_leaves_the_original_valid() {
        let svc = service();
        let now = Utc::now().timestamp() as usize;
        let original = svc.sign(&claims_with(now - 30, now + 3570)).unwrap();

        let refreshed = svc.refresh(&original).unwrap();
        assert_ne!(refreshed, original);

        // Both verify until their own independent expiries.
        let old = svc.verify(&original).unwrap();
        let new = svc.verify(&refreshed).unwrap();
        assert_eq!(old.sub, new.sub);
        assert_eq!(old.role, new.role);
        assert!(new.iat > old.iat);
    }

    #[test]
    fn refresh_rejects_expired_input() {
        let svc = service();
        let now = Utc::now().timestamp() as usize;
        let expired = svc.sign(&claims_with(now - 7200, now - 3600)).unwrap();

        assert_eq!(svc.refresh(&expired).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn concurrent_sessions_are_expected() {
        // No revocation list: two tokens for the same identity, issued at
        // different instants, are both valid at once. Expected behavior,
        // not a bug.
        let svc = service();
        let id = Uuid::new_v4();
        let now = Utc::now().timestamp() as usize;

        let first = svc
            .sign(&Claims {
                sub: id.to_string(),
                role: UserRole::Client,
                name: "Juan".into(),
                email: "juan@example.com".into(),
                iat: now - 10,
                exp: now + 3590,
            })
            .unwrap();
        let second = svc.issue(id, UserRole::Client, "Juan", "juan@example.com").unwrap();

        assert_ne!(first, second);
        assert!(svc.verify(&first).is_ok());
        assert!(svc.verify(&second).is_ok());
    }

    #[test]
    fn legacy_tokens_still_decode() {
        let svc = service();
        let now = Utc::now().timestamp() as usize;
        let legacy = LegacyClaims {
            token_type: "access_token".into(),
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &legacy,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let decoded = svc.verify_legacy(&token).unwrap();
        assert_eq!(decoded.token_type, "access_token");

        // The identity-bearing verifier refuses them.
        assert_eq!(svc.verify(&token).unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn legacy_requires_the_type_tag() {
        let svc = service();
        let now = Utc::now().timestamp() as usize;
        let bogus = LegacyClaims {
            token_type: "refresh_token".into(),
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &bogus,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(svc.verify_legacy(&token).unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn extract_token_shapes() {
        assert_eq!(extract_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_token(Some("abc.def.ghi")), None);
        assert_eq!(extract_token(Some("bearer abc.def.ghi")), None);
        assert_eq!(extract_token(Some("Bearer  abc.def.ghi")), None);
        assert_eq!(extract_token(Some("Bearer ")), None);
        assert_eq!(extract_token(Some("Bearer")), None);
        assert_eq!(extract_token(None), None);
    }
}
