use anyhow::Result;

/// Minimum accepted password length, enforced at registration and update.
pub const MIN_PASSWORD_LEN: usize = 6;

const BCRYPT_COST: u32 = 12;

/// One-way hash for storage. Intentionally expensive (bcrypt, cost 12).
pub fn hash(plaintext: &str) -> Result<String> {
    Ok(bcrypt::hash(plaintext, BCRYPT_COST)?)
}

/// Check a plaintext against a stored digest. Any bcrypt error counts as a
/// mismatch.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    bcrypt::verify(plaintext, digest).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let digest = hash("walky123").unwrap();
        assert!(verify("walky123", &digest));
        assert!(!verify("walky124", &digest));
    }

    #[test]
    fn garbage_digest_never_verifies() {
        assert!(!verify("walky123", "not-a-bcrypt-digest"));
    }
}
