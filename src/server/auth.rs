//! Shared-secret auth gate.
//!
//! A single access password protects link creation. A successful login
//! issues an expiring session token `<expiry>.<sha256(secret:expiry)>` so the
//! secret itself never leaves the server. All comparisons are constant-time.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// Cookie carrying the session token.
pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// Verifies the shared secret and the session tokens derived from it.
#[derive(Clone)]
pub struct AuthGate {
    secret: String,
    session_ttl: Duration,
}

impl AuthGate {
    /// Creates a gate for `secret` issuing sessions valid for `session_ttl`.
    #[must_use]
    pub fn new(secret: impl Into<String>, session_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            session_ttl,
        }
    }

    /// Session lifetime.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Checks a presented password against the secret.
    #[must_use]
    pub fn check_password(&self, candidate: &str) -> bool {
        constant_time_eq(candidate.as_bytes(), self.secret.as_bytes())
    }

    /// Issues a session token expiring `session_ttl` from now.
    #[must_use]
    pub fn issue_token(&self) -> String {
        self.issue_token_at(unix_now())
    }

    /// Returns true if `token` was issued by this gate and has not expired.
    #[must_use]
    pub fn verify_token(&self, token: &str) -> bool {
        self.verify_token_at(token, unix_now())
    }

    /// Returns true if either credential is valid.
    #[must_use]
    pub fn is_authorized(&self, session_token: Option<&str>, password: Option<&str>) -> bool {
        session_token.is_some_and(|token| self.verify_token(token))
            || password.is_some_and(|candidate| self.check_password(candidate))
    }

    fn issue_token_at(&self, now: u64) -> String {
        let expiry = now.saturating_add(self.session_ttl.as_secs());
        format!("{expiry}.{}", self.signature(expiry))
    }

    fn verify_token_at(&self, token: &str, now: u64) -> bool {
        let Some((expiry, signature)) = token.split_once('.') else {
            return false;
        };
        let Ok(expiry) = expiry.parse::<u64>() else {
            return false;
        };
        if expiry <= now {
            return false;
        }
        constant_time_eq(signature.as_bytes(), self.signature(expiry).as_bytes())
    }

    fn signature(&self, expiry: u64) -> String {
        let digest = Sha256::digest(format!("{}:{expiry}", self.secret).as_bytes());
        to_hex(&digest)
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Compares two byte strings without short-circuiting on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
