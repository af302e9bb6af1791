//! Session manager: server-side login state keyed by an opaque token.
//!
//! Sessions live in the database; the client only ever holds the cookie
//! value `<session_id>.<hmac-sha256-hex>`. A cookie whose signature does
//! not verify is treated exactly like a missing cookie, so a forged token
//! never reaches the database.

use crate::db::DbPool;
use crate::sql;
use crate::users::User;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::Sha256;
use sqlx::Row;

type HmacSha256 = Hmac<Sha256>;

/// Cookie name for the session ID
pub const SESSION_COOKIE: &str = "frota_session";

/// Length of the random session identifier.
const SESSION_ID_LEN: usize = 64;

/// Server-side session record
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: String,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Database-backed storage for sessions.
pub struct SessionStore {
    pool: DbPool,
    timeout_secs: u64,
}

impl SessionStore {
    /// Create a new SessionStore using the given database pool.
    pub fn new(pool: DbPool, timeout_secs: u64) -> Self {
        Self { pool, timeout_secs }
    }

    /// Generate a cryptographically secure session ID.
    fn generate_session_id() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LEN)
            .map(char::from)
            .collect()
    }

    /// Create a session for a logged-in user and return its ID.
    pub async fn create_session(&self, user: &User) -> Result<String> {
        let session_id = Self::generate_session_id();
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.timeout_secs as i64);

        sqlx::query(sql::INSERT_SESSION)
            .bind(&session_id)
            .bind(&user.id)
            .bind(&user.email)
            .bind(now.to_rfc3339())
            .bind(expires_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .context("Failed to create session")?;

        Ok(session_id)
    }

    /// Load a session by ID.
    ///
    /// Expired sessions are deleted on sight and reported as absent, so
    /// the caller cannot tell an expired session from an unknown one.
    pub async fn load_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let row = sqlx::query(sql::SELECT_SESSION)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query session")?;

        let session = match row {
            Some(row) => {
                let expires_at = DateTime::parse_from_rfc3339(row.get("expires_at"))
                    .context("Invalid expires_at timestamp")?
                    .with_timezone(&Utc);

                if expires_at < Utc::now() {
                    self.destroy_session(session_id).await.ok();
                    return Ok(None);
                }

                Some(SessionRecord {
                    session_id: row.get("session_id"),
                    user_id: row.get("user_id"),
                    user_email: row.get("user_email"),
                    created_at: DateTime::parse_from_rfc3339(row.get("created_at"))
                        .context("Invalid created_at timestamp")?
                        .with_timezone(&Utc),
                    expires_at,
                })
            }
            None => None,
        };

        Ok(session)
    }

    /// Destroy a session (logout). Idempotent: destroying an unknown or
    /// already-destroyed token is a no-op.
    pub async fn destroy_session(&self, session_id: &str) -> Result<()> {
        sqlx::query(sql::DELETE_SESSION)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    /// Delete all expired sessions (background cleanup task).
    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        let result = sqlx::query(sql::DELETE_EXPIRED_SESSIONS)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;

        Ok(result.rows_affected())
    }
}

/// Build the signed cookie value for a session ID.
pub fn cookie_value(session_id: &str, secret_key: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(session_id.as_bytes());
    let sig = hex::encode(mac.finalize().into_bytes());
    format!("{session_id}.{sig}")
}

/// Verify a signed cookie value and extract the session ID.
///
/// Returns None for malformed values or bad signatures. Signature
/// comparison goes through the Mac's constant-time verify.
pub fn verify_cookie(value: &str, secret_key: &str) -> Option<String> {
    let (session_id, sig_hex) = value.split_once('.')?;
    if session_id.is_empty() {
        return None;
    }
    let sig = hex::decode(sig_hex).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(session_id.as_bytes());
    mac.verify_slice(&sig).ok()?;

    Some(session_id.to_string())
}
