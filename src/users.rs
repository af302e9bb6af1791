//! Credential store: user accounts and password verification.
//!
//! Handles password hashing (argon2id), registration validation, and
//! credential checks for login. Only the hash is ever stored; verification
//! delegates to argon2's constant-time comparison.

use crate::db::DbPool;
use crate::sql;
use anyhow::{Context, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sqlx::Row;
use thiserror::Error;
use uuid::Uuid;

/// Minimum accepted full-name length.
const MIN_NAME_LEN: usize = 3;
/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 6;

/// User account record
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Errors surfaced to the registration form.
///
/// Messages are user-visible (Portuguese, matching the UI language).
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Missing/invalid form fields or password mismatch. No state change.
    #[error("{0}")]
    Validation(String),

    /// Email already registered. No state change.
    #[error("Este e-mail já está cadastrado.")]
    DuplicateEmail,

    /// Database failure.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Database-backed storage for user accounts.
pub struct UserStore {
    pool: DbPool,
}

impl UserStore {
    /// Create a new UserStore using the given database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Hash a password using Argon2id.
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Register a new account.
    ///
    /// Validates the form fields, checks email uniqueness, and stores the
    /// password hash. The pre-insert lookup has a benign race under
    /// concurrent registration; the UNIQUE index on email is the backstop
    /// and loses the race cleanly as a duplicate.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, RegisterError> {
        let full_name = full_name.trim();
        let email = email.trim().to_lowercase();

        if full_name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(RegisterError::Validation(
                "Preencha todos os campos.".to_string(),
            ));
        }
        if full_name.chars().count() < MIN_NAME_LEN {
            return Err(RegisterError::Validation(
                "O nome deve ter pelo menos 3 caracteres.".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(RegisterError::Validation(
                "Informe um e-mail válido.".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegisterError::Validation(
                "A senha deve ter pelo menos 6 caracteres.".to_string(),
            ));
        }
        if password != confirm_password {
            return Err(RegisterError::Validation(
                "As senhas devem ser iguais.".to_string(),
            ));
        }

        if self
            .find_by_email(&email)
            .await
            .map_err(RegisterError::Storage)?
            .is_some()
        {
            return Err(RegisterError::DuplicateEmail);
        }

        let password_hash = Self::hash_password(password).map_err(RegisterError::Storage)?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            full_name: full_name.to_string(),
            email,
            password_hash,
            created_at: Utc::now(),
            last_login: None,
        };

        let result = sqlx::query(sql::INSERT_USER)
            .bind(&user.id)
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at.to_rfc3339())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(RegisterError::DuplicateEmail)
            }
            Err(e) => Err(RegisterError::Storage(
                anyhow::Error::new(e).context("Failed to insert user"),
            )),
        }
    }

    /// Get a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(sql::SELECT_USER_BY_EMAIL)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query user")?;

        let user = match row {
            Some(row) => Some(User {
                id: row.get("id"),
                full_name: row.get("full_name"),
                email: row.get("email"),
                password_hash: row.get("password_hash"),
                created_at: DateTime::parse_from_rfc3339(row.get("created_at"))
                    .context("Invalid created_at timestamp")?
                    .with_timezone(&Utc),
                last_login: row
                    .get::<Option<String>, _>("last_login")
                    .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                    .map(|dt| dt.with_timezone(&Utc)),
            }),
            None => None,
        };

        Ok(user)
    }

    /// Check a login attempt.
    ///
    /// Returns the user on success, None otherwise. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = match self.find_by_email(email).await? {
            Some(u) => u,
            None => return Ok(None),
        };

        if !Self::verify_password(password, &user.password_hash) {
            return Ok(None);
        }

        // Update last login
        sqlx::query(sql::UPDATE_USER_LAST_LOGIN)
            .bind(Utc::now().to_rfc3339())
            .bind(&user.id)
            .execute(&self.pool)
            .await
            .ok(); // Don't fail the login if this doesn't work

        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn store() -> UserStore {
        let db = Database::new_in_memory().await.unwrap();
        UserStore::new(db.pool())
    }

    #[test]
    fn test_password_hashing() {
        let password = "segredo_123";
        let hash = UserStore::hash_password(password).unwrap();

        // Hash should be different from password
        assert_ne!(hash, password);

        // Should verify correctly
        assert!(UserStore::verify_password(password, &hash));

        // Wrong password should fail
        assert!(!UserStore::verify_password("outra_senha", &hash));
    }

    #[tokio::test]
    async fn test_register_and_find() {
        let store = store().await;
        let user = store
            .register("Maria Silva", "maria@exemplo.com", "senha123", "senha123")
            .await
            .unwrap();
        assert_eq!(user.email, "maria@exemplo.com");

        let found = store.find_by_email("maria@exemplo.com").await.unwrap();
        assert_eq!(found.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = store().await;
        store
            .register("Maria Silva", "maria@exemplo.com", "senha123", "senha123")
            .await
            .unwrap();

        let err = store
            .register("Outra Maria", "maria@exemplo.com", "senha456", "senha456")
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_register_password_mismatch() {
        let store = store().await;
        let err = store
            .register("Maria Silva", "maria@exemplo.com", "senha123", "senha124")
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::Validation(_)));

        // No account was created
        assert!(store
            .find_by_email("maria@exemplo.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_short_fields() {
        let store = store().await;
        assert!(matches!(
            store.register("Jo", "jo@exemplo.com", "senha123", "senha123").await,
            Err(RegisterError::Validation(_))
        ));
        assert!(matches!(
            store.register("João", "joao@exemplo.com", "curta", "curta").await,
            Err(RegisterError::Validation(_))
        ));
        assert!(matches!(
            store.register("João", "sem-arroba", "senha123", "senha123").await,
            Err(RegisterError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let store = store().await;
        store
            .register("Maria Silva", "maria@exemplo.com", "senha123", "senha123")
            .await
            .unwrap();

        // Correct credentials succeed
        let user = store
            .authenticate("maria@exemplo.com", "senha123")
            .await
            .unwrap();
        assert!(user.is_some());

        // Wrong password and unknown email are both plain None
        assert!(store
            .authenticate("maria@exemplo.com", "errada")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .authenticate("ninguem@exemplo.com", "senha123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_email_is_normalized() {
        let store = store().await;
        store
            .register("Maria Silva", "  Maria@Exemplo.com ", "senha123", "senha123")
            .await
            .unwrap();

        assert!(store
            .authenticate("maria@exemplo.com", "senha123")
            .await
            .unwrap()
            .is_some());
    }
}
