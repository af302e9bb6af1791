//! SQL query constants for the user and session stores.

pub const INSERT_USER: &str = r#"
    INSERT INTO users (id, full_name, email, password_hash, created_at)
    VALUES (?, ?, ?, ?, ?)
"#;

pub const SELECT_USER_BY_EMAIL: &str =
    "SELECT id, full_name, email, password_hash, created_at, last_login FROM users WHERE email = ?";

pub const UPDATE_USER_LAST_LOGIN: &str = "UPDATE users SET last_login = ? WHERE id = ?";

pub const INSERT_SESSION: &str = r#"
    INSERT INTO sessions (session_id, user_id, user_email, created_at, expires_at)
    VALUES (?, ?, ?, ?, ?)
"#;

pub const SELECT_SESSION: &str =
    "SELECT session_id, user_id, user_email, created_at, expires_at FROM sessions WHERE session_id = ?";

pub const DELETE_SESSION: &str = "DELETE FROM sessions WHERE session_id = ?";

pub const DELETE_EXPIRED_SESSIONS: &str = "DELETE FROM sessions WHERE expires_at < ?";
