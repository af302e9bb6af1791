//! Configuration loading for the dashboard daemon.
//!
//! Loads configuration from a TOML file and/or environment variables using
//! figment. This makes the daemon container-friendly by supporting both
//! config files and environment variable overrides.
//!
//! # Configuration Sources (in order of priority, lowest to highest)
//!
//! 1. Default values (from `#[serde(default)]` attributes)
//! 2. TOML config file (if provided)
//! 3. Environment variables (prefix: `FROTA_`, nested with `__`)
//!
//! # Environment Variable Naming
//!
//! - `FROTA_HTTP__LISTEN_ADDR` → `http.listen_addr`
//! - `FROTA_SESSION__SECRET_KEY` → `session.secret_key`
//! - `FROTA_SUPABASE__URL` → `supabase.url`
//! - `FROTA_SUPABASE__ANON_KEY` → `supabase.anon_key`

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder secret shipped in the generated config. The server refuses
/// to start while the secret is empty or still set to this value.
pub const PLACEHOLDER_SECRET: &str = "troque-esta-chave";

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

/// Database configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    /// Defaults to `<data_dir>/painel.db` when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Key used to HMAC-sign the session cookie.
    /// Must be set to a real value; the placeholder is rejected at startup.
    #[serde(default)]
    pub secret_key: String,

    /// Session lifetime in seconds (default: 24h).
    #[serde(default = "default_session_timeout")]
    pub timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            timeout_secs: default_session_timeout(),
        }
    }
}

fn default_session_timeout() -> u64 {
    86400
}

/// External data service (Supabase) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co`.
    #[serde(default)]
    pub url: String,

    /// Anonymous API key sent as `apikey` / bearer token.
    #[serde(default)]
    pub anon_key: String,

    /// Request timeout in seconds for table fetches.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    5
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub supabase: SupabaseConfig,
}

impl Config {
    /// Default config file location.
    pub fn default_path() -> PathBuf {
        PathBuf::from("/etc/frota-painel/config.toml")
    }

    /// Default data directory (database, logs).
    pub fn default_data_dir() -> PathBuf {
        PathBuf::from("/var/lib/frota-painel")
    }

    /// Load configuration from TOML file and environment variables.
    ///
    /// Configuration sources are merged in order (later sources override
    /// earlier):
    /// 1. TOML config file (if it exists)
    /// 2. Environment variables (prefix: `FROTA_`, nested with `__`)
    pub fn load(path: &Path) -> Result<Self> {
        let mut figment = Figment::new();

        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("FROTA_").split("__"));

        let config: Config = figment.extract().with_context(|| {
            format!(
                "Failed to load config from {} and environment",
                path.display()
            )
        })?;

        Ok(config)
    }

    /// Verify the configuration is usable before the listener binds.
    ///
    /// Missing external-service credentials or a placeholder session secret
    /// are fatal: the process must not start serving requests.
    pub fn validate(&self) -> Result<()> {
        if self.supabase.url.is_empty() {
            bail!(
                "supabase.url is not configured. \
                 Set it in the config file or via FROTA_SUPABASE__URL."
            );
        }
        if self.supabase.anon_key.is_empty() {
            bail!(
                "supabase.anon_key is not configured. \
                 Set it in the config file or via FROTA_SUPABASE__ANON_KEY."
            );
        }
        if self.session.secret_key.is_empty() || self.session.secret_key == PLACEHOLDER_SECRET {
            bail!(
                "session.secret_key is empty or still set to the placeholder. \
                 Generate a random value and set it before starting the server."
            );
        }
        if self.session.timeout_secs == 0 {
            bail!("session.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Resolve the database path, falling back to `<data_dir>/painel.db`.
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| data_dir.join("painel.db"))
    }
}

/// Generate a commented default configuration file.
pub fn generate_default_config() -> String {
    format!(
        r#"# frota-painel configuration
#
# Every value here can be overridden with environment variables using the
# FROTA_ prefix and __ for nesting, e.g.:
#   FROTA_HTTP__LISTEN_ADDR=127.0.0.1:9090
#   FROTA_SUPABASE__ANON_KEY=...

[http]
listen_addr = "0.0.0.0:8080"

[database]
# Defaults to <data-dir>/painel.db when omitted.
# path = "/var/lib/frota-painel/painel.db"

[session]
# HMAC key for the session cookie. The server refuses to start while this
# is left at the placeholder value.
secret_key = "{PLACEHOLDER_SECRET}"
timeout_secs = 86400

[supabase]
# Project base URL and anonymous key. Both are required.
url = ""
anon_key = ""
timeout_secs = 5
"#
    )
}
