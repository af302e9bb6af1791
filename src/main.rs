//! Logistics admin dashboard - Main entry point
//!
//! The daemon serves a session-gated web UI over the fleet's external data
//! tables (clients, products, drivers, vehicles, deliveries).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use frota_painel::config::{self, Config};
use frota_painel::db::Database;
use frota_painel::orders::OrderStore;
use frota_painel::routes::{AppState, build_router};
use frota_painel::server::{run_server, spawn_session_cleanup};
use frota_painel::sessions::SessionStore;
use frota_painel::supabase::SupabaseClient;
use frota_painel::users::{RegisterError, UserStore};

/// Admin dashboard for a delivery/logistics operation
#[derive(Parser)]
#[command(name = "frota-painel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value_os_t = Config::default_path())]
    config: PathBuf,

    /// Data directory for the database and logs
    #[arg(short, long, default_value_os_t = Config::default_data_dir())]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard daemon
    Serve {
        /// Address to listen on (overrides config)
        #[arg(long)]
        listen: Option<SocketAddr>,
    },

    /// Create a user account from the command line
    CreateUser {
        /// Email address (login)
        #[arg(long)]
        email: String,

        /// Full display name
        #[arg(long)]
        full_name: String,

        /// Password (minimum 6 characters)
        #[arg(long)]
        password: String,
    },

    /// Generate a default configuration file
    InitConfig {
        /// Output path (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    match cli.command {
        Commands::Serve { listen } => {
            // For daemon mode: log to both stdout and file with rotation
            init_daemon_logging(&cli.data_dir, filter)?;
            serve(&cli.config, &cli.data_dir, listen).await
        }
        Commands::CreateUser {
            email,
            full_name,
            password,
        } => {
            init_cli_logging(filter);
            create_user(&cli.config, &cli.data_dir, &email, &full_name, &password).await
        }
        Commands::InitConfig { output } => {
            init_cli_logging(filter);
            generate_config(output)
        }
    }
}

/// Initialize logging for CLI commands (stdout only).
fn init_cli_logging(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Initialize logging for daemon mode (stdout + rotating file).
fn init_daemon_logging(data_dir: &PathBuf, filter: EnvFilter) -> Result<()> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("painel")
        .filename_suffix("log")
        .build(&log_dir)
        .with_context(|| "Failed to create log file appender")?;

    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Leak the guard to keep the writer alive for the lifetime of the program
    // This is intentional for a long-running daemon
    std::mem::forget(_guard);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false)) // stdout
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking),
        ) // file
        .init();

    info!("Logging to: {}", log_dir.display());
    Ok(())
}

/// Run the dashboard daemon.
async fn serve(config_path: &PathBuf, data_dir: &PathBuf, listen: Option<SocketAddr>) -> Result<()> {
    let config = Config::load(config_path)?;

    // Refuse to serve with missing credentials or a placeholder secret
    config.validate()?;

    let listen_addr: SocketAddr = match listen {
        Some(addr) => addr,
        None => config
            .http
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", config.http.listen_addr))?,
    };

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let db = Database::new(&config.database_path(data_dir)).await?;

    let supabase = SupabaseClient::new(
        &config.supabase.url,
        &config.supabase.anon_key,
        config.supabase.timeout_secs,
    )?;

    let state = Arc::new(AppState {
        users: UserStore::new(db.pool()),
        sessions: SessionStore::new(db.pool(), config.session.timeout_secs),
        fetcher: Arc::new(supabase),
        orders: OrderStore::with_demo_data(),
        secret_key: config.session.secret_key.clone(),
        session_timeout_secs: config.session.timeout_secs,
    });

    info!("Dashboard starting...");

    let cleanup = spawn_session_cleanup(state.clone());

    let router = build_router(state);
    run_server(router, listen_addr, shutdown_signal()).await?;

    cleanup.abort();
    Ok(())
}

/// Resolve when the process receives Ctrl-C / SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Create a user account from the command line.
///
/// Only the database section of the config is needed here, so the full
/// validation (external-service credentials, session secret) is skipped.
async fn create_user(
    config_path: &PathBuf,
    data_dir: &PathBuf,
    email: &str,
    full_name: &str,
    password: &str,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::new(&config.database_path(data_dir)).await?;
    let users = UserStore::new(db.pool());

    match users.register(full_name, email, password, password).await {
        Ok(user) => {
            info!("Created user {} <{}>", user.full_name, user.email);
            Ok(())
        }
        Err(e @ (RegisterError::Validation(_) | RegisterError::DuplicateEmail)) => {
            anyhow::bail!("Cannot create user: {e}")
        }
        Err(RegisterError::Storage(e)) => Err(e),
    }
}

/// Generate a default config file.
fn generate_config(output: Option<PathBuf>) -> Result<()> {
    let contents = config::generate_default_config();

    match output {
        Some(path) => {
            std::fs::write(&path, contents)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            info!("Wrote default config to {}", path.display());
        }
        None => print!("{contents}"),
    }

    Ok(())
}
