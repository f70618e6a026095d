//! SkillCall Server: skill-exchange video-call coordination.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use skillcall_api::AppState;
use skillcall_auth::JwtEncoder;
use skillcall_core::config::AppConfig;
use skillcall_core::error::AppError;
use skillcall_core::types::id::UserId;
use skillcall_database::{CallStore, MemoryStore, PgStore, connect_pool};
use skillcall_entity::user::UserProfile;
use skillcall_worker::{CronScheduler, ExpirySweepJob, NotificationPurgeJob, ReminderJob};

/// SkillCall: skill-exchange video-call coordination
#[derive(Debug, Parser)]
#[command(name = "skillcall-server", version, about, long_about = None)]
struct Cli {
    /// Configuration environment (overlays `config/{env}`)
    #[arg(long, env = "SKILLCALL_ENV", default_value = "development")]
    env: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server (default)
    Serve(ServeArgs),
    /// Mint an access token for local testing
    Token(TokenArgs),
}

#[derive(Debug, Args, Default)]
struct ServeArgs {
    /// Seed the in-memory user directory, as `id=Display Name`
    #[arg(long = "user", value_parser = parse_user)]
    users: Vec<UserProfile>,
}

#[derive(Debug, Args)]
struct TokenArgs {
    /// Subject user id
    #[arg(long)]
    user: String,
    /// Display name carried in the token
    #[arg(long)]
    name: String,
}

fn parse_user(raw: &str) -> Result<UserProfile, String> {
    let (id, name) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected id=Name, got '{raw}'"))?;
    if id.trim().is_empty() {
        return Err("user id must not be empty".to_string());
    }
    Ok(UserProfile::new(id.trim(), name.trim()))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let result = match cli.command {
        Some(Commands::Token(args)) => print_token(&config, args),
        Some(Commands::Serve(args)) => run(config, args).await,
        None => run(config, ServeArgs::default()).await,
    };

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

fn print_token(config: &AppConfig, args: TokenArgs) -> Result<(), AppError> {
    let encoder = JwtEncoder::new(&config.auth);
    let (token, expires_at) =
        encoder.issue_access_token(&UserId::new(args.user), &args.name, "user")?;
    println!("{token}");
    tracing::info!(%expires_at, "Access token issued");
    Ok(())
}

/// Open the configured store, running migrations for PostgreSQL.
async fn open_store(config: &AppConfig, args: &ServeArgs) -> Result<Arc<dyn CallStore>, AppError> {
    if config.database.is_memory() {
        tracing::warn!("Using the in-memory store; data is lost on shutdown");
        let store = MemoryStore::new();
        for user in &args.users {
            store.add_user(user.clone()).await;
        }
        return Ok(Arc::new(store));
    }

    if !args.users.is_empty() {
        tracing::warn!("--user seeds only apply to the in-memory store; ignoring");
    }

    let pool = connect_pool(&config.database).await?;
    skillcall_database::migration::run_migrations(&pool).await?;
    Ok(Arc::new(PgStore::new(pool)))
}

/// Main server run function
async fn run(config: AppConfig, args: ServeArgs) -> Result<(), AppError> {
    tracing::info!("Starting SkillCall v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_placeholder_secret() {
        tracing::warn!("auth.jwt_secret is the development placeholder; set SKILLCALL__AUTH__JWT_SECRET");
    }

    // ── Step 1: Storage ──────────────────────────────────────────
    let store = open_store(&config, &args).await?;

    // ── Step 2: Services and realtime engine ─────────────────────
    let state: AppState = skillcall_api::build_state(config.clone(), store);
    let bridge_handle = state.realtime.start();

    // ── Step 3: Scheduled sweeps ─────────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let scheduler = CronScheduler::new(config.worker.clone()).await?;
        scheduler
            .register_default_tasks(
                Arc::new(ExpirySweepJob::new(
                    state.requests.clone(),
                    state.sessions.clone(),
                )),
                Arc::new(ReminderJob::new(state.requests.clone())),
                Arc::new(NotificationPurgeJob::new(state.notifications.clone())),
            )
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── Step 4: HTTP server ──────────────────────────────────────
    let realtime = state.realtime.clone();
    let app = skillcall_api::build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("SkillCall server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 5: Stop background tasks ────────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    realtime.shutdown();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, bridge_handle).await.is_err() {
        tracing::warn!("Event bridge did not stop within the grace period");
    }

    tracing::info!("SkillCall server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
