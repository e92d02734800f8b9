//! DOS Draw Jackpot service CLI.
//!
//! Entry point for the `ddj-api` binary. Provides subcommands for:
//! - `run` - Start the HTTP service
//! - `migrate` - Run database migrations
//! - `version` - Show version information

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::str::FromStr;
use tracing::info;

use ddj_api::config::Settings;
use ddj_api::ports::SystemClock;
use ddj_api::ratelimit::{self, RateLimiter};
use ddj_api::state::AppState;
use ddj_api::store::PostgresStore;

/// DOS Draw Jackpot HTTP service
#[derive(Parser, Debug)]
#[command(name = "ddj-api")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service
    Run,

    /// Run database migrations and exit
    Migrate,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!(version = ddj_api::VERSION, "starting ddj-api");

    match cli.command {
        Commands::Run => run().await,
        Commands::Migrate => migrate().await,
        Commands::Version => {
            println!("ddj-api {}", ddj_api::VERSION);
            Ok(())
        }
    }
}

async fn build_pool(settings: &Settings) -> eyre::Result<sqlx::PgPool> {
    let mut options = PgConnectOptions::from_str(&settings.database_url)?;
    if settings.database_ssl_required() {
        options = options.ssl_mode(PgSslMode::Require);
    }

    let pool = PgPoolOptions::new().max_connections(10).connect_with(options).await?;
    Ok(pool)
}

async fn migrate() -> eyre::Result<()> {
    let settings = Settings::load()?;
    let pool = build_pool(&settings).await?;
    let store = PostgresStore::new(pool);
    store.run_migrations().await?;
    info!("migrations applied");
    Ok(())
}

async fn run() -> eyre::Result<()> {
    let settings = Settings::load()?;
    let pool = build_pool(&settings).await?;

    let store = PostgresStore::new(pool.clone());
    store.run_migrations().await?;

    let rate_limiter = Arc::new(RateLimiter::new());
    let sweeper = ratelimit::spawn_sweeper(rate_limiter.clone());

    let state = AppState {
        pool,
        settings: Arc::new(settings.clone()),
        rate_limiter,
        clock: Arc::new(SystemClock),
    };

    let app = ddj_api::api::router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
