//! coordeval-api - coordinator competency evaluation service
//!
//! Stores evaluations in SQLite and mirrors them, best effort, to a Google
//! Sheets tab.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use coordeval_api::db::SqliteStore;
use coordeval_api::dispatch::{DispatchConfig, Dispatcher};
use coordeval_api::lookup::PersonLookup;
use coordeval_api::sheets::GoogleSheetsClient;
use coordeval_api::{build_router, AppState};
use coordeval_common::config::{ConfigOverrides, ServiceConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for coordeval-api
#[derive(Parser, Debug)]
#[command(name = "coordeval-api")]
#[command(about = "Coordinator competency evaluation service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5790", env = "COORDEVAL_PORT")]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1", env = "COORDEVAL_BIND")]
    bind: IpAddr,

    /// SQLite database file
    #[arg(short, long, env = "COORDEVAL_DATABASE")]
    database: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "COORDEVAL_CONFIG")]
    config: Option<PathBuf>,

    /// Also store unit, regional, registration, name and school on every assessment row
    #[arg(long, env = "COORDEVAL_PERSIST_CONTEXT")]
    persist_context: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coordeval_api=debug,coordeval_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting coordeval-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config = ServiceConfig::resolve(&ConfigOverrides {
        config_file: args.config.clone(),
        database: args.database.clone(),
        persist_context: args.persist_context.then_some(true),
    })
    .context("Failed to resolve configuration")?;

    info!("Database path: {}", config.database_path.display());
    if config.sheets.spreadsheet_id.is_none() {
        warn!("No spreadsheet configured; submissions will be stored but not mirrored");
    }
    if config.sheets.credentials.is_none() {
        warn!("No service-account credentials; spreadsheet appends will fail");
    }

    let pool = coordeval_common::db::init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database ready");

    let store = Arc::new(SqliteStore::new(pool));
    let mirror = Arc::new(
        GoogleSheetsClient::new(config.sheets.credentials.clone())
            .context("Failed to create spreadsheet client")?,
    );
    let dispatcher = Arc::new(Dispatcher::new(
        store.clone(),
        mirror,
        DispatchConfig::from(&config),
    ));
    let lookup = PersonLookup::new(store);

    let app = build_router(AppState::new(dispatcher, lookup));

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("coordeval-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
