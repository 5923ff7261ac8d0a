//! gra-api - Golden Raspberry Awards catalog service
//!
//! Serves the movie/producer/studio catalog and the award interval report
//! over HTTP. On startup the first CSV file in the configured directory is
//! imported unless `--skip-startup-import` is given.

use anyhow::{Context, Result};
use clap::Parser;
use gra_common::config::{load_toml_config, ConfigOverrides, ServiceConfig};
use gra_common::db::init_database;
use gra_api::services::csv_importer;
use gra_api::{build_router, AppState};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "gra-api")]
#[command(about = "Golden Raspberry Awards catalog service")]
#[command(version)]
struct Args {
    /// Optional TOML configuration file
    #[arg(short, long, env = "GRA_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the SQLite database file
    #[arg(short, long, env = "GRA_DATABASE")]
    database: Option<PathBuf>,

    /// HTTP server port
    #[arg(short, long, env = "GRA_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "GRA_HOST")]
    host: Option<String>,

    /// Directory scanned for a CSV file to import at startup
    #[arg(long, env = "GRA_CSV_DIR")]
    csv_dir: Option<PathBuf>,

    /// Environment label reported by /health
    #[arg(long, env = "GRA_ENV")]
    environment: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "GRA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Do not import a CSV file at startup
    #[arg(long)]
    skip_startup_import: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_path: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            csv_dir: self.csv_dir.clone(),
            environment: self.environment.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The TOML file may carry the log level, so it is read before tracing init
    // and any failure is reported once logging is up.
    let toml_config = args.config.as_deref().map(load_toml_config).transpose();
    let config = ServiceConfig::resolve(
        args.overrides(),
        toml_config.as_ref().ok().cloned().flatten(),
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "gra_api={level},gra_common={level},tower_http={level}",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification comes first, before any database work
    info!(
        "Starting Golden Raspberry Awards API (gra-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(path) = &args.config {
        toml_config.with_context(|| format!("Failed to load config {}", path.display()))?;
        info!("Configuration file: {}", path.display());
    }
    info!(
        environment = %config.environment,
        csv_dir = %config.csv_dir.display(),
        "Configuration resolved"
    );

    info!("Database path: {}", config.database_path.display());
    let pool = match init_database(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(pool, config.environment.clone());

    if args.skip_startup_import {
        info!("Startup CSV import skipped");
    } else {
        match csv_importer::import_from_directory(&state.db, &state.engine, &config.csv_dir).await {
            Ok(Some(summary)) => {
                state.csv_loaded.store(true, Ordering::SeqCst);
                info!(
                    imported = summary.imported_movies,
                    ignored = summary.ignored_movies,
                    "✓ Startup CSV import complete"
                );
            }
            Ok(None) => {}
            // A bad file should not keep the catalog offline
            Err(e) => warn!("Startup CSV import failed: {}", e),
        }
    }

    let app = build_router(state);

    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("gra-api listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
