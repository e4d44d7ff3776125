//! Chirpy HTTP server.
//!
//! Serves the JSON API over PostgreSQL when `DATABASE_URL` is set, or over
//! in-memory storage otherwise.

use anyhow::{Context, Error};
use chirpy::{
    AuthConfig,
    db::{Database, Repositories},
};
use chirpy_server::{api, config::ServerConfig, logging, metrics};
use pico_args::Arguments;
use std::net::SocketAddr;
use tracing::{info, warn};

const HELP: &str = "\
Run the Chirpy HTTP server

USAGE:
  chirpy_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL, else in-memory]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (required, at least 32 characters)
  POLKA_KEY                API key expected on payment webhooks (required)
  PLATFORM                 Set to 'dev' to enable POST /admin/reset
  FILESERVER_ROOT          Directory served under /app [default: ./app]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind, database_url)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus exporter listening on {}", addr);
    }

    let (repositories, database) = match &config.database {
        Some(db_config) => {
            let db = Database::new(db_config)
                .await
                .context("Failed to connect to database")?;
            db.run_migrations()
                .await
                .context("Failed to run database migrations")?;
            db.health_check()
                .await
                .context("Database health check failed")?;
            info!("Database connected successfully");
            (Repositories::postgres(&db), Some(db))
        }
        None => {
            warn!("DATABASE_URL not set; data will live in memory and vanish on exit");
            (Repositories::in_memory(), None)
        }
    };

    if config.is_dev() {
        warn!("Running on the dev platform: POST /admin/reset is enabled");
    }

    let auth_config = AuthConfig::new(
        config.security.jwt_secret.clone(),
        config.security.polka_key.clone(),
    );
    let state = api::AppState::new(
        repositories,
        auth_config,
        config.platform.clone(),
        config.fileserver_root.clone(),
    );
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Serving files from {} and API at http://{}. Press Ctrl+C to stop.",
        config.fileserver_root.display(),
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
