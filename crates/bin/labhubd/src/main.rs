//! # labhubd: labhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! `labhubd token <subject>` prints a signed access token instead of serving.
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, bail};
use tracing_subscriber::EnvFilter;

use labhub_adapter_http_axum::auth::AccessGate;
use labhub_adapter_http_axum::state::AppState;
use labhub_adapter_http_axum::uploads::LocalImageStore;
use labhub_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteLaboratoryRepository, SqliteMaterialRepository,
    SqliteReservationRepository,
};
use labhub_app::services::laboratory_service::LaboratoryService;
use labhub_app::services::material_service::MaterialService;
use labhub_app::services::reservation_service::ReservationService;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("unable to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let access = match config.auth.jwt_secret.as_deref() {
        Some(secret) => AccessGate::with_secret(secret),
        None => AccessGate::disabled(),
    };

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => serve(&config, access).await,
        Some("token") => {
            let subject = args.next().unwrap_or_else(|| "admin".to_string());
            let token = access
                .issue(&subject, unix_now()?, config.auth.token_ttl_secs)
                .context("unable to issue token, is auth.jwt_secret set?")?;
            println!("{token}");
            Ok(())
        }
        Some(other) => bail!("unknown command {other:?}, expected `token <subject>`"),
    }
}

async fn serve(config: &Config, access: AccessGate) -> anyhow::Result<()> {
    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .with_context(|| format!("unable to open database {}", config.database_url()))?;
    let pool = db.pool().clone();

    // Repositories
    let laboratory_repo = SqliteLaboratoryRepository::new(pool.clone());
    let material_repo = SqliteMaterialRepository::new(pool.clone());
    let reservation_repo = SqliteReservationRepository::new(pool);

    // Services
    let laboratory_service =
        LaboratoryService::new(laboratory_repo.clone(), material_repo.clone());
    let material_service = MaterialService::new(laboratory_repo.clone(), material_repo.clone());
    let reservation_service =
        ReservationService::new(laboratory_repo, material_repo, reservation_repo);

    if config.auth.jwt_secret.is_none() {
        tracing::warn!("auth.jwt_secret is not set, privileged routes will answer 401");
    }

    // HTTP
    let images = LocalImageStore::new(config.uploads_dir());
    let state = AppState::new(
        laboratory_service,
        material_service,
        reservation_service,
        images,
        access,
    );
    let app = labhub_adapter_http_axum::router::build(state, config.uploads_dir());

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("unable to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, uploads = %config.uploads.dir, "labhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("labhubd stopped");
    Ok(())
}

fn unix_now() -> anyhow::Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?
        .as_secs())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
