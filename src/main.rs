//! SlotBook Server: class booking and hosted checkout.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use slotbook_api::{AppState, StoreHandles};
use slotbook_core::config::{AppConfig, ENVIRONMENT_VAR, ReaperConfig, resolve_environment};
use slotbook_core::error::AppError;
use slotbook_database::DatabasePool;
use slotbook_worker::{CronScheduler, ReaperJob};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment, then validate it
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = resolve_environment(std::env::var(ENVIRONMENT_VAR).ok());

    let config = AppConfig::load(&env)?;
    config.validate()?;
    Ok(config)
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
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SlotBook v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = DatabasePool::connect(&config.database).await?;

    slotbook_database::migration::run_migrations(db_pool.pool()).await?;

    let repos = db_pool.repositories();
    let stores = StoreHandles {
        templates: repos.templates,
        sessions: repos.sessions,
        bookings: repos.bookings,
    };

    // ── Step 2: Payment provider ─────────────────────────────────
    let provider = slotbook_payment::build_provider(&config.payment)?;
    tracing::info!(provider = provider.provider_name(), "Payment provider ready");

    // ── Step 3: Services ─────────────────────────────────────────
    let reaper_config = config.reaper.clone();
    let app_state = AppState::build(config.clone(), stores, provider)?;

    // ── Step 4: Scheduler ────────────────────────────────────────
    let mut scheduler = if reaper_config.enabled {
        let mut scheduler = CronScheduler::new().await?;
        scheduler
            .register(Arc::new(reaper_job(&app_state, &reaper_config)))
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Abandonment reaper schedule disabled");
        None
    };

    // ── Step 5: HTTP server ──────────────────────────────────────
    let app = slotbook_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("SlotBook server listening on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")));

    // ── Step 6: Stop background work ─────────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Scheduler shutdown failed: {}", e);
        }
    }
    db_pool.close().await;

    served?;
    tracing::info!("SlotBook server shut down gracefully");
    Ok(())
}

/// Scheduled reaper job driving the same reaper the HTTP layer uses
fn reaper_job(state: &AppState, config: &ReaperConfig) -> ReaperJob {
    ReaperJob::new(Arc::clone(&state.reaper), config)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
