//! # feedlotd — feedlot daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct the ledger, connectivity manager, and dispatch coordinator
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve until SIGTERM/SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use feedlot_adapter_device_http::HttpFeeder;
use feedlot_adapter_http_axum::AppState;
use feedlot_adapter_storage_sqlite_sqlx::{
    Config as DbConfig, SqliteFeedTypeRepository, SqliteHistoryStore, SqliteScheduleRepository,
    SqliteZoneRepository,
};
use feedlot_adapter_virtual_feeder::VirtualFeeder;
use feedlot_app::connectivity::DeviceManager;
use feedlot_app::dispatch::DispatchCoordinator;
use feedlot_app::event_bus::InProcessEventBus;
use feedlot_app::ledger::FeedLedger;
use feedlot_app::ports::FeederTransport;
use feedlot_app::services::{FeedTypeService, ScheduleService, ZoneService};

use config::{Config, DeviceMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    match config.device.mode {
        DeviceMode::Virtual => {
            let feeder = VirtualFeeder::new(config.device.virtual_rate_per_second);
            tracing::info!("using virtual feeding controller");
            run(config, feeder).await
        }
        DeviceMode::Http => {
            let feeder = HttpFeeder::new(&config.device.address);
            tracing::info!(address = %config.device.address, "using HTTP feeding controller");
            run(config, feeder).await
        }
    }
}

/// Wire the full stack around the chosen transport and serve.
async fn run<T>(config: Config, transport: T) -> anyhow::Result<()>
where
    T: FeederTransport + Send + Sync + 'static,
{
    // Database
    let db = DbConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let feed_repo = SqliteFeedTypeRepository::new(pool.clone());
    let zone_repo = SqliteZoneRepository::new(pool.clone());
    let schedule_repo = SqliteScheduleRepository::new(pool.clone());
    let history = SqliteHistoryStore::new(pool);

    // Event bus
    let event_bus = InProcessEventBus::new(256);

    // Ledger, connectivity, dispatch
    let ledger = Arc::new(FeedLedger::new(feed_repo.clone()));
    let device = Arc::new(DeviceManager::new(transport, config.connect_timeout()));
    let coordinator = DispatchCoordinator::new(
        Arc::clone(&device),
        Arc::clone(&ledger),
        schedule_repo.clone(),
        history.clone(),
        event_bus.clone(),
        config.monitor_settings(),
    );

    // Services
    let schedule_service = ScheduleService::new(
        zone_repo.clone(),
        ledger,
        schedule_repo.clone(),
        event_bus.clone(),
        coordinator,
    );
    let feed_type_service = FeedTypeService::new(feed_repo, schedule_repo);
    let zone_service = ZoneService::new(zone_repo);

    // HTTP
    let state = AppState::new(
        schedule_service,
        feed_type_service,
        zone_service,
        device,
        history,
        event_bus,
    );
    let app = feedlot_adapter_http_axum::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "feedlotd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("feedlotd stopped");
    Ok(())
}

/// Resolve when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install SIGINT handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
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
