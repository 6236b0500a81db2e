//! Event Manager
//!
//! Status reconciler daemon: keeps stored event statuses in step with the clock

use anyhow::Context;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use event_manager::{
    config::Settings,
    database::DatabaseService,
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard keeps the file writer alive
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", event_manager::info());

    info!(backend = ?settings.database.backend, "Connecting to storage...");
    let database = DatabaseService::connect(&settings.database)
        .await
        .context("failed to open storage backend")?;

    let services = ServiceFactory::from_settings(&database, &settings);
    let events = services.event_service;

    let period = settings.service.status_refresh_interval();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_seconds = period.as_secs(), "Status reconciler running");

    loop {
        tokio::select! {
            // The first tick completes immediately, reconciling at startup
            _ = ticker.tick() => {
                if let Err(e) = events.auto_update_status().await {
                    error!(
                        error = %e,
                        severity = %e.severity(),
                        recoverable = e.is_recoverable(),
                        "Status reconciliation failed"
                    );
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for shutdown signal")?;
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Event Manager stopped");
    Ok(())
}
