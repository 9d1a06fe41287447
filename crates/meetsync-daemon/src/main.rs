mod readiness;
mod scheduler;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use meetsync_bmlt::BmltClient;
use meetsync_core::compile_interval;

#[derive(Debug, Parser)]
#[command(name = "meetsyncd")]
#[command(about = "WordPress to BMLT meeting importer daemon")]
struct Cli {
    /// Run a single synchronization pass and exit instead of scheduling.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Missing required configuration is the one hard startup failure; it
    // aborts here, before any network activity.
    let config = Arc::new(meetsync_core::load_app_config()?);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "loaded configuration");

    std::fs::create_dir_all(&config.data_dir)?;

    let probe_client = BmltClient::new(
        &config.bmlt_base_url,
        &config.bmlt_api_prefix,
        config.http_timeout_secs,
        meetsync_sync::USER_AGENT,
    )?;
    readiness::wait_for_api(
        &probe_client,
        readiness::MAX_ATTEMPTS,
        readiness::POLL_DELAY,
    )
    .await;

    if cli.once {
        let report = meetsync_sync::run_sync(&config).await?;
        tracing::info!(
            created = report.created,
            skipped = report.skipped,
            failed = report.failed,
            "single sync pass complete"
        );
        return Ok(());
    }

    let schedule = compile_interval(config.sync_interval_minutes);
    tracing::info!(expr = %schedule.expr, cadence = %schedule.label, "compiled sync schedule");

    // The first sync runs immediately regardless of the schedule; a failure
    // here must not keep the scheduler from starting.
    if let Err(e) = meetsync_sync::run_sync(&config).await {
        tracing::error!(error = %e, "initial sync run failed");
    }

    let _scheduler = scheduler::build_scheduler(Arc::clone(&config), &schedule).await?;
    tracing::info!("scheduler started; waiting for shutdown signal");

    shutdown_signal().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
