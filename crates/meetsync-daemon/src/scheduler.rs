//! In-process cron scheduler for the sync job.
//!
//! The compiled schedule is handed in as a value and registered with a
//! [`JobScheduler`]; there is no schedule file on disk. Each tick rebuilds
//! its clients and runs a full sync pass; failures are logged and the
//! scheduler keeps going.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use meetsync_core::{AppConfig, CompiledSchedule};

/// Builds and starts the scheduler with the sync job registered on
/// `schedule`.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts the job down.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    config: Arc<AppConfig>,
    schedule: &CompiledSchedule,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let running = Arc::new(AtomicBool::new(false));
    let cadence = schedule.label.clone();
    let cron = schedule.cron_with_seconds();

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let config = Arc::clone(&config);
        let running = Arc::clone(&running);
        let cadence = cadence.clone();

        Box::pin(async move {
            // Non-reentrant guard: a run that outlasts the interval must not
            // overlap the next tick.
            if running.swap(true, Ordering::SeqCst) {
                tracing::warn!("scheduler: previous sync run still in progress; skipping tick");
                return;
            }

            tracing::info!(%cadence, "scheduler: starting sync run");
            match meetsync_sync::run_sync(&config).await {
                Ok(report) => tracing::info!(
                    created = report.created,
                    skipped = report.skipped,
                    failed = report.failed,
                    "scheduler: sync run complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: sync run failed"),
            }

            running.store(false, Ordering::SeqCst);
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}
