//! Scheduled mode: run the pipeline on a cron schedule until interrupted.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use visitwatch_core::AppConfig;

use crate::pipeline::{self, RunMode};

/// Every five minutes, on the minute (seconds-resolution cron).
pub(crate) const DEFAULT_SCHEDULE: &str = "0 */5 * * * *";

/// Builds and starts the scheduler with a single monitoring job.
///
/// Each tick is an independent [`pipeline::run_once`]; failures are logged
/// and the next tick runs as usual. The returned [`JobScheduler`] must be
/// kept alive, dropping it stops the job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if `schedule` is not a valid cron
/// expression or the scheduler cannot be started.
pub(crate) async fn build_scheduler(
    config: Arc<AppConfig>,
    schedule: &str,
    verbose: bool,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let config = Arc::clone(&config);

        Box::pin(async move {
            match pipeline::run_once(&config, RunMode::Send).await {
                Ok(summary) => tracing::info!(
                    rows = summary.rows,
                    watched = summary.watched,
                    sent = summary.sent,
                    "scheduler: monitoring run complete"
                ),
                Err(e) => crate::log_run_failure(e.stage(), &e.into(), verbose),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Runs the scheduler until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Propagates scheduler construction and shutdown failures.
pub(crate) async fn run_scheduled(
    config: Arc<AppConfig>,
    schedule: &str,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut scheduler = build_scheduler(config, schedule, verbose).await?;
    tracing::info!(schedule, "scheduler: watching for visitors");

    shutdown_signal().await;
    scheduler.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("received shutdown signal, stopping scheduler");
}
