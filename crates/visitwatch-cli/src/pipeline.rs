//! One monitoring pass: authenticate, fetch, filter, notify.

use chrono::Local;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;
use visitwatch_analytics::{
    load_access_token, AnalyticsClient, CredentialError, FetchError, ANALYTICS_READONLY_SCOPE,
};
use visitwatch_core::{filter_monitored, AppConfig};
use visitwatch_slack::{NotifyError, SlackClient};

use crate::notify;

/// Whether a run posts to Slack or only prints what it would post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunMode {
    Send,
    DryRun,
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunSummary {
    /// Rows in the real-time report.
    pub rows: usize,
    /// Monitored countries present in the report, including zero counts.
    pub watched: usize,
    /// Messages posted (or printed, for a dry run).
    pub sent: usize,
}

/// A failed run, tagged with the stage that failed.
#[derive(Debug, Error)]
pub(crate) enum MonitorError {
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),
}

impl MonitorError {
    pub(crate) fn stage(&self) -> &'static str {
        match self {
            MonitorError::Credential(_) => "credentials",
            MonitorError::Fetch(_) => "fetch",
            MonitorError::Notify(_) => "notify",
        }
    }
}

/// Runs the pipeline once under a fresh `run_id` span.
///
/// Nothing is retried. A failed Slack send aborts the remaining sends.
///
/// # Errors
///
/// Returns [`MonitorError`] naming the first stage that failed.
pub(crate) async fn run_once(config: &AppConfig, mode: RunMode) -> Result<RunSummary, MonitorError> {
    let span = tracing::info_span!("run", run_id = %Uuid::new_v4());
    run_pipeline(config, mode).instrument(span).await
}

async fn run_pipeline(config: &AppConfig, mode: RunMode) -> Result<RunSummary, MonitorError> {
    let token = load_access_token(
        &config.credentials_path,
        ANALYTICS_READONLY_SCOPE,
        config.request_timeout_secs,
    )
    .await?;

    let analytics = AnalyticsClient::with_base_url(
        token,
        config.request_timeout_secs,
        &config.analytics_base_url,
    )?;
    let rows = analytics.run_realtime_report(&config.property_id).await?;

    let snapshot = filter_monitored(&rows, &config.monitored_countries);
    tracing::info!(
        rows = rows.len(),
        watched = snapshot.len(),
        active = snapshot.active().count(),
        "realtime report filtered"
    );

    let sent = match mode {
        RunMode::Send => {
            let slack = SlackClient::with_base_url(
                &config.slack_token,
                config.request_timeout_secs,
                &config.slack_base_url,
            )?;
            notify::send_notifications(&slack, &config.slack_channel, &snapshot).await?
        }
        RunMode::DryRun => {
            let messages = notify::pending_messages(&snapshot, Local::now());
            for message in &messages {
                println!("dry-run: would post to {}: {message}", config.slack_channel);
            }
            messages.len()
        }
    };

    Ok(RunSummary {
        rows: rows.len(),
        watched: snapshot.len(),
        sent,
    })
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
