mod notify;
mod pipeline;
mod watch;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use visitwatch_core::AppConfig;

use crate::pipeline::RunMode;

#[derive(Debug, Parser)]
#[command(name = "visitwatch")]
#[command(about = "Post Slack alerts for real-time visitors from watched countries")]
struct Cli {
    /// Log at debug level and print full error chains
    #[arg(long, global = true)]
    verbose: bool,

    /// Exit with a non-zero status when a run fails instead of only logging it
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the monitor once (the default)
    Run {
        /// Print the alerts that would be sent without posting to Slack
        #[arg(long)]
        dry_run: bool,
    },
    /// Keep running the monitor on a cron schedule until interrupted
    Watch {
        /// Six-field cron expression (seconds first), evaluated in UTC
        #[arg(long, default_value = watch::DEFAULT_SCHEDULE)]
        schedule: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = visitwatch_core::load_app_config();
    let log_level = config.as_ref().map_or("info", |c| c.log_level.as_str());
    init_tracing(log_level, cli.verbose)?;

    let config = match config {
        Ok(config) => config,
        Err(e) => return report_failure("config", e.into(), cli.verbose, cli.strict),
    };
    tracing::debug!(?config, "configuration loaded");

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => run_monitor(&config, dry_run, cli.verbose, cli.strict).await,
        Commands::Watch { schedule } => {
            watch::run_scheduled(Arc::new(config), &schedule, cli.verbose).await
        }
    }
}

/// One `run` invocation: a pipeline failure is logged once, then handed to
/// the exit policy.
async fn run_monitor(
    config: &AppConfig,
    dry_run: bool,
    verbose: bool,
    strict: bool,
) -> anyhow::Result<()> {
    let mode = if dry_run { RunMode::DryRun } else { RunMode::Send };
    match pipeline::run_once(config, mode).await {
        Ok(summary) => {
            tracing::info!(
                rows = summary.rows,
                watched = summary.watched,
                sent = summary.sent,
                dry_run,
                "monitoring run complete"
            );
            Ok(())
        }
        Err(e) => {
            let stage = e.stage();
            report_failure(stage, e.into(), verbose, strict)
        }
    }
}

fn init_tracing(log_level: &str, verbose: bool) -> anyhow::Result<()> {
    let env_filter = if verbose {
        EnvFilter::try_new("debug")?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

/// Logs a failed run. Verbose mode includes the full `Caused by` chain.
pub(crate) fn log_run_failure(stage: &str, err: &anyhow::Error, verbose: bool) {
    if verbose {
        tracing::error!(stage, "monitoring run failed: {err:?}");
    } else {
        tracing::error!(stage, error = %err, "monitoring run failed");
    }
}

fn report_failure(
    stage: &str,
    err: anyhow::Error,
    verbose: bool,
    strict: bool,
) -> anyhow::Result<()> {
    log_run_failure(stage, &err, verbose);
    exit_status(strict, err)
}

/// Failures are already logged; only `--strict` turns them into a non-zero exit.
fn exit_status(strict: bool, err: anyhow::Error) -> anyhow::Result<()> {
    if strict {
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests;
