use std::io;
use std::sync::{Arc, Mutex};

use visitwatch_core::{MONITORED_COUNTRIES, SLACK_CHANNEL};

use super::*;

/// Shared in-memory sink for a test-scoped `fmt` subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Config whose key file does not exist; nothing listens on port 9.
fn config_without_key() -> AppConfig {
    AppConfig {
        property_id: "1".to_string(),
        slack_token: "xoxb-test".to_string(),
        slack_channel: SLACK_CHANNEL.to_string(),
        monitored_countries: MONITORED_COUNTRIES.iter().map(|c| (*c).to_string()).collect(),
        credentials_path: std::env::temp_dir().join("visitwatch-missing-key-file.json"),
        log_level: "info".to_string(),
        request_timeout_secs: 1,
        analytics_base_url: "http://127.0.0.1:9".to_string(),
        slack_base_url: "http://127.0.0.1:9".to_string(),
    }
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["visitwatch"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(!cli.verbose);
    assert!(!cli.strict);
}

#[test]
fn parses_run_command() {
    let cli = Cli::try_parse_from(["visitwatch", "run"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Run { dry_run: false })
    ));
}

#[test]
fn parses_run_dry_run() {
    let cli = Cli::try_parse_from(["visitwatch", "run", "--dry-run"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Run { dry_run: true })));
}

#[test]
fn watch_defaults_to_five_minute_schedule() {
    let cli = Cli::try_parse_from(["visitwatch", "watch"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Watch { ref schedule }) if schedule == "0 */5 * * * *"
    ));
}

#[test]
fn watch_accepts_custom_schedule() {
    let cli = Cli::try_parse_from(["visitwatch", "watch", "--schedule", "0 * * * * *"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Watch { ref schedule }) if schedule == "0 * * * * *"
    ));
}

#[test]
fn global_flags_work_after_subcommand() {
    let cli = Cli::try_parse_from(["visitwatch", "run", "--verbose", "--strict"]).unwrap();
    assert!(cli.verbose);
    assert!(cli.strict);
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["visitwatch", "report"]).is_err());
}

#[test]
fn exit_status_swallows_errors_unless_strict() {
    assert!(exit_status(false, anyhow::anyhow!("boom")).is_ok());
    assert!(exit_status(true, anyhow::anyhow!("boom")).is_err());
}

#[tokio::test]
async fn failed_run_logs_one_line_and_exits_cleanly() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let result = run_monitor(&config_without_key(), false, false, false).await;
    assert!(result.is_ok(), "non-strict run must not raise: {result:?}");

    let output = logs.contents();
    let failures: Vec<&str> = output
        .lines()
        .filter(|line| line.contains("monitoring run failed"))
        .collect();
    assert_eq!(failures.len(), 1, "expected one failure line, got:\n{output}");
    assert!(failures[0].contains("ERROR"), "{}", failures[0]);
    assert!(failures[0].contains(r#"stage="credentials""#), "{}", failures[0]);
    assert!(!output.contains("monitoring run complete"));
}

#[tokio::test]
async fn failed_run_is_an_error_when_strict() {
    let result = run_monitor(&config_without_key(), false, false, true).await;
    let err = result.expect_err("strict run must surface the failure");
    assert!(err.to_string().contains("credential"), "{err}");
}
