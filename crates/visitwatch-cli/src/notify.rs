//! Message formatting and the Slack send loop.

use chrono::{DateTime, Local};
use visitwatch_core::VisitorSnapshot;
use visitwatch_slack::{NotifyError, SlackClient};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders the alert text for one country.
pub(crate) fn format_message(country: &str, count: i64, at: DateTime<Local>) -> String {
    format!(
        "🌍 {count} active visitor(s) from {country} at {}",
        at.format(TIMESTAMP_FORMAT)
    )
}

/// Messages that a send would produce at `at`; zero and negative counts yield none.
pub(crate) fn pending_messages(snapshot: &VisitorSnapshot, at: DateTime<Local>) -> Vec<String> {
    snapshot
        .active()
        .map(|(country, count)| format_message(country, count, at))
        .collect()
}

/// Posts one message per country with a positive count.
///
/// Stops at the first failed send; countries after it are not attempted.
///
/// # Errors
///
/// Returns the first [`NotifyError`] raised by Slack.
pub(crate) async fn send_notifications(
    slack: &SlackClient,
    channel: &str,
    snapshot: &VisitorSnapshot,
) -> Result<usize, NotifyError> {
    let mut sent = 0;
    for (country, count) in snapshot.active() {
        let text = format_message(country, count, Local::now());
        slack.post_message(channel, &text).await?;
        tracing::info!(country, count, channel, "visitor alert sent");
        sent += 1;
    }
    Ok(sent)
}
