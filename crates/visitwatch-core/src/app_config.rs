use std::path::PathBuf;

/// Slack channel every notification is posted to.
pub const SLACK_CHANNEL: &str = "#portfolio-alert";

/// Countries whose visitors trigger a notification.
pub const MONITORED_COUNTRIES: [&str; 4] = ["United States", "United Kingdom", "Canada", "Nigeria"];

#[derive(Clone)]
pub struct AppConfig {
    /// GA4 property, either `properties/<id>` or the bare numeric id.
    pub property_id: String,
    pub slack_token: String,
    pub slack_channel: String,
    pub monitored_countries: Vec<String>,
    pub credentials_path: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub analytics_base_url: String,
    pub slack_base_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("property_id", &self.property_id)
            .field("slack_token", &"[redacted]")
            .field("slack_channel", &self.slack_channel)
            .field("monitored_countries", &self.monitored_countries)
            .field("credentials_path", &self.credentials_path)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("analytics_base_url", &self.analytics_base_url)
            .field("slack_base_url", &self.slack_base_url)
            .finish()
    }
}
