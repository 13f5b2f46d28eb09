use crate::app_config::{AppConfig, MONITORED_COUNTRIES, SLACK_CHANNEL};
use crate::ConfigError;
use tracing_subscriber::EnvFilter;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    // Set-but-blank counts as missing: the backends would only reject it later.
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            Ok(_) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must not be empty".to_string(),
            }),
            Err(_) => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let property_id = require("PROPERTY_ID")?;
    let slack_token = require("SLACK_TOKEN")?;

    let credentials_path = PathBuf::from(or_default(
        "VISITWATCH_CREDENTIALS_PATH",
        "credentials.json",
    ));
    let log_level = or_default("VISITWATCH_LOG_LEVEL", "info");
    // Same parser `main` hands the level to, so a bad directive fails here.
    EnvFilter::try_new(&log_level).map_err(|e| ConfigError::InvalidEnvVar {
        var: "VISITWATCH_LOG_LEVEL".to_string(),
        reason: e.to_string(),
    })?;
    let request_timeout_secs = parse_u64("VISITWATCH_REQUEST_TIMEOUT_SECS", "30")?;
    let analytics_base_url = or_default(
        "VISITWATCH_ANALYTICS_BASE_URL",
        "https://analyticsdata.googleapis.com",
    );
    let slack_base_url = or_default("VISITWATCH_SLACK_BASE_URL", "https://slack.com/api");

    Ok(AppConfig {
        property_id,
        slack_token,
        slack_channel: SLACK_CHANNEL.to_string(),
        monitored_countries: MONITORED_COUNTRIES.iter().map(|c| (*c).to_string()).collect(),
        credentials_path,
        log_level,
        request_timeout_secs,
        analytics_base_url,
        slack_base_url,
    })
}
