//! Shared configuration and data model for visitwatch.
//!
//! Holds the process-wide [`AppConfig`], the fixed watch-list and channel
//! constants, and the country filter that turns raw report rows into a
//! [`VisitorSnapshot`].

pub mod app_config;
pub mod config;
pub mod snapshot;

use thiserror::Error;

pub use app_config::{AppConfig, MONITORED_COUNTRIES, SLACK_CHANNEL};
pub use config::{load_app_config, load_app_config_from_env};
pub use snapshot::{filter_monitored, ReportRow, VisitorSnapshot};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
