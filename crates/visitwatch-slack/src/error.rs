use thiserror::Error;

/// Errors returned by the Slack client.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack answered `"ok": false`, e.g. `invalid_auth` or `channel_not_found`.
    #[error("Slack API error: {0}")]
    Api(String),

    /// The configured base URL (or a method URL built from it) does not parse.
    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
