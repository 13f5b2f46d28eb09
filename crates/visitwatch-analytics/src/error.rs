use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning a service-account key into an access token.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The key file could not be read.
    #[error("failed to read credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key file is not valid service-account JSON.
    #[error("malformed credential file: {0}")]
    Parse(#[source] serde_json::Error),

    /// The key file parsed but is not a service-account key.
    #[error("unsupported credential type \"{0}\", expected \"service_account\"")]
    UnsupportedKeyType(String),

    /// The embedded private key could not be loaded or used for signing.
    #[error("invalid service-account private key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),

    /// Network or TLS failure talking to the token endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint refused the assertion or the requested scope.
    #[error("token request rejected ({status}): {message}")]
    TokenRejected { status: u16, message: String },
}

/// Errors raised while running the real-time report.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Data API answered with a non-2xx status.
    #[error("analytics API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A report row is missing its country or carries a non-integer count.
    #[error("malformed report row {index}: {reason}")]
    MalformedRow { index: usize, reason: String },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
