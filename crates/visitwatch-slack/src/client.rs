//! HTTP client for Slack's `chat.postMessage`.
//!
//! Slack reports most failures as HTTP 200 with `"ok": false`; those are
//! surfaced as [`NotifyError::Api`] carrying Slack's error code.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// Client for the Slack Web API.
pub struct SlackClient {
    client: Client,
    token: String,
    base_url: Url,
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

/// What Slack tells us about a message it accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct PostedMessage {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

impl SlackClient {
    /// Creates a client rooted at `base_url`, e.g. `https://slack.com/api`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`NotifyError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("visitwatch/0.1 (realtime-monitor)")
            .build()?;

        // Trailing slash so `join` appends the method name instead of
        // replacing the last path segment (`/api`).
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| NotifyError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url,
        })
    }

    /// Posts `text` to `channel`.
    ///
    /// # Errors
    ///
    /// - [`NotifyError::Api`] if Slack answers `"ok": false`.
    /// - [`NotifyError::Http`] on network failure or non-2xx HTTP status.
    /// - [`NotifyError::Deserialize`] if the response is not JSON.
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<PostedMessage, NotifyError> {
        let url = self.method_url("chat.postMessage")?;
        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.token)
            .json(&PostMessageRequest { channel, text })
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| NotifyError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;
        Self::check_api_error(&value)?;

        let posted: PostedMessage =
            serde_json::from_value(value).map_err(|e| NotifyError::Deserialize {
                context: "chat.postMessage".to_string(),
                source: e,
            })?;
        tracing::debug!(channel, ts = ?posted.ts, "slack message posted");
        Ok(posted)
    }

    fn method_url(&self, method: &str) -> Result<Url, NotifyError> {
        self.base_url
            .join(method)
            .map_err(|e| NotifyError::InvalidBaseUrl {
                base_url: format!("{}{method}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// Checks the top-level `"ok"` flag and returns Slack's error code if false.
    fn check_api_error(body: &serde_json::Value) -> Result<(), NotifyError> {
        if body.get("ok").and_then(serde_json::Value::as_bool) == Some(true) {
            return Ok(());
        }
        let code = body
            .get("error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown_error")
            .to_string();
        Err(NotifyError::Api(code))
    }
}
