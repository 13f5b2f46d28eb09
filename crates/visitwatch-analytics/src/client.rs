//! HTTP client for the GA4 Data API real-time report.
//!
//! Issues a single `runRealtimeReport` call dimensioned by `country` and
//! metered by `activeUsers`. No date range and no pagination: the report
//! always describes "right now".

use std::time::Duration;

use reqwest::{Client, Url};
use visitwatch_core::ReportRow;

use crate::credentials::AccessToken;
use crate::error::FetchError;
use crate::types::{
    Dimension, GoogleErrorEnvelope, Metric, ReportRowWire, RunRealtimeReportRequest,
    RunRealtimeReportResponse,
};

const COUNTRY_DIMENSION: &str = "country";
const ACTIVE_USERS_METRIC: &str = "activeUsers";

/// Client for the Analytics Data API.
///
/// The base URL comes from configuration, so production and mock servers
/// go through the same [`AnalyticsClient::with_base_url`] constructor.
pub struct AnalyticsClient {
    client: Client,
    token: AccessToken,
    base_url: Url,
}

impl AnalyticsClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`FetchError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        token: AccessToken,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("visitwatch/0.1 (realtime-monitor)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| FetchError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            token,
            base_url,
        })
    }

    /// Runs the real-time "active users by country" report for `property_id`.
    ///
    /// Rows come back in the order the API returned them. An empty report is
    /// `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Http`] on network failure.
    /// - [`FetchError::Api`] on a non-2xx status (auth, quota, unknown property).
    /// - [`FetchError::Deserialize`] if the body is not the expected shape.
    /// - [`FetchError::MalformedRow`] if a row lacks a country or has a
    ///   non-integer count.
    pub async fn run_realtime_report(&self, property_id: &str) -> Result<Vec<ReportRow>, FetchError> {
        let url = self.report_url(property_id)?;
        let request = RunRealtimeReportRequest {
            dimensions: vec![Dimension {
                name: COUNTRY_DIMENSION,
            }],
            metrics: vec![Metric {
                name: ACTIVE_USERS_METRIC,
            }],
        };

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(self.token.secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: RunRealtimeReportResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        tracing::debug!(
            rows = parsed.rows.len(),
            row_count = ?parsed.row_count,
            "realtime report received"
        );

        parsed
            .rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| convert_row(index, row))
            .collect()
    }

    fn report_url(&self, property_id: &str) -> Result<Url, FetchError> {
        let path = format!("v1beta/{}:runRealtimeReport", property_resource(property_id));
        self.base_url
            .join(&path)
            .map_err(|e| FetchError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Normalises a property identifier to its `properties/<id>` resource name.
#[must_use]
pub fn property_resource(property_id: &str) -> String {
    let trimmed = property_id.trim();
    if trimmed.starts_with("properties/") {
        trimmed.to_string()
    } else {
        format!("properties/{trimmed}")
    }
}

fn convert_row(index: usize, row: ReportRowWire) -> Result<ReportRow, FetchError> {
    let malformed = |reason: String| FetchError::MalformedRow { index, reason };

    let country = row
        .dimension_values
        .into_iter()
        .next()
        .and_then(|v| v.value)
        .ok_or_else(|| malformed("missing country dimension value".to_string()))?;

    let raw = row
        .metric_values
        .into_iter()
        .next()
        .and_then(|v| v.value)
        .ok_or_else(|| malformed(format!("missing activeUsers value for {country}")))?;

    let active_users = raw
        .trim()
        .parse::<i64>()
        .map_err(|e| malformed(format!("activeUsers for {country} is not an integer ({raw:?}): {e}")))?;

    Ok(ReportRow {
        country,
        active_users,
    })
}

/// Pulls `error.message` out of a Google error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{status}: {}", envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::ValueWire;

    fn test_client(base_url: &str) -> AnalyticsClient {
        AnalyticsClient::with_base_url(AccessToken::new("test-token", Utc::now()), 30, base_url)
            .expect("client construction should not fail")
    }

    fn wire_row(country: Option<&str>, count: Option<&str>) -> ReportRowWire {
        ReportRowWire {
            dimension_values: vec![ValueWire {
                value: country.map(str::to_string),
            }],
            metric_values: vec![ValueWire {
                value: count.map(str::to_string),
            }],
        }
    }

    #[test]
    fn property_resource_prefixes_bare_ids() {
        assert_eq!(property_resource("123456"), "properties/123456");
        assert_eq!(property_resource(" 42 "), "properties/42");
    }

    #[test]
    fn property_resource_keeps_full_resource_names() {
        assert_eq!(property_resource("properties/123456"), "properties/123456");
    }

    #[test]
    fn report_url_targets_realtime_endpoint() {
        let client = test_client("https://analyticsdata.googleapis.com/");
        let url = client.report_url("123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://analyticsdata.googleapis.com/v1beta/properties/123:runRealtimeReport"
        );
    }

    #[test]
    fn with_base_url_rejects_garbage() {
        let result =
            AnalyticsClient::with_base_url(AccessToken::new("t", Utc::now()), 30, "not a url");
        assert!(matches!(result, Err(FetchError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn convert_row_parses_country_and_count() {
        let row = convert_row(0, wire_row(Some("Canada"), Some("12"))).unwrap();
        assert_eq!(row, ReportRow::new("Canada", 12));
    }

    #[test]
    fn convert_row_rejects_non_numeric_count() {
        let err = convert_row(3, wire_row(Some("Canada"), Some("lots"))).unwrap_err();
        assert!(
            matches!(err, FetchError::MalformedRow { index: 3, ref reason } if reason.contains("Canada")),
            "got: {err:?}"
        );
    }

    #[test]
    fn convert_row_rejects_missing_country() {
        let err = convert_row(0, wire_row(None, Some("1"))).unwrap_err();
        assert!(matches!(err, FetchError::MalformedRow { .. }), "got: {err:?}");
    }

    #[test]
    fn api_error_message_prefers_google_envelope() {
        let body = r#"{"error":{"code":403,"message":"User does not have sufficient permissions","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            api_error_message(body),
            "PERMISSION_DENIED: User does not have sufficient permissions"
        );
    }

    #[test]
    fn api_error_message_falls_back_to_raw_body() {
        assert_eq!(api_error_message("Service Unavailable\n"), "Service Unavailable");
        assert_eq!(api_error_message(""), "empty response body");
    }
}
