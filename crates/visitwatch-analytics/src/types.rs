//! Wire types for `properties.runRealtimeReport`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct RunRealtimeReportRequest<'a> {
    pub dimensions: Vec<Dimension<'a>>,
    pub metrics: Vec<Metric<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Dimension<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Metric<'a> {
    pub name: &'a str,
}

/// Response body. The API omits `rows` entirely when nothing matched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRealtimeReportResponse {
    #[serde(default)]
    pub rows: Vec<ReportRowWire>,
    #[serde(default)]
    pub row_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRowWire {
    #[serde(default)]
    pub dimension_values: Vec<ValueWire>,
    #[serde(default)]
    pub metric_values: Vec<ValueWire>,
}

#[derive(Debug, Deserialize)]
pub struct ValueWire {
    #[serde(default)]
    pub value: Option<String>,
}

/// Google's standard error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
pub struct GoogleErrorEnvelope {
    pub error: GoogleError,
}

#[derive(Debug, Deserialize)]
pub struct GoogleError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
