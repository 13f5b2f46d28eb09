//! Google Analytics 4 Data API access for visitwatch.
//!
//! [`credentials`] turns a service-account key file into a short-lived bearer
//! token; [`client`] uses that token to run the real-time "active users by
//! country" report and converts the response into [`ReportRow`]s.
//!
//! [`ReportRow`]: visitwatch_core::ReportRow

pub mod client;
pub mod credentials;
pub mod error;
pub mod types;

pub use client::{property_resource, AnalyticsClient};
pub use credentials::{
    exchange_for_token, load_access_token, AccessToken, ServiceAccountKey,
    ANALYTICS_READONLY_SCOPE,
};
pub use error::{CredentialError, FetchError};
