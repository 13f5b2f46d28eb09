//! Service-account authentication.
//!
//! Google's server-to-server flow: sign a short-lived RS256 JWT with the
//! service account's private key, then trade it at the key's `token_uri` for a
//! bearer access token carrying the requested scope.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

/// Read-only scope for the Analytics Data API.
pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The subset of a service-account key file needed to mint tokens.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("client_email", &self.client_email)
            .field("private_key", &"[redacted]")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    /// Parses a key from its JSON text.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::Parse`] if the text is not a key file.
    /// - [`CredentialError::UnsupportedKeyType`] if `type` is not `service_account`.
    pub fn from_json(json: &str) -> Result<Self, CredentialError> {
        let key: Self = serde_json::from_str(json).map_err(CredentialError::Parse)?;
        if key.key_type != "service_account" {
            return Err(CredentialError::UnsupportedKeyType(key.key_type));
        }
        Ok(key)
    }

    /// Reads and parses a key file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Io`] if the file cannot be read, otherwise
    /// the errors of [`ServiceAccountKey::from_json`].
    pub async fn from_file(path: &Path) -> Result<Self, CredentialError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CredentialError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&raw)
    }

    /// Signs the JWT assertion presented to the token endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidKey`] if the private key is not a
    /// usable RSA PEM.
    pub fn sign_assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String, CredentialError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.private_key_id);

        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: scope.to_string(),
            aud: self.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        jsonwebtoken::encode(&header, &claims, &key).map_err(CredentialError::InvalidKey)
    }
}

/// A bearer token for the Analytics Data API.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Reads the key file at `path` and exchanges it for a token with `scope`.
///
/// # Errors
///
/// Any [`CredentialError`]: unreadable or malformed file, bad private key,
/// network failure, or a rejected assertion/scope.
pub async fn load_access_token(
    path: &Path,
    scope: &str,
    timeout_secs: u64,
) -> Result<AccessToken, CredentialError> {
    let key = ServiceAccountKey::from_file(path).await?;
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    exchange_for_token(&client, &key, scope).await
}

/// Trades a signed assertion for an access token at `key.token_uri`.
///
/// # Errors
///
/// - [`CredentialError::InvalidKey`] if the assertion cannot be signed.
/// - [`CredentialError::Http`] on network failure.
/// - [`CredentialError::TokenRejected`] on a non-2xx answer.
pub async fn exchange_for_token(
    client: &Client,
    key: &ServiceAccountKey,
    scope: &str,
) -> Result<AccessToken, CredentialError> {
    let now = Utc::now();
    let assertion = key.sign_assertion(scope, now)?;

    tracing::debug!(
        client_email = %key.client_email,
        token_uri = %key.token_uri,
        "requesting service-account access token"
    );

    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<TokenErrorBody>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {desc}", err.error),
                None => err.error,
            },
            Err(_) => body,
        };
        return Err(CredentialError::TokenRejected {
            status: status.as_u16(),
            message,
        });
    }

    let token: TokenResponse = response.json().await?;
    Ok(AccessToken::new(
        token.access_token,
        now + chrono::Duration::seconds(token.expires_in),
    ))
}
