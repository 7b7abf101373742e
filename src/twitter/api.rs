//! Core X API utilities.
//!
//! This module contains the HTTP client wrapper that signs every request with
//! OAuth 1.0a and turns responses into JSON values or typed errors.

use log::{debug, error, info};
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;

use crate::config::CredentialBundle;
use crate::oauth::{OAuth1Signer, OAuthError};

/// Base URL of the X API v2.
pub const API_BASE_URL: &str = "https://api.x.com/2";

/// Errors returned by [`XClient`] operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to sign request: {0}")]
    OAuth(#[from] OAuthError),

    #[error("Request failed with code {status}")]
    Status { status: u16, data: Option<Value> },

    #[error("Unexpected response from X API: {0}")]
    UnexpectedResponse(String),
}

impl ApiError {
    /// JSON error body returned by the API, when there was one.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ApiError::Status { data, .. } => data.as_ref(),
            _ => None,
        }
    }
}

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// This function:
/// - Truncates long text to prevent log flooding
/// - Replaces control characters that could manipulate log output
/// - Escapes newlines to prevent log injection
///
/// # Parameters
///
/// - `text`: The text to sanitize
/// - `max_chars`: Maximum number of characters before truncation
///
/// # Returns
///
/// A sanitized string safe for logging
pub(crate) fn sanitize_for_logging(text: &str, max_chars: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    let total = sanitized.chars().count();
    if total > max_chars {
        let truncated: String = sanitized.chars().take(max_chars).collect();
        format!("{}... [truncated, {} total chars]", truncated, total)
    } else {
        sanitized
    }
}

/// A signed client for the X API v2.
pub struct XClient {
    http: Client,
    credentials: CredentialBundle,
    base_url: String,
}

impl XClient {
    /// Creates a client for the public API endpoint.
    pub fn new(credentials: CredentialBundle) -> Self {
        Self::with_base_url(credentials, API_BASE_URL)
    }

    /// Creates a client against another base URL (a proxy or a test server).
    pub fn with_base_url(credentials: CredentialBundle, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            credentials,
            base_url,
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends an OAuth 1.0a signed request and returns the parsed JSON body.
    ///
    /// # Parameters
    ///
    /// - `method`: HTTP method
    /// - `path`: Endpoint path relative to the base URL, e.g. `tweets`
    /// - `body`: Optional JSON body (not part of the signature)
    /// - `operation_name`: Human-readable name for the operation (for logging)
    ///
    /// # Returns
    ///
    /// - `Ok(Value)`: The JSON response body on a 2xx status
    /// - `Err(ApiError)`: Transport failure, non-success status, or a body that is not JSON
    pub(crate) async fn send_signed(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        operation_name: &str,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(path);
        info!("Sending {} request for operation: {}", method, operation_name);
        debug!("Request URL: {}", url);

        let auth_header =
            OAuth1Signer::new(&self.credentials).authorization_header(method.as_str(), &url, &[])?;
        debug!("Request headers: Authorization: OAuth [REDACTED]");

        let mut request = self
            .http
            .request(method, url.as_str())
            .header("Authorization", auth_header);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        info!(
            "Received response with status: {} for operation: {}",
            status, operation_name
        );

        let response_text = response.text().await?;

        if status.is_success() {
            debug!(
                "Response summary for '{}': {} bytes received",
                operation_name,
                response_text.len()
            );
            return serde_json::from_str(&response_text).map_err(|e| {
                ApiError::UnexpectedResponse(format!(
                    "{} (body: {})",
                    e,
                    sanitize_for_logging(&response_text, 200)
                ))
            });
        }

        error!("Operation '{}' failed - Status: {}", operation_name, status);
        debug!(
            "Error response for '{}': {}",
            operation_name,
            sanitize_for_logging(&response_text, 200)
        );
        Err(ApiError::Status {
            status: status.as_u16(),
            data: serde_json::from_str(&response_text).ok(),
        })
    }
}
