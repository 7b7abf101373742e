//! OAuth 1.0a request signing for the X API.
//!
//! Posting and deleting on behalf of a user with consumer/access token pairs
//! uses OAuth 1.0a user context: every request carries an `Authorization`
//! header holding an HMAC-SHA1 signature over the method, URL and
//! parameters.
//!
//! JSON request bodies are not part of the signature; only the protocol
//! parameters, the URL query and form parameters are.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use log::debug;
use rand::{distributions::Alphanumeric, Rng};
use sha1::Sha1;
use thiserror::Error;
use url::Url;

use crate::config::CredentialBundle;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LENGTH: usize = 32;

/// Errors raised while building a signed header.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request URL has no host: {0}")]
    MissingHost(String),

    #[error("failed to initialise HMAC-SHA1: {0}")]
    InvalidKey(String),
}

/// Percent-encodes a value as RFC 3986 requires for OAuth 1.0a.
///
/// Only `A-Z a-z 0-9 - . _ ~` are left as is.
///
/// ```rust
/// use x_cli::oauth::percent_encode;
///
/// assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
/// ```
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Builds the signature base string: `METHOD&url&params`.
///
/// `params` must already contain every parameter to sign; they are encoded
/// and sorted here.
pub fn signature_base_string(method: &str, base_url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (percent_encode(key), percent_encode(value)))
        .collect();
    encoded.sort();

    let parameter_string = encoded
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(base_url),
        percent_encode(&parameter_string)
    )
}

/// Signs a base string with HMAC-SHA1 and returns the base64 signature.
pub fn sign(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, OAuthError> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| OAuthError::InvalidKey(e.to_string()))?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Splits a request URL into its normalized base URL and decoded query
/// parameters.
fn split_url(url: &str) -> Result<(String, Vec<(String, String)>), OAuthError> {
    let parsed = Url::parse(url)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| OAuthError::MissingHost(url.to_string()))?
        .to_lowercase();

    let mut base_url = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        base_url.push_str(&format!(":{}", port));
    }
    base_url.push_str(parsed.path());

    let query = parsed
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    Ok((base_url, query))
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

/// Produces OAuth 1.0a `Authorization` headers for one set of credentials.
pub struct OAuth1Signer<'a> {
    credentials: &'a CredentialBundle,
}

impl<'a> OAuth1Signer<'a> {
    pub fn new(credentials: &'a CredentialBundle) -> Self {
        Self { credentials }
    }

    /// Builds the `Authorization` header for a request with a fresh nonce and
    /// the current timestamp.
    ///
    /// # Parameters
    ///
    /// - `method`: HTTP method, e.g. `POST`
    /// - `url`: Full request URL, query string included
    /// - `form_params`: Form-encoded body parameters (empty for JSON bodies)
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        form_params: &[(&str, &str)],
    ) -> Result<String, OAuthError> {
        let nonce = generate_nonce();
        let timestamp = chrono::Utc::now().timestamp();
        self.authorization_header_with(method, url, form_params, &nonce, timestamp)
    }

    /// Same as [`authorization_header`](Self::authorization_header) with a
    /// caller-chosen nonce and timestamp.
    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        form_params: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, OAuthError> {
        let (base_url, query) = split_url(url)?;
        let timestamp = timestamp.to_string();

        let oauth_params: Vec<(String, String)> = vec![
            (
                "oauth_consumer_key".to_string(),
                self.credentials.consumer_key.clone(),
            ),
            ("oauth_nonce".to_string(), nonce.to_string()),
            (
                "oauth_signature_method".to_string(),
                SIGNATURE_METHOD.to_string(),
            ),
            ("oauth_timestamp".to_string(), timestamp),
            ("oauth_token".to_string(), self.credentials.access_token.clone()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];

        let mut signed_params = oauth_params.clone();
        signed_params.extend(query);
        signed_params.extend(
            form_params
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );

        let base_string = signature_base_string(method, &base_url, &signed_params);
        let signature = sign(
            &base_string,
            &self.credentials.consumer_secret,
            &self.credentials.access_token_secret,
        )?;
        debug!("Signed {} {} with OAuth 1.0a", method, base_url);

        let mut header_params = oauth_params;
        header_params.push(("oauth_signature".to_string(), signature));
        header_params.sort();

        let fields = header_params
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", percent_encode(key), percent_encode(value)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Published example from the X developer documentation on creating a
    // request signature.
    fn doc_credentials() -> CredentialBundle {
        CredentialBundle {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".into(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".into(),
            access_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".into(),
            access_token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".into(),
        }
    }

    const DOC_URL: &str = "https://api.twitter.com/1.1/statuses/update.json?include_entities=true";
    const DOC_STATUS: &str = "Hello Ladies + Gentlemen, a signed OAuth request!";
    const DOC_NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const DOC_TIMESTAMP: i64 = 1318622958;

    #[test]
    fn test_percent_encode_reserved_characters() {
        assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(percent_encode("Hello!"), "Hello%21");
        assert_eq!(percent_encode("a,b/c"), "a%2Cb%2Fc");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_signature_base_string_matches_documentation() {
        let params: Vec<(String, String)> = [
            ("status", DOC_STATUS),
            ("include_entities", "true"),
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", DOC_NONCE),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            (
                "oauth_token",
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            ),
            ("oauth_version", "1.0"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let base = signature_base_string(
            "post",
            "https://api.twitter.com/1.1/statuses/update.json",
            &params,
        );
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
             include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26\
             oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26\
             oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26\
             oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26\
             oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen\
             %252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn test_header_matches_documented_signature() {
        let credentials = doc_credentials();
        let header = OAuth1Signer::new(&credentials)
            .authorization_header_with(
                "POST",
                DOC_URL,
                &[("status", DOC_STATUS)],
                DOC_NONCE,
                DOC_TIMESTAMP,
            )
            .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_timestamp=\"1318622958\""));
        assert!(header.ends_with("oauth_version=\"1.0\""));
        // Form and query parameters are signed but never sent in the header.
        assert!(!header.contains("status"));
        assert!(!header.contains("include_entities"));
    }

    #[test]
    fn test_generated_headers_use_fresh_nonces() {
        let credentials = doc_credentials();
        let signer = OAuth1Signer::new(&credentials);
        let first = signer
            .authorization_header("DELETE", "https://api.x.com/2/tweets/1", &[])
            .unwrap();
        let second = signer
            .authorization_header("DELETE", "https://api.x.com/2/tweets/1", &[])
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(generate_nonce().len(), NONCE_LENGTH);
    }

    #[test]
    fn test_split_url_normalizes_host_and_keeps_port() {
        let (base, query) = split_url("https://API.X.com:8443/2/tweets?a=1&b=x%20y").unwrap();
        assert_eq!(base, "https://api.x.com:8443/2/tweets");
        assert_eq!(
            query,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "x y".to_string())
            ]
        );
    }

    #[test]
    fn test_invalid_url_is_an_error() {
        let credentials = doc_credentials();
        let result = OAuth1Signer::new(&credentials).authorization_header("GET", "not a url", &[]);
        assert!(matches!(result, Err(OAuthError::InvalidUrl(_))));
    }
}
