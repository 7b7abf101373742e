//! Tweet operations for the X API.
//!
//! This module contains functions for posting (plain, reply, quote) and
//! deleting tweets using the X API v2.

use log::{debug, info, warn};
use reqwest::Method;
use serde_json::{json, Value};

use crate::args::PostIntent;

use super::api::{sanitize_for_logging, ApiError, XClient};
use super::parsing::{normalize_tweet_id, TweetId};

/// Public URL of a tweet.
///
/// ```rust
/// use x_cli::{normalize_tweet_id, status_url};
///
/// let id = normalize_tweet_id("1234567890").unwrap();
/// assert_eq!(status_url(&id), "https://x.com/i/status/1234567890");
/// ```
pub fn status_url(id: &TweetId) -> String {
    format!("https://x.com/i/status/{}", id)
}

/// Builds the JSON body of `POST /2/tweets` for an intent.
pub fn build_tweet_payload(intent: &PostIntent) -> Value {
    let mut payload = json!({ "text": intent.text });

    if let Some(reply_to) = &intent.reply_to {
        payload["reply"] = json!({ "in_reply_to_tweet_id": reply_to });
    }
    if let Some(quote_to) = &intent.quote_to {
        payload["quote_tweet_id"] = json!(quote_to);
    }

    payload
}

/// Reads `data.id` from a create-tweet response.
fn created_tweet_id(response: &Value) -> Result<TweetId, ApiError> {
    response
        .get("data")
        .and_then(|data| data.get("id"))
        .and_then(Value::as_str)
        .and_then(normalize_tweet_id)
        .ok_or_else(|| {
            ApiError::UnexpectedResponse(format!(
                "missing data.id in {}",
                sanitize_for_logging(&response.to_string(), 200)
            ))
        })
}

/// Checks `data.deleted` in a delete-tweet response.
fn confirm_deleted(response: &Value) -> Result<(), ApiError> {
    match response
        .get("data")
        .and_then(|data| data.get("deleted"))
        .and_then(Value::as_bool)
    {
        Some(true) => Ok(()),
        Some(false) => Err(ApiError::UnexpectedResponse(
            "the API reported the tweet as not deleted".to_string(),
        )),
        None => Err(ApiError::UnexpectedResponse(format!(
            "missing data.deleted in {}",
            sanitize_for_logging(&response.to_string(), 200)
        ))),
    }
}

impl XClient {
    /// Posts a tweet, optionally as a reply or a quote.
    ///
    /// # Parameters
    ///
    /// - `intent`: Parsed `x-post` arguments
    ///
    /// # Returns
    ///
    /// - `Ok(TweetId)`: The id of the created tweet
    /// - `Err(ApiError)`: If signing, the network, or the API fails
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use x_cli::{parse_post_args, CredentialBundle, ParsedArgs, XClient};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let credentials = CredentialBundle {
    ///         consumer_key: "...".into(),
    ///         consumer_secret: "...".into(),
    ///         access_token: "...".into(),
    ///         access_token_secret: "...".into(),
    ///     };
    ///     let Ok(ParsedArgs::Run(intent)) = parse_post_args(&["Hello from Rust!"]) else {
    ///         return;
    ///     };
    ///     match XClient::new(credentials).post_tweet(&intent).await {
    ///         Ok(id) => println!("Tweet posted: {}", id),
    ///         Err(e) => eprintln!("Failed to post tweet: {}", e),
    ///     }
    /// }
    /// ```
    pub async fn post_tweet(&self, intent: &PostIntent) -> Result<TweetId, ApiError> {
        info!(
            "Starting tweet post operation for text: '{}'",
            sanitize_for_logging(&intent.text, 80)
        );
        if let Some(reply_to) = &intent.reply_to {
            info!("Replying to tweet {}", reply_to);
        }
        if let Some(quote_to) = &intent.quote_to {
            info!("Quoting tweet {}", quote_to);
        }

        let payload = build_tweet_payload(intent);
        debug!("Tweet payload: {}", payload);

        let response = self
            .send_signed(Method::POST, "tweets", Some(&payload), "post_tweet")
            .await?;
        let id = created_tweet_id(&response)?;
        info!("Tweet {} posted successfully", id);
        Ok(id)
    }

    /// Deletes one tweet owned by the authenticated user.
    pub async fn delete_tweet(&self, id: &TweetId) -> Result<(), ApiError> {
        info!("Starting delete operation for tweet {}", id);

        let response = self
            .send_signed(
                Method::DELETE,
                &format!("tweets/{}", id),
                None,
                "delete_tweet",
            )
            .await?;

        confirm_deleted(&response).map_err(|e| {
            warn!("Delete of tweet {} was not confirmed: {}", id, e);
            e
        })?;
        info!("Tweet {} deleted successfully", id);
        Ok(())
    }
}
