//! X (Twitter) API integration module.
//!
//! This module contains the tweet id helpers shared with argument parsing and
//! the OAuth 1.0a signed client used to post and delete tweets.

mod api;
mod parsing;
mod tweets;

// Re-export public API
pub use api::{ApiError, XClient, API_BASE_URL};
pub use parsing::{extract_tweet_id_from_url, normalize_tweet_id, TweetId};
pub use tweets::{build_tweet_payload, status_url};
