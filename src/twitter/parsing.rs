//! Tweet id parsing and extraction utilities.
//!
//! Tweet ids are kept as decimal strings, never as integers, so ids of any
//! length reach the API exactly as the user typed them.

use std::fmt;

use serde::Serialize;

/// A validated tweet id: one or more ASCII decimal digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TweetId(String);

impl TweetId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TweetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TweetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a user supplied tweet id.
///
/// Surrounding whitespace is trimmed; what remains must consist solely of
/// ASCII digits.
///
/// # Examples
///
/// ```rust
/// use x_cli::normalize_tweet_id;
///
/// assert_eq!(normalize_tweet_id(" 123456 ").unwrap().as_str(), "123456");
/// assert!(normalize_tweet_id("-123").is_none());
/// ```
pub fn normalize_tweet_id(value: &str) -> Option<TweetId> {
    let id = value.trim();
    let re = regex::Regex::new(r"^[0-9]+$").ok()?;
    if re.is_match(id) {
        Some(TweetId(id.to_string()))
    } else {
        None
    }
}

/// Extracts the tweet id from a status URL such as
/// `https://x.com/user/status/1234567890`.
///
/// The first `/status/<digits>` segment found anywhere in the input wins, so
/// query strings and trailing path segments (`/photo/1`) are ignored.
///
/// # Returns
///
/// - `Some(TweetId)`: The digits following `/status/`
/// - `None`: If the input has no such segment
pub fn extract_tweet_id_from_url(url: &str) -> Option<TweetId> {
    let re = regex::Regex::new(r"/status/([0-9]+)").ok()?;
    let captures = re.captures(url)?;
    captures.get(1).map(|m| TweetId(m.as_str().to_string()))
}
