//! Command-line argument parsing for the `x-post` and `x-delete` tools.
//!
//! Both parsers share the same scanning rules: tokens are read left to right,
//! `--` switches to literal mode for the rest of the line, `--help`/`-h` wins
//! as soon as it is seen, and the first invalid token ends the scan with an
//! error that names it.

use std::path::PathBuf;

use log::debug;
use thiserror::Error;

use crate::twitter::{extract_tweet_id_from_url, normalize_tweet_id, TweetId};

pub const POST_USAGE: &str =
    "Usage: x-post <tweet text> [--reply-to <tweet-id>] [--quote <tweet-id> | --quote-url <url>] [--config <path>]";
pub const DELETE_USAGE: &str = "Usage: x-delete <tweet-id> [<tweet-id>...] [--config <path>]";

/// Outcome of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedArgs<T> {
    /// `--help` or `-h` was given; every other token is ignored.
    Help,
    /// A validated intent ready to run.
    Run(T),
}

/// Validated arguments of `x-post`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostIntent {
    /// Explicit credentials file given with `--config`.
    pub config_path: Option<PathBuf>,
    /// Tweet to reply to. Never set together with `quote_to`.
    pub reply_to: Option<TweetId>,
    /// Tweet to quote. Never set together with `reply_to`.
    pub quote_to: Option<TweetId>,
    /// Tweet body, trimmed and non-empty.
    pub text: String,
}

/// Validated arguments of `x-delete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteIntent {
    /// Explicit credentials file given with `--config`.
    pub config_path: Option<PathBuf>,
    /// Ids to delete, in command-line order. Never empty.
    pub tweet_ids: Vec<TweetId>,
}

/// Errors produced while parsing command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Missing value for {0}.")]
    MissingValue(String),

    #[error("Invalid tweet ID for {option}: \"{value}\".")]
    InvalidOptionTweetId { option: String, value: String },

    #[error("Failed to parse tweet ID from --quote-url value: \"{0}\".")]
    InvalidQuoteUrl(String),

    #[error("Invalid tweet ID: \"{0}\".")]
    InvalidTweetId(String),

    #[error("Cannot use --reply-to and --quote/--quote-url together.")]
    ConflictingTargets,

    #[error("Missing tweet text. Use --help for examples.")]
    MissingText,

    #[error("At least one tweet ID is required. Use --help for examples.")]
    MissingTweetIds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Tokens starting with `-` are options.
    Options,
    /// After `--`: every token is an operand.
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Help,
    Flag(&'a str),
    Operand(&'a str),
}

/// Left-to-right token scanner shared by both parsers.
struct Scanner<'a, S> {
    args: &'a [S],
    pos: usize,
    state: ScanState,
}

impl<'a, S: AsRef<str>> Scanner<'a, S> {
    fn new(args: &'a [S]) -> Self {
        Self {
            args,
            pos: 0,
            state: ScanState::Options,
        }
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        let args: &'a [S] = self.args;
        loop {
            let arg = args.get(self.pos)?.as_ref();
            self.pos += 1;

            match self.state {
                ScanState::Literal => return Some(Token::Operand(arg)),
                ScanState::Options if arg == "--" => {
                    self.state = ScanState::Literal;
                }
                ScanState::Options if arg == "--help" || arg == "-h" => {
                    return Some(Token::Help);
                }
                ScanState::Options if arg.starts_with('-') => return Some(Token::Flag(arg)),
                ScanState::Options => return Some(Token::Operand(arg)),
            }
        }
    }

    /// Consumes the value following `option`.
    ///
    /// A missing token, an empty token, or one that looks like another option
    /// all count as a missing value.
    fn take_value(&mut self, option: &str) -> Result<&'a str, ArgsError> {
        let args: &'a [S] = self.args;
        match args.get(self.pos).map(AsRef::as_ref) {
            Some(value) if !value.is_empty() && !value.starts_with('-') => {
                self.pos += 1;
                Ok(value)
            }
            _ => Err(ArgsError::MissingValue(option.to_string())),
        }
    }
}

fn option_tweet_id(option: &str, value: &str) -> Result<TweetId, ArgsError> {
    normalize_tweet_id(value).ok_or_else(|| ArgsError::InvalidOptionTweetId {
        option: option.to_string(),
        value: value.to_string(),
    })
}

/// Parses the arguments of `x-post` (program name excluded).
///
/// # Returns
///
/// - `Ok(ParsedArgs::Help)`: If `--help`/`-h` was seen before any error
/// - `Ok(ParsedArgs::Run(PostIntent))`: A validated post request
/// - `Err(ArgsError)`: The first problem found, in scan order
///
/// # Example
///
/// ```rust
/// use x_cli::{parse_post_args, ParsedArgs};
///
/// let parsed = parse_post_args(&["Hello", "world", "--reply-to", "123"]).unwrap();
/// let ParsedArgs::Run(intent) = parsed else { panic!("expected an intent") };
/// assert_eq!(intent.text, "Hello world");
/// assert_eq!(intent.reply_to.unwrap().as_str(), "123");
/// ```
pub fn parse_post_args<S: AsRef<str>>(args: &[S]) -> Result<ParsedArgs<PostIntent>, ArgsError> {
    let mut scanner = Scanner::new(args);
    let mut config_path = None;
    let mut reply_to = None;
    let mut quote_to = None;
    let mut text_parts: Vec<&str> = Vec::new();

    while let Some(token) = scanner.next_token() {
        match token {
            Token::Help => return Ok(ParsedArgs::Help),
            Token::Flag(flag @ ("--config" | "-c")) => {
                config_path = Some(PathBuf::from(scanner.take_value(flag)?));
            }
            Token::Flag(flag @ ("--reply-to" | "-r")) => {
                let value = scanner.take_value(flag)?;
                reply_to = Some(option_tweet_id(flag, value)?);
            }
            Token::Flag(flag @ "--quote") => {
                let value = scanner.take_value(flag)?;
                quote_to = Some(option_tweet_id(flag, value)?);
            }
            Token::Flag(flag @ "--quote-url") => {
                let value = scanner.take_value(flag)?;
                let id = extract_tweet_id_from_url(value)
                    .ok_or_else(|| ArgsError::InvalidQuoteUrl(value.to_string()))?;
                quote_to = Some(id);
            }
            Token::Flag(flag) => return Err(ArgsError::UnknownOption(flag.to_string())),
            Token::Operand(part) => text_parts.push(part),
        }
    }

    if reply_to.is_some() && quote_to.is_some() {
        return Err(ArgsError::ConflictingTargets);
    }

    let text = text_parts.join(" ").trim().to_string();
    if text.is_empty() {
        return Err(ArgsError::MissingText);
    }

    debug!(
        "Parsed post arguments: {} chars, reply_to={:?}, quote_to={:?}, config={:?}",
        text.chars().count(),
        reply_to.as_ref().map(TweetId::as_str),
        quote_to.as_ref().map(TweetId::as_str),
        config_path
    );

    Ok(ParsedArgs::Run(PostIntent {
        config_path,
        reply_to,
        quote_to,
        text,
    }))
}

/// Parses the arguments of `x-delete` (program name excluded).
///
/// Every operand must be a tweet id; the scan stops at the first one that
/// is not.
pub fn parse_delete_args<S: AsRef<str>>(
    args: &[S],
) -> Result<ParsedArgs<DeleteIntent>, ArgsError> {
    let mut scanner = Scanner::new(args);
    let mut config_path = None;
    let mut tweet_ids = Vec::new();

    while let Some(token) = scanner.next_token() {
        match token {
            Token::Help => return Ok(ParsedArgs::Help),
            Token::Flag(flag @ ("--config" | "-c")) => {
                config_path = Some(PathBuf::from(scanner.take_value(flag)?));
            }
            Token::Flag(flag) => return Err(ArgsError::UnknownOption(flag.to_string())),
            Token::Operand(arg) => {
                let id = normalize_tweet_id(arg)
                    .ok_or_else(|| ArgsError::InvalidTweetId(arg.to_string()))?;
                tweet_ids.push(id);
            }
        }
    }

    if tweet_ids.is_empty() {
        return Err(ArgsError::MissingTweetIds);
    }

    debug!(
        "Parsed delete arguments: {} ids, config={:?}",
        tweet_ids.len(),
        config_path
    );

    Ok(ParsedArgs::Run(DeleteIntent {
        config_path,
        tweet_ids,
    }))
}

/// Full help for `x-post`.
pub fn post_help_text() -> String {
    format!(
        "{POST_USAGE}

Examples:
  x-post \"Hello world from CLI!\"
  x-post \"Reply text\" --reply-to 1234567890
  x-post \"Check this out\" --quote-url https://x.com/user/status/1234567890
  x-post --config ./secrets/x-api.json \"Configured path example\"

Use -- before text that starts with a dash:
  x-post -- \"--not-a-flag\"
"
    )
}

/// Full help for `x-delete`.
pub fn delete_help_text() -> String {
    format!(
        "{DELETE_USAGE}

Examples:
  x-delete 1234567890
  x-delete 12345 67890
  x-delete --config ./secrets/x-api.json 1234567890
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_post(args: &[&str]) -> PostIntent {
        match parse_post_args(args) {
            Ok(ParsedArgs::Run(intent)) => intent,
            other => panic!("expected a post intent, got {:?}", other),
        }
    }

    fn run_delete(args: &[&str]) -> DeleteIntent {
        match parse_delete_args(args) {
            Ok(ParsedArgs::Run(intent)) => intent,
            other => panic!("expected a delete intent, got {:?}", other),
        }
    }

    fn ids(intent: &DeleteIntent) -> Vec<&str> {
        intent.tweet_ids.iter().map(TweetId::as_str).collect()
    }

    #[test]
    fn test_post_help_short_circuits() {
        assert_eq!(parse_post_args(&["--help"]), Ok(ParsedArgs::Help));
        assert_eq!(parse_post_args(&["-h"]), Ok(ParsedArgs::Help));
    }

    #[test]
    fn test_post_help_wins_over_surrounding_tokens() {
        // Later tokens that would fail are never looked at.
        assert_eq!(
            parse_post_args(&["text", "--reply-to", "1", "--help", "--wat", "--quote"]),
            Ok(ParsedArgs::Help)
        );
        // Earlier valid tokens are discarded too.
        assert_eq!(
            parse_post_args(&["-c", "/tmp/x.json", "-h"]),
            Ok(ParsedArgs::Help)
        );
    }

    #[test]
    fn test_post_error_before_help_is_reported() {
        assert_eq!(
            parse_post_args(&["--wat", "--help"]),
            Err(ArgsError::UnknownOption("--wat".into()))
        );
    }

    #[test]
    fn test_post_parses_reply_target_and_text() {
        let intent = run_post(&["Hello", "world", "--reply-to", "123"]);
        assert_eq!(intent.text, "Hello world");
        assert_eq!(intent.reply_to.as_ref().map(TweetId::as_str), Some("123"));
        assert_eq!(intent.quote_to, None);
        assert_eq!(intent.config_path, None);
    }

    #[test]
    fn test_post_short_reply_flag() {
        let intent = run_post(&["-r", "42", "hi"]);
        assert_eq!(intent.reply_to.as_ref().map(TweetId::as_str), Some("42"));
    }

    #[test]
    fn test_post_parses_quote_url() {
        let intent = run_post(&[
            "Quoted",
            "tweet",
            "--quote-url",
            "https://x.com/user/status/456",
        ]);
        assert_eq!(intent.quote_to.as_ref().map(TweetId::as_str), Some("456"));
        assert_eq!(intent.text, "Quoted tweet");
    }

    #[test]
    fn test_post_parses_quote_id() {
        let intent = run_post(&["--quote", "789", "look"]);
        assert_eq!(intent.quote_to.as_ref().map(TweetId::as_str), Some("789"));
    }

    #[test]
    fn test_post_parses_config_path() {
        let intent = run_post(&["--config", "./secrets/x-api.json", "hello"]);
        assert_eq!(
            intent.config_path,
            Some(PathBuf::from("./secrets/x-api.json"))
        );
    }

    #[test]
    fn test_post_rejects_unknown_options() {
        assert_eq!(
            parse_post_args(&["hello", "--wat"]),
            Err(ArgsError::UnknownOption("--wat".into()))
        );
        assert_eq!(
            parse_post_args(&["hello", "--wat"]).unwrap_err().to_string(),
            "Unknown option: --wat"
        );
    }

    #[test]
    fn test_post_rejects_conflicting_reply_and_quote_in_any_order() {
        let cases: [&[&str]; 3] = [
            &["hello", "--reply-to", "1", "--quote", "2"],
            &["--quote", "2", "hello", "--reply-to", "1"],
            &["-r", "1", "--quote-url", "https://x.com/a/status/2", "hello"],
        ];
        for args in cases {
            let err = parse_post_args(args).unwrap_err();
            assert_eq!(err, ArgsError::ConflictingTargets);
            assert_eq!(
                err.to_string(),
                "Cannot use --reply-to and --quote/--quote-url together."
            );
        }
    }

    #[test]
    fn test_post_conflict_is_checked_before_text() {
        assert_eq!(
            parse_post_args(&["--reply-to", "1", "--quote", "2"]),
            Err(ArgsError::ConflictingTargets)
        );
    }

    #[test]
    fn test_post_double_dash_keeps_dash_prefixed_text() {
        let intent = run_post(&["--", "--help"]);
        assert_eq!(intent.text, "--help");

        let intent = run_post(&["note:", "--", "-r", "-1", "--"]);
        assert_eq!(intent.text, "note: -r -1 --");
        assert_eq!(intent.reply_to, None);
    }

    #[test]
    fn test_post_missing_values() {
        assert_eq!(
            parse_post_args(&["hello", "--reply-to"]),
            Err(ArgsError::MissingValue("--reply-to".into()))
        );
        assert_eq!(
            parse_post_args(&["hello", "-c", "--quote", "1"])
                .unwrap_err()
                .to_string(),
            "Missing value for -c."
        );
        assert_eq!(
            parse_post_args(&["hello", "--quote-url", ""]),
            Err(ArgsError::MissingValue("--quote-url".into()))
        );
    }

    #[test]
    fn test_post_invalid_tweet_ids_for_options() {
        assert_eq!(
            parse_post_args(&["hello", "--reply-to", "abc"])
                .unwrap_err()
                .to_string(),
            "Invalid tweet ID for --reply-to: \"abc\"."
        );
        assert_eq!(
            parse_post_args(&["hello", "-r", "12a"]).unwrap_err().to_string(),
            "Invalid tweet ID for -r: \"12a\"."
        );
        assert_eq!(
            parse_post_args(&["hello", "--quote", "x"]).unwrap_err().to_string(),
            "Invalid tweet ID for --quote: \"x\"."
        );
    }

    #[test]
    fn test_post_invalid_quote_url() {
        assert_eq!(
            parse_post_args(&["hello", "--quote-url", "https://x.com/user"])
                .unwrap_err()
                .to_string(),
            "Failed to parse tweet ID from --quote-url value: \"https://x.com/user\"."
        );
    }

    #[test]
    fn test_post_missing_text() {
        assert_eq!(parse_post_args::<&str>(&[]), Err(ArgsError::MissingText));
        assert_eq!(
            parse_post_args(&["   ", "", "--reply-to", "1"]),
            Err(ArgsError::MissingText)
        );
        assert_eq!(
            ArgsError::MissingText.to_string(),
            "Missing tweet text. Use --help for examples."
        );
    }

    #[test]
    fn test_post_text_is_joined_and_trimmed() {
        let intent = run_post(&["  padded", "words  "]);
        assert_eq!(intent.text, "padded words");
    }

    #[test]
    fn test_post_last_value_option_wins() {
        let intent = run_post(&["-c", "a.json", "-c", "b.json", "-r", "1", "-r", "2", "t"]);
        assert_eq!(intent.config_path, Some(PathBuf::from("b.json")));
        assert_eq!(intent.reply_to.as_ref().map(TweetId::as_str), Some("2"));
    }

    #[test]
    fn test_post_accepts_owned_strings() {
        let args = vec!["hi".to_string(), "there".to_string()];
        let ParsedArgs::Run(intent) = parse_post_args(&args).unwrap() else {
            panic!("expected intent");
        };
        assert_eq!(intent.text, "hi there");
    }

    #[test]
    fn test_delete_parses_ids_and_config_path() {
        let intent = run_delete(&["--config", "/tmp/creds.json", "1", "2"]);
        assert_eq!(ids(&intent), vec!["1", "2"]);
        assert_eq!(intent.config_path, Some(PathBuf::from("/tmp/creds.json")));
    }

    #[test]
    fn test_delete_help() {
        assert_eq!(parse_delete_args(&["1", "-h"]), Ok(ParsedArgs::Help));
        assert_eq!(parse_delete_args(&["--help", "nope"]), Ok(ParsedArgs::Help));
    }

    #[test]
    fn test_delete_rejects_invalid_ids() {
        let err = parse_delete_args(&["123", "abc", "--wat"]).unwrap_err();
        assert_eq!(err, ArgsError::InvalidTweetId("abc".into()));
        assert_eq!(err.to_string(), "Invalid tweet ID: \"abc\".");
    }

    #[test]
    fn test_delete_dash_ids_after_separator_are_invalid_ids() {
        assert_eq!(
            parse_delete_args(&["--", "-5"]),
            Err(ArgsError::InvalidTweetId("-5".into()))
        );
        let intent = run_delete(&["--", "5", "6"]);
        assert_eq!(ids(&intent), vec!["5", "6"]);
    }

    #[test]
    fn test_delete_rejects_unknown_options() {
        assert_eq!(
            parse_delete_args(&["1", "--reply-to", "2"]),
            Err(ArgsError::UnknownOption("--reply-to".into()))
        );
    }

    #[test]
    fn test_delete_requires_an_id() {
        let err = parse_delete_args(&["--config", "/tmp/c.json"]).unwrap_err();
        assert_eq!(err, ArgsError::MissingTweetIds);
        assert_eq!(
            err.to_string(),
            "At least one tweet ID is required. Use --help for examples."
        );
    }

    #[test]
    fn test_delete_config_missing_value() {
        assert_eq!(
            parse_delete_args(&["1", "--config"]),
            Err(ArgsError::MissingValue("--config".into()))
        );
    }

    #[test]
    fn test_delete_preserves_order_and_duplicates() {
        let intent = run_delete(&["3", " 1 ", "3"]);
        assert_eq!(ids(&intent), vec!["3", "1", "3"]);
    }

    #[test]
    fn test_help_texts_start_with_usage() {
        assert!(post_help_text().starts_with(POST_USAGE));
        assert!(post_help_text().contains("x-post -- \"--not-a-flag\""));
        assert!(delete_help_text().starts_with(DELETE_USAGE));
        assert!(delete_help_text().contains("x-delete 12345 67890"));
    }
}
