//! # x-cli Library
//!
//! Shared building blocks of the `x-post` and `x-delete` command-line tools,
//! which post and delete tweets through the X API v2 using OAuth 1.0a user
//! context credentials.
//!
//! ## Features
//!
//! - Deterministic argument parsing with precise, first-error-wins messages
//! - Layered credential discovery (environment variables, then credential files)
//! - OAuth 1.0a HMAC-SHA1 request signing
//! - Minimal X API v2 client for creating and deleting tweets
//!
//! ## Configuration
//!
//! Credentials are read from `X_API_KEY`, `X_API_SECRET`, `X_ACCESS_TOKEN` and
//! `X_ACCESS_SECRET`, or from the first existing credentials file among:
//! `--config <path>`, `X_API_CONFIG`, `./x-api.json`, `./.x-api.json`,
//! `~/.config/x-api.json` and, with `X_API_USE_LEGACY_PATHS=1`,
//! `~/.clawdbot/secrets/x-api.json`.
//!
//! Log output is controlled with `RUST_LOG` (see `env_logger`).

pub mod args;
pub mod config;
pub mod fs;
pub mod oauth;
pub mod twitter;

// Re-export commonly used types and functions
pub use args::{
    delete_help_text, parse_delete_args, parse_post_args, post_help_text, ArgsError,
    DeleteIntent, ParsedArgs, PostIntent, DELETE_USAGE, POST_USAGE,
};
pub use config::{
    candidate_config_paths, credential_help_text, load_credentials, CredentialBundle,
    CredentialError, CredentialSource, LoadOptions, ResolvedCredentials,
};
pub use fs::{FileSystem, RealFileSystem};
pub use twitter::{
    extract_tweet_id_from_url, normalize_tweet_id, status_url, ApiError, TweetId, XClient,
};
