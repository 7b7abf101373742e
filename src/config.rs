//! Credential discovery for the X API.
//!
//! Credentials come from exactly one place. If any of the four credential
//! environment variables is set, the environment is the only source and must
//! be complete. Otherwise a fixed, ordered list of JSON files is searched and
//! the first file that exists decides the outcome, good or bad.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::fs::FileSystem;

/// Environment variable holding the consumer (API) key.
pub const ENV_API_KEY: &str = "X_API_KEY";
/// Environment variable holding the consumer (API) secret.
pub const ENV_API_SECRET: &str = "X_API_SECRET";
/// Environment variable holding the user access token.
pub const ENV_ACCESS_TOKEN: &str = "X_ACCESS_TOKEN";
/// Environment variable holding the user access token secret.
pub const ENV_ACCESS_SECRET: &str = "X_ACCESS_SECRET";
/// Environment variable naming an explicit credentials file.
pub const ENV_CONFIG_PATH: &str = "X_API_CONFIG";
/// Set to `1` to also search the legacy credentials location.
pub const ENV_USE_LEGACY_PATHS: &str = "X_API_USE_LEGACY_PATHS";

/// Credential field names, in the order they are reported when missing.
pub const CREDENTIAL_KEYS: [&str; 4] = [
    "consumerKey",
    "consumerSecret",
    "accessToken",
    "accessTokenSecret",
];

const CREDENTIAL_ENV_VARS: [&str; 4] = [
    ENV_API_KEY,
    ENV_API_SECRET,
    ENV_ACCESS_TOKEN,
    ENV_ACCESS_SECRET,
];

const CONFIG_FILE_NAME: &str = "x-api.json";
const HIDDEN_CONFIG_FILE_NAME: &str = ".x-api.json";

/// OAuth 1.0a user context credentials.
///
/// The serialized form matches the credentials file:
///
/// ```json
/// {
///   "consumerKey": "...",
///   "consumerSecret": "...",
///   "accessToken": "...",
///   "accessTokenSecret": "..."
/// }
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialBundle {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("consumer_key", &mask_secret(&self.consumer_key))
            .field("consumer_secret", &mask_secret(&self.consumer_secret))
            .field("access_token", &mask_secret(&self.access_token))
            .field("access_token_secret", &mask_secret(&self.access_token_secret))
            .finish()
    }
}

/// Where a credential bundle was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// The `X_API_KEY` family of environment variables.
    Env,
    /// A credentials file.
    File(PathBuf),
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Env => f.write_str("env"),
            CredentialSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A successful credential lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub credentials: CredentialBundle,
    pub source: CredentialSource,
    /// Candidate files considered; empty when the environment was used.
    pub searched_paths: Vec<PathBuf>,
}

/// Why no usable credentials were found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("Missing environment variables: {}", .missing.join(", "))]
    MissingEnvVars { missing: Vec<&'static str> },

    #[error("Failed to parse credentials file ({}): {message}", .path.display())]
    Parse {
        path: PathBuf,
        message: String,
        searched_paths: Vec<PathBuf>,
    },

    #[error(
        "Credentials file is missing required fields ({}): {}",
        .path.display(),
        .missing.join(", ")
    )]
    MissingFields {
        path: PathBuf,
        missing: Vec<&'static str>,
        searched_paths: Vec<PathBuf>,
    },

    #[error("No credentials found.")]
    NotFound { searched_paths: Vec<PathBuf> },
}

impl CredentialError {
    /// Candidate files that were considered before failing.
    pub fn searched_paths(&self) -> &[PathBuf] {
        match self {
            CredentialError::MissingEnvVars { .. } => &[],
            CredentialError::Parse { searched_paths, .. }
            | CredentialError::MissingFields { searched_paths, .. }
            | CredentialError::NotFound { searched_paths } => searched_paths.as_slice(),
        }
    }

    /// The credentials file that caused the failure, if one did.
    pub fn path(&self) -> Option<&Path> {
        match self {
            CredentialError::Parse { path, .. } | CredentialError::MissingFields { path, .. } => {
                Some(path.as_path())
            }
            CredentialError::MissingEnvVars { .. } | CredentialError::NotFound { .. } => None,
        }
    }
}

/// Inputs to [`load_credentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Environment variables visible to the lookup.
    pub env: HashMap<String, String>,
    /// Directory searched for `x-api.json` and `.x-api.json`.
    pub cwd: PathBuf,
    /// Home directory searched for `.config/x-api.json`; empty when unknown.
    pub home: PathBuf,
    /// Explicit credentials file, searched first.
    pub config_path: Option<PathBuf>,
    /// Overrides `X_API_USE_LEGACY_PATHS` when set.
    pub include_legacy_paths: Option<bool>,
}

impl LoadOptions {
    pub fn new(env: HashMap<String, String>, cwd: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        Self {
            env,
            cwd: cwd.into(),
            home: home.into(),
            config_path: None,
            include_legacy_paths: None,
        }
    }

    /// Builds options from the running process: its environment, working
    /// directory and the user's home directory.
    ///
    /// Environment entries that are not valid UTF-8 are skipped. When no home
    /// directory can be determined, `home` is left empty and the home-relative
    /// candidates are not searched.
    ///
    /// # Errors
    ///
    /// Fails if the working directory is unavailable.
    pub fn from_process() -> io::Result<Self> {
        let env_vars = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        let cwd = env::current_dir()?;
        let home = dirs::home_dir().unwrap_or_else(|| {
            warn!("Could not determine home directory");
            PathBuf::new()
        });
        Ok(Self::new(env_vars, cwd, home))
    }

    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    pub fn with_legacy_paths(mut self, include: bool) -> Self {
        self.include_legacy_paths = Some(include);
        self
    }

    fn env_value(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    fn use_legacy_paths(&self) -> bool {
        self.include_legacy_paths
            .unwrap_or_else(|| self.env_value(ENV_USE_LEGACY_PATHS) == Some("1"))
    }
}

fn has_value(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Masks a secret for logging, keeping at most four characters at each end.
pub(crate) fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let len = chars.len();
    if len > 16 {
        let prefix: String = chars[..4].iter().collect();
        let suffix: String = chars[len - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "****".to_string()
    }
}

/// Turns the four optional fields into a bundle, or lists the missing keys.
fn bundle_from_fields(fields: [Option<String>; 4]) -> Result<CredentialBundle, Vec<&'static str>> {
    match fields {
        [Some(consumer_key), Some(consumer_secret), Some(access_token), Some(access_token_secret)] => {
            Ok(CredentialBundle {
                consumer_key,
                consumer_secret,
                access_token,
                access_token_secret,
            })
        }
        fields => Err(CREDENTIAL_KEYS
            .iter()
            .zip(&fields)
            .filter_map(|(key, value)| value.is_none().then_some(*key))
            .collect()),
    }
}

/// Builds the ordered, de-duplicated list of candidate credentials files.
///
/// Order: explicit path, `X_API_CONFIG`, `<cwd>/x-api.json`,
/// `<cwd>/.x-api.json`, `<home>/.config/x-api.json`, and, when enabled,
/// `<home>/.clawdbot/secrets/x-api.json`.
pub fn candidate_config_paths(options: &LoadOptions) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(path) = options.config_path.as_ref().filter(|p| !p.as_os_str().is_empty()) {
        candidates.push(path.clone());
    }
    if let Some(path) = options.env_value(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
        candidates.push(PathBuf::from(path));
    }

    candidates.push(options.cwd.join(CONFIG_FILE_NAME));
    candidates.push(options.cwd.join(HIDDEN_CONFIG_FILE_NAME));

    let has_home = !options.home.as_os_str().is_empty();
    if has_home {
        candidates.push(options.home.join(".config").join(CONFIG_FILE_NAME));
    }
    if has_home && options.use_legacy_paths() {
        candidates.push(
            options
                .home
                .join(".clawdbot")
                .join("secrets")
                .join(CONFIG_FILE_NAME),
        );
    }

    let mut paths = Vec::with_capacity(candidates.len());
    for path in candidates {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

fn load_from_env(options: &LoadOptions) -> Option<Result<ResolvedCredentials, CredentialError>> {
    let fields = CREDENTIAL_ENV_VARS.map(|name| {
        options
            .env_value(name)
            .filter(|value| has_value(value))
            .map(str::to_string)
    });

    if fields.iter().all(Option::is_none) {
        debug!("No credential environment variables set");
        return None;
    }

    info!("Loading X API credentials from environment variables");
    let result = match bundle_from_fields(fields) {
        Ok(credentials) => {
            debug!("Consumer key (masked): {}", mask_secret(&credentials.consumer_key));
            Ok(ResolvedCredentials {
                credentials,
                source: CredentialSource::Env,
                searched_paths: Vec::new(),
            })
        }
        Err(missing) => {
            warn!("Environment credentials are incomplete, missing: {}", missing.join(", "));
            Err(CredentialError::MissingEnvVars { missing })
        }
    };
    Some(result)
}

fn load_from_file(
    path: &Path,
    fs: &dyn FileSystem,
    searched_paths: &[PathBuf],
) -> Result<ResolvedCredentials, CredentialError> {
    let parse_error = |message: String| CredentialError::Parse {
        path: path.to_path_buf(),
        message,
        searched_paths: searched_paths.to_vec(),
    };

    let content = fs
        .read_to_string(path)
        .map_err(|e| parse_error(e.to_string()))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;

    // Non-object documents have no fields and fall through to MissingFields.
    let fields = CREDENTIAL_KEYS.map(|key| {
        value
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| has_value(value))
            .map(str::to_string)
    });

    match bundle_from_fields(fields) {
        Ok(credentials) => {
            info!("Loaded X API credentials from {}", path.display());
            debug!("Consumer key (masked): {}", mask_secret(&credentials.consumer_key));
            Ok(ResolvedCredentials {
                credentials,
                source: CredentialSource::File(path.to_path_buf()),
                searched_paths: searched_paths.to_vec(),
            })
        }
        Err(missing) => {
            warn!(
                "Credentials file {} is missing fields: {}",
                path.display(),
                missing.join(", ")
            );
            Err(CredentialError::MissingFields {
                path: path.to_path_buf(),
                missing,
                searched_paths: searched_paths.to_vec(),
            })
        }
    }
}

/// Resolves X API credentials.
///
/// # Resolution Order
///
/// 1. Environment variables (`X_API_KEY`, `X_API_SECRET`, `X_ACCESS_TOKEN`,
///    `X_ACCESS_SECRET`). If any is non-blank all four must be; files are not
///    consulted.
/// 2. The first existing file from [`candidate_config_paths`]. A file that
///    cannot be read or parsed, or that lacks a field, is an error; later
///    candidates are not tried.
///
/// # Returns
///
/// - `Ok(ResolvedCredentials)`: The bundle together with its source
/// - `Err(CredentialError)`: What went wrong, with the paths searched
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use x_cli::{load_credentials, CredentialSource, LoadOptions, RealFileSystem};
///
/// let env: HashMap<String, String> = [
///     ("X_API_KEY", "key"),
///     ("X_API_SECRET", "secret"),
///     ("X_ACCESS_TOKEN", "token"),
///     ("X_ACCESS_SECRET", "token-secret"),
/// ]
/// .into_iter()
/// .map(|(k, v)| (k.to_string(), v.to_string()))
/// .collect();
///
/// let resolved = load_credentials(&LoadOptions::new(env, "/work", "/home/me"), &RealFileSystem).unwrap();
/// assert_eq!(resolved.source, CredentialSource::Env);
/// ```
pub fn load_credentials(
    options: &LoadOptions,
    fs: &dyn FileSystem,
) -> Result<ResolvedCredentials, CredentialError> {
    if let Some(result) = load_from_env(options) {
        return result;
    }

    let searched_paths = candidate_config_paths(options);
    for path in &searched_paths {
        if !fs.exists(path) {
            debug!("No credentials file at {}", path.display());
            continue;
        }
        debug!("Found credentials file at {}", path.display());
        return load_from_file(path, fs, &searched_paths);
    }

    warn!(
        "No credentials found after searching {} paths",
        searched_paths.len()
    );
    Err(CredentialError::NotFound { searched_paths })
}

/// Setup instructions shown when credentials cannot be resolved.
///
/// A `Searched config paths:` block is appended when `searched_paths` is not
/// empty.
pub fn credential_help_text(searched_paths: &[PathBuf]) -> String {
    let mut text = String::from(
        "Set environment variables:
  export X_API_KEY=\"...\"
  export X_API_SECRET=\"...\"
  export X_ACCESS_TOKEN=\"...\"
  export X_ACCESS_SECRET=\"...\"

Or create x-api.json:
  {
    \"consumerKey\": \"...\",
    \"consumerSecret\": \"...\",
    \"accessToken\": \"...\",
    \"accessTokenSecret\": \"...\"
  }",
    );

    if !searched_paths.is_empty() {
        text.push_str("\nSearched config paths:");
        for path in searched_paths {
            text.push_str(&format!("\n  - {}", path.display()));
        }
    }

    text
}
