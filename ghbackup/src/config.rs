//! Configuration file parsing.

use crate::remote::{
    DEFAULT_API_URL, DEFAULT_PER_PAGE, DEFAULT_TIMEOUT, Paging, Settings,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// `Result` type for configuration [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors encountered loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration file could not be read.
    #[error("Could not read {path:?}: {source}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// An error encountered parsing the TOML configuration.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// The timeout was set to zero, so every request would fail at once.
    #[error("Timeout must be at least 1 second")]
    ZeroTimeout,

    /// No access token was configured.
    #[error(
        "No GitHub token configured (use --token, GITHUB_TOKEN, or \
        github_token in the configuration file)"
    )]
    MissingToken,
}

/// Configuration.
///
/// Every field is optional so that configurations from different sources
/// can be layered with [`Config::merge()`].
#[derive(Debug, Clone, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Personal access token.
    pub github_token: Option<String>,

    /// Number of items to request per page.
    pub per_page: Option<u8>,

    /// Directory to clone into.
    pub clone_path: Option<PathBuf>,

    /// Base URL of the API.
    pub api_url: Option<String>,

    /// Timeout in seconds for each API call and each clone.
    pub timeout: Option<u64>,

    /// Whether to retrieve every page of results, not just the first.
    pub all_pages: Option<bool>,

    /// Whether `backup` should clone gists as well as repositories.
    pub gists: Option<bool>,
}

impl Config {
    /// Parse a TOML configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use assert2::assert;
    /// use ghbackup::config::Config;
    /// use std::path::PathBuf;
    ///
    /// assert!(
    ///     Config::parse(
    ///         r#"
    ///         github_token = "ghp_abc"
    ///         per_page = 50
    ///         clone_path = "/srv/backup/github"
    ///         "#
    ///     )
    ///     .unwrap()
    ///         == Config {
    ///             github_token: Some("ghp_abc".to_owned()),
    ///             per_page: Some(50),
    ///             clone_path: Some(PathBuf::from("/srv/backup/github")),
    ///             ..Config::default()
    ///         },
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if it can’t parse the configuration.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can’t be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&input)
    }

    /// Layer `overrides` on top of this configuration.
    ///
    /// Any value set in `overrides` wins.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            github_token: overrides.github_token.or(self.github_token),
            per_page: overrides.per_page.or(self.per_page),
            clone_path: overrides.clone_path.or(self.clone_path),
            api_url: overrides.api_url.or(self.api_url),
            timeout: overrides.timeout.or(self.timeout),
            all_pages: overrides.all_pages.or(self.all_pages),
            gists: overrides.gists.or(self.gists),
        }
    }

    /// Whether `backup` should clone gists. Defaults to `true`.
    #[must_use]
    pub fn include_gists(&self) -> bool {
        self.gists.unwrap_or(true)
    }

    /// Produce client settings, filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingToken`] if no token was configured, or
    /// [`Error::ZeroTimeout`] if the timeout is 0.
    pub fn to_settings(&self) -> Result<Settings> {
        let token = self.github_token.clone().ok_or(Error::MissingToken)?;
        if self.timeout == Some(0) {
            return Err(Error::ZeroTimeout);
        }
        Ok(Settings {
            token,
            per_page: self.per_page.unwrap_or(DEFAULT_PER_PAGE),
            paging: if self.all_pages.unwrap_or(false) {
                Paging::AllPages
            } else {
                Paging::FirstPage
            },
            api_url: self
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            clone_path: self
                .clone_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
            timeout: self
                .timeout
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}
