//! Authenticated session and client settings.

use super::Result;
use reqwest::header::{
    ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT,
};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// The public GitHub API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub’s default page size.
pub const DEFAULT_PER_PAGE: u8 = 30;

/// GitHub won’t return more than this many items per page.
pub const MAX_PER_PAGE: u8 = 100;

/// Default timeout for each API call and each clone.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How many pages list operations retrieve.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Paging {
    /// Only retrieve the first page.
    #[default]
    FirstPage,

    /// Keep retrieving pages until a short or empty page comes back.
    AllPages,
}

/// Everything needed to configure a [`RemoteClient`](super::RemoteClient).
#[derive(Clone, Eq, PartialEq)]
pub struct Settings {
    /// Static access token.
    pub token: String,

    /// Number of items to request per page.
    pub per_page: u8,

    /// How many pages to retrieve.
    pub paging: Paging,

    /// Base URL of the API, without a trailing slash.
    pub api_url: String,

    /// Directory to clone into.
    pub clone_path: PathBuf,

    /// Timeout for each API call and each clone.
    pub timeout: Duration,
}

impl Settings {
    /// Settings with defaults for everything but the token.
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: token.into(),
            per_page: DEFAULT_PER_PAGE,
            paging: Paging::default(),
            api_url: DEFAULT_API_URL.to_owned(),
            clone_path: PathBuf::from("."),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Keep the token out of debug output.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("token", &"<redacted>")
            .field("per_page", &self.per_page)
            .field("paging", &self.paging)
            .field("api_url", &self.api_url)
            .field("clone_path", &self.clone_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// An authenticated handle to the remote API.
///
/// Immutable once built. Every request sent through [`Session::http()`]
/// carries the bearer token and the configured timeout.
#[derive(Clone)]
pub struct Session {
    /// The access token, used for authenticated clones.
    token: String,

    /// Base URL of the API, without a trailing slash.
    api_url: String,

    /// HTTP client with authentication headers baked in.
    http: reqwest::Client,
}

impl Session {
    /// Build a session. This does not contact the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the token can’t be used in a header, or if the
    /// HTTP client could not be constructed.
    pub fn new(token: &str, api_url: &str, timeout: Duration) -> Result<Self> {
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {token}"))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("ghbackup"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            token: token.to_owned(),
            api_url: api_url.trim_end_matches('/').to_owned(),
            http,
        })
    }

    /// The access token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The full URL for an API endpoint, e.g. `/user/repos`.
    #[must_use]
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.api_url)
    }

    /// The authenticated HTTP client.
    #[must_use]
    pub const fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}
