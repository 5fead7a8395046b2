//! The remote client.

use super::{
    Cloner, Error, Gist, MAX_PER_PAGE, Paging, Repository, Result, Session,
    Settings,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Client for a GitHub-compatible API.
///
/// Built once with [`RemoteClient::configure()`] and then borrowed by every
/// operation. Nothing in here changes after construction.
#[derive(Debug)]
pub struct RemoteClient {
    /// The authenticated session.
    session: Session,

    /// Number of items to request per page.
    per_page: u8,

    /// How many pages list operations retrieve.
    paging: Paging,

    /// Clones into the configured clone path.
    cloner: Cloner,

    /// Where to log status.
    log: slog::Logger,
}

impl RemoteClient {
    /// Build a client from `settings`. This does not contact the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the page size is out of range, or if the
    /// underlying HTTP client could not be constructed.
    pub fn configure(settings: &Settings, log: slog::Logger) -> Result<Self> {
        if !(1..=MAX_PER_PAGE).contains(&settings.per_page) {
            return Err(Error::InvalidPageSize(settings.per_page));
        }

        Ok(Self {
            session: Session::new(
                &settings.token,
                &settings.api_url,
                settings.timeout,
            )?,
            per_page: settings.per_page,
            paging: settings.paging,
            cloner: Cloner::new(
                settings.clone_path.clone(),
                settings.token.clone(),
                settings.timeout,
            ),
            log,
        })
    }

    /// The authenticated session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The clone path.
    #[must_use]
    pub fn clone_path(&self) -> &Path {
        self.cloner.base()
    }

    /// Get a repository by owner and name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] with the status code if the API
    /// responds with anything but `200 OK`, or [`Error::Transport`] if the
    /// request fails. Returns [`Error::InvalidName`] without making a
    /// request if `owner` or `name` is not a plain path segment.
    pub async fn get_repository_by_name(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Repository> {
        let owner = path_segment(owner)?;
        let name = path_segment(name)?;
        self.get(&format!("/repos/{owner}/{name}"), &[]).await
    }

    /// List repositories for the authenticated user.
    ///
    /// Only the first page is retrieved unless the client was configured
    /// with [`Paging::AllPages`]. Results are in the order the API returned
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] with the status code if the API
    /// responds with anything but `200 OK`, or [`Error::Transport`] if the
    /// request fails.
    pub async fn list_repositories(&self) -> Result<Vec<Repository>> {
        let repos: Vec<Repository> = self.list("/user/repos").await?;
        slog::info!(self.log, "Received {} repositories", repos.len());
        Ok(repos)
    }

    /// List gists for the authenticated user.
    ///
    /// Paging works the same as in [`RemoteClient::list_repositories()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] with the status code if the API
    /// responds with anything but `200 OK`, or [`Error::Transport`] if the
    /// request fails.
    pub async fn list_gists(&self) -> Result<Vec<Gist>> {
        let gists: Vec<Gist> = self.list("/gists").await?;
        slog::info!(self.log, "Received {} gists", gists.len());
        Ok(gists)
    }

    /// Clone `url` into `clone_path/name`.
    ///
    /// Runs on the blocking thread pool and waits at most the configured
    /// timeout for it to finish. A clone that stalls without transferring
    /// anything is abandoned when the timeout expires: it keeps running on
    /// the blocking pool until `git2` gives up on the connection, but its
    /// result is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the clone is already there. That
    /// is expected when re-running a backup; see [`Error::is_expected()`].
    /// Returns [`Error::CloneTimedOut`] if the timeout expires. Any other
    /// error is a genuine failure.
    pub async fn clone_repository(
        &self,
        name: &str,
        url: &str,
    ) -> Result<PathBuf> {
        slog::debug!(self.log, "Cloning"; "name" => name, "url" => url);
        let cloner = self.cloner.clone();
        let timeout = cloner.timeout();
        let task = {
            let name = name.to_owned();
            let url = url.to_owned();
            tokio::task::spawn_blocking(move || cloner.clone_into(&name, &url))
        };

        match tokio::time::timeout(timeout, task).await {
            Ok(result) => result?,
            Err(_) => {
                slog::debug!(self.log, "Abandoning stalled clone";
                    "name" => name);
                Err(Error::CloneTimedOut { name: name.to_owned(), timeout })
            }
        }
    }

    /// Retrieve pages of a list endpoint according to the paging setting.
    async fn list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Vec<T>> {
        let per_page = u32::from(self.per_page);
        let mut items = Vec::new();
        for page in 1_u32.. {
            let batch: Vec<T> = self
                .get(endpoint, &[("per_page", per_page), ("page", page)])
                .await?;
            let full = batch.len() >= usize::from(self.per_page);
            items.extend(batch);

            if self.paging == Paging::FirstPage || !full {
                break;
            }
            slog::debug!(self.log, "Fetching next page";
                "endpoint" => endpoint, "page" => page.saturating_add(1));
        }
        Ok(items)
    }

    /// Make a `GET` request and decode the JSON response.
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, u32)],
    ) -> Result<T> {
        let url = self.session.url(endpoint);
        slog::trace!(self.log, "GET"; "url" => &url, "query" => ?query);
        let response =
            self.session.http().get(&url).query(query).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                url,
                code: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

/// Make sure `segment` can be used as a single segment of a URL path.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] if `segment` is empty, `.` or `..`, or
/// contains anything that would change which URL is requested.
fn path_segment(segment: &str) -> Result<&str> {
    if matches!(segment, "" | "." | "..")
        || segment.contains(['/', '\\', '?', '#', '%'])
        || segment.chars().any(char::is_control)
    {
        Err(Error::InvalidName(segment.to_owned()))
    } else {
        Ok(segment)
    }
}
