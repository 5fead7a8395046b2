//! Back up everything: list, then clone each result.

use crate::remote::{self, Cloneable, RemoteClient};
use std::path::PathBuf;

/// What to back up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Selection {
    /// Clone the user’s repositories.
    pub repositories: bool,

    /// Clone the user’s gists.
    pub gists: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self { repositories: true, gists: true }
    }
}

/// Outcome of a backup run.
#[derive(Debug, Default)]
pub struct Summary {
    /// Newly cloned, with the path they were cloned to.
    pub cloned: Vec<(String, PathBuf)>,

    /// Already present on disk from a previous run.
    pub present: Vec<String>,

    /// Could not be cloned.
    pub failed: Vec<(String, remote::Error)>,
}

impl Summary {
    /// True if nothing failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Clone everything in `selection` that isn’t already on disk.
///
/// Items are cloned one at a time in the order the API listed them. A clone
/// that fails is recorded in the [`Summary`] and the run continues.
///
/// # Errors
///
/// Returns an error if a list call fails. Nothing is cloned after that.
pub async fn run(
    client: &RemoteClient,
    selection: Selection,
    log: &slog::Logger,
) -> remote::Result<Summary> {
    let mut summary = Summary::default();

    if selection.repositories {
        let repos = client.list_repositories().await?;
        clone_all(client, &repos, &mut summary, log).await;
    }

    if selection.gists {
        let gists = client.list_gists().await?;
        clone_all(client, &gists, &mut summary, log).await;
    }

    Ok(summary)
}

/// Clone each item in turn, recording the outcome in `summary`.
async fn clone_all<T: Cloneable + Sync>(
    client: &RemoteClient,
    items: &[T],
    summary: &mut Summary,
    log: &slog::Logger,
) {
    for item in items {
        let name = item.clone_name();
        match client.clone_repository(name, item.clone_url()).await {
            Ok(path) => {
                slog::info!(log, "'{name}' is cloned";
                    "path" => %path.display());
                summary.cloned.push((name.to_owned(), path));
            }
            Err(error) if error.is_expected() => {
                slog::info!(log, "'{name}' is already cloned");
                summary.present.push(name.to_owned());
            }
            Err(error) => {
                slog::error!(log, "{error}");
                summary.failed.push((name.to_owned(), error));
            }
        }
    }
}
