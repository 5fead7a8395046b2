//! Clone repositories to local disk.

use super::{Error, Result};
use git2::build::RepoBuilder;
use git2::{
    Cred, CredentialType, ErrorCode, FetchOptions, RemoteCallbacks,
    Repository,
};
use std::cell::Cell;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

/// Username GitHub accepts alongside a token for HTTPS git operations.
const TOKEN_USERNAME: &str = "x-access-token";

/// Clones repositories into subdirectories of a base path.
///
/// This is blocking; [`RemoteClient`](super::RemoteClient) runs it on the
/// blocking thread pool.
#[derive(Clone)]
pub struct Cloner {
    /// Directory that clone targets are created in.
    base: PathBuf,

    /// Token used to authenticate HTTPS clones.
    token: String,

    /// Abort a clone that takes longer than this.
    timeout: Duration,
}

impl Cloner {
    /// Create a new `Cloner`.
    pub fn new<P: Into<PathBuf>, S: Into<String>>(
        base: P,
        token: S,
        timeout: Duration,
    ) -> Self {
        Self { base: base.into(), token: token.into(), timeout }
    }

    /// The base path.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// How long a clone may take.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the clone target for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if `name` is not a single, normal path
    /// component (e.g. `..`, `a/b`, or the empty string).
    pub fn target(&self, name: &str) -> Result<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None)
                if !name.contains(['/', '\\']) =>
            {
                Ok(self.base.join(name))
            }
            _ => Err(Error::InvalidName(name.to_owned())),
        }
    }

    /// Clone `url` into `base/name`.
    ///
    /// Returns the path to the new working copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the target is already a clone of
    /// `url`; the existing clone is left untouched. Every other error is a
    /// genuine failure.
    pub fn clone_into(&self, name: &str, url: &str) -> Result<PathBuf> {
        let path = self.target(name)?;
        check_target(&path, url)?;

        fs::create_dir_all(&self.base).map_err(|source| Error::Io {
            path: self.base.clone(),
            source,
        })?;

        let deadline = Instant::now().checked_add(self.timeout);
        let timed_out = Cell::new(false);
        let credentials_tried = Cell::new(false);

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|_url, _username, allowed| {
            if credentials_tried.replace(true) {
                return Err(git2::Error::from_str(
                    "credentials were rejected",
                ));
            }
            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                Cred::userpass_plaintext(TOKEN_USERNAME, &self.token)
            } else {
                Cred::default()
            }
        });
        callbacks.transfer_progress(|_progress| {
            if deadline.is_some_and(|deadline| Instant::now() > deadline) {
                timed_out.set(true);
                false
            } else {
                true
            }
        });

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        let result =
            RepoBuilder::new().fetch_options(fetch_options).clone(url, &path);
        match result {
            Ok(_) => Ok(path),
            Err(_) if timed_out.get() => Err(Error::CloneTimedOut {
                name: name.to_owned(),
                timeout: self.timeout,
            }),
            Err(error) if error.code() == ErrorCode::Exists => {
                Err(Error::AlreadyExists { path })
            }
            Err(source) => {
                Err(Error::CloneFailure { name: name.to_owned(), source })
            }
        }
    }
}

impl fmt::Debug for Cloner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cloner")
            .field("base", &self.base)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Make sure the clone target is absent, empty, or already our clone.
///
/// # Errors
///
/// Returns [`Error::AlreadyExists`] if `path` is a repository whose
/// `origin` is `url`, or [`Error::TargetOccupied`] if it’s anything else
/// other than an empty directory.
fn check_target(path: &Path, url: &str) -> Result<()> {
    let occupied = || Error::TargetOccupied {
        path: path.to_owned(),
        url: url.to_owned(),
    };

    match fs::symlink_metadata(path) {
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok(());
        }
        Err(source) => {
            return Err(Error::Io { path: path.to_owned(), source });
        }
        Ok(metadata) if !metadata.is_dir() => return Err(occupied()),
        Ok(_) => {}
    }

    let mut entries = fs::read_dir(path)
        .map_err(|source| Error::Io { path: path.to_owned(), source })?;
    if entries.next().is_none() {
        return Ok(());
    }

    let Ok(repository) = Repository::open(path) else {
        return Err(occupied());
    };
    match repository.find_remote("origin") {
        Ok(remote) if remote.url() == Some(url) => {
            Err(Error::AlreadyExists { path: path.to_owned() })
        }
        _ => Err(occupied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{FsDirectory, Home};
    use assert2::assert;
    use testdir::testdir;

    /// Set up a home with an upstream repo, and a cloner into `home/backup`.
    fn fixture() -> (Home, String, Cloner) {
        let home = Home::init(testdir!());
        let upstream = home.upstream("upstream.git");
        let url = upstream.to_string_lossy().into_owned();
        let cloner =
            Cloner::new(home.join("backup"), "t0ken", Duration::MAX);
        (home, url, cloner)
    }

    #[test]
    fn clone_creates_target() {
        let (home, url, cloner) = fixture();

        let path = cloner.clone_into("thing", &url).unwrap();
        assert!(path == home.join("backup/thing"));
        assert!(fs::read_to_string(path.join("a")).unwrap() == "0a");
    }

    #[test]
    fn second_clone_is_already_exists() {
        let (home, url, cloner) = fixture();
        let path = cloner.clone_into("thing", &url).unwrap();
        let head = Repository::open(&path)
            .unwrap()
            .head()
            .unwrap()
            .target()
            .unwrap();
        home.write("backup/thing/local-change", "keep me");

        let error = cloner.clone_into("thing", &url).unwrap_err();
        assert!(let Error::AlreadyExists { .. } = &error);
        assert!(error.is_expected());

        let again = Repository::open(&path).unwrap();
        assert!(again.head().unwrap().target().unwrap() == head);
        assert!(
            fs::read_to_string(path.join("local-change")).unwrap()
                == "keep me"
        );
    }

    #[test]
    fn unreachable_url_is_failure() {
        let (home, _, cloner) = fixture();
        let missing =
            home.join("missing.git").to_string_lossy().into_owned();

        let error = cloner.clone_into("missing", &missing).unwrap_err();
        assert!(let Error::CloneFailure { .. } = &error);
        assert!(!error.is_expected());
    }

    #[test]
    fn unrelated_directory_is_occupied() {
        let (home, url, cloner) = fixture();
        home.write("backup/thing/notes.txt", "not a repo");

        assert!(
            let Err(Error::TargetOccupied { .. }) =
                cloner.clone_into("thing", &url)
        );
        assert!(
            fs::read_to_string(home.join("backup/thing/notes.txt")).unwrap()
                == "not a repo"
        );
    }

    #[test]
    fn clone_of_other_repo_is_occupied() {
        let (home, url, cloner) = fixture();
        let other = home.upstream("other.git");
        cloner.clone_into("thing", &other.to_string_lossy()).unwrap();

        assert!(
            let Err(Error::TargetOccupied { .. }) =
                cloner.clone_into("thing", &url)
        );
    }

    #[test]
    fn file_is_occupied() {
        let (home, url, cloner) = fixture();
        home.write("backup/thing", "file");

        assert!(
            let Err(Error::TargetOccupied { .. }) =
                cloner.clone_into("thing", &url)
        );
    }

    #[test]
    fn empty_directory_is_cloned_into() {
        let (home, url, cloner) = fixture();
        home.mkdir("backup/thing");

        assert!(let Ok(_) = cloner.clone_into("thing", &url));
        assert!(home.join("backup/thing/.git").is_dir());
    }

    #[test]
    fn unsafe_names_are_rejected() {
        let cloner = Cloner::new("/nonexistent", "t", Duration::MAX);
        for name in ["", ".", "..", "a/b", "../a", "/abs", "a\\b"] {
            assert!(let Err(Error::InvalidName(_)) = cloner.target(name));
        }
        assert!(
            cloner.target("ok.name").unwrap()
                == cloner.base().join("ok.name")
        );
    }
}
