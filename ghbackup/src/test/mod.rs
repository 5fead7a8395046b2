//! Test helpers for unit tests

use bstr::ByteSlice;
use duct::cmd;
use serde_json::json;
use std::ffi::OsString;
use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};

/// Convenience functions for working with directory-like things.
pub trait FsDirectory {
    /// Get the path to this directory.
    #[must_use]
    fn path(&self) -> &Path;

    /// Join a path to this.
    ///
    /// Equivalent to `dir.path().join(...)`.
    #[must_use]
    #[inline]
    fn join<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.path().join(path)
    }

    /// Make a subdirectory.
    ///
    /// Creates all parent directories if necessary.
    fn mkdir<P: AsRef<Path>>(&self, path: P) {
        fs::create_dir_all(self.join(path)).unwrap();
    }

    /// Write a file.
    ///
    /// Creates all parent directories if necessary.
    fn write<P: AsRef<Path>>(&self, path: P, content: &str) {
        let path = self.join(path);
        self.mkdir(path.parent().unwrap());
        fs::write(path, content).unwrap();
    }
}

/// The home directory for `git` operations.
#[derive(Debug)]
pub struct Home(PathBuf);

impl FsDirectory for Home {
    /// Get the path to the home directory.
    fn path(&self) -> &Path {
        &self.0
    }
}

impl Home {
    /// Create a `Home` for an existing directory.
    pub fn existing<P: Into<PathBuf>>(path: P) -> Self {
        Self(path.into())
    }

    /// Create a new home directory with a `.gitconfig`.
    ///
    /// `user.name` and `user.email` must be set for commits to work in CI.
    /// `init.defaultBranch` is set so that every upstream has a `main`.
    ///
    /// # Panics
    ///
    /// Panics if it can’t write `{path}/.gitconfig`.
    pub fn init<P: Into<PathBuf>>(path: P) -> Self {
        let home = Self::existing(path);
        home.write(
            ".gitconfig",
            "[user]\n\
            name = Name\n\
            email = name@example.com\n\
            [init]\n\
            defaultBranch = main\n\
            [advice]\n\
            detachedHead = false\n",
        );
        home
    }

    /// Run `git` in the `cwd` directory and panic on errors.
    ///
    /// Prints `git` command line and working directory to stdout. If the
    /// command is successful, it prints its output, too.
    ///
    /// # Panics
    ///
    /// Panics if the process fails, or if there was an actual IO error.
    pub fn git<P, I, S>(&self, cwd: P, args: I)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let shell_args =
            shell_words::join(args.iter().map(|arg| arg.to_string_lossy()));

        println!("`git {shell_args}` in {:?}", self.join(&cwd));
        let output = run_git(&self.0, cwd, args).run().unwrap();
        print!("{}", output.stdout.as_bstr());
    }

    /// Create a bare repository with one commit on `main` to clone from.
    ///
    /// Returns the path to the bare repository, which works as a clone URL.
    ///
    /// # Panics
    ///
    /// Panics if there was a problem creating the repository.
    pub fn upstream<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let bare = self.join(path);
        let work = bare.with_extension("work");

        self.git(&self.0, [o("init"), o("--bare"), o(&bare)]);
        self.git(&self.0, [o("clone"), o(&bare), o(&work)]);

        fs::write(work.join("a"), "0a").unwrap();
        fs::write(work.join("b"), "0b").unwrap();
        self.git(&work, ["add", "a", "b"]);
        self.git(&work, ["commit", "-m", "commit 0"]);
        self.git(&work, ["push", "origin", "main"]);

        bare
    }
}

/// Convert something to an [`OsString`].
pub fn o<S: Into<OsString>>(input: S) -> OsString {
    input.into()
}

/// Set up a call to `git` in the `cwd` directory.
///
/// If `cwd` is relative, it will be interpreted in the context of `home`.
/// `home` should contain a `.gitconfig` file.
pub fn run_git<PH, PC, I, S>(home: PH, cwd: PC, args: I) -> duct::Expression
where
    PH: AsRef<Path>,
    PC: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let home: &Path = home.as_ref();
    cmd("git", args)
        .dir(home.join(cwd))
        .env("HOME", home)
        .env("GIT_CONFIG_GLOBAL", home.join(".gitconfig"))
        .env("GIT_CONFIG_SYSTEM", "/dev/null")
        .stderr_to_stdout()
        .stdout_capture()
}

/// A server that accepts connections but never answers.
///
/// Connections wait in the listen backlog until the listener is dropped,
/// which resets them. Returns the listener and its `http://` URL.
pub fn silent_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    (listener, url)
}

/// A logger that throws everything away.
pub fn discard_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

/// JSON for a list of repositories with the given names.
pub fn repos_json(names: &[&str]) -> String {
    let repos: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(id, name)| {
            json!({
                "id": id,
                "name": name,
                "full_name": format!("someone/{name}"),
                "clone_url": format!("https://github.com/someone/{name}.git"),
            })
        })
        .collect();
    serde_json::to_string(&repos).unwrap()
}

/// JSON for a list of gists with the given IDs.
pub fn gists_json(ids: &[&str]) -> String {
    let gists: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "git_pull_url": format!("https://gist.github.com/{id}.git"),
                "public": true,
            })
        })
        .collect();
    serde_json::to_string(&gists).unwrap()
}
