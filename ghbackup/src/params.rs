//! Code to deal with executable parameters.

use ghbackup::config::{self, Config};
use ghbackup::mirror::Selection;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

pub use clap::Parser;

/// Back up your GitHub repositories and gists
#[derive(Debug, clap::Parser)]
#[clap(version, about)]
pub struct Params {
    /// Whether or not to output in color
    #[clap(long, default_value = "auto", value_name = "WHEN", global = true)]
    pub color: ColorChoice,

    /// Verbosity (may be repeated up to three times)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Number of items to request per page (1 to 100)
    #[arg(long, value_name = "N", global = true)]
    pub per_page: Option<u8>,

    /// Retrieve every page of results instead of just the first
    #[arg(long, global = true)]
    pub all_pages: bool,

    /// Directory to clone into
    #[arg(long, value_name = "DIR", global = true)]
    pub clone_path: Option<PathBuf>,

    /// Base URL of the GitHub API
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Timeout in seconds for each API call and each clone
    #[arg(long, value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Clone every repository and gist that isn’t already backed up
    Backup(BackupParams),
    /// Show a single repository as JSON
    Get(GetParams),
    /// List repositories (or gists) as JSON
    List(ListParams),
    /// Output the version
    Version,
}

/// Parameters for the `backup` subcommand
#[derive(Debug, clap::Args)]
pub struct BackupParams {
    /// Don’t back up repositories
    #[arg(long)]
    pub no_repos: bool,

    /// Don’t back up gists
    #[arg(long)]
    pub no_gists: bool,
}

/// Parameters for the `get` subcommand
#[derive(Debug, clap::Args)]
pub struct GetParams {
    /// Owner of the repository
    pub owner: String,

    /// Name of the repository
    pub name: String,
}

/// Parameters for the `list` subcommand
#[derive(Debug, clap::Args)]
pub struct ListParams {
    /// List gists instead of repositories
    #[arg(long)]
    pub gists: bool,
}

impl Params {
    /// Load the configuration file (if any) and apply flags on top of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file can’t be read or parsed.
    pub fn load_config(&self) -> config::Result<Config> {
        let file = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Ok(file.merge(self.flag_config()))
    }

    /// Configuration specified by flags and environment.
    fn flag_config(&self) -> Config {
        Config {
            github_token: self.token.clone(),
            per_page: self.per_page,
            clone_path: self.clone_path.clone(),
            api_url: self.api_url.clone(),
            timeout: self.timeout,
            all_pages: self.all_pages.then_some(true),
            gists: match &self.command {
                Command::Backup(backup) if backup.no_gists => Some(false),
                _ => None,
            },
        }
    }

    /// Print a warning message in error color to `err_stream()`.
    pub fn warn<S: AsRef<str>>(&self, message: S) -> io::Result<()> {
        let mut err_out = self.err_stream();
        err_out.set_color(&error_color())?;
        err_out.write_all(message.as_ref().as_bytes())?;
        err_out.reset()?;

        Ok(())
    }

    /// Print a message in success color to `out_stream()`.
    pub fn success<S: AsRef<str>>(&self, message: S) -> io::Result<()> {
        let mut out = self.out_stream();
        out.set_color(&success_color())?;
        out.write_all(message.as_ref().as_bytes())?;
        out.reset()?;

        Ok(())
    }

    /// Get stream to use for standard output.
    pub fn out_stream(&self) -> StandardStream {
        StandardStream::stdout(self.color_choice(&io::stdout()))
    }

    /// Get stream to use for errors.
    pub fn err_stream(&self) -> StandardStream {
        StandardStream::stderr(self.color_choice(&io::stderr()))
    }

    /// Whether or not to output on a stream in color.
    ///
    /// Checks if passed stream is a terminal.
    pub fn color_choice<T: IsTerminal>(
        &self,
        stream: &T,
    ) -> termcolor::ColorChoice {
        if self.color == ColorChoice::Auto && !stream.is_terminal() {
            termcolor::ColorChoice::Never
        } else {
            self.color.into()
        }
    }
}

impl BackupParams {
    /// What to back up, given whether the configuration includes gists.
    pub const fn selection(&self, include_gists: bool) -> Selection {
        Selection {
            repositories: !self.no_repos,
            gists: include_gists && !self.no_gists,
        }
    }
}

/// Whether or not to output in color
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Output in color when running in a terminal that supports it
    #[default]
    Auto,

    /// Always output in color
    Always,

    /// Never output in color
    Never,
}

impl From<ColorChoice> for termcolor::ColorChoice {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Auto => Self::Auto,
            ColorChoice::Always => Self::Always,
            ColorChoice::Never => Self::Never,
        }
    }
}

/// Returns color used to output errors.
pub fn error_color() -> ColorSpec {
    let mut color = ColorSpec::new();
    color.set_fg(Some(Color::Red));
    color.set_intense(true);
    color
}

/// Returns color used to output a successful summary.
pub fn success_color() -> ColorSpec {
    let mut color = ColorSpec::new();
    color.set_fg(Some(Color::Blue));
    color.set_bold(true);
    color
}
