//! Run subcommands.

use crate::params::{Command, Params};
use ghbackup::config::Config;
use ghbackup::mirror;
use ghbackup::remote::RemoteClient;
use std::process::ExitCode;

/// Run the subcommand in `params`.
///
/// # Errors
///
/// Returns an error if configuration fails, if a call to the API fails, or
/// if output can’t be written. Individual clone failures during `backup` do
/// not produce an error; they produce [`ExitCode::FAILURE`].
#[tokio::main]
pub async fn run(
    params: &Params,
    log: &slog::Logger,
) -> anyhow::Result<ExitCode> {
    match &params.command {
        Command::Backup(backup_params) => {
            let (config, client) = connect(params, log)?;
            let selection = backup_params.selection(config.include_gists());
            let summary = mirror::run(&client, selection, log).await?;

            let message = format!(
                "{} cloned, {} already present, {} failed in {:?}\n",
                summary.cloned.len(),
                summary.present.len(),
                summary.failed.len(),
                client.clone_path(),
            );
            if summary.is_success() {
                params.success(message)?;
            } else {
                params.warn(message)?;
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Get(get_params) => {
            let (_, client) = connect(params, log)?;
            let repo = client
                .get_repository_by_name(&get_params.owner, &get_params.name)
                .await?;
            println!("{}", serde_json::to_string_pretty(&repo)?);
        }
        Command::List(list_params) => {
            let (_, client) = connect(params, log)?;
            let json = if list_params.gists {
                serde_json::to_string_pretty(&client.list_gists().await?)?
            } else {
                serde_json::to_string_pretty(
                    &client.list_repositories().await?,
                )?
            };
            println!("{json}");
        }
        Command::Version => {
            println!("{}", env!("GIT_VERSION"));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Load configuration and build the client.
///
/// # Errors
///
/// Returns an error if the configuration can’t be loaded, if there’s no
/// token, or if the client can’t be built.
fn connect(
    params: &Params,
    log: &slog::Logger,
) -> anyhow::Result<(Config, RemoteClient)> {
    let config = params.load_config()?;
    let settings = config.to_settings()?;
    slog::debug!(log, "Configured"; "settings" => ?settings);
    let client = RemoteClient::configure(&settings, log.clone())?;
    Ok((config, client))
}
