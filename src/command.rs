//! Subcommand execution.
//!
//! Each subcommand has a `run` function holding its behaviour, taking its
//! collaborators as arguments, and an `execute` wrapper that wires those
//! collaborators from the command line, environment and config file and
//! prints the result.
use log::*;
use std::path::Path;

use crate::{
    cli::{Args, Command},
    config::{FileConfig, Settings},
    error::{ChangelogError, Result},
    git::repository_root,
    store::HttpChangelogStore,
};

pub mod generate;
pub mod publish;
pub mod records;

/// Run the parsed command line.
pub async fn execute(args: Args) -> Result<()> {
    let Args { repo, command, .. } = args;

    match command {
        Command::Generate(cmd) => generate::execute(&repo, cmd).await,
        Command::Publish(cmd) => publish::execute(&repo, cmd).await,
        Command::List(cmd) => records::execute_list(&repo, cmd).await,
        Command::Show(cmd) => records::execute_show(&repo, cmd).await,
        Command::Update(cmd) => records::execute_update(&repo, cmd).await,
        Command::Delete(cmd) => records::execute_delete(&repo, cmd).await,
    }
}

/// Load `changelog.toml` from the repository root, or from `path` itself
/// when it is not inside a repository.
async fn load_file_config(path: &Path) -> Result<FileConfig> {
    let root = match repository_root(path) {
        Ok(root) => root,
        Err(ChangelogError::NotARepository { .. }) => {
            debug!("{} is not a git repository", path.display());
            path.to_path_buf()
        }
        Err(err) => return Err(err),
    };

    FileConfig::load(&root).await
}

/// Settings from the process environment and config file, with the store
/// URL flag applied.
async fn load_settings(
    path: &Path,
    api_url: Option<&str>,
) -> Result<(FileConfig, Settings)> {
    let file_config = load_file_config(path).await?;
    let mut settings = Settings::from_env(&file_config)?;
    settings.override_store_url(api_url)?;
    Ok((file_config, settings))
}

fn store_for(settings: &Settings) -> Result<HttpChangelogStore> {
    HttpChangelogStore::new(&settings.store_url, settings.store_timeout)
}
