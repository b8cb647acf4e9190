//! Command line interface definition.
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Default number of changelogs shown by `list`.
pub const DEFAULT_SHOWN: u32 = 5;

/// Generate user-facing changelogs from git history and publish them.
#[derive(Parser, Debug)]
#[command(name = "changelog", version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = ".", global = true)]
    /// Path inside the git repository to work on.
    pub repo: PathBuf,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a changelog from recent commits.
    Generate(GenerateArgs),

    /// Publish the last generated changelog.
    Publish(PublishArgs),

    /// List published changelogs, newest first.
    List(ListArgs),

    /// Show a single changelog.
    Show(ShowArgs),

    /// Update fields of a published changelog.
    Update(UpdateArgs),

    /// Delete a changelog.
    Delete(DeleteArgs),
}

#[derive(ClapArgs, Debug, Default, Clone)]
pub struct GenerateArgs {
    #[arg(short, long)]
    /// Days of history to include (default: 7, or `days` in changelog.toml).
    pub days: Option<u32>,

    #[arg(long)]
    /// Start date (YYYY-MM-DD). Overrides --days.
    pub since: Option<String>,

    #[arg(long)]
    /// End date (YYYY-MM-DD). Defaults to now.
    pub until: Option<String>,

    #[arg(short, long)]
    /// Branch to read. Falls back to the current branch when missing.
    pub branch: Option<String>,

    #[arg(short = 'v', long = "version")]
    /// Version for this changelog. Suggested from commits when omitted.
    pub release_version: Option<String>,

    #[arg(short, long)]
    /// Project name used when publishing (default: repository name).
    pub project: Option<String>,

    #[arg(long)]
    /// Gemini API key. Falls back to GEMINI_API_KEY env var.
    pub api_key: Option<String>,

    #[arg(long)]
    /// Changelog API URL. Falls back to CHANGELOG_API_URL env var.
    pub api_url: Option<String>,

    #[arg(long, default_value_t = false)]
    /// Publish the generated changelog immediately.
    pub publish: bool,

    #[arg(long, default_value_t = false)]
    /// List the commits that would be used without calling the AI.
    pub dry_run: bool,

    #[arg(short, long)]
    /// Also write the generated changelog to this file as JSON.
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Default, Clone)]
pub struct PublishArgs {
    #[arg(short = 'v', long = "version")]
    /// Version to publish under (default: the generated version).
    pub release_version: Option<String>,

    #[arg(short, long)]
    /// Project name (default: the generated project).
    pub project: Option<String>,

    #[arg(long)]
    /// Changelog API URL. Falls back to CHANGELOG_API_URL env var.
    pub api_url: Option<String>,

    #[arg(long, default_value_t = false)]
    /// Publish even if generation did not complete cleanly.
    pub force: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    #[arg(short, long)]
    /// Only show changelogs for this project.
    pub project: Option<String>,

    #[arg(short, long, default_value_t = DEFAULT_SHOWN, value_parser = clap::value_parser!(u32).range(1..))]
    /// Number of changelogs to show.
    pub limit: u32,

    #[arg(long, default_value_t = 0)]
    /// Number of changelogs to skip.
    pub skip: u32,

    #[arg(long)]
    /// Changelog API URL. Falls back to CHANGELOG_API_URL env var.
    pub api_url: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ShowArgs {
    /// Changelog id.
    pub id: u64,

    #[arg(long)]
    /// Changelog API URL. Falls back to CHANGELOG_API_URL env var.
    pub api_url: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct UpdateArgs {
    /// Changelog id.
    pub id: u64,

    #[arg(short = 'v', long = "version")]
    /// New version.
    pub release_version: Option<String>,

    #[arg(long)]
    /// New title.
    pub title: Option<String>,

    #[arg(long)]
    /// New summary.
    pub summary: Option<String>,

    #[arg(long)]
    /// Publish (true) or unpublish (false) the changelog.
    pub published: Option<bool>,

    #[arg(long)]
    /// Changelog API URL. Falls back to CHANGELOG_API_URL env var.
    pub api_url: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DeleteArgs {
    /// Changelog id.
    pub id: u64,

    #[arg(long)]
    /// Changelog API URL. Falls back to CHANGELOG_API_URL env var.
    pub api_url: Option<String>,
}
