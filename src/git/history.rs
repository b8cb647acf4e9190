//! Extract the commits of one branch that fall inside a date window.
//!
//! The walk follows history from the branch tip, children before parents.
//! The window start is a hard fence: the first commit older than it ends the
//! walk, even if its ancestors carry timestamps back inside the window. The window end is only a
//! filter: commits newer than it are skipped and the walk continues.
use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone};
use derive_builder::Builder;
use git2::{BranchType, ErrorCode, Oid, Repository, Sort};
use log::*;
use std::path::{Path, PathBuf};

use crate::{
    error::{ChangelogError, Result},
    git::commit::{Commit, CommitRange, short_id},
};

/// Default number of days to look back when no start date is given.
pub const DEFAULT_DAYS: u32 = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parameters for a history extraction.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default, build_fn(private, name = "_build"))]
pub struct HistoryQuery {
    /// Any path inside the repository. Parents are searched.
    pub repo_path: PathBuf,
    /// Days to look back when `since` is not set.
    pub days: u32,
    /// Start date (`YYYY-MM-DD`), overrides `days`.
    pub since: Option<String>,
    /// End date (`YYYY-MM-DD`), defaults to now.
    pub until: Option<String>,
    /// Branch to read. Falls back to the checked-out branch when missing.
    pub branch: Option<String>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            days: DEFAULT_DAYS,
            since: None,
            until: None,
            branch: None,
        }
    }
}

impl HistoryQuery {
    pub fn builder() -> HistoryQueryBuilder {
        HistoryQueryBuilder::default()
    }
}

impl HistoryQueryBuilder {
    pub fn build(&self) -> Result<HistoryQuery> {
        self._build().map_err(|e| {
            ChangelogError::invalid_args(format!(
                "Failed to build history query: {}",
                e
            ))
        })
    }
}

/// Inclusive window bounds in seconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: i64,
    pub until: i64,
}

impl TimeWindow {
    /// Resolve the window relative to `now`. Explicit dates are taken as
    /// local midnight at the start of that day.
    pub fn resolve(
        days: u32,
        since: Option<&str>,
        until: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<Self> {
        let since = match since {
            Some(date) => start_of_day(date)?,
            None => (now - TimeDelta::days(i64::from(days))).timestamp(),
        };

        let until = match until {
            Some(date) => start_of_day(date)?,
            None => now.timestamp(),
        };

        Ok(Self { since, until })
    }
}

fn start_of_day(raw: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)?;
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|dt| dt.timestamp())
        .ok_or_else(|| {
            ChangelogError::invalid_args(format!(
                "{raw} has no local midnight"
            ))
        })
}

/// Commits extracted for one window, newest first.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Directory name of the repository's working tree.
    pub repo_name: String,
    /// Branch that was walked. `None` when the repository has no commits.
    pub branch: Option<String>,
    /// Set when the requested branch did not exist and the checked-out
    /// branch was walked instead.
    pub branch_fallback: bool,
    pub commits: Vec<Commit>,
    pub range: Option<CommitRange>,
}

impl History {
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Find the repository containing `path`, searching parent directories.
pub fn open_repository(path: &Path) -> Result<Repository> {
    Repository::discover(path).map_err(|err| match err.code() {
        ErrorCode::NotFound => ChangelogError::NotARepository {
            path: path.display().to_string(),
        },
        _ => err.into(),
    })
}

/// Working tree root (or git dir for bare repositories) containing `path`.
pub fn repository_root(path: &Path) -> Result<PathBuf> {
    let repo = open_repository(path)?;
    Ok(repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf())
}

fn repository_name(repo: &Repository) -> String {
    repo.workdir()
        .unwrap_or_else(|| repo.path())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repository".to_string())
}

/// Extract commits relative to the current local time.
pub fn extract(query: &HistoryQuery) -> Result<History> {
    extract_at(query, Local::now())
}

/// Extract commits with the window resolved against `now`.
pub fn extract_at(
    query: &HistoryQuery,
    now: DateTime<Local>,
) -> Result<History> {
    let repo = open_repository(&query.repo_path)?;
    let repo_name = repository_name(&repo);

    let window = TimeWindow::resolve(
        query.days,
        query.since.as_deref(),
        query.until.as_deref(),
        now,
    )?;

    debug!(
        "{repo_name}: extracting commits between {} and {}",
        window.since, window.until
    );

    let Some(branch) = resolve_branch(&repo, query.branch.as_deref())? else {
        return Ok(History {
            repo_name,
            ..History::default()
        });
    };

    let commits = walk(&repo, branch.tip, &window)?;
    let range = CommitRange::from_emitted(&commits);

    info!(
        "{repo_name}: found {} commits on branch {}",
        commits.len(),
        branch.name
    );

    Ok(History {
        repo_name,
        branch: Some(branch.name),
        branch_fallback: branch.fallback,
        commits,
        range,
    })
}

struct ResolvedBranch {
    name: String,
    tip: Oid,
    fallback: bool,
}

fn resolve_branch(
    repo: &Repository,
    requested: Option<&str>,
) -> Result<Option<ResolvedBranch>> {
    if let Some(name) = requested {
        for kind in [BranchType::Local, BranchType::Remote] {
            if let Ok(branch) = repo.find_branch(name, kind) {
                let tip = branch.get().peel_to_commit()?.id();
                return Ok(Some(ResolvedBranch {
                    name: name.to_string(),
                    tip,
                    fallback: false,
                }));
            }
        }
    }

    let head = match repo.head() {
        Ok(head) => head,
        Err(err) if err.code() == ErrorCode::UnbornBranch => {
            warn!("repository has no commits yet");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let name = head.shorthand().unwrap_or("HEAD").to_string();

    if let Some(requested) = requested {
        warn!(
            "branch '{requested}' not found: falling back to current branch '{name}'"
        );
    }

    let tip = head.peel_to_commit()?.id();

    Ok(Some(ResolvedBranch {
        name,
        tip,
        fallback: requested.is_some(),
    }))
}

fn walk(
    repo: &Repository,
    tip: Oid,
    window: &TimeWindow,
) -> Result<Vec<Commit>> {
    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL)?;
    revwalk.push(tip)?;

    let mut commits = vec![];

    for oid in revwalk {
        let commit = repo.find_commit(oid?)?;
        let timestamp = commit.time().seconds();

        if timestamp < window.since {
            debug!(
                "commit {} is older than the window: stopping",
                short_id(&commit.id().to_string())
            );
            break;
        }

        if timestamp > window.until {
            debug!(
                "commit {} is newer than the window: skipping",
                short_id(&commit.id().to_string())
            );
            continue;
        }

        commits.push(read_commit(repo, &commit)?);
    }

    Ok(commits)
}

fn read_commit(repo: &Repository, commit: &git2::Commit) -> Result<Commit> {
    let id = commit.id().to_string();
    let author = commit.author();

    Ok(Commit {
        short_id: short_id(&id),
        id,
        message: String::from_utf8_lossy(commit.message_bytes())
            .trim()
            .to_string(),
        author_name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
        author_email: String::from_utf8_lossy(author.email_bytes())
            .into_owned(),
        timestamp: commit.time().seconds(),
        files: changed_files(repo, commit)?,
    })
}

/// Paths touched relative to the first parent. libgit2 has no direct API
/// for this so the full tree diff is computed.
fn changed_files(
    repo: &Repository,
    commit: &git2::Commit,
) -> Result<Vec<String>> {
    if commit.parent_count() == 0 {
        return Ok(vec![]);
    }

    let parent = commit.parent(0)?;
    let diff = repo.diff_tree_to_tree(
        Some(&parent.tree()?),
        Some(&commit.tree()?),
        None,
    )?;

    Ok(diff
        .deltas()
        .filter_map(|delta| {
            delta
                .old_file()
                .path()
                .or_else(|| delta.new_file().path())
                .map(|path| path.display().to_string())
        })
        .collect())
}
