//! Local git history access.
//!
//! Discovers the repository that contains a path, resolves the branch to
//! read, and walks its commits inside a date window.

/// Commit and commit-range types produced by the extractor.
pub mod commit;

/// Date-window history extraction over a git2 revwalk.
pub mod history;

pub use commit::{Commit, CommitRange};
pub use history::{
    DEFAULT_DAYS, History, HistoryQuery, HistoryQueryBuilder, TimeWindow,
    extract, extract_at, open_repository, repository_root,
};
