//! Single-slot cache holding the most recent generated changelog.
//!
//! The slot lives inside the repository's git directory so each repository
//! has its own pending changelog. Every generation overwrites it and a
//! successful publish clears it.
use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{
    changelog::ChangelogDraft,
    error::Result,
    git::{CommitRange, open_repository},
};

/// File name of the slot inside the git directory.
pub const PENDING_FILE: &str = "changelog-pending.json";

/// A generated changelog waiting to be published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChangelog {
    pub draft: ChangelogDraft,
    pub version: String,
    pub commit_range: Option<CommitRange>,
    pub project_name: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    /// Slot backed by an explicit file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Slot for the repository containing `path`.
    pub fn for_repo_path(path: &Path) -> Result<Self> {
        let repo = open_repository(path)?;
        Ok(Self::for_repository(&repo))
    }

    pub fn for_repository(repo: &git2::Repository) -> Self {
        Self::new(repo.path().join(PENDING_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the slot's contents.
    pub async fn store(&self, pending: &PendingChangelog) -> Result<()> {
        let content = serde_json::to_string_pretty(pending)?;
        debug!("writing pending changelog to {}", self.path.display());
        fs::write(&self.path, content).await?;
        Ok(())
    }

    pub async fn load(&self) -> Result<Option<PendingChangelog>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub async fn clear(&self) -> Result<()> {
        if fs::try_exists(&self.path).await? {
            debug!("clearing pending changelog at {}", self.path.display());
            fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{TestRepo, create_test_pending};
    use tempfile::TempDir;

    #[tokio::test]
    async fn empty_slot_loads_none() {
        let dir = TempDir::new().unwrap();
        let cache = SessionCache::new(dir.path().join(PENDING_FILE));

        assert!(cache.load().await.unwrap().is_none());
        cache.clear().await.unwrap();
    }

    #[tokio::test]
    async fn store_load_and_clear() {
        let dir = TempDir::new().unwrap();
        let cache = SessionCache::new(dir.path().join(PENDING_FILE));
        let pending = create_test_pending();

        cache.store(&pending).await.unwrap();
        assert_eq!(cache.load().await.unwrap(), Some(pending));

        cache.clear().await.unwrap();
        assert!(cache.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn newer_generation_overwrites_slot() {
        let dir = TempDir::new().unwrap();
        let cache = SessionCache::new(dir.path().join(PENDING_FILE));

        let first = create_test_pending();
        let mut second = create_test_pending();
        second.version = "v9.9.9".into();

        cache.store(&first).await.unwrap();
        cache.store(&second).await.unwrap();

        assert_eq!(cache.load().await.unwrap().unwrap().version, "v9.9.9");
    }

    #[test]
    fn slot_lives_in_git_dir() {
        let repo = TestRepo::new();
        let cache = SessionCache::for_repo_path(repo.path()).unwrap();

        assert!(cache.path().ends_with(".git/changelog-pending.json"));
    }

    #[tokio::test]
    async fn corrupt_slot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PENDING_FILE);
        std::fs::write(&path, "{not json").unwrap();

        let result = SessionCache::new(path).load().await;

        assert!(matches!(result, Err(crate::ChangelogError::JsonParseError(_))));
    }
}
