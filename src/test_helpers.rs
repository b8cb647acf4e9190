//! Common test helper functions shared across test modules.
//!
//! Provides fixtures for commits, drafts and store records, plus a
//! throwaway git repository with commits at chosen timestamps.
use chrono::{Local, NaiveDate, TimeZone, Utc};
use git2::{Repository, Signature, Time};
use std::{fs, path::Path};
use tempfile::TempDir;

use crate::{
    changelog::{ChangeBucket, ChangelogDraft},
    git::Commit,
    session::PendingChangelog,
    store::ChangelogRecord,
};

/// Creates a commit with the given short id, message and changed files.
pub fn create_test_commit(
    short_id: &str,
    message: &str,
    files: &[&str],
) -> Commit {
    Commit {
        id: format!("{short_id:0<40}"),
        short_id: short_id.to_string(),
        message: message.to_string(),
        author_name: "Test Author".to_string(),
        author_email: "test@example.com".to_string(),
        timestamp: 1_700_000_000,
        files: files.iter().map(|f| f.to_string()).collect(),
    }
}

/// Creates a clean draft with one feature and one fix.
pub fn create_test_draft() -> ChangelogDraft {
    ChangelogDraft {
        title: "Smoother Sign-in".to_string(),
        summary: Some("Sign-in is faster and more reliable.".to_string()),
        changes: ChangeBucket {
            features: vec!["Added single sign-on".to_string()],
            bugfixes: vec!["Fixed sessions expiring early".to_string()],
            ..ChangeBucket::default()
        },
        error: None,
    }
}

/// Creates a pending changelog wrapping [`create_test_draft`].
pub fn create_test_pending() -> PendingChangelog {
    PendingChangelog {
        draft: create_test_draft(),
        version: "v1.1.0".to_string(),
        commit_range: None,
        project_name: "app".to_string(),
        generated_at: Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap(),
    }
}

/// Creates a published record created on 2024-03-07.
pub fn create_test_record(id: u64, project: &str) -> ChangelogRecord {
    let draft = create_test_draft();
    ChangelogRecord {
        id,
        version: "v1.1.0".to_string(),
        title: draft.title,
        summary: draft.summary,
        changes: draft.changes,
        commit_range: Some("aaaaaaa..ccccccc".to_string()),
        project_name: project.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 7, 10, 15, 30).unwrap(),
        published: true,
    }
}

/// Seconds since the epoch of `hour`:00 local time on `date` (YYYY-MM-DD).
pub fn local_timestamp(date: &str, hour: u32) -> i64 {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    Local
        .from_local_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
        .earliest()
        .unwrap()
        .timestamp()
}

/// A git repository in a temporary directory.
pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `files` and commit them on HEAD with author and committer
    /// time set to `timestamp`. Returns the full commit id.
    pub fn commit_at(
        &self,
        message: &str,
        files: &[&str],
        timestamp: i64,
    ) -> String {
        let mut index = self.repo.index().unwrap();

        for file in files {
            let path = self.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, format!("{message}\n{timestamp}\n")).unwrap();
            index.add_path(Path::new(file)).unwrap();
        }

        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let signature = Signature::new(
            "Test Author",
            "test@example.com",
            &Time::new(timestamp, 0),
        )
        .unwrap();

        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents = parent.iter().collect::<Vec<_>>();

        self.repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parents,
            )
            .unwrap()
            .to_string()
    }

    /// Create a local branch at HEAD without checking it out.
    pub fn create_branch(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.branch(name, &head, false).unwrap();
    }

    /// Create a remote-tracking ref `refs/remotes/<remote>/<name>` at HEAD.
    pub fn create_remote_branch(&self, remote: &str, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo
            .reference(
                &format!("refs/remotes/{remote}/{name}"),
                head.id(),
                false,
                "test remote branch",
            )
            .unwrap();
    }

    /// Short name of the checked-out branch.
    pub fn current_branch(&self) -> String {
        self.repo.head().unwrap().shorthand().unwrap().to_string()
    }
}
