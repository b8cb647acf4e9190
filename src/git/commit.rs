use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of hex characters kept in a short commit id.
pub const SHORT_ID_LEN: usize = 7;

/// A commit read from local history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub id: String,
    pub short_id: String,
    /// Full commit message with surrounding whitespace trimmed.
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    /// Committer time in seconds since the epoch.
    pub timestamp: i64,
    /// Paths changed relative to the first parent. Empty for root commits.
    pub files: Vec<String>,
}

impl Commit {
    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// Abbreviate a full hash to [`SHORT_ID_LEN`] characters.
pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

/// Oldest and newest short ids bounding an extracted window, rendered as
/// `<oldest>..<newest>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRange {
    pub oldest: String,
    pub newest: String,
}

impl CommitRange {
    /// Build the range from commits in emission order (newest first).
    pub fn from_emitted(commits: &[Commit]) -> Option<Self> {
        let newest = commits.first()?;
        let oldest = commits.last()?;
        Some(Self {
            oldest: oldest.short_id.clone(),
            newest: newest.short_id.clone(),
        })
    }
}

impl fmt::Display for CommitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.oldest, self.newest)
    }
}
