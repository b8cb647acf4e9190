//! Wire types exchanged with the changelog store.
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    changelog::{ChangeBucket, ChangelogDraft},
    git::CommitRange,
};

/// Page size used by the store when none is requested.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// A changelog as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogRecord {
    pub id: u64,
    pub version: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub changes: ChangeBucket,
    #[serde(default)]
    pub commit_range: Option<String>,
    pub project_name: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

/// Accept RFC 3339 timestamps as well as naive ISO timestamps, which are
/// taken as UTC.
fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChangelog {
    pub version: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub changes: ChangeBucket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_range: Option<String>,
    pub project_name: String,
}

impl NewChangelog {
    pub fn from_draft(
        draft: &ChangelogDraft,
        version: &str,
        range: Option<&CommitRange>,
        project_name: &str,
    ) -> Self {
        Self {
            version: version.to_string(),
            title: draft.title.clone(),
            summary: draft.summary.clone(),
            changes: draft.changes.clone(),
            commit_range: range.map(CommitRange::to_string),
            project_name: project_name.to_string(),
        }
    }
}

/// Partial update. Unset fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangelogUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<ChangeBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl ChangelogUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Filter and paging for list requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub project: Option<String>,
    pub limit: u32,
    pub skip: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            project: None,
            limit: DEFAULT_LIST_LIMIT,
            skip: 0,
        }
    }
}
