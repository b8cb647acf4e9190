//! Changelog draft model and schema repair of generated payloads.
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{ChangelogError, Result};

/// Title used when the model omits one.
pub const DEFAULT_TITLE: &str = "Changelog Update";

/// Title carried by every degraded draft.
pub const ERROR_TITLE: &str = "Changelog Generation Error";

const RAW_RESPONSE_PREVIEW: usize = 500;

/// Display order and headings used when rendering a draft.
const SECTIONS: [(Category, &str); 4] = [
    (Category::Features, "New Features"),
    (Category::Improvements, "Improvements"),
    (Category::Bugfixes, "Bug Fixes"),
    (Category::Breaking, "Breaking Changes"),
];

/// The only categories a change may be filed under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Features,
    Bugfixes,
    Improvements,
    Breaking,
}

/// Change descriptions grouped by category. Every category is always
/// present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeBucket {
    pub features: Vec<String>,
    pub bugfixes: Vec<String>,
    pub improvements: Vec<String>,
    pub breaking: Vec<String>,
}

impl ChangeBucket {
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Features => &self.features,
            Category::Bugfixes => &self.bugfixes,
            Category::Improvements => &self.improvements,
            Category::Breaking => &self.breaking,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Features => &mut self.features,
            Category::Bugfixes => &mut self.bugfixes,
            Category::Improvements => &mut self.improvements,
            Category::Breaking => &mut self.breaking,
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::iter().all(|category| self.get(category).is_empty())
    }

    /// Total number of entries across all categories.
    pub fn len(&self) -> usize {
        Category::iter().map(|category| self.get(category).len()).sum()
    }

    /// Coerce an arbitrary decoded value into a bucket. Missing categories
    /// become empty lists; unknown categories, non-list values and
    /// non-string items are dropped with a warning.
    pub fn repair(value: &Value) -> Self {
        let mut bucket = Self::default();

        let Some(map) = value.as_object() else {
            if !value.is_null() {
                warn!("discarding non-object changes payload: {value}");
            }
            return bucket;
        };

        for (key, items) in map {
            let Ok(category) = Category::from_str(key) else {
                warn!("dropping unknown change category '{key}'");
                continue;
            };

            let Some(items) = items.as_array() else {
                warn!("dropping non-list value for category '{key}'");
                continue;
            };

            for item in items {
                match item.as_str() {
                    Some(text) => bucket.get_mut(category).push(text.to_string()),
                    None => {
                        warn!("dropping non-string entry in '{key}': {item}")
                    }
                }
            }
        }

        bucket
    }
}

/// Changelog content produced by synthesis, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub changes: ChangeBucket,
    /// Diagnostic set only when generation or parsing failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChangelogDraft {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// Build a draft from a decoded model response.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(map) = value.as_object() else {
            return Err(ChangelogError::Other(color_eyre::eyre::eyre!(
                "expected a JSON object, found: {value}"
            )));
        };

        let title = map
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TITLE)
            .to_string();

        let summary = map
            .get("summary")
            .and_then(Value::as_str)
            .map(str::to_string);

        let changes = map
            .get("changes")
            .map(ChangeBucket::repair)
            .unwrap_or_default();

        Ok(Self {
            title,
            summary,
            changes,
            error: None,
        })
    }

    /// Degraded draft for a response that could not be parsed.
    pub fn malformed(error: impl Into<String>, raw: &str) -> Self {
        let preview: String = raw.chars().take(RAW_RESPONSE_PREVIEW).collect();
        Self {
            title: ERROR_TITLE.to_string(),
            summary: Some("Failed to parse AI response".to_string()),
            changes: ChangeBucket {
                improvements: vec![format!("Raw response: {preview}")],
                ..ChangeBucket::default()
            },
            error: Some(error.into()),
        }
    }

    /// Plain text rendering for the terminal. Empty sections are omitted.
    pub fn render(&self, version: &str) -> String {
        let mut out = format!("{} ({version})\n", self.title);

        if let Some(summary) = &self.summary {
            out.push_str(&format!("\n{summary}\n"));
        }

        for (category, heading) in SECTIONS {
            let items = self.changes.get(category);

            if items.is_empty() {
                continue;
            }

            out.push_str(&format!("\n{heading}\n"));

            for item in items {
                out.push_str(&format!("  - {item}\n"));
            }
        }

        out
    }

    /// Degraded draft for a generation call that failed outright.
    pub fn backend_failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            title: ERROR_TITLE.to_string(),
            summary: Some(format!("AI generation failed: {message}")),
            changes: ChangeBucket::default(),
            error: Some(message),
        }
    }
}
