//! Traits for changelog persistence
use async_trait::async_trait;

use crate::{
    error::Result,
    store::types::{ChangelogRecord, ChangelogUpdate, ListQuery, NewChangelog},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangelogStore: Send + Sync {
    /// Persist a new changelog and return it with its assigned id.
    async fn create(&self, changelog: NewChangelog) -> Result<ChangelogRecord>;
    /// Published changelogs, newest first.
    async fn list(&self, query: ListQuery) -> Result<Vec<ChangelogRecord>>;
    async fn get(&self, id: u64) -> Result<Option<ChangelogRecord>>;
    async fn update(
        &self,
        id: u64,
        update: ChangelogUpdate,
    ) -> Result<ChangelogRecord>;
    async fn delete(&self, id: u64) -> Result<()>;
}
