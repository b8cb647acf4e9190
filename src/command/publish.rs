//! The `publish` command.
use log::*;
use std::path::Path;

use crate::{
    cli::PublishArgs,
    command::{load_settings, store_for},
    error::{ChangelogError, Result},
    session::{PendingChangelog, SessionCache},
    store::{ChangelogRecord, ChangelogStore, NewChangelog},
    version::suggest_version,
};

/// Overrides applied to the pending changelog when publishing.
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    pub version: Option<String>,
    pub project_name: Option<String>,
    /// Publish a degraded draft anyway.
    pub force: bool,
}

/// Publish the changelog waiting in `session` and clear the slot.
pub async fn run(
    request: &PublishRequest,
    session: &SessionCache,
    store: &dyn ChangelogStore,
) -> Result<ChangelogRecord> {
    let pending = session
        .load()
        .await?
        .ok_or(ChangelogError::NoPendingChangelog)?;

    publish_pending(request, session, store, pending).await
}

/// Publish an already loaded pending changelog. The slot is cleared only
/// once the store has accepted it.
pub async fn publish_pending(
    request: &PublishRequest,
    session: &SessionCache,
    store: &dyn ChangelogStore,
    pending: PendingChangelog,
) -> Result<ChangelogRecord> {
    if let Some(error) = &pending.draft.error
        && !request.force
    {
        return Err(ChangelogError::DegradedDraft(error.clone()));
    }

    let version = Some(
        request
            .version
            .clone()
            .unwrap_or_else(|| pending.version.clone()),
    )
    .filter(|version| !version.is_empty())
    .unwrap_or_else(|| suggest_version(&[], None));

    let project_name = request
        .project_name
        .clone()
        .unwrap_or_else(|| pending.project_name.clone());

    let body = NewChangelog::from_draft(
        &pending.draft,
        &version,
        pending.commit_range.as_ref(),
        &project_name,
    );

    let record = store.create(body).await?;

    session.clear().await?;

    Ok(record)
}

pub async fn execute(repo: &Path, args: PublishArgs) -> Result<()> {
    let (_, settings) = load_settings(repo, args.api_url.as_deref()).await?;
    let session = SessionCache::for_repo_path(repo)?;
    let store = store_for(&settings)?;

    let request = PublishRequest {
        version: args.release_version,
        project_name: args.project,
        force: args.force,
    };

    info!("publishing changelog to {}", settings.store_url);

    let record = run(&request, &session, &store).await?;

    println!(
        "Published! Changelog ID: {} ({} for {})",
        record.id, record.version, record.project_name
    );

    Ok(())
}
