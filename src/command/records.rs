//! The `list`, `show`, `update` and `delete` commands.
use std::path::Path;

use crate::{
    cli::{DeleteArgs, ListArgs, ShowArgs, UpdateArgs},
    command::{load_settings, store_for},
    error::{ChangelogError, Result},
    store::{ChangelogRecord, ChangelogStore, ChangelogUpdate, ListQuery},
};

const TITLE_WIDTH: usize = 40;

/// Fetch a record, treating absence as an error.
pub async fn show(
    store: &dyn ChangelogStore,
    id: u64,
) -> Result<ChangelogRecord> {
    store.get(id).await?.ok_or(ChangelogError::NotFound(id))
}

/// Apply a partial update. An update with no fields set is rejected
/// before contacting the store.
pub async fn update(
    store: &dyn ChangelogStore,
    id: u64,
    update: ChangelogUpdate,
) -> Result<ChangelogRecord> {
    if update.is_empty() {
        return Err(ChangelogError::invalid_args(
            "nothing to update: pass --version, --title, --summary or --published",
        ));
    }

    store.update(id, update).await
}

/// One line per record: id, version, title and creation date.
pub fn render_table(records: &[ChangelogRecord]) -> String {
    let mut lines = vec![format!(
        "{:<6} {:<14} {:<width$} {}",
        "ID",
        "VERSION",
        "TITLE",
        "DATE",
        width = TITLE_WIDTH
    )];

    for record in records {
        let title: String = record.title.chars().take(TITLE_WIDTH).collect();
        lines.push(format!(
            "{:<6} {:<14} {:<width$} {}",
            record.id,
            record.version,
            title,
            record.created_at.format("%Y-%m-%d"),
            width = TITLE_WIDTH
        ));
    }

    lines.join("\n")
}

pub async fn execute_list(repo: &Path, args: ListArgs) -> Result<()> {
    let (_, settings) = load_settings(repo, args.api_url.as_deref()).await?;
    let store = store_for(&settings)?;

    let records = store
        .list(ListQuery {
            project: args.project,
            limit: args.limit,
            skip: args.skip,
        })
        .await?;

    if records.is_empty() {
        println!("No changelogs found.");
        return Ok(());
    }

    println!("{}", render_table(&records));

    Ok(())
}

pub async fn execute_show(repo: &Path, args: ShowArgs) -> Result<()> {
    let (_, settings) = load_settings(repo, args.api_url.as_deref()).await?;
    let store = store_for(&settings)?;

    let record = show(&store, args.id).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}

pub async fn execute_update(repo: &Path, args: UpdateArgs) -> Result<()> {
    let (_, settings) = load_settings(repo, args.api_url.as_deref()).await?;
    let store = store_for(&settings)?;

    let changes = ChangelogUpdate {
        version: args.release_version,
        title: args.title,
        summary: args.summary,
        changes: None,
        published: args.published,
    };

    let record = update(&store, args.id, changes).await?;

    println!("Updated changelog {} ({})", record.id, record.version);

    Ok(())
}

pub async fn execute_delete(repo: &Path, args: DeleteArgs) -> Result<()> {
    let (_, settings) = load_settings(repo, args.api_url.as_deref()).await?;
    let store = store_for(&settings)?;

    store.delete(args.id).await?;

    println!("Deleted changelog {}", args.id);

    Ok(())
}
