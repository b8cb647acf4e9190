//! The `generate` command.
use log::*;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;

use crate::{
    cli::GenerateArgs,
    command::{load_settings, publish, store_for},
    config::Settings,
    error::Result,
    format::{NO_COMMITS_SENTINEL, format_commits},
    git::{self, DEFAULT_DAYS, History, HistoryQuery},
    session::{PendingChangelog, SessionCache},
    synth::{GeminiClient, Synthesizer, TextGenerator},
    version::suggest_version,
};

/// Commits listed by a dry run.
const DRY_RUN_SHOWN: usize = 10;

/// Characters of each message shown by a dry run.
const DRY_RUN_MESSAGE_WIDTH: usize = 60;

/// What to generate.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub query: HistoryQuery,
    /// Version to attach. Suggested from the commits when `None`.
    pub version: Option<String>,
    /// Project to publish under. Defaults to the repository name.
    pub project: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug)]
pub enum GenerateOutcome {
    /// No commits matched the window. Nothing was generated or stored.
    EmptyWindow(History),
    /// Commits were found but generation was skipped on request.
    DryRun(History),
    /// A draft was generated and stored in the session slot.
    Generated(PendingChangelog),
}

/// Extract, synthesize and store a changelog. When `generator` is `None` a
/// Gemini client is built from `settings`.
pub async fn run(
    request: &GenerateRequest,
    settings: &Settings,
    session: &SessionCache,
    generator: Option<&dyn TextGenerator>,
) -> Result<GenerateOutcome> {
    let history = git::extract(&request.query)?;

    if history.is_empty() {
        warn!("{NO_COMMITS_SENTINEL}");
        return Ok(GenerateOutcome::EmptyWindow(history));
    }

    info!("found {} commits in {}", history.commits.len(), history.repo_name);

    if request.dry_run {
        return Ok(GenerateOutcome::DryRun(history));
    }

    let version = match &request.version {
        Some(version) => version.clone(),
        None => {
            let version = suggest_version(&history.commits, None);
            info!("auto-generated version: {version}");
            version
        }
    };

    let api_key = settings.require_api_key()?;

    let commits_text = format_commits(&history.commits);

    let gemini;
    let generator: &dyn TextGenerator = match generator {
        Some(generator) => generator,
        None => {
            gemini = GeminiClient::new(
                api_key,
                &settings.model,
                &settings.gemini_url,
                settings.generation_timeout,
            )?;
            &gemini
        }
    };

    let synthesis = Synthesizer::new(generator, settings.generation_timeout)
        .synthesize(&commits_text, &history.repo_name, Some(&version))
        .await;

    let project_name = request
        .project
        .clone()
        .unwrap_or_else(|| history.repo_name.clone());

    let pending = PendingChangelog {
        draft: synthesis.into_draft(),
        version,
        commit_range: history.range,
        project_name,
        generated_at: chrono::Utc::now(),
    };

    session.store(&pending).await?;

    Ok(GenerateOutcome::Generated(pending))
}

/// Lines printed by a dry run.
pub fn dry_run_lines(history: &History) -> Vec<String> {
    let mut lines = vec!["Commits that would be analyzed:".to_string()];

    for commit in history.commits.iter().take(DRY_RUN_SHOWN) {
        let subject = commit.subject();
        let mut shown: String =
            subject.chars().take(DRY_RUN_MESSAGE_WIDTH).collect();

        if shown.len() < subject.len() {
            shown.push_str("...");
        }

        lines.push(format!("  - {} {shown}", commit.short_id));
    }

    if history.commits.len() > DRY_RUN_SHOWN {
        lines.push(format!(
            "  ... and {} more",
            history.commits.len() - DRY_RUN_SHOWN
        ));
    }

    lines
}

/// JSON document written by `--output`: the version followed by the draft.
pub fn output_document(pending: &PendingChangelog) -> Result<Value> {
    let mut document = Map::new();
    document.insert("version".into(), Value::String(pending.version.clone()));

    if let Value::Object(draft) = serde_json::to_value(&pending.draft)? {
        document.extend(draft);
    }

    Ok(Value::Object(document))
}

async fn write_output(path: &Path, pending: &PendingChangelog) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(&output_document(pending)?)?;
    info!("writing changelog to: {}", path.display());
    fs::write(path, content).await?;

    Ok(())
}

pub async fn execute(repo: &Path, args: GenerateArgs) -> Result<()> {
    let (file_config, mut settings) =
        load_settings(repo, args.api_url.as_deref()).await?;
    settings.override_api_key(args.api_key.as_deref());

    let session = SessionCache::for_repo_path(repo)?;

    let query = HistoryQuery::builder()
        .repo_path(repo)
        .days(args.days.or(file_config.days).unwrap_or(DEFAULT_DAYS))
        .since(args.since.clone())
        .until(args.until.clone())
        .branch(args.branch.clone())
        .build()?;

    let request = GenerateRequest {
        query,
        version: args.release_version.clone(),
        project: args.project.clone().or(file_config.project),
        dry_run: args.dry_run,
    };

    match run(&request, &settings, &session, None).await? {
        GenerateOutcome::EmptyWindow(_) => {
            println!("{NO_COMMITS_SENTINEL}");
        }
        GenerateOutcome::DryRun(history) => {
            println!("{}", dry_run_lines(&history).join("\n"));
        }
        GenerateOutcome::Generated(pending) => {
            if let Some(error) = &pending.draft.error {
                warn!("changelog generated with errors: {error}");
            }

            println!("{}", pending.draft.render(&pending.version));

            if let Some(output) = &args.output {
                write_output(output, &pending).await?;
            }

            if args.publish {
                let store = store_for(&settings)?;
                let request = publish::PublishRequest::default();
                let record = publish::publish_pending(
                    &request, &session, &store, pending,
                )
                .await?;
                println!("Published! Changelog ID: {}", record.id);
            }
        }
    }

    Ok(())
}
