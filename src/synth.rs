//! Turn formatted commit text into a user-facing changelog draft.
//!
//! The [`Synthesizer`] owns the prompt, the call to a [`TextGenerator`] and
//! the decoding of its reply. It never fails: every problem is folded into
//! a degraded [`ChangelogDraft`] so the caller can decide what to do with
//! it.
use log::*;
use serde_json::Value;
use std::time::Duration;

use crate::{changelog::ChangelogDraft, error::Result};

pub mod gemini;
mod prompt;
pub mod traits;

pub use gemini::{DEFAULT_GEMINI_URL, DEFAULT_MODEL, GeminiClient};
pub use prompt::build_prompt;
pub use traits::TextGenerator;

/// Upper bound for a single generation call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

const FENCE: &str = "```";

/// Result of a synthesis attempt. Every variant carries a usable draft.
#[derive(Debug, Clone)]
pub enum Synthesis {
    Generated(ChangelogDraft),
    MalformedResponse { draft: ChangelogDraft, raw: String },
    BackendFailure { draft: ChangelogDraft, reason: String },
}

impl Synthesis {
    pub fn draft(&self) -> &ChangelogDraft {
        match self {
            Self::Generated(draft) => draft,
            Self::MalformedResponse { draft, .. } => draft,
            Self::BackendFailure { draft, .. } => draft,
        }
    }

    pub fn into_draft(self) -> ChangelogDraft {
        match self {
            Self::Generated(draft) => draft,
            Self::MalformedResponse { draft, .. } => draft,
            Self::BackendFailure { draft, .. } => draft,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Generated(_))
    }
}

/// Prompts a generator and decodes its reply into a draft.
pub struct Synthesizer<'a> {
    generator: &'a dyn TextGenerator,
    timeout: Duration,
}

impl<'a> Synthesizer<'a> {
    pub fn new(generator: &'a dyn TextGenerator, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn synthesize(
        &self,
        commits_text: &str,
        project: &str,
        version: Option<&str>,
    ) -> Synthesis {
        let prompt = build_prompt(commits_text, project, version);

        debug!("sending {} byte prompt to generator", prompt.len());

        let raw = match tokio::time::timeout(
            self.timeout,
            self.generator.generate(&prompt),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => return backend_failure(err.to_string()),
            Err(_) => {
                return backend_failure(format!(
                    "generation timed out after {}s",
                    self.timeout.as_secs()
                ));
            }
        };

        match parse_response(&raw) {
            Ok(draft) => {
                info!(
                    "generated changelog '{}' with {} entries",
                    draft.title,
                    draft.changes.len()
                );
                Synthesis::Generated(draft)
            }
            Err(err) => {
                warn!("could not parse generator response: {err}");
                Synthesis::MalformedResponse {
                    draft: ChangelogDraft::malformed(err.to_string(), &raw),
                    raw,
                }
            }
        }
    }
}

fn backend_failure(reason: String) -> Synthesis {
    warn!("changelog generation failed: {reason}");
    Synthesis::BackendFailure {
        draft: ChangelogDraft::backend_failure(reason.clone()),
        reason,
    }
}

/// Remove a wrapping fenced code block. The opening line (with any
/// language tag) is dropped along with everything from the last fence.
fn strip_fence(text: &str) -> &str {
    let text = text.trim();

    if !text.starts_with(FENCE) {
        return text;
    }

    let body = text.split_once('\n').map(|(_, rest)| rest).unwrap_or("");

    match body.rfind(FENCE) {
        Some(end) => &body[..end],
        None => body,
    }
}

/// Decode a generator reply into a draft, repairing the change buckets.
pub fn parse_response(raw: &str) -> Result<ChangelogDraft> {
    let value: Value = serde_json::from_str(strip_fence(raw))?;
    ChangelogDraft::from_value(&value)
}
