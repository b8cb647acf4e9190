//! Generate user-facing changelogs from git history.
//!
//! Commits in a date window are read from a local repository, rendered to
//! text, summarized by a generative model into categorized release notes
//! and published to a changelog store.

pub mod changelog;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod git;
pub mod session;
pub mod store;
pub mod synth;
pub mod version;

pub use error::{ChangelogError, Result};

#[cfg(test)]
pub mod test_helpers;
