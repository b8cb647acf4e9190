//! Traits for generative text backends
use async_trait::async_trait;

use crate::error::Result;

/// A backend that completes a prompt with free text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
