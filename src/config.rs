//! Runtime settings and the optional `changelog.toml` file.
//!
//! Values are resolved in order: command line flag, environment variable,
//! config file, built-in default. The environment is passed in as a map so
//! resolution can be exercised without touching process state.
use derive_builder::Builder;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::{collections::HashMap, env, path::Path, time::Duration};
use tokio::fs;
use url::Url;

use crate::{
    error::{ChangelogError, Result},
    store::{DEFAULT_STORE_TIMEOUT, DEFAULT_STORE_URL},
    synth::{DEFAULT_GEMINI_URL, DEFAULT_GENERATION_TIMEOUT, DEFAULT_MODEL},
};

/// Default configuration filename, looked up at the repository root.
pub const DEFAULT_CONFIG_FILE: &str = "changelog.toml";

/// Credential for the generative backend.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Base URL of the changelog store.
pub const STORE_URL_ENV: &str = "CHANGELOG_API_URL";

/// Base URL of the Gemini API, for proxies.
pub const GEMINI_URL_ENV: &str = "GEMINI_API_URL";

/// Contents of `changelog.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Project name used when publishing (default: repository directory).
    pub project: Option<String>,
    /// Days to look back when no start date is given (default: 7).
    pub days: Option<u32>,
    /// Gemini model name (default: gemini-flash-latest).
    pub model: Option<String>,
    /// Changelog store base URL (default: http://localhost:8000).
    pub api_url: Option<String>,
    /// Seconds to wait for the generative backend (default: 120).
    pub generation_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load `changelog.toml` from `root`, returning defaults when absent.
    pub async fn load(root: &Path) -> Result<Self> {
        let path = root.join(DEFAULT_CONFIG_FILE);

        if !fs::try_exists(&path).await? {
            debug!("no {DEFAULT_CONFIG_FILE} found in {}", root.display());
            return Ok(Self::default());
        }

        info!("loading configuration from {}", path.display());
        let content = fs::read_to_string(&path).await?;
        Ok(toml::from_str(&content)?)
    }
}

/// Inputs to settings resolution.
#[derive(Debug, Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct SettingsParams {
    #[builder(default)]
    pub env: HashMap<String, String>,
    #[builder(default)]
    pub file: FileConfig,
    /// `--api-key` flag.
    #[builder(default)]
    pub api_key: Option<String>,
    /// `--api-url` flag.
    #[builder(default)]
    pub store_url: Option<String>,
}

impl SettingsParamsBuilder {
    pub fn build(&self) -> Result<Settings> {
        let params = self._build().map_err(|e| {
            ChangelogError::invalid_config(format!(
                "Failed to build settings: {}",
                e
            ))
        })?;
        Settings::new(params)
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<SecretString>,
    pub store_url: Url,
    pub gemini_url: Url,
    pub model: String,
    pub generation_timeout: Duration,
    pub store_timeout: Duration,
}

impl Settings {
    pub fn builder() -> SettingsParamsBuilder {
        SettingsParamsBuilder::default()
    }

    pub fn new(params: SettingsParams) -> Result<Self> {
        let env_value = |key: &str| {
            params
                .env
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let api_key = non_empty(params.api_key.as_deref())
            .or_else(|| env_value(API_KEY_ENV))
            .map(SecretString::from);

        let store_url = non_empty(params.store_url.as_deref())
            .or_else(|| env_value(STORE_URL_ENV))
            .or_else(|| params.file.api_url.clone())
            .unwrap_or_else(|| DEFAULT_STORE_URL.to_string());

        let gemini_url = env_value(GEMINI_URL_ENV)
            .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string());

        let generation_timeout = params
            .file
            .generation_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_GENERATION_TIMEOUT);

        Ok(Self {
            api_key,
            store_url: parse_base_url(&store_url)?,
            gemini_url: parse_base_url(&gemini_url)?,
            model: params
                .file
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            generation_timeout,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        })
    }

    /// Resolve from an explicit environment map.
    pub fn from_env_map(
        env: &HashMap<String, String>,
        file: &FileConfig,
    ) -> Result<Self> {
        Self::builder().env(env.clone()).file(file.clone()).build()
    }

    /// Resolve from the process environment.
    pub fn from_env(file: &FileConfig) -> Result<Self> {
        Self::from_env_map(&env::vars().collect(), file)
    }

    /// Apply a `--api-key` flag.
    pub fn override_api_key(&mut self, api_key: Option<&str>) {
        if let Some(key) = non_empty(api_key) {
            self.api_key = Some(SecretString::from(key));
        }
    }

    /// Apply a `--api-url` flag.
    pub fn override_store_url(
        &mut self,
        store_url: Option<&str>,
    ) -> Result<()> {
        if let Some(url) = non_empty(store_url) {
            self.store_url = parse_base_url(&url)?;
        }
        Ok(())
    }

    /// The generative backend credential, required before any generation
    /// request is made.
    pub fn require_api_key(&self) -> Result<&SecretString> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().is_empty())
            .ok_or(ChangelogError::MissingCredential)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        ChangelogError::invalid_config(format!("invalid URL '{raw}': {e}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ChangelogError::invalid_config(format!(
            "only http and https URLs are supported: {raw}"
        )));
    }

    Ok(url)
}

/// Ensure the URL path ends with `/` so relative joins append to it
/// instead of replacing its last segment.
pub fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    url
}
