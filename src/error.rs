//! Error types for changelog generation, storage and publishing.

use thiserror::Error;
use url::Url;

/// Main error type for changelog operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "Gemini API key not found: set the GEMINI_API_KEY environment variable or pass --api-key"
    )]
    MissingCredential,

    // Git errors
    #[error("Not a git repository (searched {path} and its parents)")]
    NotARepository { path: String },

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    // Session errors
    #[error("No changelog to publish: run `changelog generate` first")]
    NoPendingChangelog,

    #[error(
        "Pending changelog was not generated cleanly ({0}): pass --force to publish it anyway"
    )]
    DegradedDraft(String),

    // Network/API errors
    #[error(
        "Could not connect to the changelog API at {url}: make sure the backend is running"
    )]
    BackendUnreachable { url: String },

    #[error("Request to {url} timed out")]
    BackendTimeout { url: String },

    #[error("API error ({status}): {body}")]
    BackendRejected { status: u16, body: String },

    #[error("Changelog {0} not found")]
    NotFound(u64),

    #[error("Network request failed: {0}")]
    NetworkError(String),

    // Parsing errors - automatic conversions via #[from]
    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Date parse error: {0}")]
    ChronoParseError(#[from] chrono::ParseError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ChangelogError
pub type Result<T> = std::result::Result<T, ChangelogError>;

impl ChangelogError {
    /// Create an invalid arguments error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Classify a failed request against `url` so connection problems and
    /// timeouts name the endpoint the user configured.
    pub fn from_transport(err: reqwest::Error, url: &Url) -> Self {
        let url = url.as_str().trim_end_matches('/').to_string();
        if err.is_timeout() {
            Self::BackendTimeout { url }
        } else if err.is_connect() {
            Self::BackendUnreachable { url }
        } else {
            err.into()
        }
    }
}

// Implement From for std::io::Error - wraps in Other variant for generic I/O errors
impl From<std::io::Error> for ChangelogError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

// Implement From for reqwest errors (network/API)
impl From<reqwest::Error> for ChangelogError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if err.is_status() => Self::BackendRejected {
                status: status.as_u16(),
                body: err.to_string(),
            },
            _ => Self::NetworkError(err.to_string()),
        }
    }
}

// Implement From for reqwest header errors (needs custom message)
impl From<reqwest::header::InvalidHeaderValue> for ChangelogError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidConfig(format!("Invalid header value: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formats() {
        let err = ChangelogError::invalid_args("bad date");
        assert_eq!(err.to_string(), "Invalid arguments: bad date");

        let err = ChangelogError::BackendUnreachable {
            url: "http://localhost:8000".into(),
        };
        assert_eq!(
            err.to_string(),
            "Could not connect to the changelog API at http://localhost:8000: make sure the backend is running"
        );

        let err = ChangelogError::BackendRejected {
            status: 422,
            body: r#"{"detail":"bad"}"#.into(),
        };
        assert_eq!(err.to_string(), r#"API error (422): {"detail":"bad"}"#);
    }

    #[test]
    fn test_error_helpers() {
        let err = ChangelogError::invalid_config("missing field");
        assert!(matches!(err, ChangelogError::InvalidConfig(_)));

        let err = ChangelogError::invalid_args("bad flag");
        assert!(matches!(err, ChangelogError::InvalidArgs(_)));
    }

    #[test]
    fn test_from_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{");
        let err: ChangelogError = json_err.unwrap_err().into();
        assert!(matches!(err, ChangelogError::JsonParseError(_)));

        let date_err = chrono::NaiveDate::parse_from_str("nope", "%Y-%m-%d");
        let err: ChangelogError = date_err.unwrap_err().into();
        assert!(matches!(err, ChangelogError::ChronoParseError(_)));

        let io_err = std::io::Error::other("disk full");
        let err: ChangelogError = io_err.into();
        assert!(matches!(err, ChangelogError::Other(_)));
    }
}
