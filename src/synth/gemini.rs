//! Implements the TextGenerator trait for the Gemini REST API
use async_trait::async_trait;
use log::*;
use reqwest::{
    Client, Url,
    header::{HeaderMap, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::{
    config::with_trailing_slash,
    error::{ChangelogError, Result},
    synth::{
        gemini::types::{
            Content, GenerateContentRequest, GenerateContentResponse, Part,
        },
        traits::TextGenerator,
    },
};

mod types;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

/// Public Gemini API root.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/";

/// Gemini client authenticated with an API key header.
pub struct GeminiClient {
    client: Client,
    endpoint: Url,
}

impl GeminiClient {
    pub fn new(
        api_key: &SecretString,
        model: &str,
        base_url: &Url,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let mut key_value = HeaderValue::from_str(api_key.expose_secret())?;
        key_value.set_sensitive(true);

        headers.append("x-goog-api-key", key_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let endpoint = with_trailing_slash(base_url)
            .join(&format!("v1beta/models/{model}:generateContent"))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let data = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        debug!("posting prompt to {}", self.endpoint);

        let request = self
            .client
            .post(self.endpoint.clone())
            .json(&data)
            .build()?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|err| ChangelogError::from_transport(err, &self.endpoint))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ChangelogError::from_transport(err, &self.endpoint))?;

        if !status.is_success() {
            return Err(ChangelogError::BackendRejected {
                status: status.as_u16(),
                body,
            });
        }

        let result: GenerateContentResponse = serde_json::from_str(&body)?;

        result.text().ok_or_else(|| {
            ChangelogError::NetworkError(
                "Gemini response contained no text".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    const GENERATE_PATH: &str =
        "/v1beta/models/gemini-flash-latest:generateContent";

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(
            &SecretString::from("test-key".to_string()),
            DEFAULT_MODEL,
            &Url::parse(&server.uri()).unwrap(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn endpoint_includes_model_and_keeps_base_path() {
        let client = GeminiClient::new(
            &SecretString::from("k".to_string()),
            "gemini-pro",
            &Url::parse("http://localhost:9000/proxy").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(
            client.endpoint().as_str(),
            "http://localhost:9000/proxy/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn sends_prompt_and_joins_candidate_parts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_json(json!({
                "contents": [{ "parts": [{ "text": "hello" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "parts": [{ "text": "{\"title\":" }, { "text": " \"x\"}\n" }],
                        "role": "model"
                    },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).generate("hello").await.unwrap();

        assert_eq!(text, "{\"title\": \"x\"}");
    }

    #[tokio::test]
    async fn error_status_is_rejected_with_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(403).set_body_string("API key not valid"),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hello").await.unwrap_err();

        match err {
            ChangelogError::BackendRejected { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_candidates_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hello").await.unwrap_err();

        assert!(matches!(err, ChangelogError::NetworkError(_)));
    }

    #[tokio::test]
    async fn blank_text_is_returned_for_parsing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "  \n" }] } }]
            })))
            .mount(&server)
            .await;

        let text = client_for(&server).generate("hello").await.unwrap();

        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn candidate_without_text_parts_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [] } }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hello").await.unwrap_err();

        assert!(matches!(err, ChangelogError::NetworkError(_)));
    }
}
