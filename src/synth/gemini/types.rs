use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Trimmed text of the first candidate. `None` when there is no
    /// candidate or it carries no text parts; an empty reply is still text.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;

        let parts = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<&str>>();

        if parts.is_empty() {
            return None;
        }

        Some(parts.concat().trim().to_string())
    }
}
