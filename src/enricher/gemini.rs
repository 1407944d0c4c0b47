use async_trait::async_trait;
use log::*;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::EnrichmentConfig,
    enricher::GenerativeTextProvider,
    error::{NotesError, Result},
};

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Gemini `generateContent` client.
pub struct Gemini {
    client: Client,
    api_key: SecretString,
    endpoint: String,
}

impl Gemini {
    pub fn new(config: &EnrichmentConfig) -> Self {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.as_str().trim_end_matches('/'),
            config.model
        );

        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            endpoint,
        }
    }
}

/// Text of the first candidate, with its parts joined in order.
fn first_candidate_text(response: GenerateContentResponse) -> Result<String> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        NotesError::enrichment("gemini response contained no candidates")
    })?;

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    let text = parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<Vec<String>>()
        .join("");

    if text.is_empty() {
        return Err(NotesError::enrichment(
            "gemini candidate contained no text",
        ));
    }

    Ok(text)
}

#[async_trait]
impl GenerativeTextProvider for Gemini {
    async fn generate(&self, prompt: String) -> Result<String> {
        debug!("sending prompt to {}", self.endpoint);

        let body = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(NotesError::enrichment(format!(
                "gemini returned {status}: {text}"
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| {
                NotesError::enrichment(format!(
                    "unexpected gemini response shape: {e}"
                ))
            })?;

        first_candidate_text(parsed)
    }
}
