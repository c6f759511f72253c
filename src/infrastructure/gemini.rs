//! Google Gemini completion backend.
//!
//! Talks to the `generateContent` REST endpoint. The availability probe is a
//! live round trip with a trivial prompt, so it reflects current
//! reachability rather than configuration presence.

use crate::core::assistant::{ChatMessage, render_prompt};
use crate::infrastructure::traits::{CompletionError, CompletionProvider};
use async_trait::async_trait;
use di::inject;
use di::injectable;
use log::{info, warn};
use serde_json::{Value, json};
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[injectable(CompletionProvider)]
impl GeminiClient {
    #[inject]
    pub fn create() -> GeminiClient {
        dotenvy::dotenv().ok();
        let api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_owned());
        let base_url = env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        GeminiClient {
            client,
            base_url,
            api_key,
            model,
        }
    }
}

impl GeminiClient {
    async fn generate_content(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Gemini returned {status}");
            return Err(CompletionError::GenerationFailed);
        }

        let payload: Value = response.json().await.map_err(map_transport_error)?;
        let text = extract_text(&payload);
        if text.is_empty() {
            warn!("Gemini returned an empty candidate");
            return Err(CompletionError::GenerationFailed);
        }
        Ok(text)
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            info!("Gemini API key not configured");
            return false;
        }

        match self.generate_content("Hello").await {
            Ok(_) => true,
            Err(err) => {
                warn!("Gemini not available: {err}");
                false
            }
        }
    }

    async fn complete(
        &self,
        system_prompt: &str,
        transcript: &[ChatMessage],
    ) -> Result<String, CompletionError> {
        let prompt = render_prompt(system_prompt, transcript);
        self.generate_content(&prompt).await
    }

    fn service_name(&self) -> &str {
        "Google Gemini"
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

fn map_transport_error(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        warn!("Gemini request timed out");
        CompletionError::Timeout
    } else {
        warn!("Gemini transport error: {err}");
        CompletionError::GenerationFailed
    }
}

/// Concatenates `candidates[0].content.parts[*].text`.
fn extract_text(payload: &Value) -> String {
    payload["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}
