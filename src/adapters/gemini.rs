//! reqwest implementation of [`AiClient`] for the `generateContent` endpoint.
//!
//! Request: `{ contents: [{ role, parts: [{ text }] }], generationConfig: { responseMimeType, responseSchema } }`.
//! Response: `candidates[0].content.parts[0].text`, or `{ error: { message } }` with a non-2xx status.

use crate::config::toml_config::GeneratorConfig;
use crate::domain::ports::AiClient;
use crate::domain::schema::ResponseSchema;
use crate::utils::error::{GenError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const JSON_MIME_TYPE: &str = "application/json";
const API_KEY_HEADER: &str = "x-goog-api-key";
const SAFETY_FINISH_REASON: &str = "SAFETY";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: RequestGenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestGenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        Self::new(
            config.api.base_url.clone(),
            config.api.model.clone(),
            config.api_key()?,
            config.timeout(),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn build_body<'a>(prompt: &'a str, schema: &ResponseSchema) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: RequestGenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
                response_schema: schema.to_json(),
            },
        }
    }
}

fn transport(error: reqwest::Error) -> GenError {
    GenError::TransportFailure(error.without_url())
}

/// Map a non-2xx reply to `ApiRejected`, preferring the service's own message.
fn rejection(status: reqwest::StatusCode, body: &str) -> GenError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    GenError::ApiRejected {
        status: status.as_u16(),
        message,
    }
}

fn extract_text(body: &str) -> Result<String> {
    let envelope: GenerateContentResponse = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("Unreadable response envelope: {}", e);
            return Err(GenError::EmptyResponse);
        }
    };

    let Some(candidate) = envelope.candidates.into_iter().next() else {
        // 沒有候選結果：可能是提示本身被安全機制擋下
        if let Some(reason) = envelope.prompt_feedback.and_then(|f| f.block_reason) {
            tracing::warn!("Prompt blocked by the service: {}", reason);
            return Err(GenError::SafetyBlocked);
        }
        return Err(GenError::EmptyResponse);
    };

    let text = candidate
        .content
        .into_iter()
        .flat_map(|content| content.parts)
        .find_map(|part| part.text);

    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ if candidate.finish_reason.as_deref() == Some(SAFETY_FINISH_REASON) => {
            Err(GenError::SafetyBlocked)
        }
        _ => Err(GenError::EmptyResponse),
    }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn send(&self, prompt: &str, schema: &ResponseSchema) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(GenError::invalid_input("prompt cannot be empty"));
        }

        let endpoint = self.endpoint();
        tracing::debug!("Making API request to: {}", endpoint);

        // 金鑰走標頭而不是查詢字串，錯誤訊息裡也不帶 URL
        let response = self
            .client
            .post(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Self::build_body(prompt, schema))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(rejection(status, &body));
        }

        extract_text(&body)
    }
}
