//! Inference gateway: structured inventory and free-text label requests.
//!
//! [`InferenceGateway`] is the seam the session controller talks to;
//! [`GeminiClient`] implements it against the `generateContent` REST endpoint.

use async_trait::async_trait;
use clarity_core::{Location, inventory_response_schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::prompt::{clean_label, label_prompt};
use crate::{ConfigError, GatewayConfig, GatewayError, ImagePayload, InferenceError};

/// Single-shot calls to a multimodal inference service.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Check that a call could be attempted at all. Never touches the network.
    fn ready(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Send an image plus instruction and parse the schema-constrained reply
    /// into a [`Location`]. The reply is accepted as-is once it parses.
    async fn analyze_image(
        &self,
        image: &ImagePayload,
        instruction: &str,
    ) -> Result<Location, GatewayError>;

    /// Ask for a short bin label given `name (xquantity)` summaries.
    async fn suggest_label(&self, item_summaries: &[String]) -> Result<String, GatewayError>;
}

// ── Wire types ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: &'a ImagePayload,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn inventory_request<'a>(image: &'a ImagePayload, instruction: &'a str) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData { inline_data: image },
                Part::Text { text: instruction },
            ],
        }],
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json",
            response_schema: inventory_response_schema(),
        }),
    }
}

fn text_request(prompt: &str) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part::Text { text: prompt }],
        }],
        generation_config: None,
    }
}

/// Concatenated text of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String, InferenceError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(InferenceError::Blocked(reason));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(InferenceError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_default();
        return match reason.as_str() {
            "SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" => Err(InferenceError::Blocked(reason.clone())),
            _ => Err(InferenceError::EmptyResponse),
        };
    }
    Ok(text)
}

/// Parse the structured reply. Malformed JSON propagates unmodified.
fn parse_location(text: &str) -> Result<Location, InferenceError> {
    Ok(serde_json::from_str(text.trim())?)
}

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GeminiClient {
    /// Build the HTTP client with the configured request timeout.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self { client, config })
    }

    /// POST a request and return the reply text.
    ///
    /// Configuration is checked before anything touches the network.
    async fn generate(&self, body: &GenerateContentRequest<'_>) -> Result<String, GatewayError> {
        let api_key = self.config.api_key()?;
        let base_url = self.config.normalized_base_url()?;
        let url = format!(
            "{base_url}/v1beta/models/{}:generateContent",
            self.config.model
        );

        info!(model = %self.config.model, "sending generateContent request");
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(InferenceError::from)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Server {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed: GenerateContentResponse = resp.json().await.map_err(InferenceError::from)?;
        Ok(response_text(parsed)?)
    }
}

#[async_trait]
impl InferenceGateway for GeminiClient {
    fn ready(&self) -> Result<(), ConfigError> {
        self.config.api_key()?;
        self.config.normalized_base_url()?;
        Ok(())
    }

    async fn analyze_image(
        &self,
        image: &ImagePayload,
        instruction: &str,
    ) -> Result<Location, GatewayError> {
        let text = self.generate(&inventory_request(image, instruction)).await?;
        let location = parse_location(&text)?;
        info!(
            location = %location.location_suggestion,
            items = location.items.len(),
            "analyzed image"
        );
        Ok(location)
    }

    async fn suggest_label(&self, item_summaries: &[String]) -> Result<String, GatewayError> {
        let prompt = label_prompt(item_summaries);
        let text = self.generate(&text_request(&prompt)).await?;
        let label = clean_label(&text);
        info!(label = %label, items = item_summaries.len(), "suggested label");
        Ok(label)
    }
}
