//! OpenAI-compatible backend implementation

use super::error::classify_status;
use super::{Balance, BackendError, BalanceBackend, ImageBackend, TextBackend};
use crate::session::{Resolution, Role, Turn};
use async_trait::async_trait;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TEXT_MODEL: &str = "gpt-3.5-turbo";

/// HTTP client against an OpenAI-compatible API surface. Implements all
/// three backend capabilities, so `main` hands out one instance behind
/// three trait objects.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: String, base_url: Option<&str>, timeout: Duration) -> Self {
        let base_url = base_url
            .map_or(DEFAULT_BASE_URL, |u| u.trim_end_matches('/'))
            .to_string();

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url,
            model: DEFAULT_TEXT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn translate_turn(turn: &Turn) -> ChatMessage {
        let role = match turn.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        ChatMessage {
            role: role.to_string(),
            content: turn.content.clone(),
        }
    }

    fn send_error(e: &reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::timeout(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            BackendError::network(format!("Connection failed: {e}"))
        } else {
            BackendError::unknown(format!("Request failed: {e}"))
        }
    }

    fn classify_error(status: reqwest::StatusCode, body: &str) -> BackendError {
        BackendError::new(classify_status(status), format!("HTTP {status}: {body}"))
    }

    /// Send a request and parse the success body as `T`.
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Self::send_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            BackendError::malformed_response(format!("Failed to parse response: {e} - body: {body}"))
        })
    }

    fn decode_image(response: ImagesResponse) -> Result<Vec<u8>, BackendError> {
        let datum = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::malformed_response("Image response had no data"))?;

        base64::engine::general_purpose::STANDARD
            .decode(datum.b64_json)
            .map_err(|e| BackendError::malformed_response(format!("Invalid image base64: {e}")))
    }
}

#[async_trait]
impl TextBackend for OpenAiBackend {
    async fn generate_text(
        &self,
        history: &[Turn],
        temperature: Option<f32>,
    ) -> Result<String, BackendError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: history.iter().map(Self::translate_turn).collect(),
            temperature,
        };

        let response: ChatResponse = self
            .execute(
                self.client
                    .post(format!("{}/chat/completions", self.base_url))
                    .json(&request),
            )
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| BackendError::malformed_response("Completion had no choices"))
    }
}

#[async_trait]
impl ImageBackend for OpenAiBackend {
    async fn generate_image(
        &self,
        prompt: &str,
        resolution: Resolution,
    ) -> Result<Vec<u8>, BackendError> {
        let request = ImageGenerationRequest {
            prompt: prompt.to_string(),
            n: 1,
            size: resolution.as_str().to_string(),
            response_format: "b64_json".to_string(),
        };

        let response: ImagesResponse = self
            .execute(
                self.client
                    .post(format!("{}/images/generations", self.base_url))
                    .json(&request),
            )
            .await?;

        Self::decode_image(response)
    }

    async fn generate_image_variant(
        &self,
        source: &[u8],
        resolution: Resolution,
    ) -> Result<Vec<u8>, BackendError> {
        let image_part = reqwest::multipart::Part::bytes(source.to_vec())
            .file_name("source.png")
            .mime_str("image/png")
            .map_err(|e| BackendError::invalid_request(format!("Invalid image part: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("image", image_part)
            .text("n", "1")
            .text("size", resolution.as_str())
            .text("response_format", "b64_json");

        let response: ImagesResponse = self
            .execute(
                self.client
                    .post(format!("{}/images/variations", self.base_url))
                    .multipart(form),
            )
            .await?;

        Self::decode_image(response)
    }
}

#[async_trait]
impl BalanceBackend for OpenAiBackend {
    async fn balance(&self) -> Result<Balance, BackendError> {
        let response: CreditGrantsResponse = self
            .execute(
                self.client
                    .get(format!("{}/dashboard/billing/credit_grants", self.base_url)),
            )
            .await?;

        let grant = response
            .grants
            .data
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::malformed_response("Balance response had no grants"))?;

        Ok(Balance {
            total_granted: response.total_granted,
            total_used: response.total_used,
            total_available: response.total_available,
            effective_at: unix_to_datetime(grant.effective_at)?,
            expires_at: unix_to_datetime(grant.expires_at)?,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn unix_to_datetime(secs: f64) -> Result<DateTime<Utc>, BackendError> {
    DateTime::from_timestamp(secs as i64, 0)
        .ok_or_else(|| BackendError::malformed_response(format!("Timestamp out of range: {secs}")))
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct ImageGenerationRequest {
    prompt: String,
    n: u32,
    size: String,
    response_format: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: String,
}

#[derive(Debug, Deserialize)]
struct CreditGrantsResponse {
    total_granted: f64,
    total_used: f64,
    total_available: f64,
    grants: GrantList,
}

#[derive(Debug, Deserialize)]
struct GrantList {
    data: Vec<Grant>,
}

#[derive(Debug, Deserialize)]
struct Grant {
    effective_at: f64,
    expires_at: f64,
}
