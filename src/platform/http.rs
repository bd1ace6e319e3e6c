//! HTTP implementation of the platform messenger

use super::{DeliveryError, MediaRef, Messenger, OutboundContent, ReplyContext, UploadError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Messenger backed by the platform's REST API.
///
/// Replies go to `POST {base}/messages/{message_id}/reply`, uploads to
/// `POST {base}/images`. Every send carries a fresh UUID so platform-side
/// retries stay idempotent.
pub struct HttpMessenger {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<ApiData>,
}

#[derive(Deserialize)]
struct ApiData {
    #[serde(default)]
    image_key: Option<String>,
}

impl HttpMessenger {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn reply_body(content: &OutboundContent) -> serde_json::Value {
        let (msg_type, payload) = match content {
            OutboundContent::Text(text) => (
                "text",
                serde_json::json!({ "text": text }).to_string(),
            ),
            OutboundContent::Card(card) => ("interactive", card.to_string()),
            OutboundContent::Image(media) => (
                "image",
                serde_json::json!({ "image_key": media.as_str() }).to_string(),
            ),
        };
        serde_json::json!({
            "msg_type": msg_type,
            "content": payload,
            "uuid": uuid::Uuid::new_v4().to_string(),
        })
    }
}

#[async_trait]
impl Messenger for HttpMessenger {
    async fn deliver(
        &self,
        ctx: &ReplyContext,
        content: OutboundContent,
    ) -> Result<(), DeliveryError> {
        let url = format!("{}/messages/{}/reply", self.base_url, ctx.message_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&Self::reply_body(&content))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| DeliveryError::Http(e.to_string()))?;

        if !status.is_success() || envelope.code != 0 {
            return Err(DeliveryError::Api {
                code: envelope.code,
                message: envelope.msg,
            });
        }
        Ok(())
    }

    async fn upload_media(&self, bytes: Vec<u8>) -> Result<MediaRef, UploadError> {
        let url = format!("{}/images", self.base_url);
        let part = reqwest::multipart::Part::bytes(bytes).file_name("image.png");
        let form = reqwest::multipart::Form::new()
            .text("image_type", "message")
            .part("image", part);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UploadError::Timeout
                } else {
                    UploadError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| UploadError::Http(e.to_string()))?;

        if !status.is_success() || envelope.code != 0 {
            return Err(UploadError::Api {
                code: envelope.code,
                message: envelope.msg,
            });
        }

        envelope
            .data
            .and_then(|d| d.image_key)
            .map(MediaRef::new)
            .ok_or_else(|| UploadError::Http("upload response missing image_key".to_string()))
    }

    async fn fetch_media(&self, media: &MediaRef) -> Result<Vec<u8>, UploadError> {
        let url = format!("{}/images/{}", self.base_url, media.as_str());
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UploadError::Timeout
                } else {
                    UploadError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Api {
                code: i64::from(status.as_u16()),
                message: format!("media download failed for {}", media.as_str()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UploadError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
