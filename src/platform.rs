//! Chat-platform delivery capability
//!
//! The dispatcher never talks to the platform directly; it receives a
//! [`Messenger`] at construction time and hands it logical content. The
//! HTTP implementation lives in `platform/http.rs`, mocks for tests in
//! `testing.rs`.

pub mod http;

pub use http::HttpMessenger;

use crate::action::ChatScope;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Opaque handle to media previously uploaded to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where an outbound message should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyContext {
    pub session_key: String,
    pub message_id: String,
    pub scope: ChatScope,
}

impl ReplyContext {
    pub fn new(session_key: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            session_key: session_key.into(),
            message_id: message_id.into(),
            scope: ChatScope::Direct,
        }
    }

    pub fn with_scope(mut self, scope: ChatScope) -> Self {
        self.scope = scope;
        self
    }
}

/// Logical message content. Cards are logical descriptions (see `cards`);
/// turning them into platform markup is the transport's concern.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundContent {
    Text(String),
    Card(serde_json::Value),
    Image(MediaRef),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("platform request failed: {0}")]
    Http(String),
    #[error("platform rejected message (code {code}): {message}")]
    Api { code: i64, message: String },
    #[error("platform send timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("media upload failed: {0}")]
    Http(String),
    #[error("platform rejected upload (code {code}): {message}")]
    Api { code: i64, message: String },
    #[error("media upload timed out")]
    Timeout,
}

/// Send a new message or a reply, and move media to and from the platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn deliver(
        &self,
        ctx: &ReplyContext,
        content: OutboundContent,
    ) -> Result<(), DeliveryError>;

    async fn upload_media(&self, bytes: Vec<u8>) -> Result<MediaRef, UploadError>;

    /// Download previously uploaded media, e.g. the source image for a
    /// variant regeneration.
    async fn fetch_media(&self, media: &MediaRef) -> Result<Vec<u8>, UploadError>;
}

#[async_trait]
impl<T: Messenger + ?Sized> Messenger for Arc<T> {
    async fn deliver(
        &self,
        ctx: &ReplyContext,
        content: OutboundContent,
    ) -> Result<(), DeliveryError> {
        (**self).deliver(ctx, content).await
    }

    async fn upload_media(&self, bytes: Vec<u8>) -> Result<MediaRef, UploadError> {
        (**self).upload_media(bytes).await
    }

    async fn fetch_media(&self, media: &MediaRef) -> Result<Vec<u8>, UploadError> {
        (**self).fetch_media(media).await
    }
}
