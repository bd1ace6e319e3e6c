//! Generative-AI backend capabilities
//!
//! The dispatcher and job runner consume these traits; the OpenAI-flavored
//! HTTP implementation lives in `backend/openai.rs`. Splitting text, image,
//! and balance into separate traits keeps the seams narrow: the image job
//! runner only ever sees an [`ImageBackend`].

pub mod error;
pub mod openai;

pub use error::{BackendError, BackendErrorKind};
pub use openai::OpenAiBackend;

use crate::session::{Resolution, Turn};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Account balance snapshot for the `/balance` command.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub total_granted: f64,
    pub total_used: f64,
    pub total_available: f64,
    pub effective_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Text completion over the session history.
#[async_trait]
pub trait TextBackend: Send + Sync {
    async fn generate_text(
        &self,
        history: &[Turn],
        temperature: Option<f32>,
    ) -> Result<String, BackendError>;
}

/// Image generation. Returns raw image bytes ready for upload.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate_image(
        &self,
        prompt: &str,
        resolution: Resolution,
    ) -> Result<Vec<u8>, BackendError>;

    async fn generate_image_variant(
        &self,
        source: &[u8],
        resolution: Resolution,
    ) -> Result<Vec<u8>, BackendError>;
}

/// Balance query.
#[async_trait]
pub trait BalanceBackend: Send + Sync {
    async fn balance(&self) -> Result<Balance, BackendError>;
}

#[async_trait]
impl<T: TextBackend + ?Sized> TextBackend for Arc<T> {
    async fn generate_text(
        &self,
        history: &[Turn],
        temperature: Option<f32>,
    ) -> Result<String, BackendError> {
        (**self).generate_text(history, temperature).await
    }
}

#[async_trait]
impl<T: ImageBackend + ?Sized> ImageBackend for Arc<T> {
    async fn generate_image(
        &self,
        prompt: &str,
        resolution: Resolution,
    ) -> Result<Vec<u8>, BackendError> {
        (**self).generate_image(prompt, resolution).await
    }

    async fn generate_image_variant(
        &self,
        source: &[u8],
        resolution: Resolution,
    ) -> Result<Vec<u8>, BackendError> {
        (**self).generate_image_variant(source, resolution).await
    }
}

#[async_trait]
impl<T: BalanceBackend + ?Sized> BalanceBackend for Arc<T> {
    async fn balance(&self) -> Result<Balance, BackendError> {
        (**self).balance().await
    }
}
