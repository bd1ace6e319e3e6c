//! Mock implementations for testing
//!
//! These mocks enable dispatcher and job-runner tests without real I/O.

use crate::backend::{Balance, BackendError, BalanceBackend, ImageBackend, TextBackend};
use crate::platform::{
    DeliveryError, MediaRef, Messenger, OutboundContent, ReplyContext, UploadError,
};
use crate::session::{Resolution, Turn};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Messenger
// ============================================================================

/// Mock messenger that records every delivery.
#[allow(dead_code)]
pub struct MockMessenger {
    /// Record of all deliveries made
    pub deliveries: Mutex<Vec<(ReplyContext, OutboundContent)>>,
    uploads: Mutex<Vec<Vec<u8>>>,
    media: Mutex<VecDeque<Vec<u8>>>,
    fail_deliver: Mutex<bool>,
    fail_upload: Mutex<bool>,
    /// Notified after each delivery (for test synchronization)
    pub delivered: Arc<Notify>,
}

#[allow(dead_code)]
impl MockMessenger {
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            media: Mutex::new(VecDeque::new()),
            fail_deliver: Mutex::new(false),
            fail_upload: Mutex::new(false),
            delivered: Arc::new(Notify::new()),
        }
    }

    /// Make every subsequent `deliver` call fail
    pub fn fail_deliveries(&self) {
        *self.fail_deliver.lock().unwrap() = true;
    }

    /// Make every subsequent `upload_media` call fail
    pub fn fail_uploads(&self) {
        *self.fail_upload.lock().unwrap() = true;
    }

    /// Queue bytes to be returned by the next `fetch_media` call
    pub fn queue_media(&self, bytes: Vec<u8>) {
        self.media.lock().unwrap().push_back(bytes);
    }

    /// Get recorded deliveries
    pub fn recorded_deliveries(&self) -> Vec<(ReplyContext, OutboundContent)> {
        self.deliveries.lock().unwrap().clone()
    }

    /// Get recorded upload payloads
    pub fn recorded_uploads(&self) -> Vec<Vec<u8>> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Default for MockMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn deliver(
        &self,
        ctx: &ReplyContext,
        content: OutboundContent,
    ) -> Result<(), DeliveryError> {
        if *self.fail_deliver.lock().unwrap() {
            return Err(DeliveryError::Http("mock delivery failure".to_string()));
        }
        self.deliveries
            .lock()
            .unwrap()
            .push((ctx.clone(), content));
        self.delivered.notify_waiters();
        Ok(())
    }

    async fn upload_media(&self, bytes: Vec<u8>) -> Result<MediaRef, UploadError> {
        if *self.fail_upload.lock().unwrap() {
            return Err(UploadError::Http("mock upload failure".to_string()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(bytes);
        Ok(MediaRef::new(format!("mock-image-{}", uploads.len())))
    }

    async fn fetch_media(&self, media: &MediaRef) -> Result<Vec<u8>, UploadError> {
        self.media
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| UploadError::Http(format!("no mock media for {}", media.as_str())))
    }
}

// ============================================================================
// Mock Text Backend
// ============================================================================

/// Mock text backend that returns queued replies
#[allow(dead_code)]
pub struct MockTextBackend {
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<(Vec<Turn>, Option<f32>)>>,
}

#[allow(dead_code)]
impl MockTextBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue an error
    pub fn queue_error(&self, error: BackendError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<(Vec<Turn>, Option<f32>)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockTextBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextBackend for MockTextBackend {
    async fn generate_text(
        &self,
        history: &[Turn],
        temperature: Option<f32>,
    ) -> Result<String, BackendError> {
        self.requests
            .lock()
            .unwrap()
            .push((history.to_vec(), temperature));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::network("No mock reply queued")))
    }
}

// ============================================================================
// Mock Image Backend
// ============================================================================

/// Mock image backend that returns queued image bytes
#[allow(dead_code)]
pub struct MockImageBackend {
    images: Mutex<VecDeque<Result<Vec<u8>, BackendError>>>,
    /// Record of prompts requested
    pub prompts: Mutex<Vec<(String, Resolution)>>,
    /// Record of variant source payloads requested
    pub variant_sources: Mutex<Vec<Vec<u8>>>,
    /// Notified when generation starts (for test synchronization)
    pub generation_started: Arc<Notify>,
}

#[allow(dead_code)]
impl MockImageBackend {
    pub fn new() -> Self {
        Self {
            images: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            variant_sources: Mutex::new(Vec::new()),
            generation_started: Arc::new(Notify::new()),
        }
    }

    /// Queue successful image bytes
    pub fn queue_image(&self, bytes: Vec<u8>) {
        self.images.lock().unwrap().push_back(Ok(bytes));
    }

    /// Queue an error
    pub fn queue_error(&self, error: BackendError) {
        self.images.lock().unwrap().push_back(Err(error));
    }

    fn next(&self) -> Result<Vec<u8>, BackendError> {
        self.images
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::network("No mock image queued")))
    }
}

impl Default for MockImageBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageBackend for MockImageBackend {
    async fn generate_image(
        &self,
        prompt: &str,
        resolution: Resolution,
    ) -> Result<Vec<u8>, BackendError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), resolution));
        self.generation_started.notify_waiters();
        self.next()
    }

    async fn generate_image_variant(
        &self,
        source: &[u8],
        _resolution: Resolution,
    ) -> Result<Vec<u8>, BackendError> {
        self.variant_sources.lock().unwrap().push(source.to_vec());
        self.generation_started.notify_waiters();
        self.next()
    }
}

// ============================================================================
// Mock Balance Backend
// ============================================================================

/// Mock balance backend with a fixed snapshot
#[allow(dead_code)]
pub struct MockBalanceBackend {
    result: Mutex<Option<Result<Balance, BackendError>>>,
}

#[allow(dead_code)]
impl MockBalanceBackend {
    pub fn with_balance(balance: Balance) -> Self {
        Self {
            result: Mutex::new(Some(Ok(balance))),
        }
    }

    pub fn with_error(error: BackendError) -> Self {
        Self {
            result: Mutex::new(Some(Err(error))),
        }
    }
}

#[async_trait]
impl BalanceBackend for MockBalanceBackend {
    async fn balance(&self) -> Result<Balance, BackendError> {
        self.result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(BackendError::network("No mock balance configured")))
    }
}
