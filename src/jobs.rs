//! Detached image-generation jobs
//!
//! Image generation is too slow to run inside a webhook handler, so the
//! dispatcher acknowledges immediately and hands the work to this runner.
//! Every spawned job delivers exactly one terminal message: the finished
//! image card on success, a failure notice on any error. A job that said
//! nothing would leave the user staring at a spinner forever.

use crate::action::kinds;
use crate::backend::ImageBackend;
use crate::cards;
use crate::platform::{MediaRef, Messenger, OutboundContent, ReplyContext};
use crate::session::Resolution;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// What to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageJobSpec {
    /// Fresh generation from a text prompt.
    Prompt {
        prompt: String,
        resolution: Resolution,
    },
    /// Variation of an image previously uploaded to the platform.
    Variant {
        source: MediaRef,
        resolution: Resolution,
    },
}

/// Spawns detached image jobs. Holds its capabilities behind trait objects
/// so tests can substitute mocks.
pub struct ImageJobRunner {
    backend: Arc<dyn ImageBackend>,
    messenger: Arc<dyn Messenger>,
}

impl ImageJobRunner {
    pub fn new(backend: Arc<dyn ImageBackend>, messenger: Arc<dyn Messenger>) -> Self {
        Self { backend, messenger }
    }

    /// Spawn a detached job. Returns the handle so tests can await
    /// completion; production callers drop it.
    pub fn spawn(&self, spec: ImageJobSpec, ctx: ReplyContext) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let messenger = Arc::clone(&self.messenger);
        tokio::spawn(async move {
            run_job(&*backend, &*messenger, spec, ctx).await;
        })
    }
}

async fn run_job(
    backend: &dyn ImageBackend,
    messenger: &dyn Messenger,
    spec: ImageJobSpec,
    ctx: ReplyContext,
) {
    match produce(backend, messenger, &spec).await {
        Ok(image) => {
            let (kind, value) = regenerate_handle(&spec, &image);
            let card = cards::image_result_card(
                image.clone(),
                kind,
                &value,
                &ctx.session_key,
                &ctx.message_id,
            );
            info!(session_key = %ctx.session_key, image = %image.as_str(), "image job finished");
            if let Err(e) = messenger
                .deliver(&ctx, OutboundContent::Card(cards::render(&card)))
                .await
            {
                error!(session_key = %ctx.session_key, error = %e, "failed to deliver image result");
            }
        }
        Err(detail) => {
            error!(session_key = %ctx.session_key, error = %detail, "image job failed");
            let card = cards::generation_failed_notice(&detail);
            if let Err(e) = messenger
                .deliver(&ctx, OutboundContent::Card(cards::render(&card)))
                .await
            {
                error!(session_key = %ctx.session_key, error = %e, "failed to deliver failure notice");
            }
        }
    }
}

/// Generate and upload, collapsing every failure into a displayable string.
async fn produce(
    backend: &dyn ImageBackend,
    messenger: &dyn Messenger,
    spec: &ImageJobSpec,
) -> Result<MediaRef, String> {
    let bytes = match spec {
        ImageJobSpec::Prompt { prompt, resolution } => backend
            .generate_image(prompt, *resolution)
            .await
            .map_err(|e| e.to_string())?,
        ImageJobSpec::Variant { source, resolution } => {
            let source_bytes = messenger
                .fetch_media(source)
                .await
                .map_err(|e| e.to_string())?;
            backend
                .generate_image_variant(&source_bytes, *resolution)
                .await
                .map_err(|e| e.to_string())?
        }
    };

    messenger
        .upload_media(bytes)
        .await
        .map_err(|e| e.to_string())
}

/// The regenerate button on the result card re-enters the pipeline: prompt
/// jobs carry the prompt again, variant jobs carry the fresh image key.
fn regenerate_handle(spec: &ImageJobSpec, uploaded: &MediaRef) -> (&'static str, String) {
    match spec {
        ImageJobSpec::Prompt { prompt, .. } => (kinds::PIC_TEXT_MORE, prompt.clone()),
        ImageJobSpec::Variant { .. } => (kinds::PIC_VAR_MORE, uploaded.as_str().to_string()),
    }
}
