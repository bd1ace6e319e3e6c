//! Cardbot - conversation-mode dispatcher for a chat-platform AI bot
//!
//! A webhook service that routes card interactions and text messages
//! through a per-session mode state machine: plain chat, picture creation,
//! and role play.

mod action;
mod api;
mod backend;
mod cards;
mod config;
mod dispatch;
mod jobs;
mod platform;
mod roles;
mod session;
#[cfg(test)]
mod testing;

use api::{create_router, AppState};
use backend::OpenAiBackend;
use config::BotConfig;
use dispatch::Dispatcher;
use jobs::ImageJobRunner;
use platform::HttpMessenger;
use session::InMemorySessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardbot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env();
    if !config.has_backend_key() {
        tracing::warn!("No backend API key configured. Set OPENAI_API_KEY.");
    }

    // Wire capabilities
    let store = Arc::new(InMemorySessionStore::new());
    let messenger = Arc::new(HttpMessenger::new(
        &config.platform_base_url,
        &config.platform_token,
        config.request_timeout,
    ));
    let backend = Arc::new(OpenAiBackend::new(
        config.backend_api_key.clone(),
        config.backend_base_url.as_deref(),
        config.request_timeout,
    ));

    let jobs = ImageJobRunner::new(backend.clone(), messenger.clone());
    let dispatcher = Dispatcher::new(
        store,
        messenger,
        backend.clone(),
        backend,
        jobs,
    );

    let state = AppState::new(dispatcher);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Cardbot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
