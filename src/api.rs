//! HTTP webhook surface
//!
//! Two inbound endpoints, one per platform callback: card interactions and
//! message events. Both always answer 200 — the platform retries non-2xx
//! responses, and a retry of a mutating action is worse than a dropped
//! reply.

mod handlers;

pub use handlers::create_router;

use crate::dispatch::Dispatcher;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}
