//! HTTP API for decor-chat
//!
//! Session routes, the per-session SSE stream and the relay websocket.

mod handlers;
mod relay_socket;
mod sse;
mod types;

pub use handlers::create_router;

use crate::intent::Catalog;
use crate::relay::RelayHub;
use crate::runtime::RuntimeManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<RuntimeManager>,
    pub relay: Arc<RelayHub>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(runtime: Arc<RuntimeManager>, relay: Arc<RelayHub>, catalog: Arc<Catalog>) -> Self {
        Self {
            runtime,
            relay,
            catalog,
        }
    }
}
