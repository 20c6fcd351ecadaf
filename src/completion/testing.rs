//! Scripted collaborators for completion client tests

use super::connectivity::ConnectivityProbe;
use super::error::TransportError;
use super::types::{BackendReply, CompletionRequest, Provider};
use super::CompletionBackend;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Backend that plays back queued outcomes and records which models it saw
pub struct ScriptedBackend {
    outcomes: Mutex<VecDeque<Result<BackendReply, TransportError>>>,
    pub requests: Mutex<Vec<(String, CompletionRequest)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn then(self, outcome: Result<BackendReply, TransportError>) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn models_called(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn send(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<BackendReply, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("No scripted outcome queued")))
    }

    fn provider(&self) -> Provider {
        Provider::Gemini
    }
}

/// Probe with a fixed answer that counts how often it was asked
pub struct FixedProbe {
    online: bool,
    pub checks: AtomicUsize,
}

impl FixedProbe {
    pub fn online() -> Self {
        Self {
            online: true,
            checks: AtomicUsize::new(0),
        }
    }

    pub fn offline() -> Self {
        Self {
            online: false,
            checks: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for FixedProbe {
    async fn is_online(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.online
    }
}
