//! Mock implementations for testing
//!
//! These mocks enable runtime testing without real I/O.

use super::traits::{CommandSink, Completer, TranscriptStore};
use crate::completion::CompletionError;
use crate::db::{Message, Sender};
use crate::relay::SceneCommand;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Completer
// ============================================================================

/// Completer that returns queued results and records prompts
pub struct MockCompleter {
    results: Mutex<VecDeque<Result<String, CompletionError>>>,
    /// (prompt, system prompt) of every call
    pub calls: Mutex<Vec<(String, String)>>,
}

impl MockCompleter {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_ok(&self, text: impl Into<String>) {
        self.results.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_err(&self, error: CompletionError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for MockCompleter {
    async fn complete(&self, prompt: &str, system_prompt: &str) -> Result<String, CompletionError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), system_prompt.to_string()));
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CompletionError::NoConnectivity))
    }
}

// ============================================================================
// Slow Completer
// ============================================================================

/// Completer that takes `delay` per call and tracks overlapping calls
pub struct SlowCompleter {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    /// Prompts in call order
    pub prompts: Mutex<Vec<String>>,
}

impl SlowCompleter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for SlowCompleter {
    async fn complete(&self, prompt: &str, _system_prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok("Slow Answer".to_string())
    }
}

// ============================================================================
// In-memory transcript
// ============================================================================

/// Transcript store backed by a `HashMap`
#[derive(Default)]
pub struct InMemoryTranscript {
    messages: Mutex<HashMap<String, Vec<Message>>>,
    titles: Mutex<HashMap<String, String>>,
}

impl InMemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self, session_id: &str) -> Vec<(Sender, String)> {
        self.messages
            .lock()
            .unwrap()
            .get(session_id)
            .map(|msgs| msgs.iter().map(|m| (m.sender, m.text.clone())).collect())
            .unwrap_or_default()
    }

    pub fn title(&self, session_id: &str) -> Option<String> {
        self.titles.lock().unwrap().get(session_id).cloned()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscript {
    async fn add_message(
        &self,
        session_id: &str,
        sender: Sender,
        text: &str,
    ) -> Result<Message, String> {
        let mut messages = self.messages.lock().unwrap();
        let session = messages.entry(session_id.to_string()).or_default();
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            sequence_id: i64::try_from(session.len()).unwrap_or(i64::MAX) + 1,
            sender,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        session.push(message.clone());
        Ok(message)
    }

    async fn set_title(&self, session_id: &str, title: &str) -> Result<(), String> {
        self.titles
            .lock()
            .unwrap()
            .insert(session_id.to_string(), title.to_string());
        Ok(())
    }
}

// ============================================================================
// Recording sink
// ============================================================================

/// Command sink that records everything published to it
#[derive(Default)]
pub struct RecordingSink {
    pub commands: Mutex<Vec<SceneCommand>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<SceneCommand> {
        self.commands.lock().unwrap().clone()
    }
}

impl CommandSink for RecordingSink {
    fn publish(&self, command: &SceneCommand) -> usize {
        self.commands.lock().unwrap().push(command.clone());
        1
    }
}
