//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the session runtime with mock implementations.

use crate::completion::{CompletionClient, CompletionError};
use crate::db::{Database, Message, Sender};
use crate::relay::{RelayHub, SceneCommand};
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for session transcripts
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Append a message to the session
    async fn add_message(
        &self,
        session_id: &str,
        sender: Sender,
        text: &str,
    ) -> Result<Message, String>;

    /// Set the session title
    async fn set_title(&self, session_id: &str, title: &str) -> Result<(), String>;
}

/// Client for remote completions
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &str, system_prompt: &str) -> Result<String, CompletionError>;
}

/// Destination for scene commands
pub trait CommandSink: Send + Sync {
    /// Publish one command; returns how many clients received it
    fn publish(&self, command: &SceneCommand) -> usize;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: TranscriptStore + ?Sized> TranscriptStore for Arc<T> {
    async fn add_message(
        &self,
        session_id: &str,
        sender: Sender,
        text: &str,
    ) -> Result<Message, String> {
        (**self).add_message(session_id, sender, text).await
    }

    async fn set_title(&self, session_id: &str, title: &str) -> Result<(), String> {
        (**self).set_title(session_id, title).await
    }
}

#[async_trait]
impl<T: Completer + ?Sized> Completer for Arc<T> {
    async fn complete(&self, prompt: &str, system_prompt: &str) -> Result<String, CompletionError> {
        (**self).complete(prompt, system_prompt).await
    }
}

impl<T: CommandSink + ?Sized> CommandSink for Arc<T> {
    fn publish(&self, command: &SceneCommand) -> usize {
        (**self).publish(command)
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as `TranscriptStore`
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TranscriptStore for DatabaseStorage {
    async fn add_message(
        &self,
        session_id: &str,
        sender: Sender,
        text: &str,
    ) -> Result<Message, String> {
        self.db
            .add_message(session_id, sender, text)
            .map_err(|e| e.to_string())
    }

    async fn set_title(&self, session_id: &str, title: &str) -> Result<(), String> {
        self.db
            .set_title(session_id, title)
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl Completer for CompletionClient {
    async fn complete(&self, prompt: &str, system_prompt: &str) -> Result<String, CompletionError> {
        CompletionClient::complete(self, prompt, system_prompt).await
    }
}

impl CommandSink for RelayHub {
    fn publish(&self, command: &SceneCommand) -> usize {
        self.publish_command(command)
    }
}
