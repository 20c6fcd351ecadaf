//! Per-session runtime
//!
//! Owns one session's resolver context and processes its utterances strictly
//! in arrival order. Every request goes through a single `mpsc` consumer, so
//! a resolution always runs to completion before the next one (or a clear)
//! starts.

use super::traits::{CommandSink, Completer, TranscriptStore};
use crate::completion::CompletionError;
use crate::db::Sender;
use crate::intent::{
    resolve, Catalog, Effect, IntentKind, Language, ResolverContext, ResolverSettings,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Local,
    Remote,
    Error,
}

/// Result of one utterance
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub source: ReplySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentKind>,
    /// Failure class when `source` is `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

/// Requests accepted by a session runtime
#[derive(Debug)]
pub enum SessionCommand {
    Utterance {
        text: String,
        reply_tx: oneshot::Sender<ChatReply>,
    },
    Clear {
        done_tx: oneshot::Sender<()>,
    },
}

/// Events sent to SSE subscribers
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Init {
        session: serde_json::Value,
        messages: Vec<serde_json::Value>,
    },
    Reply {
        text: String,
        source: ReplySource,
        /// The browser speaks replies flagged this way
        speak: bool,
    },
    Cleared,
}

/// Collaborators and settings shared by every session
#[derive(Clone)]
pub struct SessionDeps {
    pub store: Arc<dyn TranscriptStore>,
    pub completer: Arc<dyn Completer>,
    pub sink: Arc<dyn CommandSink>,
    pub catalog: Arc<Catalog>,
    pub settings: ResolverSettings,
    pub system_prompt: Arc<str>,
}

pub struct SessionRuntime {
    session_id: String,
    context: ResolverContext,
    deps: SessionDeps,
    needs_title: bool,
    /// First user message, titled once its reply has gone out
    title_source: Option<String>,
    command_rx: mpsc::Receiver<SessionCommand>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    cancel: CancellationToken,
}

impl SessionRuntime {
    pub fn new(
        session_id: impl Into<String>,
        deps: SessionDeps,
        needs_title: bool,
        command_rx: mpsc::Receiver<SessionCommand>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            context: ResolverContext::new(),
            deps,
            needs_title,
            title_source: None,
            command_rx,
            broadcast_tx,
            cancel,
        }
    }

    /// Main loop
    pub async fn run(mut self) {
        tracing::info!(session = %self.session_id, "Starting session runtime");

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                command = self.command_rx.recv() => match command {
                    Some(SessionCommand::Utterance { text, reply_tx }) => {
                        let reply = self.handle_utterance(&text).await;
                        // Caller may have gone away; the reply is already persisted
                        let _ = reply_tx.send(reply);
                        self.settle_title().await;
                    }
                    Some(SessionCommand::Clear { done_tx }) => {
                        self.clear();
                        let _ = done_tx.send(());
                    }
                    None => break,
                },
            }
        }

        tracing::info!(session = %self.session_id, "Session runtime stopped");
    }

    /// Reset remembered furniture and the pending slot together
    pub fn clear(&mut self) {
        self.context.clear();
        tracing::info!(session = %self.session_id, "Session memory cleared");
        let _ = self.broadcast_tx.send(SessionEvent::Cleared);
    }

    #[cfg(test)]
    pub fn context(&self) -> &ResolverContext {
        &self.context
    }

    /// Resolve one utterance locally or remotely, persist and broadcast the reply
    pub async fn handle_utterance(&mut self, text: &str) -> ChatReply {
        if !text.trim().is_empty() {
            self.persist(Sender::User, text).await;
            if self.needs_title {
                self.needs_title = false;
                self.title_source = Some(text.to_string());
            }
        }

        let reply = match resolve(
            &self.context,
            &self.deps.catalog,
            &self.deps.settings,
            text,
            chrono::Utc::now(),
        ) {
            Some(resolution) => {
                tracing::info!(
                    session = %self.session_id,
                    intent = ?resolution.intent,
                    pending = ?resolution.context.pending.pending_action(),
                    remembered = resolution.context.memory.len(),
                    "Resolved locally"
                );
                self.context = resolution.context;
                for effect in &resolution.effects {
                    match effect {
                        Effect::Relay(command) => {
                            let delivered = self.deps.sink.publish(command);
                            tracing::debug!(session = %self.session_id, ?command, delivered, "Published scene command");
                        }
                    }
                }
                ChatReply {
                    reply: resolution.reply,
                    source: ReplySource::Local,
                    intent: Some(resolution.intent),
                    error: None,
                }
            }
            None => self.complete_remotely(text).await,
        };

        self.persist(Sender::Assistant, &reply.reply).await;
        let _ = self.broadcast_tx.send(SessionEvent::Reply {
            text: reply.reply.clone(),
            source: reply.source,
            speak: true,
        });
        reply
    }

    async fn complete_remotely(&mut self, text: &str) -> ChatReply {
        if let Some(language) = Language::detect(text) {
            self.context.language = language;
        }

        match self
            .deps
            .completer
            .complete(text, &self.deps.system_prompt)
            .await
        {
            Ok(reply) => ChatReply {
                reply: reply.trim().to_string(),
                source: ReplySource::Remote,
                intent: None,
                error: None,
            },
            Err(e) => {
                tracing::warn!(session = %self.session_id, kind = e.kind(), error = %e, "Remote completion failed");
                ChatReply {
                    reply: failure_reply(&e, self.context.language),
                    source: ReplySource::Error,
                    intent: None,
                    error: Some(e.kind()),
                }
            }
        }
    }

    async fn persist(&self, sender: Sender, text: &str) {
        if let Err(e) = self
            .deps
            .store
            .add_message(&self.session_id, sender, text)
            .await
        {
            tracing::error!(session = %self.session_id, %sender, error = %e, "Failed to persist message");
        }
    }

    /// Title the session from its first message.
    ///
    /// Runs after the reply has been sent, on the runtime's own task, so it
    /// never overlaps the reply's completion call.
    pub async fn settle_title(&mut self) {
        let Some(first_message) = self.title_source.take() else {
            return;
        };

        let title = crate::title_generator::title_for(&first_message, self.deps.completer.as_ref()).await;
        match self.deps.store.set_title(&self.session_id, &title).await {
            Ok(()) => tracing::info!(session = %self.session_id, title = %title, "Session titled"),
            Err(e) => tracing::warn!(session = %self.session_id, error = %e, "Failed to set title"),
        }
    }
}

/// User-facing message for a failed remote completion
pub fn failure_reply(error: &CompletionError, language: Language) -> String {
    match (error, language) {
        (CompletionError::NoConnectivity, Language::Arabic) => {
            "📡 مفيش اتصال بالإنترنت دلوقتي. اتأكد من الشبكة وجرب تاني.".to_string()
        }
        (CompletionError::NoConnectivity, Language::English) => {
            "📡 There's no internet connection right now. Check your network and try again.".to_string()
        }
        (CompletionError::Network { .. }, Language::Arabic) => {
            "⚠️ حصلت مشكلة في الاتصال بالخدمة. جرب تاني بعد شوية.".to_string()
        }
        (CompletionError::Network { .. }, Language::English) => {
            "⚠️ I couldn't reach the assistant service. Please try again shortly.".to_string()
        }
        (CompletionError::AllModelsFailed { .. } | CompletionError::NoCandidates, Language::Arabic) => {
            "⏳ كل النماذج مشغولة دلوقتي. جرب تاني بعد دقيقة.".to_string()
        }
        (CompletionError::AllModelsFailed { .. } | CompletionError::NoCandidates, Language::English) => {
            "⏳ All models are busy right now. Please try again in a minute.".to_string()
        }
        (CompletionError::FatalProvider { .. }, Language::Arabic) => {
            "❌ الخدمة رجعت خطأ. لو المشكلة استمرت راجع إعدادات المفتاح.".to_string()
        }
        (CompletionError::FatalProvider { .. }, Language::English) => {
            "❌ The assistant service returned an error. If this keeps happening, check the API key settings.".to_string()
        }
    }
}
