//! Runtime for chat sessions
//!
//! One `SessionRuntime` task per active session. The manager starts runtimes
//! lazily, hands out their channels, and stops them when a session is deleted.

mod session;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use session::{
    ChatReply, ReplySource, SessionCommand, SessionDeps, SessionEvent, SessionRuntime,
};
pub use traits::*;

use crate::db::{Database, DbError};
use crate::intent::{Catalog, ResolverSettings};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Session runtime stopped: {0}")]
    Stopped(String),
}

impl RuntimeError {
    #[cfg(test)]
    pub fn is_not_found(&self) -> bool {
        matches!(self, RuntimeError::Db(DbError::SessionNotFound(_)))
    }
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub command_tx: mpsc::Sender<SessionCommand>,
    pub broadcast_tx: broadcast::Sender<SessionEvent>,
    cancel: CancellationToken,
}

/// Manager for all session runtimes
pub struct RuntimeManager {
    db: Database,
    deps: SessionDeps,
    runtimes: RwLock<HashMap<String, SessionHandle>>,
}

impl RuntimeManager {
    pub fn new(
        db: Database,
        completer: Arc<dyn Completer>,
        sink: Arc<dyn CommandSink>,
        catalog: Arc<Catalog>,
        settings: ResolverSettings,
        system_prompt: impl Into<Arc<str>>,
    ) -> Self {
        let deps = SessionDeps {
            store: Arc::new(DatabaseStorage::new(db.clone())),
            completer,
            sink,
            catalog,
            settings,
            system_prompt: system_prompt.into(),
        };
        Self {
            db,
            deps,
            runtimes: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new session with a fresh id
    pub fn create_session(&self) -> Result<crate::db::Session, RuntimeError> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = self.db.create_session(&id)?;
        tracing::info!(session = %id, "Created session");
        Ok(session)
    }

    /// Get or create a runtime for a session
    pub async fn get_or_create(&self, session_id: &str) -> Result<SessionHandle, RuntimeError> {
        // Check if already running
        {
            let runtimes = self.runtimes.read().await;
            if let Some(handle) = runtimes.get(session_id) {
                return Ok(handle.clone());
            }
        }

        let mut runtimes = self.runtimes.write().await;
        // Another caller may have started it while we waited for the lock
        if let Some(handle) = runtimes.get(session_id) {
            return Ok(handle.clone());
        }

        let session = self.db.get_session(session_id)?;

        let (command_tx, command_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let cancel = CancellationToken::new();

        let runtime = SessionRuntime::new(
            session_id,
            self.deps.clone(),
            session.title.is_none(),
            command_rx,
            broadcast_tx.clone(),
            cancel.clone(),
        );

        let id = session_id.to_string();
        tokio::spawn(async move {
            runtime.run().await;
            tracing::info!(session = %id, "Session runtime finished");
        });

        let handle = SessionHandle {
            command_tx,
            broadcast_tx,
            cancel,
        };
        runtimes.insert(session_id.to_string(), handle.clone());
        Ok(handle)
    }

    /// Queue an utterance and wait for its reply
    pub async fn chat(&self, session_id: &str, text: &str) -> Result<ChatReply, RuntimeError> {
        let handle = self.get_or_create(session_id).await?;
        let (reply_tx, reply_rx) = oneshot::channel();
        handle
            .command_tx
            .send(SessionCommand::Utterance {
                text: text.to_string(),
                reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::Stopped(session_id.to_string()))?;
        reply_rx
            .await
            .map_err(|_| RuntimeError::Stopped(session_id.to_string()))
    }

    /// Clear memory and pending state, after any queued utterances
    pub async fn clear(&self, session_id: &str) -> Result<(), RuntimeError> {
        let handle = self.get_or_create(session_id).await?;
        let (done_tx, done_rx) = oneshot::channel();
        handle
            .command_tx
            .send(SessionCommand::Clear { done_tx })
            .await
            .map_err(|_| RuntimeError::Stopped(session_id.to_string()))?;
        done_rx
            .await
            .map_err(|_| RuntimeError::Stopped(session_id.to_string()))
    }

    /// Subscribe to session updates
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<broadcast::Receiver<SessionEvent>, RuntimeError> {
        let handle = self.get_or_create(session_id).await?;
        Ok(handle.broadcast_tx.subscribe())
    }

    /// Stop the session's runtime and delete it with its transcript
    pub async fn delete(&self, session_id: &str) -> Result<(), RuntimeError> {
        if let Some(handle) = self.runtimes.write().await.remove(session_id) {
            handle.cancel.cancel();
        }
        self.db.delete_session(session_id)?;
        tracing::info!(session = %session_id, "Deleted session");
        Ok(())
    }

    /// Number of running session runtimes
    #[cfg(test)]
    pub async fn active_count(&self) -> usize {
        self.runtimes.read().await.len()
    }

    /// Get the database handle
    pub fn db(&self) -> &Database {
        &self.db
    }
}
