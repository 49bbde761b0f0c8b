//! Application state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use swapchain_flow::{ProposalController, SwapExecutor};
use swapchain_keys::{ChainKeyValidator, RandomSecretGenerator, SecretGenerator};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// A proposal as hosted by the node.
pub type Proposal = ProposalController<ChainKeyValidator, dyn SwapExecutor>;

/// One user's proposal session.
#[derive(Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub proposal: Arc<RwLock<Proposal>>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Live sessions.
    pub sessions: Arc<RwLock<HashMap<Uuid, Session>>>,

    /// Executor every submission runs on.
    pub executor: Arc<dyn SwapExecutor>,

    /// Source of HTLC secrets for new drafts.
    pub secrets: Arc<dyn SecretGenerator>,

    pub keys: ChainKeyValidator,
}

impl AppState {
    pub fn new(executor: Arc<dyn SwapExecutor>) -> Self {
        Self::with_secrets(executor, Arc::new(RandomSecretGenerator))
    }

    pub fn with_secrets(executor: Arc<dyn SwapExecutor>, secrets: Arc<dyn SecretGenerator>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            executor,
            secrets,
            keys: ChainKeyValidator::new(),
        }
    }

    /// Start a session with a fresh default draft.
    pub async fn create_session(&self) -> Session {
        let proposal = Proposal::create(self.secrets.as_ref(), self.keys, Arc::clone(&self.executor));
        let session = Session {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            proposal: Arc::new(RwLock::new(proposal)),
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, session.clone());
        info!("Created proposal session {}", session.id);

        session
    }

    /// Get a session by ID.
    pub async fn get_session(&self, id: Uuid) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).cloned()
    }

    /// Drop a session. A running swap still records its outcome on the
    /// detached proposal.
    pub async fn remove_session(&self, id: Uuid) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(&id);
        if removed.is_some() {
            info!("Discarded proposal session {}", id);
        }
        removed
    }

    /// List all sessions, oldest first.
    pub async fn list_sessions(&self) -> Vec<Session> {
        let sessions = self.sessions.read().await;
        let mut list: Vec<Session> = sessions.values().cloned().collect();
        list.sort_by_key(|s| s.created_at);
        list
    }
}
