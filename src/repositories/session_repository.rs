use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::models::{CartLine, LineRequest, RepositoryError, RepositoryResult, Session};

/// Trait defining the interface for session and cart storage
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session
    async fn create(&self, session: Session) -> RepositoryResult<Session>;

    /// Find a session by ID
    async fn find(&self, id: Uuid) -> RepositoryResult<Option<Session>>;

    /// Replace a stored session
    async fn update(&self, session: Session) -> RepositoryResult<Session>;

    /// Price and append a line to the session's cart and mark the session
    /// active. Returns the new line and the updated session.
    async fn add_line(
        &self,
        id: Uuid,
        request: LineRequest,
    ) -> RepositoryResult<(CartLine, Session)>;

    /// Empty the session's cart, returning how many lines were dropped
    async fn clear_cart(&self, id: Uuid) -> RepositoryResult<usize>;

    /// Remove a session. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;

    /// Number of live sessions
    async fn count(&self) -> RepositoryResult<usize>;

    /// Drop every session idle for longer than `max_idle`, returning how many went
    async fn purge_idle(&self, max_idle: Duration) -> RepositoryResult<usize>;
}

/// Process-local session store. Carts live only as long as the process.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn create(&self, session: Session) -> RepositoryResult<Session> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(RepositoryError::ConstraintViolation {
                message: format!("Session {} already exists", session.id),
            });
        }
        sessions.insert(session.id, session.clone());
        debug!(live_sessions = sessions.len(), "Session stored");
        Ok(session)
    }

    async fn find(&self, id: Uuid) -> RepositoryResult<Option<Session>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn update(&self, session: Session) -> RepositoryResult<Session> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(session)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    #[instrument(skip(self, request), fields(session_id = %id, item_id = %request.item_id()))]
    async fn add_line(
        &self,
        id: Uuid,
        request: LineRequest,
    ) -> RepositoryResult<(CartLine, Session)> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        let line = session.cart.add_line(&request);
        session.touch();
        Ok((line, session.clone()))
    }

    #[instrument(skip(self), fields(session_id = %id))]
    async fn clear_cart(&self, id: Uuid) -> RepositoryResult<usize> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        let dropped = session.cart.len();
        session.cart.clear();
        session.touch();
        Ok(dropped)
    }

    #[instrument(skip(self), fields(session_id = %id))]
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn count(&self) -> RepositoryResult<usize> {
        Ok(self.sessions.read().await.len())
    }

    #[instrument(skip(self))]
    async fn purge_idle(&self, max_idle: Duration) -> RepositoryResult<usize> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(now, max_idle));
        let purged = before - sessions.len();

        if purged > 0 {
            info!(purged, remaining = sessions.len(), "Purged idle sessions");
        }

        Ok(purged)
    }
}
