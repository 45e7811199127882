//! Ranking session store: keeps computed rankings in memory so a later request can export them.
//!
//! Sessions are addressed by UUID. The store also tracks the most recent insert, which
//! backs the "export latest" route. Capacity is bounded; the oldest insert is evicted first.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::session::RankingSession;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Arc<RankingSession>);
    async fn get(&self, id: Uuid) -> Option<Arc<RankingSession>>;
    async fn latest(&self) -> Option<Arc<RankingSession>>;
}

#[derive(Default)]
struct Sessions {
    by_id: HashMap<Uuid, Arc<RankingSession>>,
    /// Insertion order, oldest first. Its back is the latest session.
    order: VecDeque<Uuid>,
}

pub struct InMemorySessionStore {
    capacity: usize,
    inner: RwLock<Sessions>,
}

impl InMemorySessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(Sessions::default()),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: Arc<RankingSession>) {
        let mut sessions = self.inner.write().await;
        let id = session.id;
        if sessions.by_id.insert(id, session).is_some() {
            sessions.order.retain(|existing| *existing != id);
        }
        sessions.order.push_back(id);

        while sessions.order.len() > self.capacity {
            if let Some(evicted) = sessions.order.pop_front() {
                sessions.by_id.remove(&evicted);
                debug!("Evicted ranking session {evicted}");
            }
        }
    }

    async fn get(&self, id: Uuid) -> Option<Arc<RankingSession>> {
        self.inner.read().await.by_id.get(&id).cloned()
    }

    async fn latest(&self) -> Option<Arc<RankingSession>> {
        let sessions = self.inner.read().await;
        sessions
            .order
            .back()
            .and_then(|id| sessions.by_id.get(id))
            .cloned()
    }
}

#[cfg(test)]
impl InMemorySessionStore {
    async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }
}
