//! Session storage.
//!
//! Sessions live in process memory only. Each session sits behind its own
//! async mutex so turns for one key are serialised while different keys
//! proceed in parallel. The store itself is a short-held std mutex around
//! the key map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::session::{DEFAULT_SEEN_CAPACITY, Session};

/// Default upper bound on live sessions
pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

/// Shared reference to one session's state
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: String,
    inner: Arc<AsyncMutex<Session>>,
}

impl SessionHandle {
    fn new(session: Session) -> Self {
        Self {
            id: session.id.clone(),
            inner: Arc::new(AsyncMutex::new(session)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Run `f` with exclusive access to the session
    pub async fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> Session {
        self.inner.lock().await.clone()
    }
}

/// Get/create/evict access to sessions by key
pub trait SessionStore: Send + Sync {
    /// Return the session for `id`, creating it if absent, and mark it as
    /// recently used
    fn handle(&self, id: &str) -> SessionHandle;

    fn get(&self, id: &str) -> Option<SessionHandle>;

    /// Remove a session. Returns whether it existed.
    fn evict(&self, id: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct Entry {
    handle: SessionHandle,
    last_touched: u64,
}

/// In-memory store that drops the least recently touched session once
/// `capacity` is exceeded
#[derive(Debug)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Entry>>,
    capacity: usize,
    seen_capacity: usize,
    clock: AtomicU64,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}

impl InMemorySessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            seen_capacity: DEFAULT_SEEN_CAPACITY,
            clock: AtomicU64::new(0),
        }
    }

    /// Cap on remembered titles for sessions created by this store
    pub fn with_seen_capacity(mut self, seen_capacity: usize) -> Self {
        self.seen_capacity = seen_capacity;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn evict_overflow(&self, sessions: &mut HashMap<String, Entry>, keep: &str) {
        while sessions.len() > self.capacity {
            let oldest = sessions
                .iter()
                .filter(|(id, _)| id.as_str() != keep)
                .min_by_key(|(_, entry)| entry.last_touched)
                .map(|(id, _)| id.clone());

            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                    debug!(session_id = %id, "Evicted least recently used session");
                }
                None => break,
            }
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn handle(&self, id: &str) -> SessionHandle {
        let now = self.tick();
        let mut sessions = self.lock();

        if let Some(entry) = sessions.get_mut(id) {
            entry.last_touched = now;
            return entry.handle.clone();
        }

        let handle = SessionHandle::new(Session::new(id, self.seen_capacity));
        sessions.insert(
            id.to_string(),
            Entry {
                handle: handle.clone(),
                last_touched: now,
            },
        );
        debug!(session_id = %id, live = sessions.len(), "Created session");
        self.evict_overflow(&mut sessions, id);
        handle
    }

    fn get(&self, id: &str) -> Option<SessionHandle> {
        self.lock().get(id).map(|entry| entry.handle.clone())
    }

    fn evict(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::{SlotId, SlotValue};

    #[tokio::test]
    async fn test_handle_creates_and_reuses() {
        let store = InMemorySessionStore::new(4);
        let first = store.handle("s1");
        first
            .update(|s| s.set_slot(SlotId::EraPreference, SlotValue::plain("classic")))
            .await;

        let again = store.handle("s1");
        let snapshot = again.snapshot().await;
        assert_eq!(snapshot.slot(SlotId::EraPreference), Some(&SlotValue::plain("classic")));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let store = InMemorySessionStore::new(2);
        store.handle("a");
        store.handle("b");
        // touch "a" so "b" becomes the oldest
        store.handle("a");
        store.handle("c");

        assert_eq!(store.len(), 2);
        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
        assert!(store.get("c").is_some());
    }

    #[test]
    fn test_evict() {
        let store = InMemorySessionStore::default();
        store.handle("x");
        assert!(store.evict("x"));
        assert!(!store.evict("x"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_seen_capacity_applies_to_new_sessions() {
        let store = InMemorySessionStore::new(8).with_seen_capacity(2);
        let snapshot = store.handle("s").snapshot().await;
        assert_eq!(snapshot.seen_items.capacity(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(InMemorySessionStore::new(4));
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store.handle("shared").update(|s| s.turns += 1).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(store.handle("shared").snapshot().await.turns, 16);
    }
}
