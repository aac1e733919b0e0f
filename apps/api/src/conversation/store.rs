//! In-memory session store.
//!
//! Each session key maps to its own `tokio::sync::Mutex`, held for the whole turn
//! (including the model calls). Turns on one key are serialized; different keys
//! never contend beyond the brief map lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::models::conversation::ConversationState;

type SessionSlot = Arc<AsyncMutex<ConversationState>>;

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, SessionSlot>>,
}

/// Exclusive access to one session for the duration of a turn.
pub struct SessionGuard {
    key: String,
    slot: SessionSlot,
    state: OwnedMutexGuard<ConversationState>,
}

impl SessionGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Replaces the stored state. Only called once a turn has fully succeeded.
    pub fn save(&mut self, state: ConversationState) {
        *self.state = state;
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> SessionSlot {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!("Creating session {key}");
                Arc::new(AsyncMutex::new(ConversationState::new()))
            })
            .clone()
    }

    /// Gets or creates the session and waits for exclusive access to it.
    pub async fn acquire(&self, key: &str) -> SessionGuard {
        let slot = self.slot(key);
        let state = slot.clone().lock_owned().await;
        SessionGuard {
            key: key.to_string(),
            slot,
            state,
        }
    }

    /// False once the guard's session was removed (or removed and recreated)
    /// after it was acquired; anything saved through it is no longer reachable.
    pub fn is_current(&self, guard: &SessionGuard) -> bool {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .get(guard.key())
            .is_some_and(|slot| Arc::ptr_eq(slot, &guard.slot))
    }

    /// Copy of the session's state, waiting for any in-flight turn to finish.
    pub async fn snapshot(&self, key: &str) -> Option<ConversationState> {
        let slot = {
            let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.get(key).cloned()
        }?;
        let state = slot.lock().await;
        Some(state.clone())
    }

    /// Forgets the session. A turn already holding its guard finishes against the
    /// detached state; the next `acquire` starts fresh.
    pub fn remove(&self, key: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}
