//! Session storage
//!
//! The store is the only shared mutable state in the bot. Mutations go
//! through [`SessionStore::apply`], which runs the whole read-modify-write
//! under the store lock so two concurrent card actions on the same session
//! can never interleave a partial mutation.

use super::{Session, SessionMutation};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Storage for per-session conversational state.
///
/// Sessions are created lazily: reading an unknown key yields a default
/// session. Nothing here is durable — session loss on restart is accepted.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Snapshot of the session for `key` (default if never seen).
    async fn get(&self, key: &str) -> Session;

    /// Replace the session wholesale.
    async fn set(&self, key: &str, session: Session);

    /// Apply a mutation atomically and return the post-mutation snapshot.
    async fn apply(&self, key: &str, mutation: SessionMutation) -> Session;

    /// Reset the session to defaults (mode Chat, empty history).
    async fn clear(&self, key: &str);
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get(&self, key: &str) -> Session {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, session: Session) {
        (**self).set(key, session).await;
    }

    async fn apply(&self, key: &str, mutation: SessionMutation) -> Session {
        (**self).apply(key, mutation).await
    }

    async fn clear(&self, key: &str) {
        (**self).clear(key).await;
    }
}

/// Process-local session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Session {
        self.sessions
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    async fn set(&self, key: &str, session: Session) {
        self.sessions
            .lock()
            .unwrap()
            .insert(key.to_string(), session);
    }

    async fn apply(&self, key: &str, mutation: SessionMutation) -> Session {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.entry(key.to_string()).or_default();
        session.apply(&mutation);
        session.clone()
    }

    async fn clear(&self, key: &str) {
        self.sessions
            .lock()
            .unwrap()
            .insert(key.to_string(), Session::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Mode, Resolution, Turn};

    #[tokio::test]
    async fn unknown_key_yields_default_session() {
        let store = InMemorySessionStore::new();
        let session = store.get("nobody").await;
        assert_eq!(session, Session::default());
    }

    #[tokio::test]
    async fn clear_resets_mode_and_history() {
        let store = InMemorySessionStore::new();
        store
            .set(
                "s1",
                Session {
                    mode: Mode::RolePlay,
                    resolution: Resolution::R1024,
                    history: vec![Turn::system("be brief")],
                    temperature: Some(0.2),
                },
            )
            .await;

        store.clear("s1").await;

        let session = store.get("s1").await;
        assert_eq!(session.mode, Mode::Chat);
        assert!(session.history.is_empty());
        assert!(session.temperature.is_none());
    }

    #[tokio::test]
    async fn apply_returns_post_mutation_snapshot() {
        let store = InMemorySessionStore::new();
        let session = store.apply("s1", SessionMutation::EnterPicCreate).await;
        assert_eq!(session.mode, Mode::PicCreate);
        assert_eq!(session.resolution, Resolution::R256);
        // And the stored copy matches.
        assert_eq!(store.get("s1").await, session);
    }

    #[tokio::test]
    async fn concurrent_appends_never_interleave_partially() {
        let store = Arc::new(InMemorySessionStore::new());

        let mut tasks = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .apply(
                        "s1",
                        SessionMutation::AppendExchange {
                            user: format!("q{i}"),
                            assistant: format!("a{i}"),
                        },
                    )
                    .await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let history = store.get("s1").await.history;
        assert_eq!(history.len(), 64);
        // Every user turn must be immediately followed by its answer.
        for pair in history.chunks(2) {
            assert_eq!(pair[0].content[1..], pair[1].content[1..]);
        }
    }
}
