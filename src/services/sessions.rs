use crate::core::Session;
use std::time::Duration;

/// In-memory session store.
///
/// Sessions are keyed by an opaque token handed to the client at
/// session start. Entries expire after the configured TTL; nothing is
/// persisted across restarts.
pub struct SessionManager {
    sessions: moka::future::Cache<String, Session>,
}

impl SessionManager {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let sessions = moka::future::CacheBuilder::new(capacity)
            .time_to_idle(Duration::from_secs(ttl_secs))
            .build();

        Self { sessions }
    }

    /// Store a new session and return its token
    pub async fn create(&self, session: Session) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), session).await;
        token
    }

    pub async fn get(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).await
    }

    /// Write back a mutated session
    pub async fn update(&self, token: &str, session: Session) {
        self.sessions.insert(token.to_string(), session).await;
    }

    pub async fn remove(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }

    pub fn len(&self) -> u64 {
        self.sessions.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let manager = SessionManager::new(100, 60);
        let session = Session::new(
            "a@students.iitmandi.ac.in".to_string(),
            vec!["p1".to_string(), "p2".to_string()],
        );

        let token = manager.create(session).await;
        let fetched = manager.get(&token).await.expect("session should exist");

        assert_eq!(fetched.email(), "a@students.iitmandi.ac.in");
        assert_eq!(fetched.total(), 2);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let manager = SessionManager::new(100, 60);
        assert!(manager.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_update_roundtrip() {
        let manager = SessionManager::new(100, 60);
        let session = Session::new("a@x.com".to_string(), vec!["p1".to_string()]);
        let token = manager.create(session).await;

        let mut session = manager.get(&token).await.unwrap();
        session.skip();
        manager.update(&token, session).await;

        let fetched = manager.get(&token).await.unwrap();
        assert!(fetched.exhausted());
    }
}
