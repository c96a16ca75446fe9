//! Session store implementations
//!
//! `JsonlSessionStore` appends one JSON document per line; reads scan the
//! whole file. `InMemorySessionStore` backs tests and dry runs.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use crate::domain::{SessionId, SessionRecord, StoredSession};
use crate::infrastructure::traits::{FileSystem, SessionStore};

/// Append-only JSON Lines file.
pub struct JsonlSessionStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonlSessionStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: PathBuf) -> Self {
        Self { fs, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> io::Result<Vec<StoredSession>> {
        if !self.fs.exists(&self.path) {
            return Ok(Vec::new());
        }
        let content = self.fs.read_to_string(&self.path)?;
        let mut sessions = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let session: StoredSession = serde_json::from_str(line).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{}:{}: {}", self.path.display(), idx + 1, e),
                )
            })?;
            sessions.push(session);
        }
        Ok(sessions)
    }
}

impl SessionStore for JsonlSessionStore {
    #[instrument(level = "debug", skip(self, record), fields(path = %self.path.display()))]
    fn log_session(&self, record: &SessionRecord) -> io::Result<SessionId> {
        let stored = StoredSession {
            id: SessionId::generate(),
            record: record.clone(),
        };
        let mut line = serde_json::to_string(&stored)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        line.push('\n');

        self.fs.ensure_parent(&self.path)?;
        self.fs.append(&self.path, &line)?;
        debug!("appended session {}", stored.id);
        Ok(stored.id)
    }

    fn sessions_for_user(&self, user_id: &str) -> io::Result<Vec<StoredSession>> {
        let mut sessions: Vec<StoredSession> = self
            .read_all()?
            .into_iter()
            .filter(|s| s.record.user_id == user_id)
            .collect();
        sort_newest_first(&mut sessions);
        Ok(sessions)
    }
}

/// Volatile store, lost when dropped.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<Vec<StoredSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything logged so far, in insertion order.
    pub fn all(&self) -> Vec<StoredSession> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<StoredSession>> {
        // a poisoned lock still holds consistent data: pushes are atomic
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for InMemorySessionStore {
    fn log_session(&self, record: &SessionRecord) -> io::Result<SessionId> {
        let id = SessionId::generate();
        self.lock().push(StoredSession {
            id: id.clone(),
            record: record.clone(),
        });
        Ok(id)
    }

    fn sessions_for_user(&self, user_id: &str) -> io::Result<Vec<StoredSession>> {
        let mut sessions: Vec<StoredSession> = self
            .lock()
            .iter()
            .filter(|s| s.record.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut sessions);
        Ok(sessions)
    }
}

/// ISO-8601 UTC timestamps of equal precision sort lexicographically.
/// The sort is stable, so equal timestamps keep reverse insertion order.
fn sort_newest_first(sessions: &mut Vec<StoredSession>) {
    sessions.reverse();
    sessions.sort_by(|a, b| b.record.timestamp.cmp(&a.record.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, ts: &str) -> SessionRecord {
        SessionRecord {
            user_id: user.into(),
            emotion_path: vec!["Sad".into(), "Lonely".into(), "Isolated".into()],
            leaf_emotion: "Isolated".into(),
            intensity: 6,
            trigger: String::new(),
            timestamp: ts.into(),
        }
    }

    #[test]
    fn given_mixed_users_when_querying_then_filters_and_orders_newest_first() {
        let store = InMemorySessionStore::new();
        store.log_session(&record("a", "2024-01-02T10:00:00.000Z")).unwrap();
        store.log_session(&record("b", "2024-01-03T10:00:00.000Z")).unwrap();
        store.log_session(&record("a", "2024-01-05T10:00:00.000Z")).unwrap();
        store.log_session(&record("a", "2024-01-01T10:00:00.000Z")).unwrap();

        let sessions = store.sessions_for_user("a").unwrap();

        let stamps: Vec<_> = sessions.iter().map(|s| s.record.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            vec![
                "2024-01-05T10:00:00.000Z",
                "2024-01-02T10:00:00.000Z",
                "2024-01-01T10:00:00.000Z"
            ]
        );
    }

    #[test]
    fn given_two_appends_when_logging_then_ids_differ() {
        let store = InMemorySessionStore::new();
        let r = record("a", "2024-01-02T10:00:00.000Z");

        let first = store.log_session(&r).unwrap();
        let second = store.log_session(&r).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.all().len(), 2);
    }
}
