//! In-Memory Stream Registry Implementation

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::application::ports::{StreamRegistryError, StreamRegistryPort, StreamSession};
use crate::domain::StreamKey;

/// 内存流式会话注册表
///
/// 同一键已有活动会话时拒绝新的登记
pub struct InMemoryStreamRegistry {
    sessions: DashMap<StreamKey, StreamSession>,
}

impl InMemoryStreamRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for InMemoryStreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamRegistryPort for InMemoryStreamRegistry {
    fn register(&self, key: StreamKey) -> Result<StreamSession, StreamRegistryError> {
        match self.sessions.entry(key) {
            Entry::Occupied(_) => Err(StreamRegistryError::AlreadyActive(key)),
            Entry::Vacant(slot) => {
                let session = StreamSession::new(key);
                slot.insert(session.clone());
                tracing::debug!(stream_key = %key, session_id = %session.id, "Stream registered");
                Ok(session)
            }
        }
    }

    fn cancel(&self, key: &StreamKey) -> bool {
        match self.sessions.get(key) {
            Some(session) => {
                session.cancel();
                true
            }
            None => false,
        }
    }

    fn release(&self, key: &StreamKey, session_id: Uuid) -> bool {
        let removed = self
            .sessions
            .remove_if(key, |_, session| session.id == session_id)
            .is_some();
        if removed {
            tracing::debug!(stream_key = %key, session_id = %session_id, "Stream released");
        }
        removed
    }

    fn is_active(&self, key: &StreamKey) -> bool {
        self.sessions.contains_key(key)
    }

    fn active_keys(&self) -> Vec<StreamKey> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StreamVariant;

    fn key() -> StreamKey {
        StreamKey::new(Uuid::new_v4(), StreamVariant::Chapter(1))
    }

    #[test]
    fn test_second_register_is_rejected() {
        let registry = InMemoryStreamRegistry::new();
        let key = key();

        let first = registry.register(key).unwrap();
        assert!(matches!(
            registry.register(key),
            Err(StreamRegistryError::AlreadyActive(k)) if k == key
        ));
        assert_eq!(registry.len(), 1);
        assert!(!first.is_cancelled());
    }

    #[test]
    fn test_cancel_sets_shared_flag() {
        let registry = InMemoryStreamRegistry::new();
        let key = key();
        let session = registry.register(key).unwrap();

        assert!(registry.cancel(&key));
        assert!(session.is_cancelled());
        assert!(!registry.cancel(&StreamKey::new(Uuid::new_v4(), StreamVariant::Outline)));
    }

    #[test]
    fn test_release_only_by_owner_session() {
        let registry = InMemoryStreamRegistry::new();
        let key = key();
        let session = registry.register(key).unwrap();

        assert!(!registry.release(&key, Uuid::new_v4()));
        assert!(registry.is_active(&key));

        assert!(registry.release(&key, session.id));
        assert!(registry.is_empty());

        // 释放后可重新登记
        let next = registry.register(key).unwrap();
        assert_ne!(next.id, session.id);
        assert_eq!(registry.active_keys(), vec![key]);
    }

    #[test]
    fn test_concurrent_register_single_winner() {
        let registry = Arc::new(InMemoryStreamRegistry::new());
        let key = key();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.register(key).is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(registry.len(), 1);
    }
}
