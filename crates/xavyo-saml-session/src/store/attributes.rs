//! Session attribute storage
//!
//! Provides the key-value view of a browser session that the correlation
//! store reads and writes. Values are JSON so replicated or database-backed
//! session layers can hold them without knowing their shape.

use super::handle::SessionHandle;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Session storage backend failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StorageError(pub String);

/// Key-value attributes of a browser session
#[async_trait]
pub trait SessionAttributeStore: Send + Sync {
    /// Read the attribute stored under `key`, if any
    async fn get(&self, session: &SessionHandle, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace the attribute stored under `key`
    async fn set(&self, session: &SessionHandle, key: &str, value: Value)
        -> Result<(), StorageError>;
}

/// In-memory session attributes for testing and single-node deployments
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionAttributeStore {
    attributes: Arc<RwLock<HashMap<(SessionHandle, String), Value>>>,
}

impl InMemorySessionAttributeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every attribute of a session, as session expiry would
    pub async fn invalidate(&self, session: &SessionHandle) -> usize {
        let mut attributes = self.attributes.write().await;
        let before = attributes.len();
        attributes.retain(|(handle, _), _| handle != session);
        before - attributes.len()
    }
}

#[async_trait]
impl SessionAttributeStore for InMemorySessionAttributeStore {
    async fn get(&self, session: &SessionHandle, key: &str) -> Result<Option<Value>, StorageError> {
        let attributes = self.attributes.read().await;
        Ok(attributes.get(&(*session, key.to_string())).cloned())
    }

    async fn set(
        &self,
        session: &SessionHandle,
        key: &str,
        value: Value,
    ) -> Result<(), StorageError> {
        let mut attributes = self.attributes.write().await;
        attributes.insert((*session, key.to_string()), value);
        Ok(())
    }
}
