//! Correlation of suspended requests with a browser session

use super::attributes::{SessionAttributeStore, StorageError};
use super::handle::SessionHandle;
use crate::error::{SessionError, SessionResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A suspended protocol request, ready to be resumed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationEntry {
    /// The protocol message's own ID
    pub id: String,
    /// Transport-encoded protocol message
    pub encoded_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_state: Option<String>,
    /// Transport-encoded processing context
    pub encoded_context: String,
}

/// All pending entries of one session, keyed by message ID
pub type CorrelationEntries = HashMap<String, CorrelationEntry>;

/// Reads and writes a session's pending entries through its attributes
#[derive(Clone)]
pub struct CorrelationStore {
    sessions: Arc<dyn SessionAttributeStore>,
    attribute_key: String,
}

impl CorrelationStore {
    pub fn new(sessions: Arc<dyn SessionAttributeStore>, attribute_key: impl Into<String>) -> Self {
        Self {
            sessions,
            attribute_key: attribute_key.into(),
        }
    }

    /// Insert `entry`, replacing any entry with the same ID.
    ///
    /// The session's current map is read, changed and written back whole;
    /// a session without a map gets a new one.
    pub async fn put(&self, session: &SessionHandle, entry: CorrelationEntry) -> SessionResult<()> {
        let mut entries = self.load(session).await?.unwrap_or_default();

        let request_id = entry.id.clone();
        if entries.insert(request_id.clone(), entry).is_some() {
            tracing::debug!(
                session = %session,
                request_id = %request_id,
                "Replaced pending SAML request with the same ID"
            );
        }

        let value = serde_json::to_value(&entries).map_err(|e| {
            SessionError::Storage(StorageError(format!(
                "Failed to serialize correlation entries: {e}"
            )))
        })?;
        self.sessions
            .set(session, &self.attribute_key, value)
            .await?;

        Ok(())
    }

    /// Look up the entry for `request_id`; `None` when nothing is pending
    pub async fn get(
        &self,
        session: &SessionHandle,
        request_id: &str,
    ) -> SessionResult<Option<CorrelationEntry>> {
        Ok(self
            .load(session)
            .await?
            .and_then(|mut entries| entries.remove(request_id)))
    }

    async fn load(&self, session: &SessionHandle) -> SessionResult<Option<CorrelationEntries>> {
        let Some(value) = self.sessions.get(session, &self.attribute_key).await? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| SessionError::CorruptMapping(e.to_string()))
    }
}
