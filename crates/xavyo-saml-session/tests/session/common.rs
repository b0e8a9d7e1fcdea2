//! Shared fixtures for session manager tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use xavyo_saml_session::logging::init_test_logging;
use xavyo_saml_session::{
    AuthnRequest, InMemorySessionAttributeStore, MessageContext, SamlBinding,
    SamlIdPSessionManager, SessionAttributeStore, SessionHandle, StorageError,
};

pub const SP_ENTITY_ID: &str = "https://sp.example.com/saml/metadata";
pub const SP_ACS_URL: &str = "https://sp.example.com/saml/acs";

/// Session attributes that count every read and write
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemorySessionAttributeStore,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl CountingStore {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionAttributeStore for CountingStore {
    async fn get(&self, session: &SessionHandle, key: &str) -> Result<Option<Value>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(session, key).await
    }

    async fn set(
        &self,
        session: &SessionHandle,
        key: &str,
        value: Value,
    ) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(session, key, value).await
    }
}

/// Session attributes whose backend is down
pub struct FailingStore;

#[async_trait]
impl SessionAttributeStore for FailingStore {
    async fn get(&self, _: &SessionHandle, _: &str) -> Result<Option<Value>, StorageError> {
        Err(StorageError("session backend unavailable".to_string()))
    }

    async fn set(&self, _: &SessionHandle, _: &str, _: Value) -> Result<(), StorageError> {
        Err(StorageError("session backend unavailable".to_string()))
    }
}

pub fn setup() -> (Arc<CountingStore>, SamlIdPSessionManager) {
    init_test_logging();
    let sessions = Arc::new(CountingStore::default());
    let manager = SamlIdPSessionManager::new(sessions.clone());
    (sessions, manager)
}

pub fn authn_request(id: &str) -> AuthnRequest {
    let mut request = AuthnRequest::new(id, SP_ENTITY_ID);
    request.destination = Some("https://idp.example.com/saml/sso".to_string());
    request.assertion_consumer_service_url = Some(SP_ACS_URL.to_string());
    request.force_authn = true;
    request
}

pub fn pending(id: &str, relay_state: &str) -> MessageContext<AuthnRequest> {
    MessageContext::new(authn_request(id))
        .with_relay_state(relay_state)
        .with_binding(SamlBinding::HttpRedirect)
        .with_extension("mfa", "required")
}

/// Parameters of the request the login page redirects back with
pub fn resume_params(id: &str) -> HashMap<String, String> {
    HashMap::from([("AuthnRequestId".to_string(), id.to_string())])
}
