//! Store and resume behavior of the session manager

#[cfg(test)]
mod tests {
    use super::super::common::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use xavyo_saml_session::{
        AuthnRequest, CodecError, CorrelationStore, LogoutRequest, MessageContext,
        SamlIdPSessionManager, SessionAttributeStore, SessionError, SessionHandle,
    };

    // ============================================================
    // Round Trip Tests
    // ============================================================

    #[tokio::test]
    async fn test_store_and_fetch_round_trip() {
        let (_, manager) = setup();
        let session = SessionHandle::new();
        let context = pending("_a1b2c3", "https://app.example.com/dashboard");

        manager.store_request(&session, &context).await.unwrap();

        let resumed = manager
            .fetch_request::<AuthnRequest, _>(&session, &resume_params("_a1b2c3"))
            .await
            .unwrap()
            .expect("pending request should be found");

        assert_eq!(resumed, context);
        assert_eq!(resumed.message.issuer, SP_ENTITY_ID);
        assert_eq!(
            resumed.relay_state.as_deref(),
            Some("https://app.example.com/dashboard")
        );
        assert_eq!(resumed.extensions.get("mfa").map(String::as_str), Some("required"));
    }

    #[tokio::test]
    async fn test_issuer_whitespace_survives_round_trip() {
        let (_, manager) = setup();
        let session = SessionHandle::new();
        let mut request = authn_request("_ws");
        request.issuer = " https://sp.example.com\n".to_string();
        let context = MessageContext::new(request).with_relay_state("state");

        manager.store_request(&session, &context).await.unwrap();

        let resumed = manager
            .fetch_by_id::<AuthnRequest>(&session, "_ws")
            .await
            .unwrap();
        assert_eq!(resumed, Some(context));
    }

    #[tokio::test]
    async fn test_unresumable_request_is_not_stored() {
        let (sessions, manager) = setup();
        let session = SessionHandle::new();
        let long_id = format!("_{}", "a".repeat(300));

        let stored = manager.store_request(&session, &pending(&long_id, "state")).await;
        assert!(matches!(stored, Err(SessionError::Encoding(_))));
        assert_eq!(sessions.writes(), 0);

        let resumed = manager
            .fetch_by_id::<AuthnRequest>(&session, &long_id)
            .await
            .unwrap();
        assert!(resumed.is_none());
    }

    #[tokio::test]
    async fn test_repeated_fetch_is_idempotent() {
        let (_, manager) = setup();
        let session = SessionHandle::new();
        manager
            .store_request(&session, &pending("_dup", "state"))
            .await
            .unwrap();

        let first = manager
            .fetch_request::<AuthnRequest, _>(&session, &resume_params("_dup"))
            .await
            .unwrap();
        let second = manager
            .fetch_request::<AuthnRequest, _>(&session, &resume_params("_dup"))
            .await
            .unwrap();

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_fetch_from_resume_uri() {
        let (_, manager) = setup();
        let session = SessionHandle::new();
        manager
            .store_request(&session, &pending("_uri1", "state"))
            .await
            .unwrap();

        let uri: axum::http::Uri = "/saml/continue?AuthnRequestId=_uri1".parse().unwrap();
        let resumed = manager
            .fetch_request::<AuthnRequest, _>(&session, &uri)
            .await
            .unwrap();
        assert_eq!(resumed.unwrap().request_id(), "_uri1");
    }

    // ============================================================
    // Absence Tests
    // ============================================================

    #[tokio::test]
    async fn test_fetch_from_empty_session() {
        let (_, manager) = setup();
        let resumed = manager
            .fetch_request::<AuthnRequest, _>(&SessionHandle::new(), &resume_params("_none"))
            .await
            .unwrap();
        assert!(resumed.is_none());
    }

    #[tokio::test]
    async fn test_fetch_unknown_id() {
        let (_, manager) = setup();
        let session = SessionHandle::new();
        manager
            .store_request(&session, &pending("_known", "state"))
            .await
            .unwrap();

        let resumed = manager
            .fetch_request::<AuthnRequest, _>(&session, &resume_params("_unknown"))
            .await
            .unwrap();
        assert!(resumed.is_none());
    }

    #[tokio::test]
    async fn test_fetch_without_parameter_skips_session() {
        let (sessions, manager) = setup();
        let resumed = manager
            .fetch_request::<AuthnRequest, _>(&SessionHandle::new(), &HashMap::new())
            .await
            .unwrap();

        assert!(resumed.is_none());
        assert_eq!(sessions.reads(), 0);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let (_, manager) = setup();
        let alice = SessionHandle::new();
        let bob = SessionHandle::new();
        manager
            .store_request(&alice, &pending("_shared", "alice"))
            .await
            .unwrap();

        let resumed = manager
            .fetch_request::<AuthnRequest, _>(&bob, &resume_params("_shared"))
            .await
            .unwrap();
        assert!(resumed.is_none());
    }

    // ============================================================
    // Overwrite and Multiple Request Tests
    // ============================================================

    #[tokio::test]
    async fn test_store_same_id_overwrites() {
        let (_, manager) = setup();
        let session = SessionHandle::new();
        let first = pending("_same", "first");
        let mut second_request = authn_request("_same");
        second_request.force_authn = false;
        second_request.provider_name = Some("Second SP".to_string());
        let second = MessageContext::new(second_request).with_relay_state("second");

        manager.store_request(&session, &first).await.unwrap();
        manager.store_request(&session, &second).await.unwrap();

        let resumed = manager
            .fetch_by_id::<AuthnRequest>(&session, "_same")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resumed, second);
    }

    #[tokio::test]
    async fn test_independent_requests_in_one_session() {
        let (_, manager) = setup();
        let session = SessionHandle::new();
        let a = pending("A", "relay-a");
        let b = pending("B", "relay-b");

        manager.store_request(&session, &a).await.unwrap();
        manager.store_request(&session, &b).await.unwrap();

        let resumed_b = manager.fetch_by_id::<AuthnRequest>(&session, "B").await.unwrap();
        let resumed_a = manager.fetch_by_id::<AuthnRequest>(&session, "A").await.unwrap();
        assert_eq!(resumed_a, Some(a));
        assert_eq!(resumed_b, Some(b));
    }

    // ============================================================
    // Session Access Tests
    // ============================================================

    #[tokio::test]
    async fn test_every_call_reads_the_session() {
        let (sessions, manager) = setup();
        let session = SessionHandle::new();

        manager
            .store_request(&session, &pending("_io", "state"))
            .await
            .unwrap();
        assert_eq!(sessions.reads(), 1);
        assert_eq!(sessions.writes(), 1);

        manager.fetch_by_id::<AuthnRequest>(&session, "_io").await.unwrap();
        manager.fetch_by_id::<AuthnRequest>(&session, "_io").await.unwrap();
        assert_eq!(sessions.reads(), 3);
        assert_eq!(sessions.writes(), 1);
    }

    #[tokio::test]
    async fn test_expired_session_forgets_requests() {
        let (sessions, manager) = setup();
        let session = SessionHandle::new();
        manager
            .store_request(&session, &pending("_exp", "state"))
            .await
            .unwrap();

        assert_eq!(sessions.inner.invalidate(&session).await, 1);

        let resumed = manager.fetch_by_id::<AuthnRequest>(&session, "_exp").await.unwrap();
        assert!(resumed.is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let manager = SamlIdPSessionManager::new(Arc::new(FailingStore));
        let session = SessionHandle::new();

        let stored = manager.store_request(&session, &pending("_x", "state")).await;
        assert!(matches!(stored, Err(SessionError::Storage(_))));

        let fetched = manager.fetch_by_id::<AuthnRequest>(&session, "_x").await;
        assert!(matches!(fetched, Err(SessionError::Storage(_))));
    }

    // ============================================================
    // Rejection Tests
    // ============================================================

    #[tokio::test]
    async fn test_kind_mismatch_rejected() {
        let (_, manager) = setup();
        let session = SessionHandle::new();
        manager
            .store_request(&session, &pending("_kind", "state"))
            .await
            .unwrap();

        let result = manager.fetch_by_id::<LogoutRequest>(&session, "_kind").await;
        match result {
            Err(SessionError::CorruptEntry { request_id, source }) => {
                assert_eq!(request_id, "_kind");
                assert!(matches!(source, CodecError::WrongKind { .. }));
            }
            other => panic!("expected CorruptEntry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tampered_message_rejected() {
        let (sessions, manager) = setup();
        let session = SessionHandle::new();
        manager
            .store_request(&session, &pending("_tamper", "state"))
            .await
            .unwrap();

        let correlation = CorrelationStore::new(sessions.clone(), "xavyo.saml.idp.correlation_entries");
        let mut entry = correlation.get(&session, "_tamper").await.unwrap().unwrap();
        entry.encoded_message.replace_range(10..11, "*");
        correlation.put(&session, entry).await.unwrap();

        let result = manager.fetch_by_id::<AuthnRequest>(&session, "_tamper").await;
        match result {
            Err(SessionError::CorruptEntry { source, .. }) => {
                assert!(matches!(source, CodecError::Undecodable { .. }));
            }
            other => panic!("expected CorruptEntry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tampered_context_rejected() {
        let (sessions, manager) = setup();
        let session = SessionHandle::new();
        manager
            .store_request(&session, &pending("_ctx", "state"))
            .await
            .unwrap();

        let correlation = CorrelationStore::new(sessions.clone(), "xavyo.saml.idp.correlation_entries");
        let mut entry = correlation.get(&session, "_ctx").await.unwrap().unwrap();
        entry.encoded_context = "not-base64!".to_string();
        correlation.put(&session, entry).await.unwrap();

        let result = manager.fetch_by_id::<AuthnRequest>(&session, "_ctx").await;
        assert!(matches!(
            result,
            Err(SessionError::CorruptEntry {
                source: CodecError::Context(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_corrupt_mapping_reported() {
        let (sessions, manager) = setup();
        let session = SessionHandle::new();
        sessions
            .set(
                &session,
                "xavyo.saml.idp.correlation_entries",
                serde_json::json!(["not", "a", "map"]),
            )
            .await
            .unwrap();

        let result = manager.fetch_by_id::<AuthnRequest>(&session, "_any").await;
        assert!(matches!(result, Err(SessionError::CorruptMapping(_))));
    }
}
