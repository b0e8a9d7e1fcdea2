//! Transport encodings accepted when resuming a stored request

#[cfg(test)]
mod tests {
    use super::super::common::*;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use xavyo_saml_session::{
        AuthenticationContext, AuthnRequest, CodecError, CorrelationEntry, CorrelationStore,
        EncodingScheme, LogoutRequest, MessageCodec, MessageContext, SessionHandle,
    };

    const ATTRIBUTE_KEY: &str = "xavyo.saml.idp.correlation_entries";

    #[test]
    fn test_redirect_encoding_decodes_via_deflated_branch() {
        let codec = MessageCodec::default();
        let request = authn_request("_redirect");
        let encoded = codec.encode_with(&request, EncodingScheme::Deflated).unwrap();

        let decoded = codec.decode::<AuthnRequest>(&encoded).unwrap();
        assert_eq!(decoded.scheme, EncodingScheme::Deflated);
        assert_eq!(decoded.message, request);
    }

    #[test]
    fn test_post_encoding_decodes_via_plain_branch() {
        let codec = MessageCodec::default();
        let request = authn_request("_post");
        let encoded = codec.encode(&request).unwrap();

        let decoded = codec.decode::<AuthnRequest>(&encoded).unwrap();
        assert_eq!(decoded.scheme, EncodingScheme::Plain);
        assert_eq!(decoded.message, request);
    }

    #[test]
    fn test_corrupted_encodings_fail_both_branches() {
        let codec = MessageCodec::default();
        let request = authn_request("_corrupt");

        for scheme in [EncodingScheme::Deflated, EncodingScheme::Plain] {
            let mut encoded = codec.encode_with(&request, scheme).unwrap();
            encoded.replace_range(4..5, "*");

            let result = codec.decode::<AuthnRequest>(&encoded);
            assert!(
                matches!(result, Err(CodecError::Undecodable { .. })),
                "{scheme} encoding should fail: {result:?}"
            );
        }
    }

    #[test]
    fn test_sp_generated_post_request_accepted() {
        let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
            ID="_sp_generated" Version="2.0" IssueInstant="2026-10-18T09:30:00Z"
            AssertionConsumerServiceURL="https://sp.example.com/saml/acs">
            <saml:Issuer>https://sp.example.com/saml/metadata</saml:Issuer>
            <samlp:NameIDPolicy Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress" AllowCreate="true"/>
        </samlp:AuthnRequest>"#;
        let encoded = STANDARD.encode(xml);

        let decoded = MessageCodec::default()
            .decode::<AuthnRequest>(&encoded)
            .unwrap();
        assert_eq!(decoded.message.id, "_sp_generated");
        assert_eq!(decoded.message.issuer, SP_ENTITY_ID);
        assert_eq!(
            decoded.message.assertion_consumer_service_url.as_deref(),
            Some(SP_ACS_URL)
        );
        let policy = decoded.message.name_id_policy.unwrap();
        assert_eq!(policy.allow_create, Some(true));
    }

    #[tokio::test]
    async fn test_deflated_entry_resumes() {
        let (sessions, manager) = setup();
        let session = SessionHandle::new();
        let context = pending("_deflated", "relay");

        let entry = CorrelationEntry {
            id: "_deflated".to_string(),
            encoded_message: manager
                .codec()
                .encode_with(&context.message, EncodingScheme::Deflated)
                .unwrap(),
            relay_state: context.relay_state.clone(),
            encoded_context: AuthenticationContext::from_message_context(&context)
                .encode()
                .unwrap(),
        };
        CorrelationStore::new(sessions.clone(), ATTRIBUTE_KEY)
            .put(&session, entry)
            .await
            .unwrap();

        let resumed = manager
            .fetch_request::<AuthnRequest, _>(&session, &resume_params("_deflated"))
            .await
            .unwrap();
        assert_eq!(resumed, Some(context));
    }

    #[tokio::test]
    async fn test_logout_request_round_trip() {
        let (_, manager) = setup();
        let session = SessionHandle::new();
        let mut logout = LogoutRequest::new("_logout1", SP_ENTITY_ID, "alice@example.com");
        logout.session_indexes = vec!["_idx1".to_string()];
        let context = MessageContext::new(logout).with_relay_state("bye");

        manager.store_request(&session, &context).await.unwrap();

        let resumed = manager
            .fetch_by_id::<LogoutRequest>(&session, "_logout1")
            .await
            .unwrap();
        assert_eq!(resumed, Some(context));
    }
}
