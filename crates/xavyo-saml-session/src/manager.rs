//! Suspend and resume protocol requests across a browser round trip.
//!
//! When the IdP has to interrupt a flow (typically to show a login page) it
//! stores the inbound request in the user's session with
//! [`SamlIdPSessionManager::store_request`]. The login page sends the browser
//! back with the request ID as a parameter, and
//! [`SamlIdPSessionManager::fetch_request`] rebuilds the message and its
//! context from the session.
//!
//! The manager holds no per-session state; every call reads and writes the
//! session through the supplied [`SessionAttributeStore`].

use crate::codec::{CodecError, MessageCodec};
use crate::config::SessionManagerConfig;
use crate::context::{AuthenticationContext, MessageContext};
use crate::error::{SessionError, SessionResult};
use crate::message::SamlMessage;
use crate::request::RequestParameters;
use crate::store::{CorrelationEntry, CorrelationStore, SessionAttributeStore, SessionHandle};
use std::sync::Arc;

/// Stores pending SAML requests in the browser session and resumes them
#[derive(Clone)]
pub struct SamlIdPSessionManager {
    codec: MessageCodec,
    correlation: CorrelationStore,
    request_id_parameter: String,
}

impl SamlIdPSessionManager {
    /// Manager with the default configuration
    pub fn new(sessions: Arc<dyn SessionAttributeStore>) -> Self {
        Self::with_config(sessions, &SessionManagerConfig::default())
    }

    pub fn with_config(
        sessions: Arc<dyn SessionAttributeStore>,
        config: &SessionManagerConfig,
    ) -> Self {
        Self {
            codec: MessageCodec::new(config.limits),
            correlation: CorrelationStore::new(sessions, config.session_attribute_key.clone()),
            request_id_parameter: config.request_id_parameter.clone(),
        }
    }

    #[must_use]
    pub fn codec(&self) -> &MessageCodec {
        &self.codec
    }

    /// Name of the parameter read by [`Self::fetch_request`]
    #[must_use]
    pub fn request_id_parameter(&self) -> &str {
        &self.request_id_parameter
    }

    /// Suspend `context` in `session`, keyed by the message's ID.
    ///
    /// Storing a message whose ID is already pending replaces the earlier
    /// entry. A message that would not decode again under the configured
    /// limits (over-long ID, missing issuer, unsupported version, oversized
    /// encoding) is refused with [`SessionError::Encoding`].
    pub async fn store_request<M: SamlMessage>(
        &self,
        session: &SessionHandle,
        context: &MessageContext<M>,
    ) -> SessionResult<()> {
        let request_id = context.request_id();
        if request_id.is_empty() {
            return Err(SessionError::MissingRequestId);
        }

        let encoded_message = self
            .codec
            .encode(&context.message)
            .map_err(SessionError::Encoding)?;
        let encoded_context = AuthenticationContext::from_message_context(context)
            .encode()
            .map_err(SessionError::Encoding)?;

        // Refuse entries that resume would reject
        if let Err(e) = self.verify_resumable::<M>(&encoded_message, &encoded_context) {
            tracing::debug!(
                session = %session,
                request_id = %request_id,
                kind = %M::KIND,
                error = %e,
                "Refused to store SAML request that could not be resumed"
            );
            return Err(SessionError::Encoding(e));
        }

        let entry = CorrelationEntry {
            id: request_id.to_string(),
            encoded_message,
            relay_state: context.relay_state.clone(),
            encoded_context,
        };
        self.correlation.put(session, entry).await?;

        tracing::debug!(
            session = %session,
            request_id = %request_id,
            kind = %M::KIND,
            issuer = %context.message.issuer(),
            "Stored pending SAML request in session"
        );

        Ok(())
    }

    /// Resume the request named by the incoming request's ID parameter.
    ///
    /// Returns `Ok(None)` when the parameter is missing or empty, or when
    /// nothing is pending under that ID. Entries are not removed, so a
    /// repeated call returns the same result.
    pub async fn fetch_request<M, P>(
        &self,
        session: &SessionHandle,
        request: &P,
    ) -> SessionResult<Option<MessageContext<M>>>
    where
        M: SamlMessage,
        P: RequestParameters + Sync + ?Sized,
    {
        let Some(request_id) = request
            .parameter(&self.request_id_parameter)
            .filter(|id| !id.is_empty())
        else {
            tracing::trace!(
                parameter = %self.request_id_parameter,
                "No pending SAML request ID on incoming request"
            );
            return Ok(None);
        };

        self.fetch_by_id(session, &request_id).await
    }

    /// Resume the request stored under `request_id`
    pub async fn fetch_by_id<M: SamlMessage>(
        &self,
        session: &SessionHandle,
        request_id: &str,
    ) -> SessionResult<Option<MessageContext<M>>> {
        let Some(entry) = self.correlation.get(session, request_id).await? else {
            tracing::debug!(
                session = %session,
                request_id = %request_id,
                "No pending SAML request for ID"
            );
            return Ok(None);
        };

        match self.resume::<M>(entry) {
            Ok(context) => {
                tracing::info!(
                    session = %session,
                    request_id = %request_id,
                    kind = %M::KIND,
                    issuer = %context.message.issuer(),
                    "Resumed pending SAML request"
                );
                Ok(Some(context))
            }
            Err(source) => {
                tracing::warn!(
                    session = %session,
                    request_id = %request_id,
                    kind = %M::KIND,
                    error = %source,
                    "Pending SAML request could not be decoded"
                );
                Err(SessionError::CorruptEntry {
                    request_id: request_id.to_string(),
                    source,
                })
            }
        }
    }

    fn verify_resumable<M: SamlMessage>(
        &self,
        encoded_message: &str,
        encoded_context: &str,
    ) -> Result<(), CodecError> {
        self.codec.decode::<M>(encoded_message)?;
        AuthenticationContext::decode_with_limit(
            encoded_context,
            self.codec.limits().max_encoded_bytes,
        )?;
        Ok(())
    }

    fn resume<M: SamlMessage>(
        &self,
        entry: CorrelationEntry,
    ) -> Result<MessageContext<M>, CodecError> {
        let decoded = self.codec.decode::<M>(&entry.encoded_message)?;
        let context = AuthenticationContext::decode_with_limit(
            &entry.encoded_context,
            self.codec.limits().max_encoded_bytes,
        )?;

        let mut resumed = context.into_message_context(decoded.message);
        // Entries written before the context carried relay state keep it on the entry
        if resumed.relay_state.is_none() {
            resumed.relay_state = entry.relay_state;
        }
        Ok(resumed)
    }
}
