//! Processing context carried alongside a suspended protocol message
//!
//! The message alone is not enough to finish an SSO exchange: the binding it
//! arrived on, its relay state and what the binding layer learned about the
//! peer must survive the login round trip too. [`AuthenticationContext`] is
//! the serializable part; [`MessageContext`] is what the SSO pipeline works
//! with, the message plus that context.

use crate::codec::{CodecError, DEFAULT_MAX_ENCODED_BYTES};
use crate::message::SamlMessage;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// SAML binding a message was received on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SamlBinding {
    #[serde(rename = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect")]
    HttpRedirect,
    #[serde(rename = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST")]
    HttpPost,
    #[serde(rename = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact")]
    HttpArtifact,
}

impl SamlBinding {
    #[must_use]
    pub fn urn(&self) -> &'static str {
        match self {
            Self::HttpRedirect => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
            Self::HttpPost => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
            Self::HttpArtifact => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact",
        }
    }

    #[must_use]
    pub fn from_urn(urn: &str) -> Option<Self> {
        match urn {
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" => Some(Self::HttpRedirect),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" => Some(Self::HttpPost),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact" => Some(Self::HttpArtifact),
            _ => None,
        }
    }
}

/// A protocol message and the context needed to keep processing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext<M> {
    pub message: M,
    /// Opaque SP state, echoed back unmodified
    pub relay_state: Option<String>,
    pub binding: Option<SamlBinding>,
    /// Entity ID of the peer that sent the message
    pub peer_entity_id: Option<String>,
    /// ACS endpoint resolved for the peer, if the binding layer resolved one
    pub peer_acs_url: Option<String>,
    /// Whether the inbound message was signed and verified upstream
    pub signed: bool,
    /// Protocol extension state keyed by extension name
    pub extensions: BTreeMap<String, String>,
}

impl<M: SamlMessage> MessageContext<M> {
    /// Context for a freshly received message; the peer is its issuer
    pub fn new(message: M) -> Self {
        let peer_entity_id = Some(message.issuer().to_string());
        Self {
            message,
            relay_state: None,
            binding: None,
            peer_entity_id,
            peer_acs_url: None,
            signed: false,
            extensions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_relay_state(mut self, relay_state: impl Into<String>) -> Self {
        self.relay_state = Some(relay_state.into());
        self
    }

    #[must_use]
    pub fn with_binding(mut self, binding: SamlBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extensions.insert(name.into(), value.into());
        self
    }

    /// The correlation identifier: the message's own ID
    pub fn request_id(&self) -> &str {
        self.message.id()
    }
}

/// The serializable half of a [`MessageContext`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<SamlBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_acs_url: Option<String>,
    #[serde(default)]
    pub signed: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

impl AuthenticationContext {
    pub fn from_message_context<M>(context: &MessageContext<M>) -> Self {
        Self {
            relay_state: context.relay_state.clone(),
            binding: context.binding,
            peer_entity_id: context.peer_entity_id.clone(),
            peer_acs_url: context.peer_acs_url.clone(),
            signed: context.signed,
            extensions: context.extensions.clone(),
        }
    }

    /// Serialize to JSON, then base64
    pub fn encode(&self) -> Result<String, CodecError> {
        let json = serde_json::to_vec(self).map_err(|e| CodecError::Encoding(e.to_string()))?;
        Ok(STANDARD.encode(json))
    }

    /// Decode with the default encoded size limit
    pub fn decode(value: &str) -> Result<Self, CodecError> {
        Self::decode_with_limit(value, DEFAULT_MAX_ENCODED_BYTES)
    }

    /// Decode, rejecting input longer than `max_encoded_bytes`
    pub fn decode_with_limit(value: &str, max_encoded_bytes: usize) -> Result<Self, CodecError> {
        if value.len() > max_encoded_bytes {
            return Err(CodecError::InputTooLarge {
                size: value.len(),
                limit: max_encoded_bytes,
            });
        }
        let json = STANDARD
            .decode(value.trim())
            .map_err(|e| CodecError::Context(format!("Base64 decode failed: {e}")))?;
        serde_json::from_slice(&json).map_err(|e| CodecError::Context(e.to_string()))
    }

    /// Rebuild the pipeline's view of the exchange around `message`.
    ///
    /// Every field comes back exactly as stored, including an absent peer.
    pub fn into_message_context<M>(self, message: M) -> MessageContext<M> {
        MessageContext {
            message,
            relay_state: self.relay_state,
            binding: self.binding,
            peer_entity_id: self.peer_entity_id,
            peer_acs_url: self.peer_acs_url,
            signed: self.signed,
            extensions: self.extensions,
        }
    }
}
