//! Typed SAML protocol messages
//!
//! Only the request kinds an `IdP` suspends across a login round trip are
//! modelled here. Each kind knows how to render itself as canonical XML and
//! how to be recovered from a parsed document of the same kind.

pub mod authn_request;
pub mod logout_request;
pub mod parser;
mod xml;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use authn_request::{AuthnContextComparison, AuthnRequest, NameIdPolicy, RequestedAuthnContext};
pub use logout_request::LogoutRequest;
pub use parser::{parse_as, parse_message, ParseError};

/// SAML 2.0 protocol namespace
pub const SAMLP_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// SAML 2.0 assertion namespace
pub const SAML_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// The SAML protocol version every message is emitted with
pub const SAML_VERSION: &str = "2.0";

/// Kinds of protocol message the engine can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    AuthnRequest,
    LogoutRequest,
}

impl MessageKind {
    /// Local name of the document element for this kind
    #[must_use]
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::AuthnRequest => "AuthnRequest",
            Self::LogoutRequest => "LogoutRequest",
        }
    }

    /// Resolve a kind from a document element's local name
    #[must_use]
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "AuthnRequest" => Some(Self::AuthnRequest),
            "LogoutRequest" => Some(Self::LogoutRequest),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

/// A parsed protocol message of any supported kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolMessage {
    AuthnRequest(AuthnRequest),
    LogoutRequest(LogoutRequest),
}

impl ProtocolMessage {
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::AuthnRequest(_) => MessageKind::AuthnRequest,
            Self::LogoutRequest(_) => MessageKind::LogoutRequest,
        }
    }
}

/// A concrete protocol message type.
///
/// `KIND` ties the Rust type to the document element it is parsed from, so
/// decoding into a type never succeeds for a document of another kind.
pub trait SamlMessage: Clone + Send + Sync + Sized + 'static {
    const KIND: MessageKind;

    /// The message's own identifier (the `ID` attribute)
    fn id(&self) -> &str;

    /// Entity ID of the party that issued the message
    fn issuer(&self) -> &str;

    /// Render the message as canonical XML text
    fn to_xml(&self) -> String;

    /// Take this type out of a parsed message, handing the message back on a
    /// kind mismatch.
    fn from_protocol_message(message: ProtocolMessage) -> Result<Self, ProtocolMessage>;
}
