//! SAML 2.0 `IdP` request suspension for xavyo
//!
//! This crate lets an identity provider park an inbound protocol request in
//! the user's browser session and pick it up again after a round trip:
//! - Transport encoding of SAML messages (deflated Redirect and plain POST schemes)
//! - Serialization of the processing context (relay state, binding, peer)
//! - Per-session correlation of pending requests by message ID
//! - A session manager that stores and resumes requests
//!
//! Session state lives behind [`SessionAttributeStore`]; in-memory and
//! `PostgreSQL` implementations are provided.

pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod manager;
pub mod message;
pub mod request;
pub mod store;

pub use codec::{CodecError, CodecLimits, Decoded, EncodingScheme, MessageCodec};
pub use config::{ConfigError, SessionManagerConfig};
pub use context::{AuthenticationContext, MessageContext, SamlBinding};
pub use error::{SessionError, SessionResult};
pub use logging::LoggingError;
pub use manager::SamlIdPSessionManager;
pub use message::{
    AuthnRequest, LogoutRequest, MessageKind, ParseError, ProtocolMessage, SamlMessage,
};
pub use request::RequestParameters;
pub use store::{
    CorrelationEntry, CorrelationStore, InMemorySessionAttributeStore,
    PostgresSessionAttributeStore, SessionAttributeStore, SessionHandle, StorageError,
};
