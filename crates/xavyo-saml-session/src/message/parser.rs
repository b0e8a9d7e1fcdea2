//! Parse canonical XML into a typed protocol message of an expected kind

use super::xml::{parse_document, XmlElement};
use super::{AuthnRequest, LogoutRequest, MessageKind, ProtocolMessage, SamlMessage};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Maximum length for a message ID attribute
pub const MAX_REQUEST_ID_LENGTH: usize = 256;

/// Maximum length for the Issuer element value
pub const MAX_ISSUER_LENGTH: usize = 1024;

/// Errors produced while parsing a protocol message document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text is not well-formed XML
    #[error("XML parse error: {0}")]
    Xml(String),

    /// Well-formed message of a different kind than the caller asked for
    #[error("Expected {expected} but found {found}")]
    WrongKind {
        expected: MessageKind,
        found: MessageKind,
    },

    /// Document element is not a supported protocol message
    #[error("Unsupported document element: {0}")]
    UnknownRoot(String),

    #[error("Missing {attribute} attribute on {element}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Missing {0} element")]
    MissingElement(&'static str),

    #[error("Invalid {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

/// Parse `xml` and require its document element to be `expected`.
///
/// A well-formed message of another supported kind yields
/// [`ParseError::WrongKind`], never a converted value.
pub fn parse_message(xml: &str, expected: MessageKind) -> Result<ProtocolMessage, ParseError> {
    let root = parse_document(xml)?;
    let found = MessageKind::from_element_name(&root.name)
        .ok_or_else(|| ParseError::UnknownRoot(root.name.clone()))?;
    if found != expected {
        return Err(ParseError::WrongKind { expected, found });
    }

    match found {
        MessageKind::AuthnRequest => AuthnRequest::from_element(&root).map(ProtocolMessage::AuthnRequest),
        MessageKind::LogoutRequest => {
            LogoutRequest::from_element(&root).map(ProtocolMessage::LogoutRequest)
        }
    }
}

/// Parse `xml` directly into the message type `M`
pub fn parse_as<M: SamlMessage>(xml: &str) -> Result<M, ParseError> {
    let message = parse_message(xml, M::KIND)?;
    M::from_protocol_message(message).map_err(|other| ParseError::WrongKind {
        expected: M::KIND,
        found: other.kind(),
    })
}

pub(crate) fn required_attr(
    element: &XmlElement,
    element_name: &'static str,
    attribute: &'static str,
) -> Result<String, ParseError> {
    element
        .attr(attribute)
        .map(str::to_string)
        .ok_or(ParseError::MissingAttribute {
            element: element_name,
            attribute,
        })
}

/// Read and bound-check the `ID` attribute
pub(crate) fn message_id(element: &XmlElement, element_name: &'static str) -> Result<String, ParseError> {
    let id = required_attr(element, element_name, "ID")?;
    if id.is_empty() {
        return Err(ParseError::InvalidValue {
            field: "ID",
            message: "must not be empty".to_string(),
        });
    }
    // SECURITY: bound attacker-controlled identifiers
    if id.len() > MAX_REQUEST_ID_LENGTH {
        return Err(ParseError::InvalidValue {
            field: "ID",
            message: format!("exceeds maximum length of {MAX_REQUEST_ID_LENGTH} characters"),
        });
    }
    Ok(id)
}

/// Read and bound-check the `Issuer` child element
pub(crate) fn message_issuer(element: &XmlElement) -> Result<String, ParseError> {
    let issuer = element
        .child("Issuer")
        .map(|e| e.text.clone())
        .filter(|text| !text.trim().is_empty())
        .ok_or(ParseError::MissingElement("Issuer"))?;
    if issuer.len() > MAX_ISSUER_LENGTH {
        return Err(ParseError::InvalidValue {
            field: "Issuer",
            message: format!("exceeds maximum length of {MAX_ISSUER_LENGTH} characters"),
        });
    }
    Ok(issuer)
}

pub(crate) fn issue_instant(
    element: &XmlElement,
    element_name: &'static str,
) -> Result<DateTime<Utc>, ParseError> {
    let raw = required_attr(element, element_name, "IssueInstant")?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ParseError::InvalidValue {
            field: "IssueInstant",
            message: e.to_string(),
        })
}

pub(crate) fn version(element: &XmlElement, element_name: &'static str) -> Result<String, ParseError> {
    let version = required_attr(element, element_name, "Version")?;
    if version != super::SAML_VERSION {
        return Err(ParseError::InvalidValue {
            field: "Version",
            message: format!("unsupported SAML version {version}"),
        });
    }
    Ok(version)
}
