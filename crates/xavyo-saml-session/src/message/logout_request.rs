//! SAML `LogoutRequest`

use super::parser::{issue_instant, message_id, message_issuer, version, ParseError};
use super::xml::{push_attr, push_opt_attr, push_text_element, xml_escape, XmlElement};
use super::{MessageKind, ProtocolMessage, SamlMessage, SAMLP_NS, SAML_NS, SAML_VERSION};
use chrono::{DateTime, SecondsFormat, Utc};

const ELEMENT: &str = "LogoutRequest";

/// Maximum length for the NameID value
const MAX_NAME_ID_LENGTH: usize = 4096;

/// A single logout request received from (or sent to) an SP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutRequest {
    pub id: String,
    pub version: String,
    pub issue_instant: DateTime<Utc>,
    pub issuer: String,
    pub destination: Option<String>,
    pub reason: Option<String>,
    pub name_id: String,
    pub name_id_format: Option<String>,
    pub session_indexes: Vec<String>,
}

impl LogoutRequest {
    pub fn new(id: impl Into<String>, issuer: impl Into<String>, name_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: SAML_VERSION.to_string(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            destination: None,
            reason: None,
            name_id: name_id.into(),
            name_id_format: None,
            session_indexes: Vec::new(),
        }
    }

    pub(crate) fn from_element(root: &XmlElement) -> Result<Self, ParseError> {
        let name_id_element = root
            .child("NameID")
            .ok_or(ParseError::MissingElement("NameID"))?;
        if name_id_element.text.len() > MAX_NAME_ID_LENGTH {
            return Err(ParseError::InvalidValue {
                field: "NameID",
                message: format!("exceeds maximum length of {MAX_NAME_ID_LENGTH} characters"),
            });
        }

        Ok(Self {
            id: message_id(root, ELEMENT)?,
            version: version(root, ELEMENT)?,
            issue_instant: issue_instant(root, ELEMENT)?,
            issuer: message_issuer(root)?,
            destination: root.attr("Destination").map(str::to_string),
            reason: root.attr("Reason").map(str::to_string),
            name_id: name_id_element.text.clone(),
            name_id_format: name_id_element.attr("Format").map(str::to_string),
            session_indexes: root
                .children_named("SessionIndex")
                .map(|e| e.text.clone())
                .collect(),
        })
    }
}

impl SamlMessage for LogoutRequest {
    const KIND: MessageKind = MessageKind::LogoutRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<samlp:LogoutRequest");
        push_attr(&mut xml, "xmlns:samlp", SAMLP_NS);
        push_attr(&mut xml, "xmlns:saml", SAML_NS);
        push_attr(&mut xml, "ID", &self.id);
        push_attr(&mut xml, "Version", &self.version);
        push_attr(
            &mut xml,
            "IssueInstant",
            &self.issue_instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        );
        push_opt_attr(&mut xml, "Destination", self.destination.as_deref());
        push_opt_attr(&mut xml, "Reason", self.reason.as_deref());
        xml.push_str(">\n    ");
        push_text_element(&mut xml, "saml:Issuer", &self.issuer);
        xml.push_str("\n    <saml:NameID");
        push_opt_attr(&mut xml, "Format", self.name_id_format.as_deref());
        xml.push('>');
        xml.push_str(&xml_escape(&self.name_id));
        xml.push_str("</saml:NameID>");
        for index in &self.session_indexes {
            xml.push_str("\n    ");
            push_text_element(&mut xml, "samlp:SessionIndex", index);
        }
        xml.push_str("\n</samlp:LogoutRequest>");
        xml
    }

    fn from_protocol_message(message: ProtocolMessage) -> Result<Self, ProtocolMessage> {
        match message {
            ProtocolMessage::LogoutRequest(request) => Ok(request),
            other => Err(other),
        }
    }
}
