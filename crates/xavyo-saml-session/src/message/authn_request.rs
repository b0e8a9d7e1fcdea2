//! SAML `AuthnRequest`

use super::parser::{issue_instant, message_id, message_issuer, version, ParseError};
use super::xml::{parse_xs_boolean, push_attr, push_opt_attr, push_text_element, XmlElement};
use super::{MessageKind, ProtocolMessage, SamlMessage, SAMLP_NS, SAML_NS, SAML_VERSION};
use chrono::{DateTime, SecondsFormat, Utc};

const ELEMENT: &str = "AuthnRequest";

/// Comparison method for a `RequestedAuthnContext`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthnContextComparison {
    Exact,
    Minimum,
    Maximum,
    Better,
}

impl AuthnContextComparison {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Better => "better",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "exact" => Some(Self::Exact),
            "minimum" => Some(Self::Minimum),
            "maximum" => Some(Self::Maximum),
            "better" => Some(Self::Better),
            _ => None,
        }
    }
}

/// `NameIDPolicy` requested by the SP
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameIdPolicy {
    pub format: Option<String>,
    pub sp_name_qualifier: Option<String>,
    pub allow_create: Option<bool>,
}

/// Authentication context classes requested by the SP
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedAuthnContext {
    pub comparison: Option<AuthnContextComparison>,
    pub class_refs: Vec<String>,
}

/// An SP-initiated authentication request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthnRequest {
    pub id: String,
    pub version: String,
    pub issue_instant: DateTime<Utc>,
    pub issuer: String,
    pub destination: Option<String>,
    pub assertion_consumer_service_url: Option<String>,
    pub assertion_consumer_service_index: Option<u16>,
    pub protocol_binding: Option<String>,
    pub provider_name: Option<String>,
    pub force_authn: bool,
    pub is_passive: bool,
    pub name_id_policy: Option<NameIdPolicy>,
    pub requested_authn_context: Option<RequestedAuthnContext>,
}

impl AuthnRequest {
    /// Create a request issued now with only the mandatory fields set
    pub fn new(id: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: SAML_VERSION.to_string(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            destination: None,
            assertion_consumer_service_url: None,
            assertion_consumer_service_index: None,
            protocol_binding: None,
            provider_name: None,
            force_authn: false,
            is_passive: false,
            name_id_policy: None,
            requested_authn_context: None,
        }
    }

    pub(crate) fn from_element(root: &XmlElement) -> Result<Self, ParseError> {
        let assertion_consumer_service_index = root
            .attr("AssertionConsumerServiceIndex")
            .map(|v| {
                v.parse::<u16>().map_err(|e| ParseError::InvalidValue {
                    field: "AssertionConsumerServiceIndex",
                    message: e.to_string(),
                })
            })
            .transpose()?;

        let name_id_policy = root
            .child("NameIDPolicy")
            .map(|policy| -> Result<NameIdPolicy, ParseError> {
                Ok(NameIdPolicy {
                    format: policy.attr("Format").map(str::to_string),
                    sp_name_qualifier: policy.attr("SPNameQualifier").map(str::to_string),
                    allow_create: policy
                        .attr("AllowCreate")
                        .map(|v| boolean("AllowCreate", v))
                        .transpose()?,
                })
            })
            .transpose()?;

        let requested_authn_context = root
            .child("RequestedAuthnContext")
            .map(|ctx| -> Result<RequestedAuthnContext, ParseError> {
                let comparison = ctx
                    .attr("Comparison")
                    .map(|v| {
                        AuthnContextComparison::parse(v).ok_or_else(|| ParseError::InvalidValue {
                            field: "Comparison",
                            message: format!("unknown comparison {v}"),
                        })
                    })
                    .transpose()?;
                Ok(RequestedAuthnContext {
                    comparison,
                    class_refs: ctx
                        .children_named("AuthnContextClassRef")
                        .map(|c| c.text.clone())
                        .collect(),
                })
            })
            .transpose()?;

        Ok(Self {
            id: message_id(root, ELEMENT)?,
            version: version(root, ELEMENT)?,
            issue_instant: issue_instant(root, ELEMENT)?,
            issuer: message_issuer(root)?,
            destination: root.attr("Destination").map(str::to_string),
            assertion_consumer_service_url: root
                .attr("AssertionConsumerServiceURL")
                .map(str::to_string),
            assertion_consumer_service_index,
            protocol_binding: root.attr("ProtocolBinding").map(str::to_string),
            provider_name: root.attr("ProviderName").map(str::to_string),
            force_authn: root
                .attr("ForceAuthn")
                .map(|v| boolean("ForceAuthn", v))
                .transpose()?
                .unwrap_or(false),
            is_passive: root
                .attr("IsPassive")
                .map(|v| boolean("IsPassive", v))
                .transpose()?
                .unwrap_or(false),
            name_id_policy,
            requested_authn_context,
        })
    }
}

fn boolean(field: &'static str, value: &str) -> Result<bool, ParseError> {
    parse_xs_boolean(value).ok_or_else(|| ParseError::InvalidValue {
        field,
        message: format!("not a boolean: {value}"),
    })
}

impl SamlMessage for AuthnRequest {
    const KIND: MessageKind = MessageKind::AuthnRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<samlp:AuthnRequest");
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
        push_opt_attr(
            &mut xml,
            "AssertionConsumerServiceURL",
            self.assertion_consumer_service_url.as_deref(),
        );
        if let Some(index) = self.assertion_consumer_service_index {
            push_attr(&mut xml, "AssertionConsumerServiceIndex", &index.to_string());
        }
        push_opt_attr(&mut xml, "ProtocolBinding", self.protocol_binding.as_deref());
        push_opt_attr(&mut xml, "ProviderName", self.provider_name.as_deref());
        if self.force_authn {
            push_attr(&mut xml, "ForceAuthn", "true");
        }
        if self.is_passive {
            push_attr(&mut xml, "IsPassive", "true");
        }
        xml.push_str(">\n    ");
        push_text_element(&mut xml, "saml:Issuer", &self.issuer);

        if let Some(policy) = &self.name_id_policy {
            xml.push_str("\n    <samlp:NameIDPolicy");
            push_opt_attr(&mut xml, "Format", policy.format.as_deref());
            push_opt_attr(&mut xml, "SPNameQualifier", policy.sp_name_qualifier.as_deref());
            if let Some(allow_create) = policy.allow_create {
                push_attr(&mut xml, "AllowCreate", if allow_create { "true" } else { "false" });
            }
            xml.push_str("/>");
        }

        if let Some(ctx) = &self.requested_authn_context {
            xml.push_str("\n    <samlp:RequestedAuthnContext");
            push_opt_attr(&mut xml, "Comparison", ctx.comparison.map(|c| c.as_str()));
            xml.push('>');
            for class_ref in &ctx.class_refs {
                xml.push_str("\n        ");
                push_text_element(&mut xml, "saml:AuthnContextClassRef", class_ref);
            }
            xml.push_str("\n    </samlp:RequestedAuthnContext>");
        }

        xml.push_str("\n</samlp:AuthnRequest>");
        xml
    }

    fn from_protocol_message(message: ProtocolMessage) -> Result<Self, ProtocolMessage> {
        match message {
            ProtocolMessage::AuthnRequest(request) => Ok(request),
            other => Err(other),
        }
    }
}
