//! Transport encoding for protocol messages
//!
//! Two binding profiles produce the strings this codec reads:
//! HTTP-Redirect deflates the XML before base64 encoding it, HTTP-POST only
//! base64 encodes it. A stored value carries no tag saying which profile made
//! it, so [`MessageCodec::decode`] probes the deflated form first and falls
//! back to the plain form.

use crate::message::{parse_as, MessageKind, ParseError, SamlMessage};
use base64::{engine::general_purpose::STANDARD, Engine};
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use thiserror::Error;

/// Maximum encoded size accepted for decoding (512 KB)
pub const DEFAULT_MAX_ENCODED_BYTES: usize = 512 * 1024;

/// Maximum inflated size for deflate decoding (64 KB) to prevent deflate bomb DoS
pub const DEFAULT_MAX_INFLATED_BYTES: u64 = 64 * 1024;

/// Encoding scheme of a transport string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingScheme {
    /// Raw DEFLATE (no zlib header or trailer) then base64
    Deflated,
    /// Base64 of the UTF-8 XML
    Plain,
}

impl std::fmt::Display for EncodingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deflated => write!(f, "deflated"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Encoded value exceeds maximum size ({size} > {limit} bytes)")]
    InputTooLarge { size: usize, limit: usize },

    #[error("Base64 decode failed: {0}")]
    Base64(String),

    #[error("Deflate decode failed: {0}")]
    Inflate(String),

    #[error("Inflated message exceeds maximum size ({limit} bytes)")]
    InflatedTooLarge { limit: u64 },

    #[error("Invalid UTF-8: {0}")]
    Utf8(String),

    #[error("Message parse failed: {0}")]
    Parse(ParseError),

    /// Decoded and parsed, but into a different message kind
    #[error("Expected {expected} but found {found}")]
    WrongKind {
        expected: MessageKind,
        found: MessageKind,
    },

    /// Neither the deflated nor the plain scheme produced a message
    #[error("Undecodable message (deflated: {deflated}; plain: {plain})")]
    Undecodable {
        deflated: Box<CodecError>,
        plain: Box<CodecError>,
    },

    #[error("Invalid processing context: {0}")]
    Context(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl From<ParseError> for CodecError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::WrongKind { expected, found } => Self::WrongKind { expected, found },
            other => Self::Parse(other),
        }
    }
}

impl CodecError {
    /// Combine the failures of both decode branches.
    ///
    /// A kind mismatch on either branch wins: the payload decoded fine, it is
    /// just not what the caller asked for.
    fn exhausted(deflated: CodecError, plain: CodecError) -> Self {
        match (deflated, plain) {
            (_, e @ Self::WrongKind { .. }) | (e @ Self::WrongKind { .. }, _) => e,
            (deflated, plain) => Self::Undecodable {
                deflated: Box::new(deflated),
                plain: Box::new(plain),
            },
        }
    }
}

/// Size limits applied while decoding untrusted input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecLimits {
    pub max_encoded_bytes: usize,
    pub max_inflated_bytes: u64,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_encoded_bytes: DEFAULT_MAX_ENCODED_BYTES,
            max_inflated_bytes: DEFAULT_MAX_INFLATED_BYTES,
        }
    }
}

/// A decoded message together with the scheme that decoded it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<M> {
    pub message: M,
    pub scheme: EncodingScheme,
}

/// Encodes protocol messages to transport strings and back
#[derive(Debug, Clone, Default)]
pub struct MessageCodec {
    limits: CodecLimits,
}

impl MessageCodec {
    #[must_use]
    pub fn new(limits: CodecLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Encode with the plain (POST binding) scheme
    pub fn encode<M: SamlMessage>(&self, message: &M) -> Result<String, CodecError> {
        self.encode_with(message, EncodingScheme::Plain)
    }

    pub fn encode_with<M: SamlMessage>(
        &self,
        message: &M,
        scheme: EncodingScheme,
    ) -> Result<String, CodecError> {
        let xml = message.to_xml();
        match scheme {
            EncodingScheme::Plain => Ok(STANDARD.encode(xml.as_bytes())),
            EncodingScheme::Deflated => {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder
                    .write_all(xml.as_bytes())
                    .map_err(|e| CodecError::Encoding(format!("Deflate encode failed: {e}")))?;
                let compressed = encoder
                    .finish()
                    .map_err(|e| CodecError::Encoding(format!("Deflate encode failed: {e}")))?;
                Ok(STANDARD.encode(compressed))
            }
        }
    }

    /// Decode a transport string of unknown scheme into `M`.
    ///
    /// The deflated scheme is tried first; any failure there (bad base64,
    /// bad deflate stream, bad XML, wrong kind) falls through to the plain
    /// scheme. Only when both fail is an error returned.
    pub fn decode<M: SamlMessage>(&self, value: &str) -> Result<Decoded<M>, CodecError> {
        // SECURITY: Reject oversized input before base64 decode to prevent OOM.
        if value.len() > self.limits.max_encoded_bytes {
            return Err(CodecError::InputTooLarge {
                size: value.len(),
                limit: self.limits.max_encoded_bytes,
            });
        }

        let deflated_err = match self.decode_deflated::<M>(value) {
            Ok(message) => {
                tracing::trace!(kind = %M::KIND, "Decoded SAML message with deflated scheme");
                return Ok(Decoded {
                    message,
                    scheme: EncodingScheme::Deflated,
                });
            }
            Err(e) => e,
        };

        tracing::trace!(
            kind = %M::KIND,
            error = %deflated_err,
            "Deflated decode failed, falling back to plain scheme"
        );

        match self.decode_plain::<M>(value) {
            Ok(message) => Ok(Decoded {
                message,
                scheme: EncodingScheme::Plain,
            }),
            Err(plain_err) => Err(CodecError::exhausted(deflated_err, plain_err)),
        }
    }

    /// Decode using only the deflated scheme
    pub fn decode_deflated<M: SamlMessage>(&self, value: &str) -> Result<M, CodecError> {
        let compressed = base64_decode(value)?;

        // Inflate with size limit to prevent deflate bomb DoS
        let limit = self.limits.max_inflated_bytes;
        let mut inflated = Vec::new();
        DeflateDecoder::new(&compressed[..])
            .take(limit.saturating_add(1))
            .read_to_end(&mut inflated)
            .map_err(|e| CodecError::Inflate(e.to_string()))?;
        if inflated.len() as u64 > limit {
            return Err(CodecError::InflatedTooLarge { limit });
        }

        let xml = String::from_utf8(inflated).map_err(|e| CodecError::Utf8(e.to_string()))?;
        Ok(parse_as::<M>(&xml)?)
    }

    /// Decode using only the plain scheme
    pub fn decode_plain<M: SamlMessage>(&self, value: &str) -> Result<M, CodecError> {
        let bytes = base64_decode(value)?;
        let xml = String::from_utf8(bytes).map_err(|e| CodecError::Utf8(e.to_string()))?;
        Ok(parse_as::<M>(&xml)?)
    }
}

fn base64_decode(value: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(value.trim())
        .map_err(|e| CodecError::Base64(e.to_string()))
}
