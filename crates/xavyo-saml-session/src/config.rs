//! Session manager configuration loaded from environment variables.
//!
//! Every setting has a default; a variable that is set must be valid, or
//! loading fails with a clear error instead of silently using the default.

use crate::codec::{CodecLimits, DEFAULT_MAX_ENCODED_BYTES, DEFAULT_MAX_INFLATED_BYTES};
use std::env;
use thiserror::Error;

/// Session attribute under which pending requests are stored
pub const DEFAULT_SESSION_ATTRIBUTE_KEY: &str = "xavyo.saml.idp.correlation_entries";

/// Request parameter carrying the ID of the request to resume
pub const DEFAULT_REQUEST_ID_PARAMETER: &str = "AuthnRequestId";

const ENV_SESSION_ATTRIBUTE_KEY: &str = "SAML_SESSION_ATTRIBUTE_KEY";
const ENV_REQUEST_ID_PARAMETER: &str = "SAML_REQUEST_ID_PARAMETER";
const ENV_MAX_ENCODED_BYTES: &str = "SAML_MAX_ENCODED_REQUEST_BYTES";
const ENV_MAX_INFLATED_BYTES: &str = "SAML_MAX_INFLATED_REQUEST_BYTES";

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Settings for [`crate::SamlIdPSessionManager`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionManagerConfig {
    pub session_attribute_key: String,
    pub request_id_parameter: String,
    pub limits: CodecLimits,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            session_attribute_key: DEFAULT_SESSION_ATTRIBUTE_KEY.to_string(),
            request_id_parameter: DEFAULT_REQUEST_ID_PARAMETER.to_string(),
            limits: CodecLimits::default(),
        }
    }
}

impl SessionManagerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from any variable source; unset variables take their default
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            session_attribute_key: lookup(ENV_SESSION_ATTRIBUTE_KEY)
                .unwrap_or_else(|| DEFAULT_SESSION_ATTRIBUTE_KEY.to_string()),
            request_id_parameter: lookup(ENV_REQUEST_ID_PARAMETER)
                .unwrap_or_else(|| DEFAULT_REQUEST_ID_PARAMETER.to_string()),
            limits: CodecLimits {
                max_encoded_bytes: parse_limit(
                    ENV_MAX_ENCODED_BYTES,
                    lookup(ENV_MAX_ENCODED_BYTES),
                    DEFAULT_MAX_ENCODED_BYTES,
                )?,
                max_inflated_bytes: parse_limit(
                    ENV_MAX_INFLATED_BYTES,
                    lookup(ENV_MAX_INFLATED_BYTES),
                    DEFAULT_MAX_INFLATED_BYTES,
                )?,
            },
        };
        config.validate()?;

        tracing::debug!(
            session_attribute_key = %config.session_attribute_key,
            request_id_parameter = %config.request_id_parameter,
            max_encoded_bytes = config.limits.max_encoded_bytes,
            max_inflated_bytes = config.limits.max_inflated_bytes,
            "SAML session manager configuration loaded"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_attribute_key.trim().is_empty() {
            return Err(invalid(ENV_SESSION_ATTRIBUTE_KEY, "must not be empty"));
        }
        if self.request_id_parameter.trim().is_empty() {
            return Err(invalid(ENV_REQUEST_ID_PARAMETER, "must not be empty"));
        }
        if self.limits.max_encoded_bytes == 0 {
            return Err(invalid(ENV_MAX_ENCODED_BYTES, "must be greater than zero"));
        }
        if self.limits.max_inflated_bytes == 0 {
            return Err(invalid(ENV_MAX_INFLATED_BYTES, "must be greater than zero"));
        }
        Ok(())
    }
}

fn parse_limit<T: std::str::FromStr>(
    var: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(var, &format!("not a byte count ({e})"))),
    }
}

fn invalid(var: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        message: message.to_string(),
    }
}
