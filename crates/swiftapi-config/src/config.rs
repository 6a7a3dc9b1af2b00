//! Configuration types.
//!
//! [`SwiftApiConfig`] is the root; every section defaults independently, so
//! a file only needs the sections it changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use swiftapi_core::{AuthScheme, SecurityOptions};
use swiftapi_telemetry::LogConfig;

use crate::ConfigError;

/// Default maximum request body size (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Complete SwiftAPI configuration.
///
/// # Example
///
/// ```
/// use swiftapi_config::SwiftApiConfig;
///
/// let config = SwiftApiConfig::default();
/// assert_eq!(config.docs.title, "SwiftAPI");
/// assert_eq!(config.dispatch.max_body_size, 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SwiftApiConfig {
    /// Advertised authentication scheme and its settings.
    #[serde(default)]
    pub security: SecurityOptions,

    /// Document metadata.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Request dispatch limits.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LogConfig,
}

impl SwiftApiConfig {
    /// Development preset: pretty debug logging, no request timeout.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Production preset: JSON logging and a 30 second request timeout.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            dispatch: DispatchConfig {
                request_timeout_ms: Some(30_000),
                ..DispatchConfig::default()
            },
            ..Self::default()
        }
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `dispatch.max_body_size` is zero
    /// - `dispatch.request_timeout_ms` is zero
    /// - the API key scheme has no header names
    /// - OAuth2 has no token URL
    /// - OpenID Connect has no discovery URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "dispatch.max_body_size",
                "must be greater than zero",
            ));
        }
        if self.dispatch.request_timeout_ms == Some(0) {
            return Err(ConfigError::invalid_value(
                "dispatch.request_timeout_ms",
                "must be greater than zero; omit it to disable the timeout",
            ));
        }

        match self.security.scheme {
            AuthScheme::ApiKey if self.security.api_key_names.is_empty() => {
                Err(ConfigError::invalid_value(
                    "security.api_key_names",
                    "at least one header name is required for the api_key scheme",
                ))
            }
            AuthScheme::OAuth2 if self.security.oauth2.token_url.is_none() => Err(
                ConfigError::missing_field("security.oauth2.token_url"),
            ),
            AuthScheme::OpenIdConnect if self.security.openid_connect_url.is_none() => Err(
                ConfigError::missing_field("security.openid_connect_url"),
            ),
            _ => Ok(()),
        }
    }
}

/// Document metadata for the emitted OpenAPI document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    /// Document title.
    pub title: String,

    /// API version.
    pub version: String,

    /// Optional description.
    pub description: Option<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            title: "SwiftAPI".to_string(),
            version: "v1".to_string(),
            description: None,
        }
    }
}

/// Request dispatch limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Largest accepted request body, in bytes.
    pub max_body_size: usize,

    /// Per-request timeout in milliseconds; `None` disables it.
    pub request_timeout_ms: Option<u64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            request_timeout_ms: None,
        }
    }
}

impl DispatchConfig {
    /// The request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiftapi_telemetry::LogFormat;

    #[test]
    fn test_default_config_is_valid() {
        let config = SwiftApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.security.scheme, AuthScheme::None);
        assert_eq!(config.dispatch.request_timeout(), None);
    }

    #[test]
    fn test_presets() {
        let dev = SwiftApiConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);

        let prod = SwiftApiConfig::production();
        assert_eq!(prod.logging.format, LogFormat::Json);
        assert_eq!(
            prod.dispatch.request_timeout(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_validate_dispatch_limits() {
        let mut config = SwiftApiConfig::default();
        config.dispatch.max_body_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut config = SwiftApiConfig::default();
        config.dispatch.request_timeout_ms = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_security_settings() {
        let mut config = SwiftApiConfig::default();
        config.security.scheme = AuthScheme::OAuth2;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("security.oauth2.token_url"));

        config.security.oauth2.token_url = Some("https://id.example.com/token".to_string());
        assert!(config.validate().is_ok());

        let mut config = SwiftApiConfig::default();
        config.security.scheme = AuthScheme::ApiKey;
        config.security.api_key_names.clear();
        assert!(config.validate().is_err());
    }
}
