//! Security scheme options.
//!
//! These describe how callers authenticate so documentation can advertise the
//! right security schemes. Verifying credentials is left to identity
//! providers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default header name for API keys.
pub const DEFAULT_API_KEY_NAME: &str = "X-API-KEY";

/// How callers authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// No authentication advertised.
    #[default]
    None,
    /// HTTP basic.
    Basic,
    /// HTTP bearer token (JWT).
    Bearer,
    /// API key header.
    ApiKey,
    /// OAuth2 flows.
    #[serde(rename = "oauth2")]
    OAuth2,
    /// OpenID Connect discovery.
    OpenIdConnect,
}

/// OAuth2 endpoints and scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OAuth2Options {
    /// Authorization endpoint, for the authorization-code flow.
    pub authorization_url: Option<String>,
    /// Token endpoint, for every flow.
    pub token_url: Option<String>,
    /// Scope name to description.
    pub scopes: IndexMap<String, String>,
}

/// Security configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityOptions {
    /// The advertised scheme.
    pub scheme: AuthScheme,
    /// API key header names; one scheme is advertised per name.
    pub api_key_names: Vec<String>,
    /// OAuth2 settings.
    pub oauth2: OAuth2Options,
    /// OpenID Connect discovery URL.
    pub openid_connect_url: Option<String>,
}

impl Default for SecurityOptions {
    fn default() -> Self {
        Self {
            scheme: AuthScheme::None,
            api_key_names: vec![DEFAULT_API_KEY_NAME.to_string()],
            oauth2: OAuth2Options::default(),
            openid_connect_url: None,
        }
    }
}

impl SecurityOptions {
    /// Options advertising `scheme` with defaults for everything else.
    #[must_use]
    pub fn new(scheme: AuthScheme) -> Self {
        Self {
            scheme,
            ..Self::default()
        }
    }

    /// Replaces the API key header names.
    #[must_use]
    pub fn api_key_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_key_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the OAuth2 settings.
    #[must_use]
    pub fn oauth2(mut self, oauth2: OAuth2Options) -> Self {
        self.oauth2 = oauth2;
        self
    }

    /// Sets the OpenID Connect discovery URL.
    #[must_use]
    pub fn openid_connect_url(mut self, url: impl Into<String>) -> Self {
        self.openid_connect_url = Some(url.into());
        self
    }
}
