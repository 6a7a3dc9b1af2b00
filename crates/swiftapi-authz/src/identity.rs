//! Identity providers.
//!
//! An [`IdentityProvider`] turns request credentials into a [`Principal`].
//! Verifying bearer tokens is left to the host; the providers here cover
//! static API keys and HTTP Basic credentials.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::header::AUTHORIZATION;
use http::request::Parts;
use http::HeaderName;
use swiftapi_core::Principal;

use crate::error::{AuthzError, AuthzResult};

/// Resolves the caller behind a request.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the authenticated principal, or `None` when the request
    /// carries no valid credentials.
    async fn authenticate(&self, parts: &Parts) -> Option<Principal>;
}

/// Authenticates callers by a static API key header.
///
/// # Example
///
/// ```rust
/// use swiftapi_authz::{ApiKeyProvider, IdentityProvider};
/// use swiftapi_core::Principal;
///
/// # tokio_test::block_on(async {
/// let provider = ApiKeyProvider::new("x-api-key")
///     .unwrap()
///     .key("k-123", Principal::authenticated("reporting").with_role("reader"));
///
/// let (parts, ()) = http::Request::builder()
///     .header("x-api-key", "k-123")
///     .body(())
///     .unwrap()
///     .into_parts();
/// let principal = provider.authenticate(&parts).await.unwrap();
/// assert!(principal.has_role("reader"));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ApiKeyProvider {
    header: HeaderName,
    keys: HashMap<String, Principal>,
}

impl ApiKeyProvider {
    /// Creates a provider reading keys from `header`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::InvalidHeaderName`] if `header` is not a valid
    /// header name.
    pub fn new(header: &str) -> AuthzResult<Self> {
        let header = HeaderName::from_bytes(header.as_bytes()).map_err(|_| AuthzError::InvalidHeaderName {
            name: header.to_string(),
        })?;
        Ok(Self {
            header,
            keys: HashMap::new(),
        })
    }

    /// Maps `key` to `principal`.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>, principal: Principal) -> Self {
        self.keys.insert(key.into(), principal);
        self
    }
}

#[async_trait]
impl IdentityProvider for ApiKeyProvider {
    async fn authenticate(&self, parts: &Parts) -> Option<Principal> {
        let key = parts.headers.get(&self.header)?.to_str().ok()?;
        let principal = self.keys.get(key).cloned();
        if principal.is_none() {
            tracing::debug!(header = %self.header, "unknown api key");
        }
        principal
    }
}

#[derive(Debug, Clone)]
struct BasicAccount {
    password: String,
    roles: Vec<String>,
}

/// Authenticates callers with HTTP Basic credentials.
///
/// A matching user name and password yields a principal carrying the user
/// name and the account's roles.
#[derive(Debug, Clone, Default)]
pub struct BasicAuthProvider {
    accounts: HashMap<String, BasicAccount>,
}

impl BasicAuthProvider {
    /// Creates a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account.
    #[must_use]
    pub fn account<I, S>(mut self, user: impl Into<String>, password: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accounts.insert(
            user.into(),
            BasicAccount {
                password: password.into(),
                roles: roles.into_iter().map(Into::into).collect(),
            },
        );
        self
    }
}

/// Splits a `Basic` authorization value into user name and password.
fn decode_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

#[async_trait]
impl IdentityProvider for BasicAuthProvider {
    async fn authenticate(&self, parts: &Parts) -> Option<Principal> {
        let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
        let (user, password) = decode_basic(value)?;
        let account = self.accounts.get(&user)?;
        if account.password != password {
            tracing::debug!(user = %user, "basic credentials rejected");
            return None;
        }
        Some(
            account
                .roles
                .iter()
                .fold(Principal::authenticated(user), |p, role| p.with_role(role.clone())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(header: &str, value: &str) -> Parts {
        http::Request::builder()
            .header(header, value)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn basic(credentials: &str) -> String {
        format!("Basic {}", STANDARD.encode(credentials))
    }

    #[tokio::test]
    async fn test_api_key_lookup() {
        let provider = ApiKeyProvider::new("X-API-KEY")
            .unwrap()
            .key("secret", Principal::authenticated("svc"));

        let found = provider.authenticate(&parts("x-api-key", "secret")).await;
        assert_eq!(found.and_then(|p| p.name().map(String::from)), Some("svc".to_string()));

        assert!(provider.authenticate(&parts("x-api-key", "wrong")).await.is_none());
        assert!(provider.authenticate(&parts("x-other", "secret")).await.is_none());
    }

    #[test]
    fn test_api_key_header_name_is_validated() {
        let err = ApiKeyProvider::new("x api key").unwrap_err();
        assert_eq!(
            err,
            AuthzError::InvalidHeaderName {
                name: "x api key".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_basic_credentials() {
        let provider = BasicAuthProvider::new().account("alice", "pa:ss", ["admin", "ops"]);

        let principal = provider
            .authenticate(&parts("authorization", &basic("alice:pa:ss")))
            .await
            .unwrap();
        assert!(principal.is_authenticated());
        assert_eq!(principal.name(), Some("alice"));
        assert!(principal.has_role("ops"));

        assert!(provider
            .authenticate(&parts("authorization", &basic("alice:nope")))
            .await
            .is_none());
        assert!(provider
            .authenticate(&parts("authorization", &basic("bob:pa:ss")))
            .await
            .is_none());
    }

    #[test]
    fn test_decode_basic() {
        assert_eq!(
            decode_basic(&basic("u:p")),
            Some(("u".to_string(), "p".to_string()))
        );
        assert_eq!(decode_basic("Bearer abc"), None);
        assert_eq!(decode_basic("Basic !!!"), None);
        assert_eq!(decode_basic(&format!("Basic {}", STANDARD.encode("nocolon"))), None);
    }
}
