//! Security schemes derived from [`SecurityOptions`].

use indexmap::IndexMap;
use swiftapi_core::{AuthScheme, SecurityOptions};

use crate::error::{DocsError, DocsResult};
use crate::openapi::{OAuthFlow, OAuthFlows, SecurityRequirement, SecurityScheme};

/// Builds the component security schemes for the configured scheme.
///
/// API keys produce one scheme per configured header name.
pub fn security_schemes(options: &SecurityOptions) -> DocsResult<IndexMap<String, SecurityScheme>> {
    let mut schemes = IndexMap::new();
    match options.scheme {
        AuthScheme::None => {}
        AuthScheme::Bearer => {
            schemes.insert(
                "Bearer".to_string(),
                SecurityScheme {
                    scheme_type: "http".to_string(),
                    description: Some("JWT bearer token in the Authorization header".to_string()),
                    scheme: Some("bearer".to_string()),
                    bearer_format: Some("JWT".to_string()),
                    ..Default::default()
                },
            );
        }
        AuthScheme::Basic => {
            schemes.insert(
                "Basic".to_string(),
                SecurityScheme {
                    scheme_type: "http".to_string(),
                    description: Some("Basic auth: base64(username:password)".to_string()),
                    scheme: Some("basic".to_string()),
                    ..Default::default()
                },
            );
        }
        AuthScheme::ApiKey => {
            for key in &options.api_key_names {
                schemes.insert(
                    key.clone(),
                    SecurityScheme {
                        scheme_type: "apiKey".to_string(),
                        description: Some(format!("API key passed in the `{key}` header")),
                        location: Some("header".to_string()),
                        name: Some(key.clone()),
                        ..Default::default()
                    },
                );
            }
        }
        AuthScheme::OAuth2 => {
            schemes.insert(
                "OAuth2".to_string(),
                SecurityScheme {
                    scheme_type: "oauth2".to_string(),
                    description: Some("OAuth2".to_string()),
                    flows: Some(oauth2_flows(options)?),
                    ..Default::default()
                },
            );
        }
        AuthScheme::OpenIdConnect => {
            let url = options
                .openid_connect_url
                .clone()
                .ok_or(DocsError::MissingSecuritySetting {
                    scheme: "OpenIdConnect",
                    field: "openid_connect_url",
                })?;
            schemes.insert(
                "OpenIdConnect".to_string(),
                SecurityScheme {
                    scheme_type: "openIdConnect".to_string(),
                    description: Some("OpenID Connect".to_string()),
                    open_id_connect_url: Some(url),
                    ..Default::default()
                },
            );
        }
    }
    Ok(schemes)
}

fn oauth2_flows(options: &SecurityOptions) -> DocsResult<OAuthFlows> {
    let oauth2 = &options.oauth2;
    let token_url = oauth2.token_url.clone().ok_or(DocsError::MissingSecuritySetting {
        scheme: "OAuth2",
        field: "oauth2.token_url",
    })?;
    let flow = |authorization_url: Option<String>| OAuthFlow {
        authorization_url,
        token_url: token_url.clone(),
        scopes: oauth2.scopes.clone(),
    };

    Ok(OAuthFlows {
        password: Some(flow(None)),
        authorization_code: oauth2.authorization_url.clone().map(|url| flow(Some(url))),
        client_credentials: Some(flow(None)),
    })
}

/// Security requirements attached to operations that need authorization.
///
/// Every scheme is listed as an alternative. OAuth2 requires all configured
/// scopes.
#[must_use]
pub fn operation_security(
    options: &SecurityOptions,
    schemes: &IndexMap<String, SecurityScheme>,
) -> Vec<SecurityRequirement> {
    schemes
        .keys()
        .map(|name| {
            let scopes = if options.scheme == AuthScheme::OAuth2 {
                options.oauth2.scopes.keys().cloned().collect()
            } else {
                Vec::new()
            };
            IndexMap::from([(name.clone(), scopes)])
        })
        .collect()
}
