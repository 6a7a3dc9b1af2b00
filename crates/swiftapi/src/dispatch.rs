//! The per-request dispatch pipeline.
//!
//! A matched request moves through a fixed sequence of states:
//!
//! ```text
//! Routed → Authorizing → Binding → Invoking → Marshaling → Completed
//!    └──────────┴────────────┴─────────┴───────────┴──→ Errored
//! ```
//!
//! Authorization runs before anything touches the body or the service, so a
//! refused caller never causes an invocation. The service scope is owned by
//! the pipeline future; it is released when the future completes, fails or is
//! dropped on cancellation.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};
use swiftapi_authz::{AuthzError, IdentityProvider};
use swiftapi_core::contract::HttpVerb;
use swiftapi_core::{Principal, RequestContext, ServiceResolver, SwiftError, SwiftResult};
use swiftapi_extract::{ExtractionContext, ParameterBinder};
use swiftapi_router::RouteMatch;
use swiftapi_telemetry::metrics::record_authz_denial;
use tracing::{debug, instrument, trace, warn};

use crate::cache::{is_storable, CacheKey, CachedResponse, OutputCache};
use crate::marshal::marshal_typed;
use crate::registry::{ContractRegistry, RegisteredAction};

/// Where a request is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// A route matched.
    Routed,
    /// Checking the caller against the access rule.
    Authorizing,
    /// Resolving arguments from the request.
    Binding,
    /// Running the service action.
    Invoking,
    /// Converting the result into a response.
    Marshaling,
    /// A response was produced.
    Completed,
    /// The request failed.
    Errored,
}

impl DispatchState {
    /// Lower-case state name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Routed => "routed",
            Self::Authorizing => "authorizing",
            Self::Binding => "binding",
            Self::Invoking => "invoking",
            Self::Marshaling => "marshaling",
            Self::Completed => "completed",
            Self::Errored => "errored",
        }
    }

    /// Returns `true` for `Completed` and `Errored`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs matched requests through authorization, binding, invocation and
/// marshaling.
pub struct Dispatcher {
    registry: Arc<ContractRegistry>,
    resolver: Arc<dyn ServiceResolver>,
    identity: Option<Arc<dyn IdentityProvider>>,
    cache: Option<Arc<dyn OutputCache>>,
    max_body_size: usize,
}

impl Dispatcher {
    /// Creates a dispatcher with no identity provider and no output cache.
    #[must_use]
    pub fn new(
        registry: Arc<ContractRegistry>,
        resolver: Arc<dyn ServiceResolver>,
        max_body_size: usize,
    ) -> Self {
        Self {
            registry,
            resolver,
            identity: None,
            cache: None,
            max_body_size,
        }
    }

    /// Authenticates callers with `provider`. Without one, every caller is
    /// anonymous.
    #[must_use]
    pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(provider);
        self
    }

    /// Serves cacheable actions through `cache`.
    #[must_use]
    pub fn with_output_cache(mut self, cache: Arc<dyn OutputCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The registry requests are dispatched against.
    #[must_use]
    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// Dispatches a matched request.
    ///
    /// # Errors
    ///
    /// Returns the failure of whichever state was running: an authorization
    /// error, a binding error, the service's own error or a marshaling error.
    #[instrument(
        name = "dispatch",
        skip_all,
        fields(request_id = %ctx.request_id(), operation_id = tracing::field::Empty)
    )]
    pub async fn dispatch(
        &self,
        matched: RouteMatch,
        request: Request<Bytes>,
        ctx: &mut RequestContext,
    ) -> SwiftResult<Response<Bytes>> {
        let registered = self.registry.action(matched.route_id).ok_or_else(|| {
            SwiftError::internal(format!("no action registered for route {}", matched.route_id))
        })?;
        tracing::Span::current().record("operation_id", registered.operation_id());
        ctx.set_operation_id(registered.operation_id());

        let mut state = DispatchState::Routed;
        let outcome = self.run(registered, matched, request, ctx, &mut state).await;
        match &outcome {
            Ok(response) => {
                advance(&mut state, DispatchState::Completed);
                trace!(status = response.status().as_u16(), "dispatch completed");
            }
            Err(err) => {
                debug!(failed_in = %state, error = %err, "dispatch failed");
                advance(&mut state, DispatchState::Errored);
            }
        }
        outcome
    }

    async fn run(
        &self,
        registered: &RegisteredAction,
        matched: RouteMatch,
        request: Request<Bytes>,
        ctx: &mut RequestContext,
        state: &mut DispatchState,
    ) -> SwiftResult<Response<Bytes>> {
        let action = registered.action();
        let (parts, body) = request.into_parts();

        advance(state, DispatchState::Authorizing);
        let principal = match &self.identity {
            Some(provider) => provider
                .authenticate(&parts)
                .await
                .unwrap_or_else(Principal::anonymous),
            None => Principal::anonymous(),
        };
        ctx.set_principal(principal);
        if let Err(err) = registered.access().authorize(ctx.principal()) {
            record_authz_denial(registered.operation_id(), denial_reason(&err));
            return Err(err.into());
        }

        let cache_slot = match (&self.cache, action.cache_policy()) {
            (Some(cache), Some(policy)) if action.verb() == HttpVerb::Get => {
                let key = CacheKey::derive(
                    action.verb(),
                    parts.uri.path(),
                    parts.uri.query(),
                    &parts.headers,
                    policy,
                );
                if let Some(hit) = cache.get(&key).await {
                    debug!("served from output cache");
                    return Ok(hit.into_response());
                }
                Some((cache, key, policy.duration))
            }
            _ => None,
        };

        advance(state, DispatchState::Binding);
        let extraction = ExtractionContext::new(
            parts.method,
            parts.uri,
            parts.headers,
            body,
            matched.params,
        );
        let args = ParameterBinder::new(self.registry.catalog())
            .max_body_size(self.max_body_size)
            .bind(action.params(), &extraction)
            .await?;

        advance(state, DispatchState::Invoking);
        let contract = registered.contract();
        let mut scope = self
            .resolver
            .create_scope(contract.service_name())
            .map_err(|err| {
                warn!(service = contract.service_name(), error = %err, "service unavailable");
                err
            })?;
        let result = scope
            .instance()
            .invoke(action.method_name(), args, ctx)
            .await?;

        advance(state, DispatchState::Marshaling);
        let response = marshal_typed(result, action.return_type(), self.registry.catalog()).await?;
        drop(scope);

        if let Some((cache, key, ttl)) = cache_slot {
            if is_storable(action.verb(), &response) {
                cache.put(key, CachedResponse::from_response(&response), ttl).await;
            }
        }
        Ok(response)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.registry.len())
            .field("identity", &self.identity.is_some())
            .field("cache", &self.cache.is_some())
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

fn advance(state: &mut DispatchState, next: DispatchState) {
    trace!(from = %state, to = %next, "dispatch state");
    *state = next;
}

const fn denial_reason(err: &AuthzError) -> &'static str {
    match err {
        AuthzError::Unauthenticated => "unauthenticated",
        AuthzError::ForbiddenRole { .. } => "role",
        AuthzError::ForbiddenPolicy { .. } => "policy",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use swiftapi_core::{
        Action, ActionResult, Arguments, Contract, Parameter, SecurityRequirement,
        ServiceContainer, ServiceInstance, TypeDescriptor,
    };
    use swiftapi_router::RouteLookup;

    use crate::cache::MemoryOutputCache;

    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl ServiceInstance for Counter {
        async fn invoke(
            &mut self,
            action: &str,
            args: Arguments,
            _ctx: &RequestContext,
        ) -> SwiftResult<ActionResult> {
            let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            match action {
                "Echo" => Ok(ActionResult::Json(args.value("value").map_or(
                    serde_json::Value::Null,
                    swiftapi_core::BoundValue::to_json,
                ))),
                "Count" => ActionResult::json(&n),
                other => Err(SwiftError::not_implemented(other.to_string())),
            }
        }
    }

    fn dispatcher(calls: &Arc<AtomicUsize>) -> Dispatcher {
        let contract = Contract::builder("Things")
            .action(Action::get("Echo").param(Parameter::query("value", TypeDescriptor::int32())))
            .action(Action::get("Count").cache(swiftapi_core::contract::CachePolicy::minutes(1)))
            .action(Action::post("Guarded").secure(SecurityRequirement::authenticated()))
            .build();
        let calls = Arc::clone(calls);
        let container = ServiceContainer::new().with("Things", move || Counter(Arc::clone(&calls)));
        let registry = ContractRegistry::builder()
            .contract(contract)
            .build(&container)
            .unwrap();
        Dispatcher::new(Arc::new(registry), Arc::new(container), 1024)
    }

    async fn send(dispatcher: &Dispatcher, method: http::Method, uri: &str) -> SwiftResult<Response<Bytes>> {
        let request = Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(Bytes::new())
            .unwrap();
        let path = request.uri().path().to_string();
        let RouteLookup::Matched(matched) = dispatcher.registry().lookup(&method, &path) else {
            panic!("no route for {uri}");
        };
        let mut ctx = RequestContext::new();
        dispatcher.dispatch(matched, request, &mut ctx).await
    }

    #[test]
    fn test_state_names() {
        assert_eq!(DispatchState::Marshaling.to_string(), "marshaling");
        assert!(DispatchState::Errored.is_terminal());
        assert!(!DispatchState::Binding.is_terminal());
    }

    #[tokio::test]
    async fn test_binds_and_invokes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(&calls);
        let response = send(&dispatcher, http::Method::GET, "/api/things/echo?value=41")
            .await
            .unwrap();
        assert_eq!(response.body(), &b"41"[..]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_never_invokes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(&calls);
        let err = send(&dispatcher, http::Method::POST, "/api/things/guarded")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_binding_failure_skips_invocation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(&calls);
        let err = send(&dispatcher, http::Method::GET, "/api/things/echo?value=abc")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_output_cache_hit_skips_invocation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(&calls).with_output_cache(Arc::new(MemoryOutputCache::new()));

        let first = send(&dispatcher, http::Method::GET, "/api/things/count").await.unwrap();
        let second = send(&dispatcher, http::Method::GET, "/api/things/count").await.unwrap();
        assert_eq!(first.body(), &b"1"[..]);
        assert_eq!(second.body(), &b"1"[..]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
