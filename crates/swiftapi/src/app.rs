//! The application object.
//!
//! [`SwiftApi`] owns the immutable registry, the dispatcher and the generated
//! OpenAPI document. [`SwiftApi::handle`] is the single request entry point:
//! it assigns a request id, routes, dispatches, applies the configured
//! timeout and renders failures as problem payloads.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::HeaderValue;
use http::{Request, Response};
use swiftapi_authz::IdentityProvider;
use swiftapi_config::{ConfigError, SwiftApiConfig};
use swiftapi_core::{
    Contract, Model, RequestContext, RequestId, ServiceResolver, SwiftError, SwiftResult,
};
use swiftapi_docs::{DocsError, DocumentationEmitter, Info, OpenApi};
use swiftapi_router::RouteLookup;
use swiftapi_telemetry::metrics::{record_request, InFlightGuard};
use swiftapi_telemetry::{log_request_complete, log_request_error, log_request_start};
use thiserror::Error;
use tracing::{info, instrument};

use crate::cache::{MemoryOutputCache, OutputCache};
use crate::dispatch::Dispatcher;
use crate::marshal::problem_response;
use crate::registry::{ContractRegistry, RegistryBuilder, RegistryError};

/// Response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Operation label for requests that matched no action.
const UNMATCHED_OPERATION: &str = "unmatched";

/// Failures while assembling a [`SwiftApi`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// No service resolver was supplied.
    #[error("a service resolver is required")]
    MissingResolver,

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The contracts could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The OpenAPI document could not be generated.
    #[error(transparent)]
    Docs(#[from] DocsError),
}

/// A built application.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use bytes::Bytes;
/// use swiftapi::core::{Action, ActionResult, Arguments, Contract, RequestContext, SwiftResult};
/// use swiftapi::core::service::ServiceInstance;
/// use swiftapi::{ServiceContainer, SwiftApi};
///
/// struct Greeter;
///
/// #[async_trait]
/// impl ServiceInstance for Greeter {
///     async fn invoke(&mut self, _: &str, _: Arguments, _: &RequestContext) -> SwiftResult<ActionResult> {
///         Ok(ActionResult::text("hello"))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let app = SwiftApi::builder()
///     .contract(Contract::builder("Greeter").action(Action::get("Hello")).build())
///     .resolver(ServiceContainer::new().with("Greeter", || Greeter))
///     .build()
///     .unwrap();
///
/// let request = http::Request::get("/api/greeter/hello").body(Bytes::new()).unwrap();
/// let response = app.handle(request).await;
/// assert_eq!(response.body(), "hello");
/// assert!(response.headers().contains_key("x-request-id"));
/// # });
/// ```
#[derive(Debug)]
pub struct SwiftApi {
    registry: Arc<ContractRegistry>,
    dispatcher: Dispatcher,
    openapi: OpenApi,
    request_timeout: Option<Duration>,
}

impl SwiftApi {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> SwiftApiBuilder {
        SwiftApiBuilder::new()
    }

    /// The contract registry.
    #[must_use]
    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// The OpenAPI document generated at build time.
    #[must_use]
    pub const fn openapi(&self) -> &OpenApi {
        &self.openapi
    }

    /// Handles one request.
    pub async fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        self.handle_with_cancellation(request, std::future::pending::<()>())
            .await
    }

    /// Handles one request, abandoning it when `cancelled` resolves.
    ///
    /// A cancelled request answers with status 499. Pending body reads and
    /// service calls are dropped, which releases the service scope.
    pub async fn handle_with_cancellation<C>(&self, request: Request<Bytes>, cancelled: C) -> Response<Bytes>
    where
        C: Future<Output = ()> + Send,
    {
        let started = Instant::now();
        let _in_flight = InFlightGuard::new();
        let request_id = RequestId::new();
        let mut ctx = RequestContext::with_request_id(request_id);
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        log_request_start!(request_id, method, path);

        let outcome = tokio::select! {
            biased;
            () = cancelled => Err(SwiftError::cancelled("The request was cancelled.")),
            result = with_timeout(self.request_timeout, self.route(request, &mut ctx)) => result,
        };

        let mut response = outcome.unwrap_or_else(|err| {
            log_request_error!(request_id, err);
            problem_response(&err)
        });
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        let operation = ctx.operation_id().unwrap_or(UNMATCHED_OPERATION);
        let status = response.status().as_u16();
        let elapsed = started.elapsed();
        record_request(operation, status, elapsed);
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        log_request_complete!(request_id, operation, status, elapsed_ms);
        response
    }

    async fn route(&self, request: Request<Bytes>, ctx: &mut RequestContext) -> SwiftResult<Response<Bytes>> {
        let path = request.uri().path().to_string();
        match self.registry.lookup(request.method(), &path) {
            RouteLookup::Matched(matched) => self.dispatcher.dispatch(matched, request, ctx).await,
            RouteLookup::MethodNotAllowed(verbs) => Err(SwiftError::method_not_allowed(
                request.method().as_str(),
                verbs.iter().map(|verb| verb.as_str().to_string()).collect(),
            )),
            RouteLookup::NotFound => Err(SwiftError::not_found(format!(
                "No action is bound to {path}."
            ))),
        }
    }
}

async fn with_timeout<F>(limit: Option<Duration>, work: F) -> SwiftResult<Response<Bytes>>
where
    F: Future<Output = SwiftResult<Response<Bytes>>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, work)
            .await
            .unwrap_or_else(|_| Err(SwiftError::timeout("The request timed out."))),
        None => work.await,
    }
}

/// Builder for [`SwiftApi`].
#[must_use]
pub struct SwiftApiBuilder {
    registry: RegistryBuilder,
    resolver: Option<Arc<dyn ServiceResolver>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    cache: Option<Arc<dyn OutputCache>>,
    config: SwiftApiConfig,
}

impl Default for SwiftApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SwiftApiBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self {
            registry: RegistryBuilder::new(),
            resolver: None,
            identity: None,
            cache: None,
            config: SwiftApiConfig::default(),
        }
    }

    /// Registers a contract.
    pub fn contract(mut self, contract: Contract) -> Self {
        self.registry = self.registry.contract(contract);
        self
    }

    /// Registers several contracts.
    pub fn contracts(mut self, contracts: impl IntoIterator<Item = Contract>) -> Self {
        self.registry = self.registry.contracts(contracts);
        self
    }

    /// Registers an interface used by model endpoints and inheritance.
    pub fn interface(mut self, contract: Contract) -> Self {
        self.registry = self.registry.interface(contract);
        self
    }

    /// Registers a model.
    pub fn model(mut self, model: Model) -> Self {
        self.registry = self.registry.model(model);
        self
    }

    /// Registers several models.
    pub fn models(mut self, models: impl IntoIterator<Item = Model>) -> Self {
        self.registry = self.registry.models(models);
        self
    }

    /// Replaces the registry builder.
    pub fn registry(mut self, registry: RegistryBuilder) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the resolver providing service instances.
    pub fn resolver(mut self, resolver: impl ServiceResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets a shared resolver.
    pub fn shared_resolver(mut self, resolver: Arc<dyn ServiceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the identity provider.
    pub fn identity_provider(mut self, provider: impl IdentityProvider + 'static) -> Self {
        self.identity = Some(Arc::new(provider));
        self
    }

    /// Sets the output cache.
    pub fn output_cache(mut self, cache: impl OutputCache + 'static) -> Self {
        self.cache = Some(Arc::new(cache));
        self
    }

    /// Uses an in-process [`MemoryOutputCache`].
    pub fn memory_cache(self) -> Self {
        self.output_cache(MemoryOutputCache::new())
    }

    /// Sets the configuration.
    pub fn config(mut self, config: SwiftApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the application: registers contracts and generates the OpenAPI
    /// document.
    ///
    /// # Errors
    ///
    /// Fails if no resolver is set, the configuration is invalid, the
    /// contracts conflict or the security settings cannot be documented.
    #[instrument(name = "swiftapi_build", skip_all)]
    pub fn build(self) -> Result<SwiftApi, BuildError> {
        let resolver = self.resolver.ok_or(BuildError::MissingResolver)?;
        self.config.validate()?;

        let registry = Arc::new(self.registry.build(resolver.as_ref())?);

        let docs = &self.config.docs;
        let openapi = DocumentationEmitter::new(registry.catalog(), &self.config.security)
            .info(Info {
                title: docs.title.clone(),
                version: docs.version.clone(),
                description: docs.description.clone(),
            })
            .emit(registry.actions().iter().map(|action| action.documented()))?;

        let dispatch = &self.config.dispatch;
        let mut dispatcher = Dispatcher::new(Arc::clone(&registry), resolver, dispatch.max_body_size);
        if let Some(provider) = self.identity {
            dispatcher = dispatcher.with_identity_provider(provider);
        }
        if let Some(cache) = self.cache {
            dispatcher = dispatcher.with_output_cache(cache);
        }

        info!(
            actions = registry.len(),
            paths = openapi.paths.len(),
            "application built"
        );
        Ok(SwiftApi {
            registry,
            dispatcher,
            openapi,
            request_timeout: dispatch.request_timeout(),
        })
    }
}
