//! Service instances and their per-request scopes.
//!
//! A contract is served by a [`ServiceInstance`]. The dispatcher asks a
//! [`ServiceResolver`] for a fresh [`ServiceScope`] on every request; the
//! scope owns the instance exclusively and releases it when dropped, on
//! success, failure and cancellation alike.
//!
//! [`ServiceContainer`] is a name-keyed resolver backed by factories.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use swiftapi_core::service::{ServiceContainer, ServiceInstance, ServiceResolver};
//! use swiftapi_core::{ActionResult, Arguments, RequestContext, SwiftResult};
//!
//! struct Orders;
//!
//! #[async_trait]
//! impl ServiceInstance for Orders {
//!     async fn invoke(
//!         &mut self,
//!         action: &str,
//!         _args: Arguments,
//!         _ctx: &RequestContext,
//!     ) -> SwiftResult<ActionResult> {
//!         Ok(ActionResult::text(action.to_string()))
//!     }
//! }
//!
//! let mut container = ServiceContainer::new();
//! container.register("Orders", || Orders);
//! assert!(container.can_resolve("Orders"));
//! ```

use crate::context::RequestContext;
use crate::error::{SwiftError, SwiftResult};
use crate::invocation::ActionResult;
use crate::value::Arguments;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The implementation behind a contract.
#[async_trait]
pub trait ServiceInstance: Send {
    /// Invokes the action with the given declared method name.
    async fn invoke(
        &mut self,
        action: &str,
        args: Arguments,
        ctx: &RequestContext,
    ) -> SwiftResult<ActionResult>;
}

/// Yields request-scoped service instances by name.
pub trait ServiceResolver: Send + Sync {
    /// Returns `true` if `service` can be resolved.
    fn can_resolve(&self, service: &str) -> bool;

    /// Creates a new scope holding a fresh instance of `service`.
    fn create_scope(&self, service: &str) -> SwiftResult<ServiceScope>;
}

/// Exclusive, request-lifetime ownership of one service instance.
///
/// Dropping the scope releases the instance.
pub struct ServiceScope {
    service: String,
    instance: Box<dyn ServiceInstance>,
}

impl ServiceScope {
    /// Wraps an instance.
    #[must_use]
    pub fn new(service: impl Into<String>, instance: Box<dyn ServiceInstance>) -> Self {
        let service = service.into();
        tracing::trace!(service = %service, "service scope acquired");
        Self { service, instance }
    }

    /// The service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The owned instance.
    pub fn instance(&mut self) -> &mut dyn ServiceInstance {
        self.instance.as_mut()
    }
}

impl Drop for ServiceScope {
    fn drop(&mut self) {
        tracing::trace!(service = %self.service, "service scope released");
    }
}

impl fmt::Debug for ServiceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceScope")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

type Factory = Arc<dyn Fn() -> Box<dyn ServiceInstance> + Send + Sync>;

/// A name-keyed service resolver backed by factories.
///
/// Every scope gets a brand-new instance; nothing is shared between
/// requests.
#[derive(Default, Clone)]
pub struct ServiceContainer {
    factories: HashMap<String, Factory>,
}

impl ServiceContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `service`, replacing any previous one.
    pub fn register<S, F>(&mut self, service: impl Into<String>, factory: F)
    where
        S: ServiceInstance + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.factories.insert(
            service.into(),
            Arc::new(move || Box::new(factory()) as Box<dyn ServiceInstance>),
        );
    }

    /// Registers a factory and returns the container.
    #[must_use]
    pub fn with<S, F>(mut self, service: impl Into<String>, factory: F) -> Self
    where
        S: ServiceInstance + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.register(service, factory);
        self
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl ServiceResolver for ServiceContainer {
    fn can_resolve(&self, service: &str) -> bool {
        self.factories.contains_key(service)
    }

    fn create_scope(&self, service: &str) -> SwiftResult<ServiceScope> {
        let factory = self
            .factories
            .get(service)
            .ok_or_else(|| SwiftError::internal(format!("Service of type {service} is not registered")))?;
        Ok(ServiceScope::new(service, factory()))
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("service_count", &self.factories.len())
            .finish()
    }
}
