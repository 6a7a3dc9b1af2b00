//! # SwiftAPI
//!
//! **Metadata-driven request dispatch**
//!
//! SwiftAPI turns declared service contracts into a working HTTP surface:
//!
//! - **Routes** are synthesized from contract and action names
//!   (`api/{contract}/{action}[/{route-param}]*`)
//! - **Arguments** are bound from the query string, path, headers or body,
//!   with type coercion driven by declared type descriptors
//! - **Authorization** is compiled per action from role, policy and
//!   public-access metadata
//! - **Results** are marshaled to JSON, text or attachments; failures are
//!   rendered as `application/problem+json`
//! - **OpenAPI** documentation is generated from the same metadata
//!
//! ## Quick Start
//!
//! ```rust
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use swiftapi::prelude::*;
//!
//! struct Orders;
//!
//! #[async_trait]
//! impl ServiceInstance for Orders {
//!     async fn invoke(
//!         &mut self,
//!         action: &str,
//!         args: Arguments,
//!         _ctx: &RequestContext,
//!     ) -> SwiftResult<ActionResult> {
//!         match action {
//!             "GetUserOrders" => {
//!                 let user_id: i32 = args.get("userId")?;
//!                 let page: i32 = args.get("page")?;
//!                 ActionResult::json(&serde_json::json!({ "user_id": user_id, "page": page }))
//!             }
//!             other => Err(SwiftError::not_implemented(other.to_string())),
//!         }
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let app = SwiftApi::builder()
//!     .contract(
//!         Contract::builder("Orders")
//!             .action(
//!                 Action::get("GetUserOrders")
//!                     .param(Parameter::query("userId", TypeDescriptor::int32()))
//!                     .param(Parameter::route("page", TypeDescriptor::int32())),
//!             )
//!             .build(),
//!     )
//!     .resolver(ServiceContainer::new().with("Orders", || Orders))
//!     .build()
//!     .unwrap();
//!
//! let request = http::Request::get("/api/orders/get_user_orders/2?userId=7")
//!     .body(Bytes::new())
//!     .unwrap();
//! let response = app.handle(request).await;
//! let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
//! assert_eq!(body, serde_json::json!({ "userId": 7, "page": 2 }));
//! # });
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Request → route → authorize → bind → invoke → marshal → Response
//!              └────────┴─────────┴───────┴────────┴──→ problem+json
//! ```

#![doc(html_root_url = "https://docs.rs/swiftapi/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
pub mod cache;
pub mod dispatch;
pub mod marshal;
mod registry;

pub use app::{BuildError, SwiftApi, SwiftApiBuilder, REQUEST_ID_HEADER};
pub use cache::{CacheKey, CachedResponse, MemoryOutputCache, OutputCache};
pub use dispatch::{DispatchState, Dispatcher};
pub use registry::{ContractRegistry, RegisteredAction, RegistryBuilder, RegistryError};
pub use swiftapi_core::ServiceContainer;

// Re-export the component crates
pub use swiftapi_authz as authz;
pub use swiftapi_config as config;
pub use swiftapi_core as core;
pub use swiftapi_docs as docs;
pub use swiftapi_extract as extract;
pub use swiftapi_router as router;
pub use swiftapi_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use swiftapi::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ContractRegistry, MemoryOutputCache, OutputCache, SwiftApi};

    pub use swiftapi_core::contract::CachePolicy;
    pub use swiftapi_core::{
        Action, ActionResult, Arguments, BindingSource, Contract, HttpVerb, Model, Parameter,
        Principal, RequestContext, SecurityRequirement, ServiceContainer, ServiceInstance,
        ServiceResolver, SwiftError, SwiftResult, TypeDescriptor,
    };

    pub use swiftapi_authz::{ApiKeyProvider, BasicAuthProvider, IdentityProvider};
    pub use swiftapi_config::{ConfigLoader, SwiftApiConfig};
}
