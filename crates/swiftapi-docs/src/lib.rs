//! # SwiftAPI Docs
//!
//! OpenAPI documentation for SwiftAPI contracts.
//!
//! Documentation is produced from the same metadata that drives routing,
//! binding and authorization, so it cannot drift from what the dispatcher
//! actually does.
//!
//! - [`SchemaGenerator`] maps type descriptors to schemas, caching results
//!   and cutting recursive models with `$ref`s.
//! - [`DocumentationEmitter`] turns routed actions into an [`OpenApi`]
//!   document, with security schemes derived from
//!   [`SecurityOptions`](swiftapi_core::SecurityOptions).
//!
//! ## Quick Start
//!
//! ```rust
//! use swiftapi_authz::AccessRule;
//! use swiftapi_core::{Action, Contract, ModelCatalog, Parameter, SecurityOptions, TypeDescriptor};
//! use swiftapi_docs::{DocumentationEmitter, DocumentedAction};
//! use swiftapi_router::synthesize;
//!
//! let contract = Contract::builder("Orders")
//!     .action(Action::get("List").param(Parameter::query("page", TypeDescriptor::int32())))
//!     .build();
//! let action = &contract.actions()[0];
//! let route = synthesize(&contract, action);
//! let access = AccessRule::compile(&contract, action);
//!
//! let catalog = ModelCatalog::new();
//! let security = SecurityOptions::default();
//! let doc = DocumentationEmitter::new(&catalog, &security)
//!     .emit([DocumentedAction { contract: &contract, action, route: &route, access: &access }])
//!     .unwrap();
//!
//! assert!(doc.paths.contains_key("/api/orders/list"));
//! ```

#![doc(html_root_url = "https://docs.rs/swiftapi-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod emitter;
mod error;
mod openapi;
mod schema;
pub mod security;

pub use emitter::{DocumentationEmitter, DocumentedAction, OPENAPI_VERSION};
pub use error::{DocsError, DocsResult};
pub use openapi::{
    Components, Info, MediaType, OAuthFlow, OAuthFlows, OpenApi, Operation, Parameter, ParameterIn,
    PathItem, RequestBody, Response, Schema, SchemaType, SecurityRequirement, SecurityScheme, Tag,
};
pub use schema::SchemaGenerator;
