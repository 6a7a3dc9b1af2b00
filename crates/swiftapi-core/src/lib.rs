//! # SwiftAPI Core
//!
//! Core types and traits for the SwiftAPI dispatch engine.
//!
//! This crate provides the foundational types used throughout SwiftAPI:
//!
//! - [`Contract`], [`Action`], [`Parameter`] - Declarative service contracts
//! - [`TypeDescriptor`], [`Model`] - Semantic types for binding and documentation
//! - [`Principal`] - The caller identity seen by authorization
//! - [`SwiftError`], [`ProblemDetails`] - Error taxonomy and wire payload
//! - [`ServiceInstance`], [`ServiceResolver`] - Collaborators that run actions
//! - [`ActionResult`] - What an invocation hands back for marshaling

#![doc(html_root_url = "https://docs.rs/swiftapi-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
pub mod contract;
mod error;
mod identity;
mod invocation;
pub mod naming;
pub mod options;
pub mod service;
mod types;
mod value;

pub use context::{RequestContext, RequestId};
pub use contract::{
    Action, BindingSource, CachePolicy, Contract, HttpVerb, ModelEndpoint, Parameter,
    SecurityRequirement,
};
pub use error::{ErrorKind, FieldErrors, ProblemDetails, SwiftError, SwiftResult};
pub use identity::{Claim, Principal, NAME_CLAIM_TYPE, POLICY_CLAIM_TYPE, ROLE_CLAIM_TYPE};
pub use invocation::{ActionResult, ByteStream};
pub use options::{AuthScheme, SecurityOptions};
pub use service::{ServiceContainer, ServiceInstance, ServiceResolver, ServiceScope};
pub use types::{IntegerWidth, Model, ModelCatalog, Property, TypeDescriptor};
pub use value::{Arguments, BoundValue, UploadedFile};
