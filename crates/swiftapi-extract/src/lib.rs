//! # SwiftAPI Extract
//!
//! Request extraction and parameter binding for SwiftAPI.
//!
//! This crate turns an inbound request into the typed [`Arguments`] an
//! action is invoked with. Binding is driven entirely by the action's
//! declared parameters: each one names a source and a
//! [`TypeDescriptor`](swiftapi_core::TypeDescriptor), and raw request text is
//! coerced to that type.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`context`] | [`ExtractionContext`], the request as seen by the binder |
//! | [`query`] | case-insensitive query string access |
//! | [`coerce`] | string-to-type conversion rules |
//! | [`json`] | case-insensitive JSON body decoding |
//! | [`form`], [`multipart`] | URL-encoded and multipart form payloads |
//! | [`binder`] | [`ParameterBinder`], tying the above together |
//!
//! ## Error Handling
//!
//! Binding failures are [`ExtractionError`]s, which convert into
//! [`SwiftError::InvalidArgument`](swiftapi_core::SwiftError::InvalidArgument)
//! (400). A JSON body that fails to decode is the exception: it binds as
//! null and the action decides what to do.
//!
//! [`Arguments`]: swiftapi_core::Arguments

#![doc(html_root_url = "https://docs.rs/swiftapi-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod binder;
pub mod coerce;
pub mod context;
mod error;
pub mod form;
pub mod json;
pub mod multipart;
pub mod query;

pub use binder::{ParameterBinder, DEFAULT_MAX_BODY_SIZE};
pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{ExtractionError, ExtractionSource};
pub use form::FormData;
pub use query::QueryString;
