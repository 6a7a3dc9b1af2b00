//! SwiftAPI Authorization
//!
//! Decides whether a caller may invoke an action.
//!
//! # Overview
//!
//! Security metadata lives on contracts and actions as
//! [`SecurityRequirement`](swiftapi_core::SecurityRequirement)s plus an open
//! marker. When routes are built each action's metadata is compiled into an
//! [`AccessRule`]; per request the dispatcher resolves a
//! [`Principal`](swiftapi_core::Principal) through an [`IdentityProvider`]
//! and checks it against the rule before anything is bound or invoked.
//!
//! ```text
//!   Contract + Action metadata
//!              │ compile (build time)
//!   ┌──────────▼───────────┐
//!   │      AccessRule      │◄──── Principal ◄──── IdentityProvider
//!   └──────────┬───────────┘                        (per request)
//!              │ authorize
//!              ▼
//!        Ok(()) / AuthzError
//! ```
//!
//! # Example
//!
//! ```rust
//! use swiftapi_authz::{AccessRule, AuthzError};
//! use swiftapi_core::{Action, Contract, Principal, SecurityRequirement};
//!
//! let contract = Contract::builder("Admin")
//!     .secure(SecurityRequirement::roles(["admin", "ops"]))
//!     .action(Action::post("Restart"))
//!     .build();
//! let rule = AccessRule::compile(&contract, &contract.actions()[0]);
//!
//! let ops = Principal::authenticated("olga").with_role("ops");
//! assert!(rule.authorize(&ops).is_ok());
//! assert_eq!(rule.authorize(&Principal::anonymous()), Err(AuthzError::Unauthenticated));
//! ```

#![doc(html_root_url = "https://docs.rs/swiftapi-authz/0.1.0")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod evaluator;
pub mod identity;

pub use error::{AuthzError, AuthzResult};
pub use evaluator::AccessRule;
pub use identity::{ApiKeyProvider, BasicAuthProvider, IdentityProvider};
