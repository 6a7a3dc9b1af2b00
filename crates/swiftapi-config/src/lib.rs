//! Typed configuration for SwiftAPI.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`PREFIX__SECTION__KEY`)
//! - `.env` files through `dotenvy`
//! - Strict parsing: unknown fields are rejected
//!
//! # Example
//!
//! ```no_run
//! use swiftapi_config::ConfigLoader;
//!
//! # fn main() -> Result<(), swiftapi_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("swiftapi.toml")?
//!     .with_env_prefix("SWIFTAPI")
//!     .load()?;
//!
//! println!("Max body: {} bytes", config.dispatch.max_body_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [security]
//! scheme = "api_key"
//! api_key_names = ["X-API-KEY"]
//!
//! [docs]
//! title = "Orders API"
//! version = "v1"
//!
//! [dispatch]
//! max_body_size = 1048576
//! request_timeout_ms = 30000
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

#![doc(html_root_url = "https://docs.rs/swiftapi-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{DispatchConfig, DocsConfig, SwiftApiConfig, DEFAULT_MAX_BODY_SIZE};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use swiftapi_core::SecurityOptions;
pub use swiftapi_telemetry::{LogConfig, LogFormat};
