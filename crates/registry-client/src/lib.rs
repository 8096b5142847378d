//! Session registry client
//!
//! Protocol engines mutate call state through [`SessionRegistryClient`] and
//! never learn where the registry lives. Pick an implementation when wiring
//! the process:
//!
//! - [`LocalRegistryClient`]: the registry runs in the same process
//! - [`HttpRegistryClient`]: the registry is reached over HTTP with a timeout
//! - [`LoggingRegistryClient`]: logs and succeeds, for dry runs and tests

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod local;
pub mod logging;

pub use client::{SessionRegistryClient, SessionRegistryClientExt};
pub use config::RegistryClientConfig;
pub use error::{ClientError, Result};
pub use http::HttpRegistryClient;
pub use local::LocalRegistryClient;
pub use logging::LoggingRegistryClient;
