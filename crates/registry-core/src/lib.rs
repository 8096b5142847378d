//! Session registry for the voice gateway
//!
//! [`SessionRegistry`] stores one [`Session`] per call and is shared by the
//! SIP and WebRTC front-ends. The [`api`] module exposes it over HTTP for
//! remote gateways and admin tooling.

pub mod api;
pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use config::RegistryApiConfig;
pub use error::{RegistryError, Result};
pub use registry::SessionRegistry;
pub use types::{Session, SessionDetails, SessionState, SessionType};
