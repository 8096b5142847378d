//! SIP over UDP signaling front-end
//!
//! Each datagram carries one request. [`parser`] turns it into a
//! [`SignalingRequest`], [`SipEngine`] drives the call through the session
//! registry and answers with responses built by [`builder`], and
//! [`SipGateway`] ties the engine to a [`UdpTransport`].
//!
//! Calls are keyed by `Call-ID` only. An `INVITE` registers a `SIP` session
//! and answers `100`, `180` and `200`; a `BYE` deregisters it and answers
//! `200`. `ACK` is accepted silently.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod message;
pub mod parser;
pub mod server;
pub mod transport;

pub use builder::generate_response;
pub use config::SipConfig;
pub use engine::{DatagramSender, EngineSettings, MediaSimulation, SipEngine};
pub use error::{Error, ParseError, Result};
pub use message::{Method, SignalingRequest};
pub use parser::parse_signaling_request;
pub use server::SipGateway;
pub use transport::{TransportEvent, UdpTransport};
