//! WebRTC signaling front-end
//!
//! Browsers connect to `GET /ws` and exchange [`SignalMessage`]s. Each
//! connection is driven by [`SignalingHandler`]: it registers a `WebRTC`
//! session, relays offers and candidates to the [`MediaEngine`], marks the
//! session active once the media transport connects and deregisters it when
//! the connection ends.
//!
//! [`RtcMediaEngine`] is the production engine, built on the `webrtc` crate.

pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod handler;
pub mod rtc;
pub mod server;
pub mod signal;

pub use channel::{SignalChannel, WebSocketChannel};
pub use config::WebRtcConfig;
pub use engine::{EngineEvent, MediaEngine, PeerSession, TransportState};
pub use error::{Result, WebRtcError};
pub use guard::RegistrationGuard;
pub use handler::{ConnectionInfo, ConnectionOutcome, SignalingHandler};
pub use rtc::RtcMediaEngine;
pub use server::{router, serve};
pub use signal::{SignalKind, SignalMessage};
