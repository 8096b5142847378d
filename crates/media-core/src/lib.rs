//! Media hand-off for the voice gateway
//!
//! Protocol engines package captured audio into [`AudioSegment`]s and pass
//! them to [`MediaHandoff`], which forwards each one to a
//! [`StreamIngester`] without waiting for the result. Background media work
//! belonging to a call is tracked by [`MediaTaskManager`] so it ends with
//! the call.

pub mod config;
pub mod error;
pub mod handoff;
pub mod ingest;
pub mod simulate;
pub mod tasks;
pub mod types;

pub use config::MediaConfig;
pub use error::{MediaError, Result};
pub use handoff::MediaHandoff;
pub use ingest::{HttpIngester, LoggingIngester, StreamIngester};
pub use simulate::simulate_call_audio;
pub use tasks::MediaTaskManager;
pub use types::{AudioFormat, AudioSegment};
