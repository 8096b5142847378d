pub mod udp;

pub use udp::UdpTransport;

use std::net::SocketAddr;

use bytes::Bytes;

/// Events emitted by a transport's receive loop
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A datagram arrived
    DatagramReceived {
        data: Bytes,
        source: SocketAddr,
        destination: SocketAddr,
    },

    /// Receiving failed; the loop keeps running
    Error { error: String },

    /// The receive loop has stopped
    Closed,
}
