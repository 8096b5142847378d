use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tracing::trace;

use crate::error::Result;

/// Receiving side of the gateway's UDP socket
pub struct UdpListener {
    socket: Arc<UdpSocket>,
    buffer_size: usize,
}

impl UdpListener {
    pub async fn bind(addr: SocketAddr, buffer_size: usize) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket: Arc::new(socket),
            buffer_size,
        })
    }

    /// Wait for the next datagram
    ///
    /// Datagrams longer than the buffer are truncated by the socket.
    pub async fn receive(&self) -> Result<(Bytes, SocketAddr, SocketAddr)> {
        let mut buf = vec![0u8; self.buffer_size];
        let (len, src) = self.socket.recv_from(&mut buf).await?;
        buf.truncate(len);
        trace!("Received {} bytes from {}", len, src);
        Ok((Bytes::from(buf), src, self.local_addr()?))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Socket handle for the sending side
    pub fn clone_socket(&self) -> Arc<UdpSocket> {
        self.socket.clone()
    }
}
