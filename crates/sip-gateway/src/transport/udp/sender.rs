use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::trace;

use crate::error::{Error, Result};

/// Sending side of the gateway's UDP socket
#[derive(Clone)]
pub struct UdpSender {
    socket: Arc<UdpSocket>,
}

impl UdpSender {
    pub fn new(socket: Arc<UdpSocket>) -> Self {
        Self { socket }
    }

    pub async fn send(&self, data: &[u8], target: SocketAddr) -> Result<()> {
        let sent = self.socket.send_to(data, target).await?;
        if sent != data.len() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!("sent {} of {} bytes", sent, data.len()),
            )));
        }
        trace!("Sent {} bytes to {}", sent, target);
        Ok(())
    }
}
