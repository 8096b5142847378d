mod listener;
mod sender;

pub use listener::UdpListener;
pub use sender::UdpSender;

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::engine::DatagramSender;
use crate::error::{Error, Result};
use crate::transport::TransportEvent;

const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// UDP transport for SIP datagrams
///
/// One socket serves both directions. Inbound datagrams are delivered
/// unparsed on the event channel returned by [`UdpTransport::bind`].
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
}

struct UdpTransportInner {
    sender: UdpSender,
    listener: Arc<UdpListener>,
    closed: AtomicBool,
    cancel: CancellationToken,
    events_tx: mpsc::Sender<TransportEvent>,
}

impl UdpTransport {
    /// Bind to `addr` and start receiving
    pub async fn bind(
        addr: SocketAddr,
        buffer_size: usize,
        channel_capacity: Option<usize>,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>)> {
        if buffer_size == 0 || buffer_size > u16::MAX as usize {
            return Err(Error::Configuration(format!(
                "receive buffer size must be between 1 and 65535, got {}",
                buffer_size
            )));
        }

        let capacity = channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        let (events_tx, events_rx) = mpsc::channel(capacity);

        let listener = UdpListener::bind(addr, buffer_size).await?;
        let local_addr = listener.local_addr()?;
        info!("SIP UDP transport bound to {}", local_addr);

        let sender = UdpSender::new(listener.clone_socket());

        let transport = UdpTransport {
            inner: Arc::new(UdpTransportInner {
                sender,
                listener: Arc::new(listener),
                closed: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                events_tx,
            }),
        };

        transport.spawn_receive_loop();

        Ok((transport, events_rx))
    }

    fn spawn_receive_loop(&self) {
        let transport = self.clone();

        tokio::spawn(async move {
            let inner = &transport.inner;

            while !inner.closed.load(Ordering::Relaxed) {
                let result = tokio::select! {
                    _ = inner.cancel.cancelled() => break,
                    result = inner.listener.receive() => result,
                };

                match result {
                    Ok((data, source, destination)) => {
                        debug!("Received {} byte datagram from {}", data.len(), source);
                        let event = TransportEvent::DatagramReceived {
                            data,
                            source,
                            destination,
                        };
                        if inner.events_tx.send(event).await.is_err() {
                            debug!("Event receiver dropped, stopping receive loop");
                            break;
                        }
                    }
                    Err(e) => {
                        if inner.closed.load(Ordering::Relaxed) {
                            break;
                        }
                        error!("Error receiving UDP datagram: {}", e);
                        let _ = inner
                            .events_tx
                            .send(TransportEvent::Error {
                                error: format!("Error receiving datagram: {}", e),
                            })
                            .await;
                    }
                }
            }

            let _ = inner.events_tx.send(TransportEvent::Closed).await;
            info!("UDP receive loop terminated");
        });
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.inner.listener.local_addr()
    }

    /// Stop the receive loop; later sends fail with [`Error::TransportClosed`]
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Relaxed);
        self.inner.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DatagramSender for UdpTransport {
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<()> {
        if self.is_closed() {
            return Err(Error::TransportClosed);
        }
        debug!("Sending {} byte datagram to {}", data.len(), target);
        self.inner.sender.send(data, target).await
    }
}

impl fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(addr) = self.inner.listener.local_addr() {
            write!(f, "UdpTransport({})", addr)
        } else {
            write!(f, "UdpTransport(<e>)")
        }
    }
}
