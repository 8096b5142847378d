//! Bidirectional signaling channel to one browser

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use tracing::debug;

use crate::error::{Result, WebRtcError};
use crate::signal::SignalMessage;

/// Message transport between the gateway and one browser
#[async_trait]
pub trait SignalChannel: Send {
    /// Next inbound message
    ///
    /// `None` once the peer has gone away; `Some(Err(_))` for a frame that is
    /// not a signal message.
    async fn recv(&mut self) -> Option<Result<SignalMessage>>;

    async fn send(&mut self, message: &SignalMessage) -> Result<()>;

    async fn close(&mut self);
}

/// [`SignalChannel`] over an upgraded axum WebSocket, one JSON text frame per message
pub struct WebSocketChannel {
    socket: WebSocket,
}

impl WebSocketChannel {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

fn decode(frame: &[u8]) -> Result<SignalMessage> {
    serde_json::from_slice(frame).map_err(|e| WebRtcError::InvalidMessage(e.to_string()))
}

#[async_trait]
impl SignalChannel for WebSocketChannel {
    async fn recv(&mut self) -> Option<Result<SignalMessage>> {
        while let Some(frame) = self.socket.recv().await {
            match frame {
                Ok(Message::Text(text)) => return Some(decode(text.as_str().as_bytes())),
                Ok(Message::Binary(data)) => return Some(decode(&data)),
                Ok(Message::Close(_)) => return None,
                Ok(Message::Ping(_) | Message::Pong(_)) => continue,
                Err(e) => {
                    debug!(error = %e, "WebSocket read failed");
                    return None;
                }
            }
        }
        None
    }

    async fn send(&mut self, message: &SignalMessage) -> Result<()> {
        let json = serde_json::to_string(message)
            .map_err(|e| WebRtcError::Channel(e.to_string()))?;
        self.socket
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| WebRtcError::Channel(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.socket.send(Message::Close(None)).await;
    }
}
