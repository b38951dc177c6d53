//! Chat socket transport.
//!
//! A [`Connector`] opens one socket and exposes it as a pair of channels:
//! text frames go out through `outbound`, and [`TransportEvent`]s come in
//! through `inbound`. Dropping `outbound` closes the socket locally.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::error::ChatError;

/// Event read from the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A JSON text frame
    Text(String),
    /// The socket closed or failed; carries the reason when known
    Closed(Option<String>),
}

/// An open socket, seen as channels
#[derive(Debug)]
pub struct Connection {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Opens chat sockets
#[async_trait]
pub trait Connector: Send + Sync {
    /// Resolves once the socket is open
    async fn connect(&self, url: &str) -> Result<Connection, ChatError>;
}

/// WebSocket connector backed by `tokio-tungstenite`
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<Connection, ChatError> {
        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        tracing::info!("Connected to chat socket {}", url);

        let (mut write, mut read) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<TransportEvent>();

        // Reader: socket -> inbound channel
        let reader_tx = inbound_tx.clone();
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if reader_tx.send(TransportEvent::Text(text.to_string())).is_err() {
                            return;
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        tracing::info!("Server closed the chat socket");
                        let reason = frame.map(|f| f.reason.to_string());
                        let _ = reader_tx.send(TransportEvent::Closed(reason));
                        return;
                    }
                    Err(e) => {
                        tracing::warn!("Chat socket read error: {}", e);
                        let _ = reader_tx.send(TransportEvent::Closed(Some(e.to_string())));
                        return;
                    }
                    // Binary, ping and pong frames carry no chat data.
                    Ok(_) => {}
                }
            }
            let _ = reader_tx.send(TransportEvent::Closed(None));
        });

        // Writer: outbound channel -> socket; closes the socket when the channel ends
        tokio::spawn(async move {
            while let Some(json) = outbound_rx.recv().await {
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to write chat frame: {}", e);
                    let _ = inbound_tx.send(TransportEvent::Closed(Some(e.to_string())));
                    return;
                }
            }
            if let Err(e) = write.close().await {
                tracing::debug!("Chat socket close: {}", e);
            }
        });

        Ok(Connection {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}
