//! WebSocket transport for the relay.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info};
use poker_view::{Transport, TransportError};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

/// One WebSocket connection carrying text frames.
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

/// Opens a WebSocket to `url`.
pub async fn connect(url: &str) -> Result<WsTransport, TransportError> {
    info!("connecting to {url}");
    let (stream, _) = connect_async(url)
        .await
        .map_err(|e| TransportError::Connect(e.to_string()))?;
    Ok(WsTransport { stream })
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(_)) => return None,
                Ok(other) => debug!("ignoring non-text frame {other:?}"),
                Err(e) => return Some(Err(TransportError::Receive(e.to_string()))),
            }
        }
        None
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}
