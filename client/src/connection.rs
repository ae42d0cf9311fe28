use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use seer_protocol::{ClientMessage, ServerFrame, parse_server_frame};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One websocket to a Showdown server.
///
/// There is no reconnect: a dropped socket loses the login and every battle
/// room, so the session ends instead.
pub struct Connection {
    ws: WsStream,
}

impl Connection {
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _response) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        Ok(Self { ws })
    }

    /// Receive the next text frame, or None once the server closes
    pub async fn next_frame(&mut self) -> Result<Option<ServerFrame>> {
        while let Some(message) = self.ws.next().await {
            let message = message.context("WebSocket error")?;

            match message {
                Message::Text(text) => return Ok(Some(parse_server_frame(&text))),
                Message::Close(_) => return Ok(None),
                Message::Ping(data) => self
                    .ws
                    .send(Message::Pong(data))
                    .await
                    .context("Failed to send pong")?,
                _ => {}
            }
        }

        Ok(None)
    }

    pub async fn send(&mut self, message: &ClientMessage) -> Result<()> {
        let wire_format = message.to_wire_format();
        tracing::debug!(frame = %wire_format, "sending");
        self.ws
            .send(Message::Text(wire_format))
            .await
            .context("Failed to send message")
    }

    pub async fn close(&mut self) -> Result<()> {
        self.ws
            .close(None)
            .await
            .context("Failed to close websocket")
    }
}
