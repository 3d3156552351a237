//! Viewer feed client.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use super::ClientError;
use crate::objects::FeedMessage;

/// A connected viewer feed.
///
/// Call [`next`](FeedClient::next) repeatedly to receive frames.
pub struct FeedClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl FeedClient {
    /// Connect to `GET /ws` on the server at `base_url`.
    ///
    /// `http`/`https` base URLs are mapped to `ws`/`wss`.
    pub async fn connect(base_url: &Url) -> Result<Self, ClientError> {
        let mut url = base_url.join("/ws")?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        // Switching between special schemes cannot fail.
        let _ = url.set_scheme(scheme);
        let (socket, _response) = connect_async(url.as_str()).await?;
        Ok(Self { socket })
    }

    /// Wait for the next feed frame. Returns `None` once the server closes
    /// the connection.
    pub async fn next(&mut self) -> Option<Result<FeedMessage, ClientError>> {
        loop {
            let frame = match self.socket.next().await? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(e.into())),
            };
            match frame {
                Message::Text(text) => {
                    return Some(serde_json::from_str(&text).map_err(ClientError::Json));
                }
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Close the connection.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.socket.close(None).await?;
        Ok(())
    }
}
