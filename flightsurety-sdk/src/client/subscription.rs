//! Live log streaming over a WebSocket `eth_subscribe("logs")`.

use super::ClientError;
use crate::objects::rpc::{JsonRpcRequest, JsonRpcResponse, SubscriptionNotification};
use crate::objects::{Log, LogFilter};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use url::Url;

const SUBSCRIBE_REQUEST_ID: u64 = 1;

/// An open `logs` subscription.
///
/// Each call to [`next`](LogSubscription::next) yields the next log pushed by
/// the node. The subscription ends when the socket closes.
pub struct LogSubscription {
    id: String,
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl LogSubscription {
    /// Connect to `ws_url` and subscribe to logs matching `filter`.
    ///
    /// Block range fields of the filter are ignored by the node.
    pub async fn subscribe(ws_url: &Url, filter: &LogFilter) -> Result<Self, ClientError> {
        let (mut socket, _) = connect_async(ws_url.as_str()).await?;

        let request = JsonRpcRequest::new(SUBSCRIBE_REQUEST_ID, "eth_subscribe", ("logs", filter));
        socket
            .send(Message::Text(serde_json::to_string(&request)?))
            .await?;

        // Wait for the subscription id; notifications cannot arrive before it.
        while let Some(frame) = socket.next().await {
            let text = match frame? {
                Message::Text(text) => text,
                Message::Ping(payload) => {
                    socket.send(Message::Pong(payload)).await?;
                    continue;
                }
                Message::Close(_) => return Err(ClientError::SubscriptionClosed),
                _ => continue,
            };

            let response: JsonRpcResponse = serde_json::from_str(&text)?;
            if response.id != serde_json::json!(SUBSCRIBE_REQUEST_ID) {
                continue;
            }
            if let Some(error) = response.error {
                return Err(ClientError::Rpc(error));
            }
            let id: String = serde_json::from_value(response.result)?;
            debug!(subscription = %id, url = %ws_url, "Log subscription established");
            return Ok(Self { id, socket });
        }

        Err(ClientError::SubscriptionClosed)
    }

    /// The node-assigned subscription id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the next log. Returns `None` once the socket is closed.
    pub async fn next(&mut self) -> Option<Result<Log, ClientError>> {
        loop {
            let frame = match self.socket.next().await? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(e.into())),
            };

            match frame {
                Message::Text(text) => match parse_notification(&self.id, &text) {
                    Ok(Some(log)) => return Some(Ok(log)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                },
                Message::Ping(payload) => {
                    if let Err(e) = self.socket.send(Message::Pong(payload)).await {
                        return Some(Err(e.into()));
                    }
                }
                Message::Close(_) => return None,
                _ => {}
            }
        }
    }

    /// Send a close frame to the node.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.socket.close(None).await?;
        Ok(())
    }
}

/// Extract the log from an `eth_subscription` frame addressed to `id`.
///
/// Frames for other subscriptions and stray responses are ignored.
fn parse_notification(id: &str, text: &str) -> Result<Option<Log>, ClientError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.get("method").and_then(|m| m.as_str()) != Some("eth_subscription") {
        return Ok(None);
    }
    let notification: SubscriptionNotification<Log> = serde_json::from_value(value)?;
    if notification.params.subscription != id {
        return Ok(None);
    }
    Ok(Some(notification.params.result))
}
