//! WebSocket relay client
//!
//! This module implements the relay traits on top of `tokio-tungstenite`:
//! - Validating relay addresses (`ws://` or `wss://`)
//! - Opening the WebSocket connection
//! - Running NIP-01 subscriptions until EOSE
//! - Closing subscriptions and the socket

use crate::protocol::{ClientMessage, Event, Filter, RelayMessage};
use crate::relay::{RelayClient, RelayConnection, RelayError, RelayResult};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

/// Relay client speaking NIP-01 over WebSocket
#[derive(Debug, Clone, Default)]
pub struct WebSocketClient;

impl WebSocketClient {
    pub fn new() -> Self {
        Self
    }
}

/// Checks that `address` is a WebSocket URL
fn parse_relay_url(address: &str) -> RelayResult<Url> {
    let url = Url::parse(address).map_err(|e| RelayError::InvalidAddress {
        relay: address.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(RelayError::InvalidAddress {
            relay: address.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

impl RelayClient for WebSocketClient {
    type Connection = WebSocketConnection;

    async fn connect(&self, address: &str) -> RelayResult<WebSocketConnection> {
        let url = parse_relay_url(address)?;

        let (stream, _response) =
            connect_async(url.as_str())
                .await
                .map_err(|e| RelayError::Connect {
                    relay: address.to_string(),
                    message: e.to_string(),
                })?;

        tracing::debug!("Connected to {}", address);

        Ok(WebSocketConnection {
            relay: address.to_string(),
            stream,
            next_subscription: 0,
            ended: false,
        })
    }
}

/// An open WebSocket connection to one relay
pub struct WebSocketConnection {
    relay: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_subscription: u64,
    /// Set once the relay closed the connection or the read side failed
    ended: bool,
}

impl WebSocketConnection {
    async fn send(&mut self, message: &ClientMessage) -> RelayResult<()> {
        let json = message.to_json()?;
        self.stream
            .send(Message::Text(json))
            .await
            .map_err(|e| RelayError::Transport {
                relay: self.relay.clone(),
                message: e.to_string(),
            })
    }

    /// Reads frames until EOSE for `subscription_id`
    ///
    /// Returns the collected events and whether EOSE was seen. A read error
    /// after some events arrived ends the subscription like a close does.
    async fn collect(&mut self, subscription_id: &str) -> RelayResult<(Vec<Event>, bool)> {
        let mut events = Vec::new();

        loop {
            let text = match self.stream.next().await {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | None => {
                    self.ended = true;
                    break;
                }
                Some(Err(e)) => {
                    self.ended = true;
                    if events.is_empty() {
                        return Err(RelayError::Transport {
                            relay: self.relay.clone(),
                            message: e.to_string(),
                        });
                    }
                    tracing::debug!("Read error on {}: {}", self.relay, e);
                    break;
                }
                // Binary, Ping, Pong
                Some(Ok(_)) => continue,
            };

            match RelayMessage::from_json(&text) {
                Ok(RelayMessage::Event {
                    subscription_id: sub,
                    event,
                }) if sub == subscription_id => events.push(*event),
                Ok(RelayMessage::Eose {
                    subscription_id: sub,
                }) if sub == subscription_id => return Ok((events, true)),
                Ok(RelayMessage::Closed {
                    subscription_id: sub,
                    message,
                }) if sub == subscription_id => {
                    return Err(RelayError::SubscriptionClosed {
                        relay: self.relay.clone(),
                        reason: message,
                    });
                }
                Ok(RelayMessage::Notice(notice)) => {
                    tracing::debug!("Notice from {}: {}", self.relay, notice);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Ignoring malformed message from {}: {}", self.relay, e);
                }
            }
        }

        Ok((events, false))
    }
}

impl RelayConnection for WebSocketConnection {
    async fn query(&mut self, filter: &Filter) -> RelayResult<Vec<Event>> {
        if self.ended {
            tracing::debug!("{} already closed, skipping query", self.relay);
            return Ok(Vec::new());
        }

        self.next_subscription += 1;
        let subscription_id = format!("dumpthread-{}", self.next_subscription);

        self.send(&ClientMessage::Req {
            subscription_id: subscription_id.clone(),
            filter: filter.clone(),
        })
        .await?;

        let (events, eose) = self.collect(&subscription_id).await?;

        if !eose {
            if events.is_empty() {
                return Err(RelayError::ConnectionClosed {
                    relay: self.relay.clone(),
                });
            }
            tracing::warn!(
                "{} closed before end of stored events, keeping {} event(s)",
                self.relay,
                events.len()
            );
            return Ok(events);
        }

        // Best effort: the relay may already have dropped the subscription
        if let Err(e) = self.send(&ClientMessage::Close { subscription_id }).await {
            tracing::debug!("Failed to close subscription: {}", e);
        }

        Ok(events)
    }

    async fn close(mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!("Error closing connection to {}: {}", self.relay, e);
        }
    }
}
