//! Broadcast hub for relay clients
//!
//! Every client sees every delivery except its own. Payloads are forwarded
//! untouched; only the event name is rewritten on the way through.

use super::command::SceneCommand;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Identity of a connected relay client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    /// Origin used for commands published by the service itself
    pub const SERVER: ClientId = ClientId(0);
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::SERVER {
            write!(f, "server")
        } else {
            write!(f, "client-{}", self.0)
        }
    }
}

/// Event names on the relay socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayEvent {
    /// Emitted by the browser widget, delivered to the scene client
    AiResponse,
    UnityCommand,
    /// Emitted by the scene client, delivered to the browser widget
    UnityStatus,
    BotStatus,
}

impl RelayEvent {
    /// Name under which an inbound event is rebroadcast, if it is routed
    pub fn rebroadcast_as(self) -> Option<RelayEvent> {
        match self {
            RelayEvent::AiResponse => Some(RelayEvent::UnityCommand),
            RelayEvent::UnityStatus => Some(RelayEvent::BotStatus),
            RelayEvent::UnityCommand | RelayEvent::BotStatus => None,
        }
    }
}

/// JSON frame exchanged with relay clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: RelayEvent,
    pub data: String,
}

#[derive(Debug, Clone)]
struct Delivery {
    origin: ClientId,
    envelope: Envelope,
}

pub struct RelayHub {
    tx: broadcast::Sender<Delivery>,
    next_id: AtomicU64,
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a client and subscribe it to deliveries from everyone else
    pub fn connect(&self) -> Subscription {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::info!(client = %id, "Relay client connected");
        Subscription {
            id,
            rx: self.tx.subscribe(),
        }
    }

    /// Route an inbound frame from `origin`. Returns the number of clients
    /// it was delivered to, or `None` if the event is not routable.
    pub fn route(&self, origin: ClientId, envelope: Envelope) -> Option<usize> {
        let Some(event) = envelope.event.rebroadcast_as() else {
            tracing::debug!(client = %origin, event = ?envelope.event, "Ignoring unroutable relay event");
            return None;
        };
        if envelope.event == RelayEvent::AiResponse {
            // Payloads are opaque; decoding is only for the log
            match SceneCommand::from_wire(&envelope.data) {
                Ok(command) => tracing::info!(client = %origin, ?command, "Relaying scene command"),
                Err(e) => tracing::debug!(client = %origin, error = %e, "Relaying undecodable payload"),
            }
        } else {
            tracing::debug!(client = %origin, inbound = ?envelope.event, outbound = ?event, "Relaying");
        }
        Some(self.send(
            origin,
            Envelope {
                event,
                data: envelope.data,
            },
        ))
    }

    /// Publish a scene command from the service to every connected client
    pub fn publish_command(&self, command: &SceneCommand) -> usize {
        self.send(
            ClientId::SERVER,
            Envelope {
                event: RelayEvent::UnityCommand,
                data: command.to_wire(),
            },
        )
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn send(&self, origin: ClientId, envelope: Envelope) -> usize {
        let others = self.tx.receiver_count();
        // No subscribers is not an error for a relay
        let _ = self.tx.send(Delivery { origin, envelope });
        if origin == ClientId::SERVER {
            others
        } else {
            others.saturating_sub(1)
        }
    }
}

/// A connected client's view of the hub
pub struct Subscription {
    id: ClientId,
    rx: broadcast::Receiver<Delivery>,
}

impl Subscription {
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Next frame from another client. Returns `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            match self.rx.recv().await {
                Ok(delivery) if delivery.origin == self.id => {}
                Ok(delivery) => return Some(delivery.envelope),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(client = %self.id, skipped, "Relay client lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        tracing::info!(client = %self.id, "Relay client disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn next(sub: &mut Subscription) -> Option<Envelope> {
        timeout(Duration::from_millis(50), sub.recv()).await.ok().flatten()
    }

    #[tokio::test]
    async fn test_ai_response_reaches_others_as_unity_command() {
        let hub = RelayHub::new();
        let mut browser = hub.connect();
        let mut scene = hub.connect();

        let delivered = hub.route(
            browser.id(),
            Envelope {
                event: RelayEvent::AiResponse,
                data: "payload".to_string(),
            },
        );
        assert_eq!(delivered, Some(1));

        let frame = next(&mut scene).await.unwrap();
        assert_eq!(frame.event, RelayEvent::UnityCommand);
        assert_eq!(frame.data, "payload");

        // Sender never hears its own frame
        assert!(next(&mut browser).await.is_none());
    }

    #[tokio::test]
    async fn test_unity_status_reaches_others_as_bot_status() {
        let hub = RelayHub::new();
        let mut browser = hub.connect();
        let scene = hub.connect();

        hub.route(
            scene.id(),
            Envelope {
                event: RelayEvent::UnityStatus,
                data: "ready".to_string(),
            },
        );

        let frame = next(&mut browser).await.unwrap();
        assert_eq!(frame.event, RelayEvent::BotStatus);
        assert_eq!(frame.data, "ready");
    }

    #[tokio::test]
    async fn test_outbound_event_names_are_not_routed() {
        let hub = RelayHub::new();
        let client = hub.connect();
        let mut other = hub.connect();

        let routed = hub.route(
            client.id(),
            Envelope {
                event: RelayEvent::UnityCommand,
                data: "spoofed".to_string(),
            },
        );
        assert_eq!(routed, None);
        assert!(next(&mut other).await.is_none());
    }

    #[tokio::test]
    async fn test_published_command_reaches_every_client() {
        let hub = RelayHub::new();
        let mut a = hub.connect();
        let mut b = hub.connect();

        let command = SceneCommand::CreateObject {
            object: "Chair".to_string(),
            color: "Black".to_string(),
        };
        assert_eq!(hub.publish_command(&command), 2);

        for sub in [&mut a, &mut b] {
            let frame = next(sub).await.unwrap();
            assert_eq!(frame.event, RelayEvent::UnityCommand);
            assert_eq!(SceneCommand::from_wire(&frame.data).unwrap(), command);
        }
    }

    #[test]
    fn test_envelope_json_shape() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"event":"ai_response","data":"x"}"#).unwrap();
        assert_eq!(envelope.event, RelayEvent::AiResponse);
        assert_eq!(
            serde_json::to_string(&Envelope {
                event: RelayEvent::BotStatus,
                data: "ok".to_string()
            })
            .unwrap(),
            r#"{"event":"bot_status","data":"ok"}"#
        );
    }

    #[test]
    fn test_publish_without_clients() {
        let hub = RelayHub::new();
        let command = SceneCommand::SetColor {
            value: "Red".to_string(),
        };
        assert_eq!(hub.publish_command(&command), 0);
        assert_eq!(hub.client_count(), 0);
    }
}
