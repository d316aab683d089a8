//! The subscriber hub and the WebSocket push channel.
//!
//! The hub owns the subscriber set, the broadcast channel every message
//! fans out over, and the start-once latch for the sampler. The first
//! client to connect starts the sampling loop; it then runs for the rest
//! of the process regardless of later connects and disconnects.

use crate::error::Result;
use crate::telemetry::message::{PushEvent, TelemetryMessage};
use crate::telemetry::sampler::Sampler;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch, RwLock};
use tracing::{debug, info, warn};

/// Broadcast depth. Subscribers that fall further behind than this drop
/// the oldest messages; the system is a most-recent-value feed, not a
/// durable log.
const BROADCAST_CAPACITY: usize = 100;

#[derive(Debug)]
struct Client {
    id: String,
    connected_at: std::time::SystemTime,
}

/// Shared state for the push channel: subscriber registry, fan-out
/// channel, shutdown flag, and the not-yet-started sampler.
pub struct Hub {
    tx: broadcast::Sender<TelemetryMessage>,
    clients: RwLock<HashMap<String, Client>>,
    sampler_started: AtomicBool,
    pending_sampler: Mutex<Option<Sampler>>,
    shutdown: watch::Sender<bool>,
}

impl Hub {
    /// Build a hub around a sampler that has not started yet.
    ///
    /// `shutdown` is the process-level cancellation flag; raising it is
    /// the only way to stop the sampling loop.
    pub fn new(sampler: Sampler, shutdown: watch::Sender<bool>) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(BROADCAST_CAPACITY);

        Arc::new(Self {
            tx,
            clients: RwLock::new(HashMap::new()),
            sampler_started: AtomicBool::new(false),
            pending_sampler: Mutex::new(Some(sampler)),
            shutdown,
        })
    }

    /// Start the sampling loop if nobody has yet.
    ///
    /// Concurrent first connections race here; the compare-and-swap lets
    /// exactly one of them through. Returns whether this call did the
    /// start.
    pub fn ensure_sampler_started(self: &Arc<Self>) -> bool {
        if self
            .sampler_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let sampler = self.pending_sampler.lock().ok().and_then(|mut s| s.take());
        let Some(sampler) = sampler else {
            warn!("sampler start latch won but no sampler was pending");
            return false;
        };

        info!("first subscriber connected, starting the sampling loop");

        let hub = Arc::clone(self);
        tokio::spawn(async move {
            let mut stream = sampler.into_stream();
            while let Some(message) = stream.next().await {
                hub.publish(message);
            }
            info!("sampling loop stopped");
        });

        true
    }

    /// Deliver a message to every currently connected subscriber,
    /// best-effort. With no subscribers the message is simply dropped;
    /// the loop keeps its cadence either way.
    pub fn publish(&self, message: TelemetryMessage) {
        match self.tx.send(message) {
            Ok(receivers) => debug!("published telemetry to {} subscribers", receivers),
            Err(_) => debug!("no live subscribers for this tick"),
        }
    }

    /// Open a fan-out receiver for one subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryMessage> {
        self.tx.subscribe()
    }

    /// Raise the process-level shutdown flag.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Number of currently connected subscribers.
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Whether the sampling loop has been started.
    pub fn sampler_running(&self) -> bool {
        self.sampler_started.load(Ordering::SeqCst)
    }

    async fn register(&self, id: &str) {
        let mut clients = self.clients.write().await;
        clients.insert(
            id.to_string(),
            Client {
                id: id.to_string(),
                connected_at: std::time::SystemTime::now(),
            },
        );
    }

    async fn unregister(&self, id: &str) {
        let mut clients = self.clients.write().await;
        if let Some(client) = clients.remove(id) {
            let connected_for = client.connected_at.elapsed().unwrap_or_default();
            debug!(
                "subscriber {} removed after {:?}",
                client.id, connected_for
            );
        }
    }
}

/// WebSocket upgrade handler for the push channel.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(hub): State<Arc<Hub>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Drive one subscriber connection for its lifetime.
async fn handle_socket(socket: WebSocket, hub: Arc<Hub>) {
    let client_id = uuid::Uuid::new_v4().to_string();
    info!("subscriber connected: {}", client_id);

    hub.register(&client_id).await;
    hub.ensure_sampler_started();

    let (mut sender, mut receiver) = socket.split();
    let mut rx = hub.subscribe();

    // The protocol has no client-to-server messages; inbound frames are
    // drained so close and error conditions are observed.
    let client_id_recv = client_id.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Close(_)) => {
                    info!("subscriber {} closed the channel", client_id_recv);
                    break;
                }
                Ok(Message::Text(text)) => {
                    debug!("ignoring message from {}: {}", client_id_recv, text);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("subscriber {} channel error: {}", client_id_recv, e);
                    break;
                }
            }
        }
    });

    let client_id_send = client_id.clone();
    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(message) => {
                    if let Err(e) = forward(&mut sender, &message).await {
                        warn!("dropping subscriber {}: {}", client_id_send, e);
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        "subscriber {} lagging, skipped {} updates",
                        client_id_send, skipped
                    );
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // A finished receive side means the client went away; a finished
    // send side means delivery failed. Either way this subscriber is
    // done, and nobody else is affected.
    tokio::select! {
        _ = recv_task => {}
        _ = send_task => {}
    }

    hub.unregister(&client_id).await;
    info!("subscriber disconnected: {}", client_id);
}

async fn forward(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    message: &TelemetryMessage,
) -> Result<()> {
    let payload = serde_json::to_string(&PushEvent::from(message))
        .map_err(|e| crate::error::TelemetryError::delivery(format!("encode failed: {}", e)))?;

    sender
        .send(Message::Text(payload))
        .await
        .map_err(|e| crate::error::TelemetryError::delivery(format!("send failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SimulatedSensor;
    use std::time::Duration;

    fn test_hub() -> Arc<Hub> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sampler = Sampler::new(
            Box::new(SimulatedSensor::new()),
            Duration::from_millis(5),
            shutdown_rx,
        );
        Hub::new(sampler, shutdown_tx)
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_harmless() {
        let hub = test_hub();
        hub.publish(TelemetryMessage::Empty);
        assert_eq!(hub.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_sampler_starts_exactly_once() {
        let hub = test_hub();

        let mut starts = 0;
        for _ in 0..4 {
            if hub.ensure_sampler_started() {
                starts += 1;
            }
        }

        assert_eq!(starts, 1);
        assert!(hub.sampler_running());
        hub.shutdown();
    }

    #[tokio::test]
    async fn test_concurrent_first_connects_start_one_loop() {
        let hub = test_hub();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let hub = Arc::clone(&hub);
                tokio::spawn(async move { hub.ensure_sampler_started() })
            })
            .collect();

        let mut starts = 0;
        for handle in handles {
            if handle.await.unwrap() {
                starts += 1;
            }
        }

        assert_eq!(starts, 1);
        hub.shutdown();
    }

    #[tokio::test]
    async fn test_started_loop_reaches_subscribers() {
        let hub = test_hub();
        let mut rx = hub.subscribe();

        hub.ensure_sampler_started();

        let message = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("sampler should tick")
            .expect("channel should stay open");

        // Simulated warm-up reads still carry the raw fields.
        assert!(!message.is_empty());
        hub.shutdown();
    }

    #[tokio::test]
    async fn test_register_and_unregister_track_subscribers() {
        let hub = test_hub();

        hub.register("a").await;
        hub.register("b").await;
        assert_eq!(hub.client_count().await, 2);

        hub.unregister("a").await;
        assert_eq!(hub.client_count().await, 1);

        // Removing an unknown id is a no-op.
        hub.unregister("missing").await;
        assert_eq!(hub.client_count().await, 1);
    }
}
