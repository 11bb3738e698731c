// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-session subscriber registry behind the realtime channel. The hub itself knows nothing
//! about HTTP or authentication; the WebSocket handler authenticates and registers, the hub
//! fans events out and enforces liveness.

use dashmap::DashMap;
use futures::StreamExt;
use kasgate_common::domain::{PaymentEvent, SessionStatus, Subscriber};
use log::{debug, info, warn};
use metrics::gauge;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{select, sync::mpsc, time};
use uuid::Uuid;

/// Messages a widget sends over the channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Subscribe { session_id: Uuid, token: String },
    Unsubscribe { session_id: Uuid },
    Ping,
}

/// Messages the gateway pushes to subscribed widgets.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Snapshot of the session's current visible fields, pushed on successful subscribe.
    Session {
        #[serde(flatten)]
        session: serde_json::Value,
    },
    Status {
        session_id: Uuid,
        status: SessionStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        confirmations: Option<u64>,
    },
    Confirmations {
        session_id: Uuid,
        confirmations: u64,
        required: u64,
    },
    Error {
        message: String,
    },
    Pong,
}

/// Frames traveling from the hub to a client's write task.
#[derive(Debug, Clone)]
pub enum Outbound {
    Message(ServerMessage),
    Ping,
    Close,
}

#[derive(Debug)]
struct Client {
    sender: mpsc::UnboundedSender<Outbound>,
    alive: Arc<AtomicBool>,
    session_ids: HashSet<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionHub {
    clients: Arc<DashMap<Uuid, Client>>,
    subscribers_by_session: Arc<DashMap<Uuid, HashSet<Uuid>>>,
}

impl SubscriptionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connected client. Returns its ID, the outbound frame stream and the
    /// liveness flag the reader flips on every inbound message.
    pub fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<Outbound>, Arc<AtomicBool>) {
        let client_id = Uuid::new_v4();
        let (sender, receiver) = mpsc::unbounded_channel();
        let alive = Arc::new(AtomicBool::new(true));

        self.clients.insert(
            client_id,
            Client {
                sender,
                alive: alive.clone(),
                session_ids: HashSet::new(),
            },
        );
        gauge!("kasgate_realtime_clients").set(self.clients.len() as f64);
        debug!(client_id:%; "realtime client registered");

        (client_id, receiver, alive)
    }

    pub fn remove_client(&self, client_id: Uuid) {
        if let Some((_, client)) = self.clients.remove(&client_id) {
            for session_id in client.session_ids {
                if let Some(mut subscribers) = self.subscribers_by_session.get_mut(&session_id) {
                    subscribers.remove(&client_id);
                }
            }
            gauge!("kasgate_realtime_clients").set(self.clients.len() as f64);
            debug!(client_id:%; "realtime client removed");
        }
    }

    pub fn subscribe(&self, client_id: Uuid, session_id: Uuid) {
        if let Some(mut client) = self.clients.get_mut(&client_id) {
            client.session_ids.insert(session_id);
            self.subscribers_by_session
                .entry(session_id)
                .or_default()
                .insert(client_id);
        }
    }

    pub fn unsubscribe(&self, client_id: Uuid, session_id: Uuid) {
        if let Some(mut client) = self.clients.get_mut(&client_id) {
            client.session_ids.remove(&session_id);
        }
        if let Some(mut subscribers) = self.subscribers_by_session.get_mut(&session_id) {
            subscribers.remove(&client_id);
        }
    }

    pub fn send_to(&self, client_id: Uuid, message: ServerMessage) {
        if let Some(client) = self.clients.get(&client_id) {
            let _ = client.sender.send(Outbound::Message(message));
        }
    }

    /// Broadcast to every subscriber of the given session.
    pub fn broadcast(&self, session_id: Uuid, message: ServerMessage) {
        let Some(subscribers) = self
            .subscribers_by_session
            .get(&session_id)
            .map(|subscribers| subscribers.clone())
        else {
            return;
        };

        for client_id in subscribers {
            self.send_to(client_id, message.clone());
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn subscriber_count(&self, session_id: Uuid) -> usize {
        self.subscribers_by_session
            .get(&session_id)
            .map(|subscribers| subscribers.len())
            .unwrap_or_default()
    }

    /// One heartbeat pass: drop clients that stayed silent since the previous pass, ping the
    /// rest.
    pub fn heartbeat_pass(&self) {
        let client_ids = self
            .clients
            .iter()
            .map(|entry| *entry.key())
            .collect::<Vec<_>>();

        for client_id in client_ids {
            let Some(client) = self.clients.get(&client_id) else {
                continue;
            };

            if client.alive.swap(false, Ordering::AcqRel) {
                let _ = client.sender.send(Outbound::Ping);
            } else {
                let _ = client.sender.send(Outbound::Close);
                drop(client);
                warn!(client_id:%; "dropping unresponsive realtime client");
                self.remove_client(client_id);
            }
        }
    }

    /// Push a clean close frame to every client; used on shutdown.
    pub fn close_all(&self) {
        for entry in self.clients.iter() {
            let _ = entry.value().sender.send(Outbound::Close);
        }
        info!(clients = self.clients.len(); "closed all realtime clients");
    }

    /// Forward bus events to subscribers until the shutdown future resolves.
    pub async fn forward_events(
        &self,
        subscriber: impl Subscriber,
        required_confirmations: u64,
        shutdown: impl Future<Output = ()> + Send,
    ) {
        let mut events = subscriber.subscribe();
        let mut shutdown = std::pin::pin!(shutdown);

        loop {
            select! {
                event = events.next() => {
                    match event {
                        Some(Ok(PaymentEvent::StatusChanged { session_id, status, confirmations, .. })) => {
                            self.broadcast(
                                session_id,
                                ServerMessage::Status {
                                    session_id,
                                    status,
                                    confirmations: (status != SessionStatus::Pending)
                                        .then_some(confirmations),
                                },
                            );
                        }
                        Some(Ok(PaymentEvent::ConfirmationsUpdated { session_id, confirmations, .. })) => {
                            self.broadcast(
                                session_id,
                                ServerMessage::Confirmations {
                                    session_id,
                                    confirmations,
                                    required: required_confirmations,
                                },
                            );
                        }
                        Some(Ok(_)) => {}
                        Some(Err(error)) => warn!(error:%; "realtime forwarder lagged"),
                        None => break,
                    }
                }
                _ = &mut shutdown => break,
            }
        }
    }

    /// Run the heartbeat worker until the shutdown future resolves, then close every client.
    pub async fn run_heartbeat(
        &self,
        period: Duration,
        shutdown: impl Future<Output = ()> + Send,
    ) {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        let mut shutdown = std::pin::pin!(shutdown);

        loop {
            select! {
                _ = interval.tick() => self.heartbeat_pass(),
                _ = &mut shutdown => break,
            }
        }

        self.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_broadcast() {
        let hub = SubscriptionHub::new();
        let (client_id, mut receiver, _) = hub.register();
        let session_id = Uuid::new_v4();

        hub.subscribe(client_id, session_id);
        assert_eq!(hub.subscriber_count(session_id), 1);

        hub.broadcast(
            session_id,
            ServerMessage::Status {
                session_id,
                status: SessionStatus::Confirming,
                confirmations: Some(0),
            },
        );
        assert_matches::assert_matches!(
            receiver.try_recv().unwrap(),
            Outbound::Message(ServerMessage::Status { status: SessionStatus::Confirming, .. })
        );

        // Not subscribed to other sessions.
        hub.broadcast(
            Uuid::new_v4(),
            ServerMessage::Confirmations {
                session_id: Uuid::new_v4(),
                confirmations: 1,
                required: 10,
            },
        );
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let hub = SubscriptionHub::new();
        let (client_id, mut receiver, _) = hub.register();
        let session_id = Uuid::new_v4();

        hub.subscribe(client_id, session_id);
        hub.unsubscribe(client_id, session_id);
        hub.broadcast(session_id, ServerMessage::Pong);

        assert!(receiver.try_recv().is_err());
        assert_eq!(hub.subscriber_count(session_id), 0);
    }

    #[test]
    fn test_heartbeat_drops_silent_clients() {
        let hub = SubscriptionHub::new();
        let (client_id, mut receiver, alive) = hub.register();

        // First pass: alive (set at registration), gets a ping.
        hub.heartbeat_pass();
        assert_matches::assert_matches!(receiver.try_recv().unwrap(), Outbound::Ping);

        // No response since the ping: second pass closes and drops.
        hub.heartbeat_pass();
        assert_matches::assert_matches!(receiver.try_recv().unwrap(), Outbound::Close);
        assert_eq!(hub.client_count(), 0);

        // A responsive client survives both passes.
        let (_, mut receiver, alive2) = hub.register();
        hub.heartbeat_pass();
        alive2.store(true, Ordering::Release);
        hub.heartbeat_pass();
        assert_matches::assert_matches!(receiver.try_recv().unwrap(), Outbound::Ping);
        assert_matches::assert_matches!(receiver.try_recv().unwrap(), Outbound::Ping);
        assert_eq!(hub.client_count(), 1);

        let _ = (client_id, alive);
    }

    #[test]
    fn test_server_message_wire_shape() {
        let session_id = Uuid::new_v4();
        let json = serde_json::to_value(ServerMessage::Status {
            session_id,
            status: SessionStatus::Confirming,
            confirmations: Some(3),
        })
        .unwrap();

        assert_eq!(json["type"], "status");
        assert_eq!(json["sessionId"], session_id.to_string());
        assert_eq!(json["status"], "confirming");
        assert_eq!(json["confirmations"], 3);

        let json = serde_json::to_value(ServerMessage::Pong).unwrap();
        assert_eq!(json["type"], "pong");
    }

    #[test]
    fn test_client_message_parsing() {
        let session_id = Uuid::new_v4();
        let message = serde_json::from_str::<ClientMessage>(&format!(
            r#"{{"type":"subscribe","sessionId":"{session_id}","token":"tok"}}"#
        ))
        .unwrap();
        assert_matches::assert_matches!(
            message,
            ClientMessage::Subscribe { session_id: sid, token } => {
                assert_eq!(sid, session_id);
                assert_eq!(token, "tok");
            }
        );

        assert_matches::assert_matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"ping"}"#).unwrap(),
            ClientMessage::Ping
        );
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"bogus"}"#).is_err());
    }
}
