// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::domain::PaymentEvent;
use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};

const CHANNEL_CAPACITY: usize = 1_024;

/// Publishing side of the in-process event bus.
#[trait_variant::make(Send)]
pub trait Publisher
where
    Self: Clone + Send + Sync + 'static,
{
    async fn publish(&self, event: &PaymentEvent) -> Result<(), PubSubError>;
}

/// Subscribing side of the in-process event bus. Every subscriber observes every event
/// published after it subscribed, in publication order.
pub trait Subscriber
where
    Self: Clone + Send + Sync + 'static,
{
    fn subscribe(&self) -> impl Stream<Item = Result<PaymentEvent, PubSubError>> + Send + Unpin + 'static;
}

#[derive(Debug, Error)]
pub enum PubSubError {
    /// The subscriber fell behind and the given number of events were dropped.
    #[error("event subscriber lagged, {0} events dropped")]
    Lagged(u64),
}

/// Broadcast-channel based bus for single-process deployments.
#[derive(Debug, Clone)]
pub struct InMemPubSub {
    sender: broadcast::Sender<PaymentEvent>,
}

impl InMemPubSub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl Default for InMemPubSub {
    fn default() -> Self {
        Self::new()
    }
}

impl Publisher for InMemPubSub {
    async fn publish(&self, event: &PaymentEvent) -> Result<(), PubSubError> {
        // A send error only means there is no subscriber right now; the event is still
        // "published" as far as the publisher is concerned.
        let _ = self.sender.send(event.to_owned());
        Ok(())
    }
}

impl Subscriber for InMemPubSub {
    fn subscribe(&self) -> impl Stream<Item = Result<PaymentEvent, PubSubError>> + Send + Unpin + 'static {
        BroadcastStream::new(self.sender.subscribe())
            .map(|result| result.map_err(|BroadcastStreamRecvError::Lagged(n)| PubSubError::Lagged(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionStatus;
    use futures::StreamExt;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let pub_sub = InMemPubSub::new();
        let mut events = pub_sub.subscribe();

        let event = PaymentEvent::StatusChanged {
            session_id: Uuid::new_v4(),
            merchant_id: Uuid::new_v4(),
            status: SessionStatus::Confirming,
            confirmations: 0,
        };
        pub_sub.publish(&event).await.unwrap();

        let received = events.next().await.unwrap().unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let pub_sub = InMemPubSub::new();
        let event = PaymentEvent::SessionCreated {
            session_id: Uuid::new_v4(),
            merchant_id: Uuid::new_v4(),
        };
        assert!(pub_sub.publish(&event).await.is_ok());
    }

    #[tokio::test]
    async fn test_each_subscriber_sees_all_events() {
        let pub_sub = InMemPubSub::new();
        let mut first = pub_sub.subscribe();
        let mut second = pub_sub.subscribe();

        for confirmations in 0..3 {
            pub_sub
                .publish(&PaymentEvent::ConfirmationsUpdated {
                    session_id: Uuid::new_v4(),
                    confirmations,
                    required: 10,
                })
                .await
                .unwrap();
        }

        for events in [&mut first, &mut second] {
            for confirmations in 0..3 {
                let event = events.next().await.unwrap().unwrap();
                assert_matches::assert_matches!(
                    event,
                    PaymentEvent::ConfirmationsUpdated { confirmations: c, .. } if c == confirmations
                );
            }
        }
    }
}
