// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    domain::{deriver::AddressDeriver, storage::Storage},
    session::{SessionError, SessionManager},
};
use dashmap::DashMap;
use fastrace::trace;
use kasgate_common::domain::{BlueScore, Publisher, SessionStatus};
use log::{info, warn};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(with = "humantime_serde", default = "tick_interval_default")]
    pub tick_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval: tick_interval_default(),
        }
    }
}

const fn tick_interval_default() -> Duration {
    Duration::from_secs(1)
}

/// Tracks confirming sessions against the advancing blue score. Confirmations for a session
/// are `current − initial`, computed fresh every tick; the initial score is the one persisted
/// at detection time, so tracking survives restarts.
#[derive(Debug, Clone)]
pub struct ConfirmationTracker<S, D, P> {
    session_manager: SessionManager<S, D, P>,
    tracked: Arc<DashMap<Uuid, BlueScore>>,
}

impl<S, D, P> ConfirmationTracker<S, D, P>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
{
    pub fn new(session_manager: SessionManager<S, D, P>) -> Self {
        Self {
            session_manager,
            tracked: Arc::new(DashMap::new()),
        }
    }

    pub fn track(&self, session_id: Uuid, initial_blue_score: BlueScore) {
        self.tracked.insert(session_id, initial_blue_score);
        info!(session_id:%, initial_blue_score; "tracking confirmations");
    }

    pub fn untrack(&self, session_id: Uuid) {
        self.tracked.remove(&session_id);
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Re-establish tracking for every confirming session. Rows predating the persisted
    /// initial score fall back to the current score, restarting their count from zero.
    pub async fn rehydrate(&self, storage: &S, current_blue_score: BlueScore) -> Result<(), sqlx::Error> {
        let confirming = storage.get_sessions_by_status(SessionStatus::Confirming).await?;

        for session in confirming {
            let initial = session.initial_blue_score.unwrap_or_else(|| {
                warn!(
                    session_id:% = session.id;
                    "confirming session without initial blue score, counting from now"
                );
                current_blue_score
            });
            self.track(session.id, initial);
        }

        if self.tracked_count() > 0 {
            info!(tracked = self.tracked_count(); "rehydrated confirmation tracking");
        }

        Ok(())
    }

    /// One tick: update every tracked session against the given current score and finalize
    /// those that crossed the threshold. A current score below a session's initial score is
    /// treated as a node anomaly and leaves that session untouched for this tick.
    #[trace]
    pub async fn tick(&self, current_blue_score: BlueScore) {
        let threshold = self.session_manager.confirmation_threshold();
        let tracked = self
            .tracked
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect::<Vec<_>>();

        for (session_id, initial) in tracked {
            if current_blue_score < initial {
                warn!(
                    session_id:%,
                    current_blue_score,
                    initial;
                    "blue score below initial, skipping session this tick"
                );
                continue;
            }

            let confirmations = current_blue_score - initial;

            match self
                .session_manager
                .update_confirmations(session_id, confirmations)
                .await
            {
                // No longer confirming; somebody else finalized it.
                Ok(None) => self.untrack(session_id),

                Ok(Some(stored)) if stored >= threshold => {
                    match self.session_manager.mark_confirmed(session_id).await {
                        Ok(_) => self.untrack(session_id),
                        Err(SessionError::InvalidTransition { .. })
                        | Err(SessionError::SessionNotFound(_)) => self.untrack(session_id),
                        Err(error) => {
                            warn!(session_id:%, error:%; "cannot mark session confirmed");
                        }
                    }
                }

                Ok(Some(_)) => {}

                Err(SessionError::SessionNotFound(_)) => self.untrack(session_id),

                Err(error) => {
                    warn!(session_id:%, error:%; "cannot update confirmations");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infra::storage::sqlite::SqliteStorage,
        merchant::{MerchantService, NewMerchant},
        session::{self, NewSession, tests::TestDeriver},
    };
    use kasgate_common::{
        domain::{InMemPubSub, NetworkId, Sompi},
        infra::{migrations, pool::sqlite::{self, SqlitePool}},
    };

    type TestTracker = ConfirmationTracker<SqliteStorage, TestDeriver, InMemPubSub>;

    async fn test_setup() -> (
        TestTracker,
        SessionManager<SqliteStorage, TestDeriver, InMemPubSub>,
        SqliteStorage,
        uuid::Uuid,
    ) {
        let pool = SqlitePool::new(sqlite::Config::in_memory()).await.unwrap();
        migrations::sqlite::run(&pool).await.unwrap();
        let storage = SqliteStorage::new(pool);

        let manager = SessionManager::new(
            storage.clone(),
            TestDeriver,
            InMemPubSub::new(),
            session::Config::default(),
            NetworkId::Testnet10,
        );
        let tracker = ConfirmationTracker::new(manager.clone());

        let merchant = MerchantService::new(storage.clone())
            .create_merchant(NewMerchant {
                name: "Test Shop".to_owned(),
                email: None,
                xpub: format!("kpub{}", "C".repeat(104)),
                webhook_url: None,
            })
            .await
            .unwrap();

        let session = manager
            .create_session(
                merchant.id,
                NewSession {
                    amount: Sompi(100_000_000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        manager
            .mark_payment_received(session.id, &"tx".to_owned(), 1_000)
            .await
            .unwrap();

        (tracker, manager, storage, session.id)
    }

    #[tokio::test]
    async fn test_confirmations_advance_and_finalize() {
        let (tracker, manager, _, session_id) = test_setup().await;
        tracker.track(session_id, 1_000);

        tracker.tick(1_005).await;
        assert_eq!(manager.get_session(session_id).await.unwrap().confirmations, 5);
        assert_eq!(tracker.tracked_count(), 1);

        // Score below initial: session left untouched this tick.
        tracker.tick(995).await;
        assert_eq!(manager.get_session(session_id).await.unwrap().confirmations, 5);

        // Score regressing but above initial: stored count is clamped, never decreases.
        tracker.tick(1_003).await;
        assert_eq!(manager.get_session(session_id).await.unwrap().confirmations, 5);

        tracker.tick(1_010).await;
        let session = manager.get_session(session_id).await.unwrap();
        assert_eq!(session.status, SessionStatus::Confirmed);
        assert_eq!(session.confirmations, 10);
        assert_eq!(tracker.tracked_count(), 0);
    }

    #[tokio::test]
    async fn test_tick_untracks_finalized_sessions() {
        let (tracker, manager, _, session_id) = test_setup().await;
        tracker.track(session_id, 1_000);

        manager.mark_failed(session_id).await.unwrap();

        tracker.tick(1_004).await;
        assert_eq!(tracker.tracked_count(), 0);
        assert_eq!(
            manager.get_session(session_id).await.unwrap().status,
            SessionStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_rehydrate_restores_initial_score() {
        let (tracker, _, storage, session_id) = test_setup().await;

        tracker.rehydrate(&storage, 2_000).await.unwrap();
        assert_eq!(tracker.tracked_count(), 1);
        assert_eq!(*tracker.tracked.get(&session_id).unwrap().value(), 1_000);
    }
}
