// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::domain::{
    Session,
    deriver::AddressDeriver,
    storage::Storage,
};
use chrono::{Duration, Utc};
use fastrace::trace;
use kasgate_common::{
    domain::{
        BlueScore, NetworkId, PaymentEvent, Publisher, PubSubError, SessionStatus, Sompi,
        TransactionId, constant_time_eq, mint_subscription_token,
    },
    error::BoxError,
};
use log::{debug, info};
use metrics::counter;
use serde::Deserialize;
use std::{collections::BTreeMap, time};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Time a pending session waits for its payment before expiring.
    #[serde(with = "humantime_serde", default = "session_ttl_default")]
    pub session_ttl: time::Duration,

    /// Override of the per-network confirmation threshold.
    #[serde(default)]
    pub confirmation_threshold: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_ttl: session_ttl_default(),
            confirmation_threshold: None,
        }
    }
}

const fn session_ttl_default() -> time::Duration {
    time::Duration::from_secs(15 * 60)
}

/// Fields a merchant provides when creating a session. Validation and sanitization happen at
/// the API boundary; the manager trusts its inputs.
#[derive(Debug, Clone, Default)]
pub struct NewSession {
    pub amount: Sompi,
    pub order_id: Option<String>,
    pub metadata: Option<BTreeMap<String, String>>,
    pub redirect_url: Option<String>,
}

/// Outcome of the atomic payment-vs-expiry arbitration. A rejected payment is dropped on the
/// floor and the address stops being monitored.
#[derive(Debug, Clone)]
pub enum PaymentAcceptance {
    Accepted(Session),
    Rejected(SessionStatus),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error("merchant {0} not found")]
    MerchantNotFound(Uuid),

    #[error("invalid transition from {from} to {to} for session {id}")]
    InvalidTransition {
        id: Uuid,
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("cannot derive receive address")]
    Derive(#[source] BoxError),

    #[error("database error")]
    Storage(#[from] sqlx::Error),

    #[error("cannot publish event")]
    Publish(#[from] PubSubError),
}

/// The session state machine. Every transition runs inside a store transaction; the store is
/// the single synchronization authority, so a payment and an expiry can never both win.
#[derive(Debug, Clone)]
pub struct SessionManager<S, D, P> {
    storage: S,
    deriver: D,
    publisher: P,
    session_ttl: Duration,
    confirmation_threshold: u64,
}

impl<S, D, P> SessionManager<S, D, P>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
{
    pub fn new(storage: S, deriver: D, publisher: P, config: Config, network_id: NetworkId) -> Self {
        let confirmation_threshold = config
            .confirmation_threshold
            .unwrap_or_else(|| network_id.confirmation_threshold());

        Self {
            storage,
            deriver,
            publisher,
            session_ttl: Duration::from_std(config.session_ttl)
                .unwrap_or_else(|_| Duration::minutes(15)),
            confirmation_threshold,
        }
    }

    pub fn confirmation_threshold(&self) -> u64 {
        self.confirmation_threshold
    }

    /// Create a pending session on a fresh receive address. Index read, derivation, session
    /// insert and index bump share one transaction, so concurrent creations on the same
    /// merchant never collide on an index.
    #[trace]
    pub async fn create_session(
        &self,
        merchant_id: Uuid,
        new_session: NewSession,
    ) -> Result<Session, SessionError> {
        let now = Utc::now();

        let mut tx = self.storage.begin().await?;

        let merchant = self
            .storage
            .get_merchant_in_tx(merchant_id, &mut tx)
            .await?
            .ok_or(SessionError::MerchantNotFound(merchant_id))?;

        let address_index = merchant.next_address_index;
        let address = self
            .deriver
            .derive(&merchant.xpub, address_index)
            .map_err(|error| SessionError::Derive(Box::new(error)))?;

        let session = Session {
            id: Uuid::new_v4(),
            merchant_id,
            address,
            address_index,
            amount: new_session.amount,
            status: SessionStatus::Pending,
            subscription_token: mint_subscription_token(),
            tx_id: None,
            confirmations: 0,
            initial_blue_score: None,
            order_id: new_session.order_id,
            metadata: new_session.metadata,
            redirect_url: new_session.redirect_url,
            created_at: now,
            expires_at: now + self.session_ttl,
            paid_at: None,
            confirmed_at: None,
        };

        self.storage.insert_session(&session, &mut tx).await?;
        self.storage
            .set_next_address_index(merchant_id, address_index + 1, &mut tx)
            .await?;
        tx.commit().await?;

        counter!("kasgate_sessions_created").increment(1);
        info!(
            session_id:% = session.id,
            merchant_id:%,
            address:% = session.address,
            amount:% = session.amount;
            "session created"
        );

        self.publisher
            .publish(&PaymentEvent::SessionCreated {
                session_id: session.id,
                merchant_id,
            })
            .await?;

        Ok(session)
    }

    /// Accept a detected payment iff the session is still pending and unexpired. An overdue
    /// pending session is expired on the spot inside the same transaction; the caller treats
    /// `Rejected` as "drop this payment and stop monitoring the address".
    #[trace]
    pub async fn mark_payment_received(
        &self,
        id: Uuid,
        tx_id: &TransactionId,
        blue_score: BlueScore,
    ) -> Result<PaymentAcceptance, SessionError> {
        let now = Utc::now();

        let mut tx = self.storage.begin().await?;

        let session = self
            .storage
            .get_session_in_tx(id, &mut tx)
            .await?
            .ok_or(SessionError::SessionNotFound(id))?;

        if session.status != SessionStatus::Pending {
            tx.commit().await?;
            debug!(session_id:% = id, status:% = session.status; "payment rejected, session not pending");
            return Ok(PaymentAcceptance::Rejected(session.status));
        }

        if session.is_expired_at(now) {
            self.storage
                .update_session_status(id, SessionStatus::Expired, now, &mut tx)
                .await?;
            tx.commit().await?;

            info!(session_id:% = id; "payment rejected, session expired at arbitration");
            self.publish_status_changed(&session, SessionStatus::Expired, 0)
                .await?;

            return Ok(PaymentAcceptance::Rejected(SessionStatus::Expired));
        }

        self.storage
            .mark_session_received(id, tx_id, now, blue_score, &mut tx)
            .await?;
        tx.commit().await?;

        counter!("kasgate_payments_received").increment(1);
        info!(session_id:% = id, tx_id:%, blue_score; "payment received");

        let session = Session {
            status: SessionStatus::Confirming,
            tx_id: Some(tx_id.to_owned()),
            paid_at: Some(now),
            initial_blue_score: Some(blue_score),
            ..session
        };
        self.publish_status_changed(&session, SessionStatus::Confirming, 0)
            .await?;

        Ok(PaymentAcceptance::Accepted(session))
    }

    /// Terminal transition `confirming → confirmed`.
    #[trace]
    pub async fn mark_confirmed(&self, id: Uuid) -> Result<Session, SessionError> {
        let session = self
            .transition(id, SessionStatus::Confirming, SessionStatus::Confirmed)
            .await?;

        counter!("kasgate_payments_confirmed").increment(1);
        info!(session_id:% = id, confirmations = session.confirmations; "payment confirmed");

        Ok(session)
    }

    /// Explicit cancellation or sweep-equivalent expiry of a pending session.
    #[trace]
    pub async fn mark_expired(&self, id: Uuid) -> Result<Session, SessionError> {
        let session = self
            .transition(id, SessionStatus::Pending, SessionStatus::Expired)
            .await?;

        info!(session_id:% = id; "session expired");

        Ok(session)
    }

    /// Operator-initiated failure of a confirming session.
    #[trace]
    pub async fn mark_failed(&self, id: Uuid) -> Result<Session, SessionError> {
        let session = self
            .transition(id, SessionStatus::Confirming, SessionStatus::Failed)
            .await?;

        info!(session_id:% = id; "session failed");

        Ok(session)
    }

    async fn transition(
        &self,
        id: Uuid,
        expected_from: SessionStatus,
        to: SessionStatus,
    ) -> Result<Session, SessionError> {
        let now = Utc::now();

        let mut tx = self.storage.begin().await?;

        let session = self
            .storage
            .get_session_in_tx(id, &mut tx)
            .await?
            .ok_or(SessionError::SessionNotFound(id))?;

        if session.status != expected_from || !session.status.can_transition_to(to) {
            tx.commit().await?;
            return Err(SessionError::InvalidTransition {
                id,
                from: session.status,
                to,
            });
        }

        self.storage
            .update_session_status(id, to, now, &mut tx)
            .await?;
        tx.commit().await?;

        let session = Session {
            status: to,
            confirmed_at: (to == SessionStatus::Confirmed)
                .then_some(now)
                .or(session.confirmed_at),
            ..session
        };
        self.publish_status_changed(&session, to, session.confirmations)
            .await?;

        Ok(session)
    }

    /// Raise the confirmation count of a confirming session. Counts below the stored value
    /// are ignored; the stored count never decreases.
    pub async fn update_confirmations(
        &self,
        id: Uuid,
        confirmations: u64,
    ) -> Result<Option<u64>, SessionError> {
        let stored = self
            .storage
            .raise_session_confirmations(id, confirmations)
            .await?;

        if let Some(stored) = stored {
            self.publisher
                .publish(&PaymentEvent::ConfirmationsUpdated {
                    session_id: id,
                    confirmations: stored,
                    required: self.confirmation_threshold,
                })
                .await?;
        }

        Ok(stored)
    }

    /// Expire every overdue pending session and notify per session. Idempotent.
    #[trace]
    pub async fn expire_old_sessions(&self) -> Result<Vec<Session>, SessionError> {
        let expired = self.storage.expire_overdue_sessions(Utc::now()).await?;

        for session in &expired {
            info!(session_id:% = session.id; "session expired by sweep");
            self.publish_status_changed(session, SessionStatus::Expired, session.confirmations)
                .await?;
        }

        Ok(expired)
    }

    /// Constant-time verification of a per-session subscription token. An unknown session
    /// verifies as false, indistinguishable from a wrong token.
    pub async fn verify_subscription_token(
        &self,
        id: Uuid,
        token: &str,
    ) -> Result<bool, SessionError> {
        let session = self.storage.get_session(id).await?;

        Ok(session
            .map(|session| {
                constant_time_eq(token.as_bytes(), session.subscription_token.as_bytes())
            })
            .unwrap_or_default())
    }

    pub async fn get_session(&self, id: Uuid) -> Result<Session, SessionError> {
        self.storage
            .get_session(id)
            .await?
            .ok_or(SessionError::SessionNotFound(id))
    }

    pub async fn list_sessions(
        &self,
        merchant_id: Uuid,
        status: Option<SessionStatus>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Session>, u64), SessionError> {
        Ok(self
            .storage
            .get_merchant_sessions(merchant_id, status, limit, offset)
            .await?)
    }

    async fn publish_status_changed(
        &self,
        session: &Session,
        status: SessionStatus,
        confirmations: u64,
    ) -> Result<(), PubSubError> {
        self.publisher
            .publish(&PaymentEvent::StatusChanged {
                session_id: session.id,
                merchant_id: session.merchant_id,
                status,
                confirmations,
            })
            .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        domain::storage::SessionStorage,
        infra::storage::sqlite::SqliteStorage,
        merchant::{MerchantService, NewMerchant},
    };
    use assert_matches::assert_matches;
    use futures::StreamExt;
    use kasgate_common::{
        domain::{InMemPubSub, Subscriber},
        infra::{migrations, pool::sqlite::{self, SqlitePool}},
    };
    use std::convert::Infallible;

    #[derive(Debug, Clone)]
    pub struct TestDeriver;

    impl AddressDeriver for TestDeriver {
        type Error = Infallible;

        fn parse(&self, _xpub: &str) -> Result<(), Self::Error> {
            Ok(())
        }

        fn derive(&self, xpub: &str, index: u32) -> Result<String, Self::Error> {
            Ok(format!("kaspatest:{}x{index}", &xpub[xpub.len() - 8..]))
        }
    }

    async fn test_setup() -> (
        SessionManager<SqliteStorage, TestDeriver, InMemPubSub>,
        MerchantService<SqliteStorage>,
        SqliteStorage,
        InMemPubSub,
    ) {
        let pool = SqlitePool::new(sqlite::Config::in_memory())
            .await
            .expect("pool can be created");
        migrations::sqlite::run(&pool)
            .await
            .expect("migrations succeed");

        let storage = SqliteStorage::new(pool);
        let pub_sub = InMemPubSub::new();
        let manager = SessionManager::new(
            storage.clone(),
            TestDeriver,
            pub_sub.clone(),
            Config::default(),
            NetworkId::Testnet10,
        );
        let merchants = MerchantService::new(storage.clone());

        (manager, merchants, storage, pub_sub)
    }

    async fn test_merchant(merchants: &MerchantService<SqliteStorage>) -> crate::domain::Merchant {
        merchants
            .create_merchant(NewMerchant {
                name: "Test Shop".to_owned(),
                email: None,
                xpub: format!("kpub{}", "A".repeat(104)),
                webhook_url: None,
            })
            .await
            .expect("merchant can be created")
    }

    #[tokio::test]
    async fn test_create_session_increments_index() {
        let (manager, merchants, storage, _) = test_setup().await;
        let merchant = test_merchant(&merchants).await;

        let first = manager
            .create_session(merchant.id, NewSession { amount: Sompi(100_000_000), ..Default::default() })
            .await
            .expect("session can be created");
        let second = manager
            .create_session(merchant.id, NewSession { amount: Sompi(100_000_000), ..Default::default() })
            .await
            .expect("session can be created");

        assert_eq!(first.address_index, 0);
        assert_eq!(second.address_index, 1);
        assert_ne!(first.address, second.address);
        assert_eq!(first.status, SessionStatus::Pending);
        assert!(first.expires_at > first.created_at);

        let stored = storage
            .get_session(first.id)
            .await
            .expect("query succeeds")
            .expect("session exists");
        assert_eq!(stored.address, first.address);
        assert_eq!(stored.subscription_token, first.subscription_token);
    }

    #[tokio::test]
    async fn test_mark_payment_received_accepts_once() {
        let (manager, merchants, _, _) = test_setup().await;
        let merchant = test_merchant(&merchants).await;
        let session = manager
            .create_session(merchant.id, NewSession { amount: Sompi(100_000_000), ..Default::default() })
            .await
            .unwrap();

        let first = manager
            .mark_payment_received(session.id, &"tx-1".to_owned(), 1_000)
            .await
            .expect("arbitration succeeds");
        assert_matches!(first, PaymentAcceptance::Accepted(ref accepted) => {
            assert_eq!(accepted.status, SessionStatus::Confirming);
            assert_eq!(accepted.tx_id.as_deref(), Some("tx-1"));
            assert_eq!(accepted.initial_blue_score, Some(1_000));
        });

        // The second arbitration finds a non-pending session and rejects without mutating.
        let second = manager
            .mark_payment_received(session.id, &"tx-2".to_owned(), 2_000)
            .await
            .expect("arbitration succeeds");
        assert_matches!(second, PaymentAcceptance::Rejected(SessionStatus::Confirming));

        let stored = manager.get_session(session.id).await.unwrap();
        assert_eq!(stored.tx_id.as_deref(), Some("tx-1"));
        assert_eq!(stored.initial_blue_score, Some(1_000));
    }

    #[tokio::test]
    async fn test_payment_on_expired_session_expires_it() {
        let (manager, merchants, storage, _) = test_setup().await;
        let merchant = test_merchant(&merchants).await;

        let manager_with_zero_ttl = SessionManager::new(
            storage.clone(),
            TestDeriver,
            InMemPubSub::new(),
            Config {
                session_ttl: time::Duration::ZERO,
                confirmation_threshold: None,
            },
            NetworkId::Testnet10,
        );
        let session = manager_with_zero_ttl
            .create_session(merchant.id, NewSession { amount: Sompi(1), ..Default::default() })
            .await
            .unwrap();

        let acceptance = manager
            .mark_payment_received(session.id, &"tx-late".to_owned(), 1)
            .await
            .unwrap();
        assert_matches!(acceptance, PaymentAcceptance::Rejected(SessionStatus::Expired));

        let stored = manager.get_session(session.id).await.unwrap();
        assert_eq!(stored.status, SessionStatus::Expired);
        assert_eq!(stored.tx_id, None);
    }

    #[tokio::test]
    async fn test_terminal_states_reject_transitions() {
        let (manager, merchants, _, _) = test_setup().await;
        let merchant = test_merchant(&merchants).await;
        let session = manager
            .create_session(merchant.id, NewSession { amount: Sompi(1), ..Default::default() })
            .await
            .unwrap();

        manager.mark_expired(session.id).await.unwrap();

        assert_matches!(
            manager.mark_expired(session.id).await,
            Err(SessionError::InvalidTransition { .. })
        );
        assert_matches!(
            manager.mark_confirmed(session.id).await,
            Err(SessionError::InvalidTransition { .. })
        );
        assert_matches!(
            manager.mark_failed(session.id).await,
            Err(SessionError::InvalidTransition { .. })
        );
    }

    #[tokio::test]
    async fn test_confirming_lifecycle() {
        let (manager, merchants, _, _) = test_setup().await;
        let merchant = test_merchant(&merchants).await;
        let session = manager
            .create_session(merchant.id, NewSession { amount: Sompi(1), ..Default::default() })
            .await
            .unwrap();

        // Confirming cannot be reached by mark_confirmed directly.
        assert_matches!(
            manager.mark_confirmed(session.id).await,
            Err(SessionError::InvalidTransition { .. })
        );

        manager
            .mark_payment_received(session.id, &"tx".to_owned(), 100)
            .await
            .unwrap();

        assert_eq!(
            manager.update_confirmations(session.id, 3).await.unwrap(),
            Some(3)
        );
        // Lower counts are clamped.
        assert_eq!(
            manager.update_confirmations(session.id, 1).await.unwrap(),
            Some(3)
        );

        let confirmed = manager.mark_confirmed(session.id).await.unwrap();
        assert_eq!(confirmed.status, SessionStatus::Confirmed);
        assert!(confirmed.confirmed_at.is_some());

        // Terminal: confirmations are frozen.
        assert_eq!(
            manager.update_confirmations(session.id, 100).await.unwrap(),
            None
        );
        assert_eq!(
            manager.get_session(session.id).await.unwrap().confirmations,
            3
        );
    }

    #[tokio::test]
    async fn test_expiry_sweep_is_idempotent() {
        let (_, merchants, storage, pub_sub) = test_setup().await;
        let merchant = test_merchant(&merchants).await;

        let manager = SessionManager::new(
            storage.clone(),
            TestDeriver,
            pub_sub.clone(),
            Config {
                session_ttl: time::Duration::ZERO,
                confirmation_threshold: None,
            },
            NetworkId::Testnet10,
        );
        manager
            .create_session(merchant.id, NewSession { amount: Sompi(1), ..Default::default() })
            .await
            .unwrap();

        let expired = manager.expire_old_sessions().await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].status, SessionStatus::Expired);

        let expired_again = manager.expire_old_sessions().await.unwrap();
        assert!(expired_again.is_empty());
    }

    #[tokio::test]
    async fn test_verify_subscription_token() {
        let (manager, merchants, _, _) = test_setup().await;
        let merchant = test_merchant(&merchants).await;
        let session = manager
            .create_session(merchant.id, NewSession { amount: Sompi(1), ..Default::default() })
            .await
            .unwrap();

        assert!(
            manager
                .verify_subscription_token(session.id, &session.subscription_token)
                .await
                .unwrap()
        );
        assert!(
            !manager
                .verify_subscription_token(session.id, "wrong")
                .await
                .unwrap()
        );
        assert!(
            !manager
                .verify_subscription_token(Uuid::new_v4(), &session.subscription_token)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_status_events_are_published_in_order() {
        let (manager, merchants, _, pub_sub) = test_setup().await;
        let merchant = test_merchant(&merchants).await;
        let mut events = pub_sub.subscribe();

        let session = manager
            .create_session(merchant.id, NewSession { amount: Sompi(1), ..Default::default() })
            .await
            .unwrap();
        manager
            .mark_payment_received(session.id, &"tx".to_owned(), 1)
            .await
            .unwrap();
        manager.mark_confirmed(session.id).await.unwrap();

        assert_matches!(
            events.next().await.unwrap().unwrap(),
            PaymentEvent::SessionCreated { .. }
        );
        assert_matches!(
            events.next().await.unwrap().unwrap(),
            PaymentEvent::StatusChanged { status: SessionStatus::Confirming, .. }
        );
        assert_matches!(
            events.next().await.unwrap().unwrap(),
            PaymentEvent::StatusChanged { status: SessionStatus::Confirmed, .. }
        );
    }
}
