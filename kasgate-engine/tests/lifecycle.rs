// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end lifecycle tests: a full engine over an in-memory store with scripted node and
//! indexer doubles, delivering real webhooks to a local HTTP receiver.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use futures::Stream;
use kasgate_common::{
    domain::{
        Address, BlueScore, InMemPubSub, NetworkId, SessionStatus, Sompi,
    },
    infra::{migrations, pool::sqlite::{self, SqlitePool}},
};
use kasgate_engine::{
    application,
    domain::{
        Session, WebhookEvent,
        deriver::AddressDeriver,
        indexer::LedgerIndexer,
        node::{Node, UtxoChange, UtxoEntry},
        storage::{SessionStorage, WebhookStorage},
    },
    infra::storage::sqlite::SqliteStorage,
    merchant::{MerchantService, NewMerchant},
    session::{self, NewSession, PaymentAcceptance, SessionManager},
    tracker::{self, ConfirmationTracker},
    watcher::{self, LedgerWatcher},
    webhook::{self, WebhookDispatcher, verify_webhook_signature},
};
use parking_lot::Mutex;
use std::{
    convert::Infallible,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{net::TcpListener, sync::{broadcast, watch}, task, time::sleep};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct TestDeriver;

impl AddressDeriver for TestDeriver {
    type Error = Infallible;

    fn parse(&self, _xpub: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn derive(&self, xpub: &str, index: u32) -> Result<Address, Self::Error> {
        Ok(format!("kaspatest:{}x{index}", &xpub[4..12]))
    }
}

#[derive(Debug, Clone)]
struct MockNode {
    connected: Arc<AtomicBool>,
    utxos: Arc<Mutex<Vec<UtxoEntry>>>,
    blue_score: Arc<Mutex<BlueScore>>,
    changes: broadcast::Sender<UtxoChange>,
}

impl MockNode {
    fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            connected: Arc::new(AtomicBool::new(true)),
            utxos: Arc::new(Mutex::new(Vec::new())),
            blue_score: Arc::new(Mutex::new(1_000)),
            changes,
        }
    }

    fn push_utxo(&self, utxo: UtxoEntry) {
        self.utxos.lock().push(utxo.clone());
        let _ = self.changes.send(UtxoChange {
            added: vec![utxo],
            removed: Vec::new(),
        });
    }
}

impl Node for MockNode {
    type Error = Infallible;

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn subscribe_utxo_changes(&self, _addresses: &[Address]) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn unsubscribe_utxo_changes(&self, _addresses: &[Address]) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn get_utxos_by_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<UtxoEntry>, Self::Error> {
        Ok(self
            .utxos
            .lock()
            .iter()
            .filter(|utxo| {
                utxo.address
                    .as_ref()
                    .map(|address| addresses.contains(address))
                    .unwrap_or_default()
            })
            .cloned()
            .collect())
    }

    async fn get_sink_blue_score(&self) -> Result<BlueScore, Self::Error> {
        Ok(*self.blue_score.lock())
    }

    fn utxo_changes(&self) -> impl Stream<Item = UtxoChange> + Send + Unpin + 'static {
        use futures::StreamExt;

        BroadcastStream::new(self.changes.subscribe())
            .filter_map(|result| async { result.ok() })
            .boxed()
    }
}

#[derive(Debug, Clone)]
struct MockIndexer {
    utxos: Arc<Mutex<Vec<UtxoEntry>>>,
    blue_score: Arc<Mutex<BlueScore>>,
}

impl LedgerIndexer for MockIndexer {
    type Error = Infallible;

    async fn get_utxos_by_address(
        &self,
        address: &Address,
    ) -> Result<Vec<UtxoEntry>, Self::Error> {
        Ok(self
            .utxos
            .lock()
            .iter()
            .filter(|utxo| utxo.address.as_deref() == Some(address))
            .cloned()
            .collect())
    }

    async fn get_virtual_chain_blue_score(&self) -> Result<BlueScore, Self::Error> {
        Ok(*self.blue_score.lock())
    }

    async fn probe(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn utxo(address: &str, amount: u128, block_daa_score: u64, tx_id: &str) -> UtxoEntry {
    UtxoEntry {
        address: Some(address.to_owned()),
        tx_id: tx_id.to_owned(),
        output_index: 0,
        amount: Sompi(amount),
        script_public_key: format!("20{}ac", const_hex_encode(address)),
        block_daa_score,
    }
}

fn const_hex_encode(value: &str) -> String {
    value.bytes().map(|b| format!("{b:02x}")).collect()
}

/// A received webhook: relevant headers plus the raw body bytes the signature covers.
#[derive(Debug, Clone)]
struct ReceivedWebhook {
    event: String,
    signature: String,
    delivery_id: String,
    body: Vec<u8>,
}

#[derive(Clone)]
struct ReceiverState {
    received: Arc<Mutex<Vec<ReceivedWebhook>>>,
    /// Number of requests to answer with 500 before succeeding.
    failures_remaining: Arc<AtomicUsize>,
}

async fn receive_webhook(
    State(state): State<ReceiverState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned()
    };

    state.received.lock().push(ReceivedWebhook {
        event: header("X-KasGate-Event"),
        signature: header("X-KasGate-Signature"),
        delivery_id: header("X-KasGate-Delivery-Id"),
        body: body.to_vec(),
    });

    if state
        .failures_remaining
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
            remaining.checked_sub(1)
        })
        .is_ok()
    {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

async fn spawn_receiver(failures: usize) -> (String, ReceiverState) {
    let state = ReceiverState {
        received: Arc::new(Mutex::new(Vec::new())),
        failures_remaining: Arc::new(AtomicUsize::new(failures)),
    };

    let app = Router::new()
        .route("/hooks/kas", post(receive_webhook))
        .with_state(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/hooks/kas", listener.local_addr().unwrap());
    task::spawn(async move { axum::serve(listener, app).await.unwrap() });

    (url, state)
}

struct TestEngine {
    storage: SqliteStorage,
    manager: SessionManager<SqliteStorage, TestDeriver, InMemPubSub>,
    merchants: MerchantService<SqliteStorage>,
    node: MockNode,
    shutdown: watch::Sender<bool>,
}

impl TestEngine {
    /// Build a full engine with fast timers and spawn its application loop.
    async fn start(session_ttl: Duration) -> Self {
        let pool = SqlitePool::new(sqlite::Config::in_memory()).await.unwrap();
        migrations::sqlite::run(&pool).await.unwrap();
        let storage = SqliteStorage::new(pool);

        let pub_sub = InMemPubSub::new();
        let node = MockNode::new();
        let indexer = MockIndexer {
            utxos: node.utxos.clone(),
            blue_score: node.blue_score.clone(),
        };

        let watcher = LedgerWatcher::new(node.clone(), indexer.clone(), pub_sub.clone());
        let manager = SessionManager::new(
            storage.clone(),
            TestDeriver,
            pub_sub.clone(),
            session::Config {
                session_ttl,
                confirmation_threshold: None,
            },
            NetworkId::Testnet10,
        );
        let tracker = ConfirmationTracker::new(manager.clone());
        let dispatcher = WebhookDispatcher::new(
            storage.clone(),
            webhook::Config {
                delivery_timeout: Duration::from_secs(2),
                max_attempts: 5,
                retry_interval: Duration::from_millis(150),
                backoff_base: Duration::from_millis(50),
            },
        )
        .unwrap();
        let merchants = MerchantService::new(storage.clone());

        let config = application::Config {
            network: NetworkId::Testnet10,
            session: session::Config {
                session_ttl,
                confirmation_threshold: None,
            },
            watcher: watcher::Config {
                poll_interval: Duration::from_millis(100),
            },
            tracker: tracker::Config {
                tick_interval: Duration::from_millis(100),
            },
            webhook: webhook::Config::default(),
            expiry_sweep_interval: Duration::from_millis(200),
        };

        let (shutdown, shutdown_rx) = watch::channel(false);
        task::spawn(application::run(
            config,
            storage.clone(),
            manager.clone(),
            tracker,
            watcher,
            dispatcher,
            pub_sub.clone(),
            async move {
                let mut shutdown_rx = shutdown_rx;
                let _ = shutdown_rx.changed().await;
            },
        ));

        // Let the consumers subscribe before any event is published.
        sleep(Duration::from_millis(50)).await;

        Self {
            storage,
            manager,
            merchants,
            node,
            shutdown,
        }
    }

    async fn create_merchant(&self, webhook_url: Option<String>) -> kasgate_engine::domain::Merchant {
        self.merchants
            .create_merchant(NewMerchant {
                name: "Lifecycle Shop".to_owned(),
                email: None,
                xpub: format!("kpub{}", "D".repeat(104)),
                webhook_url,
            })
            .await
            .unwrap()
    }

    async fn create_session(&self, merchant_id: Uuid, amount: u128, order_id: Option<&str>) -> Session {
        self.manager
            .create_session(
                merchant_id,
                NewSession {
                    amount: Sompi(amount),
                    order_id: order_id.map(ToOwned::to_owned),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    async fn wait_for_status(&self, session_id: Uuid, status: SessionStatus) -> Session {
        wait_for(
            || async {
                let session = self.storage.get_session(session_id).await.unwrap().unwrap();
                (session.status == status).then_some(session)
            },
            Duration::from_secs(5),
        )
        .await
        .unwrap_or_else(|| panic!("session did not reach {status}"))
    }
}

impl Drop for TestEngine {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn wait_for<T, F, Fut>(mut predicate: F, deadline: Duration) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = tokio::time::Instant::now();
    loop {
        if let Some(value) = predicate().await {
            return Some(value);
        }
        if start.elapsed() > deadline {
            return None;
        }
        sleep(Duration::from_millis(20)).await;
    }
}

fn webhooks_by_event<'a>(
    received: &'a [ReceivedWebhook],
    event: &str,
) -> Vec<&'a ReceivedWebhook> {
    received.iter().filter(|hook| hook.event == event).collect()
}

#[tokio::test]
async fn test_happy_path() {
    let engine = TestEngine::start(Duration::from_secs(900)).await;
    let (webhook_url, receiver) = spawn_receiver(0).await;

    let merchant = engine.create_merchant(Some(webhook_url)).await;
    let session = engine
        .create_session(merchant.id, 100_000_000, Some("ORDER-001"))
        .await;
    assert_eq!(session.status, SessionStatus::Pending);

    // The payment lands, block-included at DAA score 5.
    engine
        .node
        .push_utxo(utxo(&session.address, 100_000_000, 5, "tx-happy"));

    let confirming = engine
        .wait_for_status(session.id, SessionStatus::Confirming)
        .await;
    assert_eq!(confirming.tx_id.as_deref(), Some("tx-happy"));
    assert_eq!(confirming.initial_blue_score, Some(1_000));
    assert!(confirming.paid_at.is_some());

    // The confirming webhook arrives and verifies under the merchant's secret.
    let received = wait_for(
        || async {
            let received = receiver.received.lock().clone();
            (!webhooks_by_event(&received, "payment.confirming").is_empty()).then_some(received)
        },
        Duration::from_secs(5),
    )
    .await
    .expect("confirming webhook delivered");

    let confirming_hooks = webhooks_by_event(&received, "payment.confirming");
    assert_eq!(confirming_hooks.len(), 1);
    let hook = confirming_hooks[0];
    assert!(verify_webhook_signature(
        &hook.body,
        &hook.signature,
        &merchant.webhook_secret
    ));
    let payload = serde_json::from_slice::<serde_json::Value>(&hook.body).unwrap();
    assert_eq!(payload["event"], "payment.confirming");
    assert_eq!(payload["sessionId"], session.id.to_string());
    assert_eq!(payload["amount"], "100000000");
    assert_eq!(payload["txId"], "tx-happy");
    assert_eq!(payload["orderId"], "ORDER-001");
    assert_eq!(payload["deliveryId"], hook.delivery_id);

    // Ten more blue-score units finalize the payment.
    *engine.node.blue_score.lock() = 1_010;

    let confirmed = engine
        .wait_for_status(session.id, SessionStatus::Confirmed)
        .await;
    assert_eq!(confirmed.confirmations, 10);
    assert!(confirmed.confirmed_at.is_some());

    let received = wait_for(
        || async {
            let received = receiver.received.lock().clone();
            (!webhooks_by_event(&received, "payment.confirmed").is_empty()).then_some(received)
        },
        Duration::from_secs(5),
    )
    .await
    .expect("confirmed webhook delivered");
    let hook = webhooks_by_event(&received, "payment.confirmed")[0];
    assert!(verify_webhook_signature(
        &hook.body,
        &hook.signature,
        &merchant.webhook_secret
    ));
}

#[tokio::test]
async fn test_payment_after_expiry_is_dropped() {
    let engine = TestEngine::start(Duration::from_millis(300)).await;
    let (webhook_url, receiver) = spawn_receiver(0).await;

    let merchant = engine.create_merchant(Some(webhook_url)).await;
    let session = engine.create_session(merchant.id, 1_000_000, None).await;

    // The sweep expires the session before any payment shows up.
    let expired = engine
        .wait_for_status(session.id, SessionStatus::Expired)
        .await;
    assert_eq!(expired.tx_id, None);

    // A late payment is rejected without mutating the session.
    let acceptance = engine
        .manager
        .mark_payment_received(session.id, &"tx-late".to_owned(), 2_000)
        .await
        .unwrap();
    assert!(matches!(
        acceptance,
        PaymentAcceptance::Rejected(SessionStatus::Expired)
    ));
    let session = engine.storage.get_session(session.id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Expired);
    assert_eq!(session.tx_id, None);

    // The expiry notification made it out.
    wait_for(
        || async {
            let received = receiver.received.lock().clone();
            (!webhooks_by_event(&received, "payment.expired").is_empty()).then_some(())
        },
        Duration::from_secs(5),
    )
    .await
    .expect("expired webhook delivered");
}

#[tokio::test]
async fn test_push_poll_race_delivers_once() {
    let engine = TestEngine::start(Duration::from_secs(900)).await;
    let (webhook_url, receiver) = spawn_receiver(0).await;

    let merchant = engine.create_merchant(Some(webhook_url)).await;
    let session = engine.create_session(merchant.id, 5_000_000, None).await;

    // Both backends observe the same UTXO: push via the notification, poll via the shared
    // UTXO set within its next interval.
    engine
        .node
        .push_utxo(utxo(&session.address, 5_000_000, 9, "tx-race"));

    engine
        .wait_for_status(session.id, SessionStatus::Confirming)
        .await;

    // Give the poll loop a few more passes, then assert a single confirming delivery.
    sleep(Duration::from_millis(400)).await;
    let received = receiver.received.lock().clone();
    assert_eq!(webhooks_by_event(&received, "payment.confirming").len(), 1);

    let (_, total) = engine
        .storage
        .get_merchant_webhook_deliveries(merchant.id, Some(WebhookEvent::Confirming), 10, 0)
        .await
        .unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_webhook_retry_after_failure() {
    let engine = TestEngine::start(Duration::from_secs(900)).await;
    // First request fails with 500, the retry succeeds.
    let (webhook_url, receiver) = spawn_receiver(1).await;

    let merchant = engine.create_merchant(Some(webhook_url)).await;
    let session = engine.create_session(merchant.id, 1_000_000, None).await;

    let delivery = wait_for(
        || async {
            let (deliveries, _) = engine
                .storage
                .get_merchant_webhook_deliveries(merchant.id, Some(WebhookEvent::Pending), 10, 0)
                .await
                .unwrap();
            deliveries
                .into_iter()
                .find(|delivery| delivery.delivered_at.is_some())
        },
        Duration::from_secs(5),
    )
    .await
    .expect("delivery eventually succeeds");

    assert_eq!(delivery.session_id, session.id);
    assert_eq!(delivery.attempts, 2);
    assert_eq!(delivery.last_status_code, Some(200));
    assert!(delivery.next_retry_at.is_none());

    // Both attempts carried the same frozen payload and delivery ID.
    let received = receiver.received.lock().clone();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].body, received[1].body);
    assert_eq!(received[0].delivery_id, received[1].delivery_id);
}

#[tokio::test]
async fn test_underpayment_expires() {
    let engine = TestEngine::start(Duration::from_millis(600)).await;
    let (webhook_url, receiver) = spawn_receiver(0).await;

    let merchant = engine.create_merchant(Some(webhook_url)).await;
    let session = engine.create_session(merchant.id, 1_000_000, None).await;

    // One sompi short: no detection, ever.
    engine
        .node
        .push_utxo(utxo(&session.address, 999_999, 3, "tx-under"));

    let expired = engine
        .wait_for_status(session.id, SessionStatus::Expired)
        .await;
    assert_eq!(expired.tx_id, None);
    assert_eq!(expired.paid_at, None);

    wait_for(
        || async {
            let received = receiver.received.lock().clone();
            (!webhooks_by_event(&received, "payment.expired").is_empty()).then_some(())
        },
        Duration::from_secs(5),
    )
    .await
    .expect("expired webhook delivered");

    let received = receiver.received.lock().clone();
    assert!(webhooks_by_event(&received, "payment.confirming").is_empty());
}

#[tokio::test]
async fn test_restart_rehydration_recovers_confirming_session() {
    // First engine: accept a payment, then shut down.
    let pool = SqlitePool::new(sqlite::Config::in_memory()).await.unwrap();
    migrations::sqlite::run(&pool).await.unwrap();
    let storage = SqliteStorage::new(pool);

    let pub_sub = InMemPubSub::new();
    let manager = SessionManager::new(
        storage.clone(),
        TestDeriver,
        pub_sub.clone(),
        session::Config::default(),
        NetworkId::Testnet10,
    );
    let merchants = MerchantService::new(storage.clone());
    let merchant = merchants
        .create_merchant(NewMerchant {
            name: "Restart Shop".to_owned(),
            email: None,
            xpub: format!("kpub{}", "E".repeat(104)),
            webhook_url: None,
        })
        .await
        .unwrap();
    let session = manager
        .create_session(
            merchant.id,
            NewSession {
                amount: Sompi(1_000_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    manager
        .mark_payment_received(session.id, &"tx-restart".to_owned(), 500)
        .await
        .unwrap();

    // Second engine over the same store: the tracker rehydrates from the persisted initial
    // blue score and finalizes once the threshold is crossed.
    let node = MockNode::new();
    *node.blue_score.lock() = 505;
    let indexer = MockIndexer {
        utxos: node.utxos.clone(),
        blue_score: node.blue_score.clone(),
    };
    let watcher = LedgerWatcher::new(node.clone(), indexer.clone(), pub_sub.clone());
    let tracker = ConfirmationTracker::new(manager.clone());
    let dispatcher =
        WebhookDispatcher::new(storage.clone(), webhook::Config::default()).unwrap();

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    task::spawn(application::run(
        application::Config {
            network: NetworkId::Testnet10,
            session: session::Config::default(),
            watcher: watcher::Config {
                poll_interval: Duration::from_millis(100),
            },
            tracker: tracker::Config {
                tick_interval: Duration::from_millis(100),
            },
            webhook: webhook::Config::default(),
            expiry_sweep_interval: Duration::from_secs(60),
        },
        storage.clone(),
        manager.clone(),
        tracker,
        watcher,
        dispatcher,
        pub_sub.clone(),
        async move {
            let _ = shutdown_rx.changed().await;
        },
    ));

    // Confirmation counting continues from 500, not from the restart point.
    let confirmed = wait_for(
        || async {
            let session = storage.get_session(session.id).await.unwrap().unwrap();
            (session.confirmations >= 5).then_some(session)
        },
        Duration::from_secs(5),
    )
    .await
    .expect("confirmations recovered after restart");
    assert_eq!(confirmed.confirmations, 5);

    *node.blue_score.lock() = 510;
    let confirmed = wait_for(
        || async {
            let session = storage.get_session(session.id).await.unwrap().unwrap();
            (session.status == SessionStatus::Confirmed).then_some(session)
        },
        Duration::from_secs(5),
    )
    .await
    .expect("session confirmed after restart");
    assert_eq!(confirmed.confirmations, 10);

    let _ = shutdown_tx.send(true);
}
