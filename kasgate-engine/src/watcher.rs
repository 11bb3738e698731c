// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::domain::{
    indexer::LedgerIndexer,
    node::{Node, UtxoChange, UtxoEntry, block_included_total},
};
use dashmap::DashMap;
use fastrace::trace;
use kasgate_common::{
    domain::{Address, BlueScore, PaymentEvent, Publisher, PubSubError, Sompi, TransactionId},
    error::BoxError,
};
use log::{debug, info, warn};
use metrics::{counter, gauge};
use parking_lot::Mutex;
use serde::Deserialize;
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Poll cadence of the REST baseline.
    #[serde(with = "humantime_serde", default = "poll_interval_default")]
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: poll_interval_default(),
        }
    }
}

const fn poll_interval_default() -> Duration {
    Duration::from_secs(2)
}

/// Transient bookkeeping for one watched address. The `detected` flag is single-shot: the
/// first backend to observe a qualifying total wins, every later observation is suppressed.
#[derive(Debug)]
struct MonitoredAddress {
    session_id: Uuid,
    expected: Sompi,
    detected: AtomicBool,
    known_outpoints: Mutex<HashSet<(TransactionId, u32)>>,
}

#[derive(Debug, Error)]
#[error("cannot determine current blue score")]
pub struct BlueScoreError(#[source] pub BoxError);

/// Hybrid address watcher: push subscription against the node plus a REST poll baseline, both
/// feeding the same single-shot detection per address.
#[derive(Debug, Clone)]
pub struct LedgerWatcher<N, I, P> {
    node: N,
    indexer: I,
    publisher: P,
    monitored: Arc<DashMap<Address, Arc<MonitoredAddress>>>,
    /// Maps script public keys back to watched addresses for notifications that do not name
    /// the address. Populated at subscription time via a one-shot UTXO fetch.
    scripts: Arc<DashMap<String, Address>>,
}

impl<N, I, P> LedgerWatcher<N, I, P>
where
    N: Node,
    I: LedgerIndexer,
    P: Publisher,
{
    pub fn new(node: N, indexer: I, publisher: P) -> Self {
        Self {
            node,
            indexer,
            publisher,
            monitored: Arc::new(DashMap::new()),
            scripts: Arc::new(DashMap::new()),
        }
    }

    /// Start watching an address for an incoming total of at least `expected`. Evaluates the
    /// currently known UTXO set right away, so payments that landed while the process was
    /// down are picked up on rehydration.
    #[trace]
    pub async fn monitor(
        &self,
        address: Address,
        expected: Sompi,
        session_id: Uuid,
    ) -> Result<(), PubSubError> {
        self.monitored.insert(
            address.clone(),
            Arc::new(MonitoredAddress {
                session_id,
                expected,
                detected: AtomicBool::new(false),
                known_outpoints: Mutex::new(HashSet::new()),
            }),
        );
        gauge!("kasgate_monitored_addresses").set(self.monitored.len() as f64);
        info!(address:%, expected:%, session_id:%; "monitoring address");

        match self.node.subscribe_utxo_changes(std::slice::from_ref(&address)).await {
            Ok(()) => {
                // One-shot fetch: populates the script map and catches pre-existing payments.
                match self.node.get_utxos_by_addresses(std::slice::from_ref(&address)).await {
                    Ok(utxos) => {
                        for utxo in &utxos {
                            if !utxo.script_public_key.is_empty() {
                                self.scripts
                                    .insert(utxo.script_public_key.clone(), address.clone());
                            }
                        }
                        self.evaluate(&address, &utxos).await?;
                    }
                    Err(error) => {
                        warn!(address:%, error:%; "cannot fetch initial UTXO set from node");
                    }
                }
            }
            Err(error) => {
                warn!(address:%, error:%; "cannot subscribe to UTXO changes, relying on poll");
            }
        }

        Ok(())
    }

    /// Stop watching an address. Idempotent.
    #[trace]
    pub async fn unmonitor(&self, address: &Address) {
        if self.monitored.remove(address).is_none() {
            return;
        }

        self.scripts.retain(|_, watched| watched != address);
        gauge!("kasgate_monitored_addresses").set(self.monitored.len() as f64);
        info!(address:%; "stopped monitoring address");

        if let Err(error) = self
            .node
            .unsubscribe_utxo_changes(std::slice::from_ref(address))
            .await
        {
            debug!(address:%, error:%; "cannot unsubscribe from UTXO changes");
        }
    }

    pub async fn unmonitor_session(&self, session_id: Uuid) {
        let address = self
            .monitored
            .iter()
            .find(|entry| entry.value().session_id == session_id)
            .map(|entry| entry.key().clone());

        if let Some(address) = address {
            self.unmonitor(&address).await;
        }
    }

    pub fn is_monitoring(&self, address: &Address) -> bool {
        self.monitored.contains_key(address)
    }

    pub fn monitored_count(&self) -> usize {
        self.monitored.len()
    }

    /// Handle a push notification. Affected addresses are resolved either directly or through
    /// the script map, then re-fetched from the node so the detection decision always sees
    /// the full UTXO set of the address.
    pub async fn handle_utxo_change(&self, change: UtxoChange) -> Result<(), PubSubError> {
        let mut affected = HashSet::new();
        for utxo in &change.added {
            let address = utxo.address.clone().or_else(|| {
                self.scripts
                    .get(&utxo.script_public_key)
                    .map(|entry| entry.value().clone())
            });

            if let Some(address) = address
                && self.monitored.contains_key(&address)
            {
                affected.insert(address);
            }
        }

        for address in affected {
            match self
                .node
                .get_utxos_by_addresses(std::slice::from_ref(&address))
                .await
            {
                Ok(utxos) => self.evaluate(&address, &utxos).await?,
                Err(error) => {
                    // The poll baseline re-evaluates this address within its next interval.
                    warn!(address:%, error:%; "cannot fetch UTXO set after change notification");
                }
            }
        }

        Ok(())
    }

    /// One poll pass over all monitored addresses: fetch, diff against the previous snapshot,
    /// evaluate.
    #[trace]
    pub async fn poll_once(&self) -> Result<(), PubSubError> {
        let addresses = self
            .monitored
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();

        for address in addresses {
            let utxos = match self.indexer.get_utxos_by_address(&address).await {
                Ok(utxos) => utxos,
                Err(error) => {
                    warn!(address:%, error:%; "cannot poll UTXO set from indexer");
                    continue;
                }
            };

            if let Some(entry) = self.monitored.get(&address).map(|e| e.value().clone()) {
                let current = utxos
                    .iter()
                    .map(UtxoEntry::outpoint)
                    .collect::<HashSet<_>>();
                let new_outpoints = {
                    let mut known = entry.known_outpoints.lock();
                    let new_outpoints = current.difference(&known).count();
                    *known = current;
                    new_outpoints
                };
                if new_outpoints > 0 {
                    debug!(address:%, new_outpoints; "poll observed new outputs");
                }
            }

            self.evaluate(&address, &utxos).await?;
        }

        Ok(())
    }

    /// Decide detection for one address given its full UTXO set. Only block-included outputs
    /// count; a qualifying total fires the callback event at most once per monitored address.
    async fn evaluate(&self, address: &Address, utxos: &[UtxoEntry]) -> Result<(), PubSubError> {
        let Some(entry) = self.monitored.get(address).map(|e| e.value().clone()) else {
            return Ok(());
        };

        let total = block_included_total(utxos);
        let mempool_only = utxos.iter().filter(|utxo| !utxo.is_block_included()).count();
        if mempool_only > 0 {
            debug!(address:%, mempool_only; "mempool-only outputs observed, waiting for block inclusion");
        }

        if total.0 == 0 || total < entry.expected {
            if total.0 > 0 {
                debug!(
                    address:%,
                    total:%,
                    expected:% = entry.expected;
                    "underpaid so far, continuing to watch"
                );
            }
            return Ok(());
        }

        if entry.detected.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let tx_id = utxos
            .iter()
            .filter(|utxo| utxo.is_block_included())
            .max_by_key(|utxo| utxo.block_daa_score)
            .map(|utxo| utxo.tx_id.clone())
            .unwrap_or_default();

        counter!("kasgate_payments_detected").increment(1);
        info!(
            address:%,
            tx_id:%,
            total:%,
            expected:% = entry.expected,
            session_id:% = entry.session_id;
            "payment detected"
        );

        self.publisher
            .publish(&PaymentEvent::PaymentDetected {
                session_id: entry.session_id,
                address: address.clone(),
                tx_id,
                amount: total,
            })
            .await
    }

    /// Current blue score, served from the push backend when connected, else from the
    /// indexer.
    pub async fn current_blue_score(&self) -> Result<BlueScore, BlueScoreError> {
        if self.node.is_connected() {
            match self.node.get_sink_blue_score().await {
                Ok(blue_score) => return Ok(blue_score),
                Err(error) => {
                    warn!(error:%; "cannot get blue score from node, falling back to indexer");
                }
            }
        }

        self.indexer
            .get_virtual_chain_blue_score()
            .await
            .map_err(|error| BlueScoreError(Box::new(error)))
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn indexer(&self) -> &I {
        &self.indexer
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::{Stream, StreamExt};
    use std::convert::Infallible;
    use tokio::{sync::broadcast, time::timeout};
    use tokio_stream::wrappers::BroadcastStream;

    use kasgate_common::domain::{InMemPubSub, Subscriber};

    /// Node double with an injectable UTXO set and notification channel.
    #[derive(Debug, Clone)]
    pub(crate) struct MockNode {
        pub connected: Arc<AtomicBool>,
        pub utxos: Arc<Mutex<Vec<UtxoEntry>>>,
        pub blue_score: Arc<Mutex<BlueScore>>,
        pub subscribed: Arc<Mutex<HashSet<Address>>>,
        changes: broadcast::Sender<UtxoChange>,
    }

    impl MockNode {
        pub fn new() -> Self {
            let (changes, _) = broadcast::channel(64);
            Self {
                connected: Arc::new(AtomicBool::new(true)),
                utxos: Arc::new(Mutex::new(Vec::new())),
                blue_score: Arc::new(Mutex::new(0)),
                subscribed: Arc::new(Mutex::new(HashSet::new())),
                changes,
            }
        }

        pub fn push_utxo(&self, utxo: UtxoEntry) {
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

        async fn subscribe_utxo_changes(&self, addresses: &[Address]) -> Result<(), Self::Error> {
            self.subscribed.lock().extend(addresses.iter().cloned());
            Ok(())
        }

        async fn unsubscribe_utxo_changes(
            &self,
            addresses: &[Address],
        ) -> Result<(), Self::Error> {
            let mut subscribed = self.subscribed.lock();
            for address in addresses {
                subscribed.remove(address);
            }
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
            BroadcastStream::new(self.changes.subscribe())
                .filter_map(|result| async { result.ok() })
                .boxed()
        }
    }

    /// Indexer double sharing the node's UTXO set.
    #[derive(Debug, Clone)]
    pub(crate) struct MockIndexer {
        pub utxos: Arc<Mutex<Vec<UtxoEntry>>>,
        pub blue_score: Arc<Mutex<BlueScore>>,
    }

    impl MockIndexer {
        pub fn new() -> Self {
            Self {
                utxos: Arc::new(Mutex::new(Vec::new())),
                blue_score: Arc::new(Mutex::new(0)),
            }
        }
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

    pub(crate) fn utxo(address: &str, amount: u128, block_daa_score: u64, tx_id: &str) -> UtxoEntry {
        UtxoEntry {
            address: Some(address.to_owned()),
            tx_id: tx_id.to_owned(),
            output_index: 0,
            amount: Sompi(amount),
            script_public_key: format!("20{}ac", const_hex::encode(address)),
            block_daa_score,
        }
    }

    fn test_watcher() -> (
        LedgerWatcher<MockNode, MockIndexer, InMemPubSub>,
        MockNode,
        MockIndexer,
        InMemPubSub,
    ) {
        let node = MockNode::new();
        let indexer = MockIndexer::new();
        let pub_sub = InMemPubSub::new();
        let watcher = LedgerWatcher::new(node.clone(), indexer.clone(), pub_sub.clone());
        (watcher, node, indexer, pub_sub)
    }

    async fn next_detection(
        events: &mut (impl Stream<Item = Result<PaymentEvent, PubSubError>> + Unpin),
    ) -> Option<PaymentEvent> {
        timeout(Duration::from_millis(250), events.next())
            .await
            .ok()
            .flatten()
            .and_then(Result::ok)
    }

    #[tokio::test]
    async fn test_push_detection_on_subscribe_fetch() {
        let (watcher, node, _, pub_sub) = test_watcher();
        let mut events = pub_sub.subscribe();
        let session_id = Uuid::new_v4();

        node.utxos.lock().push(utxo("kaspatest:addr1", 100_000_000, 5, "tx-1"));
        watcher
            .monitor("kaspatest:addr1".to_owned(), Sompi(100_000_000), session_id)
            .await
            .unwrap();

        assert_matches::assert_matches!(
            next_detection(&mut events).await,
            Some(PaymentEvent::PaymentDetected { session_id: sid, tx_id, amount, .. }) => {
                assert_eq!(sid, session_id);
                assert_eq!(tx_id, "tx-1");
                assert_eq!(amount, Sompi(100_000_000));
            }
        );
        assert!(node.subscribed.lock().contains("kaspatest:addr1"));
    }

    #[tokio::test]
    async fn test_push_and_poll_race_detects_once() {
        let (watcher, node, indexer, pub_sub) = test_watcher();
        let mut events = pub_sub.subscribe();
        let session_id = Uuid::new_v4();

        watcher
            .monitor("kaspatest:addr1".to_owned(), Sompi(100), session_id)
            .await
            .unwrap();

        let paid = utxo("kaspatest:addr1", 150, 7, "tx-1");
        node.utxos.lock().push(paid.clone());
        indexer.utxos.lock().push(paid.clone());

        // Both backends observe the same payment.
        watcher
            .handle_utxo_change(UtxoChange {
                added: vec![paid],
                removed: Vec::new(),
            })
            .await
            .unwrap();
        watcher.poll_once().await.unwrap();

        assert!(next_detection(&mut events).await.is_some());
        assert!(next_detection(&mut events).await.is_none());
    }

    #[tokio::test]
    async fn test_mempool_only_outputs_do_not_detect() {
        let (watcher, _, indexer, pub_sub) = test_watcher();
        let mut events = pub_sub.subscribe();

        watcher
            .monitor("kaspatest:addr1".to_owned(), Sompi(100), Uuid::new_v4())
            .await
            .unwrap();

        indexer.utxos.lock().push(utxo("kaspatest:addr1", 150, 0, "tx-mempool"));
        watcher.poll_once().await.unwrap();
        assert!(next_detection(&mut events).await.is_none());

        // The same output becomes block-included.
        indexer.utxos.lock()[0].block_daa_score = 1;
        watcher.poll_once().await.unwrap();
        assert!(next_detection(&mut events).await.is_some());
    }

    #[tokio::test]
    async fn test_underpayment_does_not_detect() {
        let (watcher, _, indexer, pub_sub) = test_watcher();
        let mut events = pub_sub.subscribe();

        watcher
            .monitor("kaspatest:addr1".to_owned(), Sompi(100), Uuid::new_v4())
            .await
            .unwrap();

        indexer.utxos.lock().push(utxo("kaspatest:addr1", 99, 5, "tx-under"));
        watcher.poll_once().await.unwrap();
        assert!(next_detection(&mut events).await.is_none());

        // A second output tops the total up; overpayment is credited as-is.
        indexer.utxos.lock().push(utxo("kaspatest:addr1", 50, 6, "tx-top-up"));
        watcher.poll_once().await.unwrap();
        assert_matches::assert_matches!(
            next_detection(&mut events).await,
            Some(PaymentEvent::PaymentDetected { amount, tx_id, .. }) => {
                assert_eq!(amount, Sompi(149));
                assert_eq!(tx_id, "tx-top-up");
            }
        );
    }

    #[tokio::test]
    async fn test_unmonitor_suppresses_detection() {
        let (watcher, node, _, pub_sub) = test_watcher();
        let mut events = pub_sub.subscribe();

        watcher
            .monitor("kaspatest:addr1".to_owned(), Sompi(100), Uuid::new_v4())
            .await
            .unwrap();
        watcher.unmonitor(&"kaspatest:addr1".to_owned()).await;
        assert!(!watcher.is_monitoring(&"kaspatest:addr1".to_owned()));
        assert!(node.subscribed.lock().is_empty());

        node.utxos.lock().push(utxo("kaspatest:addr1", 150, 5, "tx-late"));
        watcher
            .handle_utxo_change(UtxoChange {
                added: vec![utxo("kaspatest:addr1", 150, 5, "tx-late")],
                removed: Vec::new(),
            })
            .await
            .unwrap();

        assert!(next_detection(&mut events).await.is_none());
    }

    #[tokio::test]
    async fn test_script_key_resolution() {
        let (watcher, node, _, pub_sub) = test_watcher();
        let mut events = pub_sub.subscribe();
        let session_id = Uuid::new_v4();

        // The script map is populated from the initial fetch of an unpaid dust output.
        node.utxos.lock().push(utxo("kaspatest:addr1", 1, 2, "tx-dust"));
        watcher
            .monitor("kaspatest:addr1".to_owned(), Sompi(100), session_id)
            .await
            .unwrap();
        assert!(next_detection(&mut events).await.is_none());

        // The notification names only the script public key.
        let mut paid = utxo("kaspatest:addr1", 200, 9, "tx-paid");
        node.utxos.lock().push(paid.clone());
        paid.address = None;
        watcher
            .handle_utxo_change(UtxoChange {
                added: vec![paid],
                removed: Vec::new(),
            })
            .await
            .unwrap();

        assert_matches::assert_matches!(
            next_detection(&mut events).await,
            Some(PaymentEvent::PaymentDetected { session_id: sid, .. }) => assert_eq!(sid, session_id)
        );
    }

    #[tokio::test]
    async fn test_blue_score_fallback() {
        let (watcher, node, indexer, _) = test_watcher();

        *node.blue_score.lock() = 100;
        *indexer.blue_score.lock() = 90;
        assert_eq!(watcher.current_blue_score().await.unwrap(), 100);

        node.connected.store(false, Ordering::Release);
        assert_eq!(watcher.current_blue_score().await.unwrap(), 90);
    }
}
