// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared harness for API integration tests: an in-memory engine behind a bound listener.

use futures::Stream;
use kasgate_api::{
    hub::SubscriptionHub,
    infra::api::{AppState, AxumApi, Config, RateLimiter},
};
use kasgate_common::{
    domain::{Address, BlueScore, InMemPubSub, NetworkId},
    infra::{migrations, pool::sqlite::{self, SqlitePool}},
};
use kasgate_engine::{
    domain::{
        deriver::AddressDeriver,
        indexer::LedgerIndexer,
        node::{Node, UtxoChange, UtxoEntry},
    },
    infra::storage::sqlite::SqliteStorage,
    merchant::MerchantService,
    session::{self, SessionManager},
    watcher::LedgerWatcher,
};
use std::{convert::Infallible, net::TcpListener as StdTcpListener, time::Duration};
use tokio::{sync::watch, task, time::sleep};

#[derive(Debug, Clone)]
pub struct TestDeriver;

impl AddressDeriver for TestDeriver {
    type Error = Infallible;

    fn parse(&self, xpub: &str) -> Result<(), Self::Error> {
        let _ = xpub;
        Ok(())
    }

    fn derive(&self, xpub: &str, index: u32) -> Result<Address, Self::Error> {
        Ok(format!("kaspatest:{}x{index}", &xpub[4..12]))
    }
}

#[derive(Debug, Clone)]
pub struct NullNode;

impl Node for NullNode {
    type Error = Infallible;

    fn is_connected(&self) -> bool {
        false
    }

    async fn subscribe_utxo_changes(&self, _addresses: &[Address]) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn unsubscribe_utxo_changes(&self, _addresses: &[Address]) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn get_utxos_by_addresses(
        &self,
        _addresses: &[Address],
    ) -> Result<Vec<UtxoEntry>, Self::Error> {
        Ok(Vec::new())
    }

    async fn get_sink_blue_score(&self) -> Result<BlueScore, Self::Error> {
        Ok(0)
    }

    fn utxo_changes(&self) -> impl Stream<Item = UtxoChange> + Send + Unpin + 'static {
        futures::stream::pending()
    }
}

#[derive(Debug, Clone)]
pub struct NullIndexer;

impl LedgerIndexer for NullIndexer {
    type Error = Infallible;

    async fn get_utxos_by_address(
        &self,
        _address: &Address,
    ) -> Result<Vec<UtxoEntry>, Self::Error> {
        Ok(Vec::new())
    }

    async fn get_virtual_chain_blue_score(&self) -> Result<BlueScore, Self::Error> {
        Ok(0)
    }

    async fn probe(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct TestApi {
    pub port: u16,
    pub sessions: SessionManager<SqliteStorage, TestDeriver, InMemPubSub>,
    pub merchants: MerchantService<SqliteStorage>,
    pub shutdown: watch::Sender<bool>,
}

impl TestApi {
    pub fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }
}

pub async fn spawn_api() -> TestApi {
    let pool = SqlitePool::new(sqlite::Config::in_memory()).await.unwrap();
    migrations::sqlite::run(&pool).await.unwrap();
    let storage = SqliteStorage::new(pool);

    let pub_sub = InMemPubSub::new();
    let sessions = SessionManager::new(
        storage.clone(),
        TestDeriver,
        pub_sub.clone(),
        session::Config::default(),
        NetworkId::Testnet10,
    );
    let merchants = MerchantService::new(storage.clone());
    let watcher = LedgerWatcher::new(NullNode, NullIndexer, pub_sub.clone());
    let hub = SubscriptionHub::new();

    // Grab a free port from the OS, then hand it to the API config.
    let port = {
        let probe = StdTcpListener::bind("127.0.0.1:0").unwrap();
        probe.local_addr().unwrap().port()
    };

    let state = AppState {
        merchants: merchants.clone(),
        sessions: sessions.clone(),
        storage,
        watcher,
        deriver: TestDeriver,
        hub: hub.clone(),
        network: NetworkId::Testnet10,
        rate_limiter: RateLimiter::new(),
        production: false,
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown = |mut rx: watch::Receiver<bool>| async move {
        let _ = rx.changed().await;
    };

    task::spawn({
        let hub = hub.clone();
        let pub_sub = pub_sub.clone();
        let required = sessions.confirmation_threshold();
        let shutdown = shutdown(shutdown_rx.clone());
        async move { hub.forward_events(pub_sub, required, shutdown).await }
    });

    let config = Config {
        address: "127.0.0.1".parse().unwrap(),
        port,
        ..Default::default()
    };
    task::spawn(AxumApi::new(config).serve(state, shutdown(shutdown_rx)));

    // Wait for the listener to come up.
    sleep(Duration::from_millis(100)).await;

    TestApi {
        port,
        sessions,
        merchants,
        shutdown: shutdown_tx,
    }
}
