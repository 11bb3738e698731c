// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

mod config;

use anyhow::Context;
use config::Config;
use kasgate_api::{
    hub::SubscriptionHub,
    infra::api::{AppState, AxumApi, RateLimiter},
};
use kasgate_common::{
    config::ConfigExt,
    domain::InMemPubSub,
    infra::{migrations, pool::sqlite::SqlitePool},
    telemetry,
};
use kasgate_engine::{
    application,
    infra::{
        deriver::KaspaDeriver, indexer::http::HttpIndexer, node::wrpc::WrpcNode,
        storage::sqlite::SqliteStorage,
    },
    merchant::MerchantService,
    session::SessionManager,
    tracker::ConfirmationTracker,
    watcher::LedgerWatcher,
    webhook::WebhookDispatcher,
};
use log::{error, info, warn};
use std::{panic, time::Duration};
use tokio::{
    select,
    signal::unix::{SignalKind, signal},
    sync::watch,
    task,
    time::timeout,
};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    telemetry::init_logging();
    panic::set_hook(Box::new(|panic| error!(panic:%; "process panicked")));

    if let Err(error) = run().await {
        let backtrace = error.backtrace();
        let error = format!("{error:#}");
        error!(error, backtrace:%; "process exited with ERROR");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("register SIGTERM handler")?;

    let config = Config::load().context("load configuration")?;
    info!(config:?; "starting");
    let Config {
        run_migrations,
        application_config,
        infra_config,
        telemetry_config,
    } = config;

    telemetry::init_metrics(telemetry_config.metrics_config);

    let network = application_config.network;

    // The store comes up first and goes down last.
    let pool = SqlitePool::new(infra_config.storage_config)
        .await
        .context("create SQLite pool")?;
    if run_migrations {
        migrations::sqlite::run(&pool)
            .await
            .context("initialize schema")?;
    }
    let storage = SqliteStorage::new(pool);

    let pub_sub = InMemPubSub::new();
    let deriver = KaspaDeriver::new(network);
    let node = WrpcNode::spawn(infra_config.node_config, network);
    let indexer = HttpIndexer::new(infra_config.indexer_config, network)
        .context("create indexer client")?;

    let watcher = LedgerWatcher::new(node, indexer, pub_sub.clone());
    let session_manager = SessionManager::new(
        storage.clone(),
        deriver.clone(),
        pub_sub.clone(),
        application_config.session.clone(),
        network,
    );
    let tracker = ConfirmationTracker::new(session_manager.clone());
    let dispatcher = WebhookDispatcher::new(storage.clone(), application_config.webhook.clone())
        .context("create webhook dispatcher")?;
    let merchants = MerchantService::new(storage.clone());
    let hub = SubscriptionHub::new();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown = |mut rx: watch::Receiver<bool>| async move {
        let _ = rx.changed().await;
    };

    let state = AppState {
        merchants,
        sessions: session_manager.clone(),
        storage: storage.clone(),
        watcher: watcher.clone(),
        deriver,
        hub: hub.clone(),
        network,
        rate_limiter: RateLimiter::new(),
        production: infra_config.api_config.production,
    };

    let mut engine_task = task::spawn(application::run(
        application_config,
        storage,
        session_manager.clone(),
        tracker,
        watcher,
        dispatcher,
        pub_sub.clone(),
        shutdown(shutdown_rx.clone()),
    ));

    let mut api_task = task::spawn(
        AxumApi::new(infra_config.api_config).serve(state, shutdown(shutdown_rx.clone())),
    );

    let forward_task = task::spawn({
        let hub = hub.clone();
        let pub_sub = pub_sub.clone();
        let required = session_manager.confirmation_threshold();
        let shutdown = shutdown(shutdown_rx.clone());
        async move { hub.forward_events(pub_sub, required, shutdown).await }
    });

    let heartbeat_task = task::spawn({
        let hub = hub.clone();
        let shutdown = shutdown(shutdown_rx.clone());
        async move { hub.run_heartbeat(HEARTBEAT_INTERVAL, shutdown).await }
    });

    select! {
        result = &mut engine_task => {
            return result
                .context("engine task panicked")
                .and_then(|result| result.context("engine task failed"));
        }

        result = &mut api_task => {
            return result
                .context("API task panicked")
                .and_then(|result| result.context("API task failed"));
        }

        _ = sigterm.recv() => {
            warn!("SIGTERM received");
        }
    }

    // Graceful shutdown: stop the API intake and the timers, close the hub, drain webhooks,
    // then let the store drop last.
    let _ = shutdown_tx.send(true);
    let drained = timeout(SHUTDOWN_DEADLINE, async {
        let _ = api_task.await;
        let _ = engine_task.await;
        let _ = forward_task.await;
        let _ = heartbeat_task.await;
    })
    .await;
    if drained.is_err() {
        warn!("shutdown deadline exceeded");
    }

    fastrace::flush();

    Ok(())
}
