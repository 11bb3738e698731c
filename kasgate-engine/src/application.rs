// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    domain::{
        deriver::AddressDeriver,
        indexer::LedgerIndexer,
        node::Node,
        storage::Storage,
    },
    session::{self, PaymentAcceptance, SessionError, SessionManager},
    tracker::{self, ConfirmationTracker},
    watcher::{self, LedgerWatcher},
    webhook::{self, WebhookDispatcher},
};
use anyhow::Context;
use chrono::Utc;
use dashmap::DashMap;
use futures::StreamExt;
use kasgate_common::domain::{
    NetworkId, PaymentEvent, Publisher, SessionStatus, Subscriber,
};
use log::{error, info, warn};
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::{
    select,
    sync::{Semaphore, watch},
    task,
    time::{self, MissedTickBehavior},
};
use uuid::Uuid;

const WEBHOOK_CONCURRENCY_LIMIT: usize = 16;
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde_as(as = "DisplayFromStr")]
    pub network: NetworkId,

    #[serde(default)]
    pub session: session::Config,

    #[serde(default)]
    pub watcher: watcher::Config,

    #[serde(default)]
    pub tracker: tracker::Config,

    #[serde(default)]
    pub webhook: webhook::Config,

    #[serde(with = "humantime_serde", default = "expiry_sweep_interval_default")]
    pub expiry_sweep_interval: Duration,
}

const fn expiry_sweep_interval_default() -> Duration {
    Duration::from_secs(60)
}

/// Run the engine: rehydrate state from the store, then supervise the background workers
/// until the shutdown future resolves. Workers catch and log per-iteration errors; a single
/// failing iteration never stops a worker.
#[allow(clippy::too_many_arguments)]
pub async fn run<S, D, P, B, N, I>(
    config: Config,
    storage: S,
    session_manager: SessionManager<S, D, P>,
    tracker: ConfirmationTracker<S, D, P>,
    watcher: LedgerWatcher<N, I, P>,
    dispatcher: WebhookDispatcher<S>,
    subscriber: B,
    shutdown: impl Future<Output = ()> + Send,
) -> anyhow::Result<()>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    B: Subscriber,
    N: Node,
    I: LedgerIndexer,
{
    rehydrate(&storage, &tracker, &watcher).await?;

    let (stop_tx, stop_rx) = watch::channel(false);

    // Expiry sweep: terminal transitions are published, the lifecycle consumer below stops
    // monitoring the expired addresses.
    let sweep_task = task::spawn({
        let session_manager = session_manager.clone();
        let mut stop_rx = stop_rx.clone();
        let period = config.expiry_sweep_interval;

        async move {
            let mut interval = interval(period);
            loop {
                select! {
                    _ = interval.tick() => {
                        if let Err(error) = session_manager.expire_old_sessions().await {
                            warn!(error:%; "expiry sweep failed");
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            Ok::<_, anyhow::Error>(())
        }
    });

    // Confirmation tick: one blue-score read per tick, applied to every tracked session.
    let tick_task = task::spawn({
        let tracker = tracker.clone();
        let watcher = watcher.clone();
        let mut stop_rx = stop_rx.clone();
        let period = config.tracker.tick_interval;

        async move {
            let mut interval = interval(period);
            loop {
                select! {
                    _ = interval.tick() => {
                        if tracker.tracked_count() == 0 {
                            continue;
                        }
                        match watcher.current_blue_score().await {
                            Ok(blue_score) => tracker.tick(blue_score).await,
                            Err(error) => warn!(error:%; "cannot read blue score for confirmation tick"),
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            Ok::<_, anyhow::Error>(())
        }
    });

    // Poll baseline of the ledger watcher.
    let poll_task = task::spawn({
        let watcher = watcher.clone();
        let mut stop_rx = stop_rx.clone();
        let period = config.watcher.poll_interval;

        async move {
            let mut interval = interval(period);
            loop {
                select! {
                    _ = interval.tick() => {
                        if let Err(error) = watcher.poll_once().await {
                            warn!(error:%; "poll pass failed");
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            Ok::<_, anyhow::Error>(())
        }
    });

    // Push notifications from the node.
    let push_task = task::spawn({
        let watcher = watcher.clone();
        let mut stop_rx = stop_rx.clone();

        async move {
            let mut changes = watcher.node().utxo_changes();
            loop {
                select! {
                    change = changes.next() => {
                        let Some(change) = change else { break };
                        if let Err(error) = watcher.handle_utxo_change(change).await {
                            warn!(error:%; "cannot handle UTXO change notification");
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            Ok::<_, anyhow::Error>(())
        }
    });

    // Lifecycle consumer: wires watcher detections into the state machine and keeps the
    // monitored-address set in sync with session state.
    let lifecycle_task = task::spawn({
        let session_manager = session_manager.clone();
        let tracker = tracker.clone();
        let watcher = watcher.clone();
        let storage = storage.clone();
        let mut events = subscriber.subscribe();
        let mut stop_rx = stop_rx.clone();

        async move {
            loop {
                select! {
                    event = events.next() => {
                        match event {
                            Some(Ok(event)) => {
                                handle_lifecycle_event(
                                    event,
                                    &session_manager,
                                    &tracker,
                                    &watcher,
                                    &storage,
                                )
                                .await;
                            }
                            Some(Err(error)) => warn!(error:%; "lifecycle consumer lagged"),
                            None => break,
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            Ok::<_, anyhow::Error>(())
        }
    });

    // Webhook consumer: first attempts are delivered in event order per session via a FIFO
    // semaphore per session ID; distinct sessions deliver concurrently.
    let webhook_task = task::spawn({
        let dispatcher = dispatcher.clone();
        let events = subscriber.subscribe();
        let mut stop_rx = stop_rx.clone();

        async move {
            let semaphore_by_session = Arc::new(DashMap::<Uuid, Arc<Semaphore>>::new());

            let consume = events.for_each_concurrent(Some(WEBHOOK_CONCURRENCY_LIMIT), |event| {
                let dispatcher = dispatcher.clone();
                let semaphore_by_session = semaphore_by_session.clone();

                async move {
                    let event = match event {
                        Ok(event) => event,
                        Err(error) => {
                            warn!(error:%; "webhook consumer lagged");
                            return;
                        }
                    };

                    let semaphore = semaphore_by_session
                        .entry(event.session_id())
                        .or_insert_with(|| Arc::new(Semaphore::new(1)))
                        .clone();
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };

                    if let Err(error) = dispatcher.handle_event(&event).await {
                        warn!(error:%; "cannot dispatch webhook for event");
                    }
                }
            });

            select! {
                _ = consume => {}
                _ = stop_rx.changed() => {}
            }

            Ok::<_, anyhow::Error>(())
        }
    });

    // Webhook retry worker.
    let retry_task = task::spawn({
        let dispatcher = dispatcher.clone();
        let mut stop_rx = stop_rx.clone();
        let period = dispatcher.retry_interval();

        async move {
            let mut interval = interval(period);
            loop {
                select! {
                    _ = interval.tick() => {
                        if let Err(error) = dispatcher.retry_due().await {
                            warn!(error:%; "webhook retry pass failed");
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            Ok::<_, anyhow::Error>(())
        }
    });

    let (mut sweep_task, mut tick_task, mut poll_task, mut push_task) =
        (sweep_task, tick_task, poll_task, push_task);
    let (mut lifecycle_task, mut webhook_task, mut retry_task) =
        (lifecycle_task, webhook_task, retry_task);

    // "Successful" completion of any worker before shutdown is unexpected.
    select! {
        result = &mut sweep_task => return finish("sweep_task", result),
        result = &mut tick_task => return finish("tick_task", result),
        result = &mut poll_task => return finish("poll_task", result),
        result = &mut push_task => return finish("push_task", result),
        result = &mut lifecycle_task => return finish("lifecycle_task", result),
        result = &mut webhook_task => return finish("webhook_task", result),
        result = &mut retry_task => return finish("retry_task", result),

        _ = shutdown => {
            warn!("shutdown signal received");
        }
    }

    let _ = stop_tx.send(true);

    // Give in-flight webhook attempts a short deadline to finish.
    let drain = async {
        let _ = webhook_task.await;
        let _ = retry_task.await;
    };
    if time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
        warn!("webhook drain deadline exceeded");
    }

    Ok(())
}

fn interval(period: Duration) -> time::Interval {
    let mut interval = time::interval(period);
    // No burst catch-up when a tick runs long; the next tick is delayed instead.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn finish(
    name: &str,
    result: Result<anyhow::Result<()>, task::JoinError>,
) -> anyhow::Result<()> {
    result
        .with_context(|| format!("{name} panicked"))
        .and_then(|result| result.with_context(|| format!("{name} failed")))
        .and_then(|()| anyhow::bail!("{name} completed unexpectedly"))
}

/// Restore transient state from the store: monitors for pending sessions, confirmation
/// tracking for confirming sessions.
async fn rehydrate<S, D, P, N, I>(
    storage: &S,
    tracker: &ConfirmationTracker<S, D, P>,
    watcher: &LedgerWatcher<N, I, P>,
) -> anyhow::Result<()>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let now = Utc::now();

    let pending = storage
        .get_sessions_by_status(SessionStatus::Pending)
        .await
        .context("get pending sessions")?;
    let mut monitored = 0;
    for session in pending {
        // Overdue rows are left to the first sweep.
        if !session.is_expired_at(now) {
            watcher
                .monitor(session.address.clone(), session.amount, session.id)
                .await
                .context("monitor pending session")?;
            monitored += 1;
        }
    }

    let blue_score = watcher.current_blue_score().await.unwrap_or_else(|error| {
        warn!(error:%; "cannot read blue score during rehydration, counting from zero");
        0
    });
    tracker
        .rehydrate(storage, blue_score)
        .await
        .context("rehydrate confirmation tracker")?;

    if monitored > 0 || tracker.tracked_count() > 0 {
        info!(
            monitored,
            tracked = tracker.tracked_count();
            "rehydrated engine state"
        );
    }

    Ok(())
}

async fn handle_lifecycle_event<S, D, P, N, I>(
    event: PaymentEvent,
    session_manager: &SessionManager<S, D, P>,
    tracker: &ConfirmationTracker<S, D, P>,
    watcher: &LedgerWatcher<N, I, P>,
    storage: &S,
) where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    match event {
        PaymentEvent::SessionCreated { session_id, .. } => {
            match storage.get_session(session_id).await {
                Ok(Some(session)) if session.status == SessionStatus::Pending => {
                    if let Err(error) = watcher
                        .monitor(session.address, session.amount, session.id)
                        .await
                    {
                        warn!(session_id:%, error:%; "cannot monitor created session");
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(session_id:%, error:%; "cannot load created session");
                }
            }
        }

        PaymentEvent::PaymentDetected {
            session_id,
            address,
            tx_id,
            ..
        } => {
            let blue_score = match watcher.current_blue_score().await {
                Ok(blue_score) => blue_score,
                Err(error) => {
                    // Without a score the confirmation math has no anchor; the next poll or
                    // push observation re-triggers nothing (single-shot), so this is fatal
                    // for the session and loudly logged.
                    error!(session_id:%, error:%; "cannot read blue score at detection, payment not accepted");
                    return;
                }
            };

            match session_manager
                .mark_payment_received(session_id, &tx_id, blue_score)
                .await
            {
                Ok(PaymentAcceptance::Accepted(_)) => {
                    watcher.unmonitor(&address).await;
                    tracker.track(session_id, blue_score);
                }
                Ok(PaymentAcceptance::Rejected(status)) => {
                    info!(session_id:%, status:%; "payment dropped after arbitration");
                    watcher.unmonitor(&address).await;
                }
                Err(SessionError::SessionNotFound(_)) => {
                    watcher.unmonitor(&address).await;
                }
                Err(error) => {
                    warn!(session_id:%, error:%; "cannot process detected payment");
                }
            }
        }

        PaymentEvent::StatusChanged {
            session_id, status, ..
        } if status.is_terminal() => {
            watcher.unmonitor_session(session_id).await;
            tracker.untrack(session_id);
        }

        _ => {}
    }
}
