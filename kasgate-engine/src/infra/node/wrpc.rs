// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    domain::node::{Node, UtxoChange, UtxoEntry},
    infra::wire::UtxoDto,
};
use dashmap::DashMap;
use futures::{SinkExt, Stream, StreamExt};
use kasgate_common::domain::{Address, BlueScore, NetworkId};
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::{broadcast, mpsc, oneshot},
    task,
    time::{sleep, timeout},
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const CHANGES_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Primary wRPC endpoint; the per-network defaults are used when absent.
    #[serde(default)]
    pub url: Option<String>,

    /// Endpoints tried after the primary one failed.
    #[serde(default)]
    pub fallback_urls: Vec<String>,

    #[serde(with = "humantime_serde", default = "connect_timeout_default")]
    pub connect_timeout: Duration,

    #[serde(with = "humantime_serde", default = "fallback_connect_timeout_default")]
    pub fallback_connect_timeout: Duration,

    #[serde(with = "humantime_serde", default = "request_timeout_default")]
    pub request_timeout: Duration,

    /// Reconnect backoff doubles from one second up to this cap.
    #[serde(with = "humantime_serde", default = "reconnect_max_delay_default")]
    pub reconnect_max_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            fallback_urls: Vec::new(),
            connect_timeout: connect_timeout_default(),
            fallback_connect_timeout: fallback_connect_timeout_default(),
            request_timeout: request_timeout_default(),
            reconnect_max_delay: reconnect_max_delay_default(),
        }
    }
}

const fn connect_timeout_default() -> Duration {
    Duration::from_secs(15)
}

const fn fallback_connect_timeout_default() -> Duration {
    Duration::from_secs(10)
}

const fn request_timeout_default() -> Duration {
    Duration::from_secs(10)
}

const fn reconnect_max_delay_default() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Error)]
pub enum WrpcNodeError {
    #[error("node is not connected")]
    NotConnected,

    #[error("request timed out")]
    Timeout,

    #[error("connection lost while awaiting response")]
    ConnectionLost,

    #[error("node returned an error: {0}")]
    Rpc(String),

    #[error("unexpected response shape")]
    UnexpectedResponse(#[source] serde_json::Error),
}

/// JSON frame of the node's bidirectional RPC. Requests and responses correlate via `id`;
/// notifications carry a `method` and no `id`.
#[derive(Debug, Serialize, Deserialize)]
struct RpcFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    params: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UtxosChangedParams {
    #[serde(default)]
    added: Vec<UtxoDto>,
    #[serde(default)]
    removed: Vec<UtxoDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UtxosByAddressesResult {
    #[serde(default)]
    entries: Vec<UtxoDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SinkBlueScoreResult {
    blue_score: BlueScore,
}

#[derive(Debug)]
struct Inner {
    config: Config,
    endpoints: Vec<(String, Duration)>,
    connected: AtomicBool,
    next_request_id: AtomicU64,
    pending: DashMap<u64, oneshot::Sender<Result<Value, WrpcNodeError>>>,
    outbound: RwLock<Option<mpsc::UnboundedSender<String>>>,
    subscriptions: Mutex<HashSet<Address>>,
    changes: broadcast::Sender<UtxoChange>,
}

/// A [Node] implementation speaking JSON frames over a persistent WebSocket. Owns the
/// connection lifecycle: the supervision task connects through the endpoint list, pumps
/// frames, and on loss reconnects with exponential backoff, replaying active subscriptions.
#[derive(Debug, Clone)]
pub struct WrpcNode {
    inner: Arc<Inner>,
}

impl WrpcNode {
    /// Create the client and spawn its connection supervisor. Returns immediately; the poll
    /// backend covers the gap until the first successful connect.
    pub fn spawn(config: Config, network_id: NetworkId) -> Self {
        let mut endpoints = Vec::new();
        match &config.url {
            Some(url) => endpoints.push((url.clone(), config.connect_timeout)),
            None => {
                if let Some((first, rest)) = network_id.default_node_endpoints().split_first() {
                    endpoints.push(((*first).to_owned(), config.connect_timeout));
                    for url in rest {
                        endpoints.push(((*url).to_owned(), config.fallback_connect_timeout));
                    }
                }
            }
        }
        for url in &config.fallback_urls {
            endpoints.push((url.clone(), config.fallback_connect_timeout));
        }

        let (changes, _) = broadcast::channel(CHANGES_CHANNEL_CAPACITY);
        let inner = Arc::new(Inner {
            config,
            endpoints,
            connected: AtomicBool::new(false),
            next_request_id: AtomicU64::new(1),
            pending: DashMap::new(),
            outbound: RwLock::new(None),
            subscriptions: Mutex::new(HashSet::new()),
            changes,
        });

        task::spawn(Self::supervise(inner.clone()));

        Self { inner }
    }

    async fn supervise(inner: Arc<Inner>) {
        let mut backoff = Duration::from_secs(1);

        loop {
            match Self::connect_any(&inner).await {
                Some((url, stream)) => {
                    backoff = Duration::from_secs(1);
                    inner.connected.store(true, Ordering::Release);
                    info!(url:%; "push backend connected");

                    Self::replay_subscriptions(&inner).await;
                    Self::pump(&inner, stream).await;

                    inner.connected.store(false, Ordering::Release);
                    *inner.outbound.write() = None;
                    Self::fail_pending(&inner);
                    warn!(url:%; "push backend disconnected, scheduling reconnect");
                }
                None => {
                    debug!(backoff:? = backoff; "no push endpoint reachable");
                }
            }

            sleep(backoff).await;
            backoff = (backoff * 2).min(inner.config.reconnect_max_delay);
        }
    }

    async fn connect_any(
        inner: &Arc<Inner>,
    ) -> Option<(String, WebSocketStream<MaybeTlsStream<TcpStream>>)> {
        for (url, connect_timeout) in &inner.endpoints {
            match timeout(*connect_timeout, connect_async(url.as_str())).await {
                Ok(Ok((stream, _))) => return Some((url.clone(), stream)),
                Ok(Err(error)) => {
                    warn!(url:%, error:%; "cannot connect to push endpoint");
                }
                Err(_) => {
                    warn!(url:%, timeout:? = connect_timeout; "push endpoint connect timed out");
                }
            }
        }

        None
    }

    /// Re-subscribe every monitored address after a reconnect.
    async fn replay_subscriptions(inner: &Arc<Inner>) {
        let addresses = inner.subscriptions.lock().iter().cloned().collect::<Vec<_>>();
        if addresses.is_empty() {
            return;
        }

        info!(count = addresses.len(); "replaying UTXO-change subscriptions");
        if let Err(error) = Self::request_on(
            inner,
            "notifyUtxosChanged",
            json!({ "addresses": addresses }),
        )
        .await
        {
            warn!(error:%; "cannot replay subscriptions");
        }
    }

    /// Pump frames until the connection dies. The writer half is fed through an unbounded
    /// channel stored in `outbound`.
    async fn pump(inner: &Arc<Inner>, stream: WebSocketStream<MaybeTlsStream<TcpStream>>) {
        let (mut write, mut read) = stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        *inner.outbound.write() = Some(outbound_tx);

        loop {
            tokio::select! {
                outgoing = outbound_rx.recv() => {
                    let Some(outgoing) = outgoing else { break };
                    if write.send(Message::Text(outgoing.into())).await.is_err() {
                        break;
                    }
                }

                incoming = read.next() => {
                    match incoming {
                        Some(Ok(Message::Text(text))) => Self::handle_frame(inner, text.as_str()),
                        Some(Ok(Message::Ping(payload))) => {
                            if write.send(Message::Pong(payload)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
    }

    fn handle_frame(inner: &Arc<Inner>, text: &str) {
        let frame = match serde_json::from_str::<RpcFrame>(text) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(error:%; "cannot decode frame from push backend");
                return;
            }
        };

        if let Some(id) = frame.id {
            if let Some((_, sender)) = inner.pending.remove(&id) {
                let result = match frame.error {
                    Some(message) => Err(WrpcNodeError::Rpc(message)),
                    None => Ok(frame.result),
                };
                let _ = sender.send(result);
            }
            return;
        }

        match frame.method.as_deref() {
            Some("utxosChanged") => {
                match serde_json::from_value::<UtxosChangedParams>(frame.params) {
                    Ok(params) => {
                        let change = UtxoChange {
                            added: params.added.into_iter().map(UtxoEntry::from).collect(),
                            removed: params.removed.into_iter().map(UtxoEntry::from).collect(),
                        };
                        let _ = inner.changes.send(change);
                    }
                    Err(error) => {
                        warn!(error:%; "cannot decode utxosChanged notification");
                    }
                }
            }
            Some(method) => {
                debug!(method:%; "ignoring notification");
            }
            None => {}
        }
    }

    fn fail_pending(inner: &Arc<Inner>) {
        let ids = inner.pending.iter().map(|entry| *entry.key()).collect::<Vec<_>>();
        for id in ids {
            if let Some((_, sender)) = inner.pending.remove(&id) {
                let _ = sender.send(Err(WrpcNodeError::ConnectionLost));
            }
        }
    }

    async fn request_on(
        inner: &Arc<Inner>,
        method: &str,
        params: Value,
    ) -> Result<Value, WrpcNodeError> {
        let Some(outbound) = inner.outbound.read().clone() else {
            return Err(WrpcNodeError::NotConnected);
        };

        let id = inner.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        inner.pending.insert(id, sender);

        let frame = RpcFrame {
            id: Some(id),
            method: Some(method.to_owned()),
            params,
            result: Value::Null,
            error: None,
        };
        let frame = serde_json::to_string(&frame).expect("request frame serializes");

        if outbound.send(frame).is_err() {
            inner.pending.remove(&id);
            return Err(WrpcNodeError::NotConnected);
        }

        match timeout(inner.config.request_timeout, receiver).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(WrpcNodeError::ConnectionLost),
            Err(_) => {
                inner.pending.remove(&id);
                Err(WrpcNodeError::Timeout)
            }
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, WrpcNodeError> {
        Self::request_on(&self.inner, method, params).await
    }
}

impl Node for WrpcNode {
    type Error = WrpcNodeError;

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    async fn subscribe_utxo_changes(&self, addresses: &[Address]) -> Result<(), Self::Error> {
        // Remembered regardless of connectivity; the supervisor replays on (re)connect.
        self.inner
            .subscriptions
            .lock()
            .extend(addresses.iter().cloned());

        if !self.is_connected() {
            debug!("not connected, subscription deferred until reconnect");
            return Ok(());
        }

        self.request("notifyUtxosChanged", json!({ "addresses": addresses }))
            .await
            .map(|_| ())
    }

    async fn unsubscribe_utxo_changes(&self, addresses: &[Address]) -> Result<(), Self::Error> {
        {
            let mut subscriptions = self.inner.subscriptions.lock();
            for address in addresses {
                subscriptions.remove(address);
            }
        }

        if !self.is_connected() {
            return Ok(());
        }

        self.request("stopNotifyUtxosChanged", json!({ "addresses": addresses }))
            .await
            .map(|_| ())
    }

    async fn get_utxos_by_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<UtxoEntry>, Self::Error> {
        let result = self
            .request("getUtxosByAddresses", json!({ "addresses": addresses }))
            .await?;

        let result = serde_json::from_value::<UtxosByAddressesResult>(result)
            .map_err(WrpcNodeError::UnexpectedResponse)?;

        Ok(result.entries.into_iter().map(UtxoEntry::from).collect())
    }

    async fn get_sink_blue_score(&self) -> Result<BlueScore, Self::Error> {
        let result = self.request("getSinkBlueScore", json!({})).await?;

        let result = serde_json::from_value::<SinkBlueScoreResult>(result)
            .map_err(WrpcNodeError::UnexpectedResponse)?;

        Ok(result.blue_score)
    }

    fn utxo_changes(&self) -> impl Stream<Item = UtxoChange> + Send + Unpin + 'static {
        BroadcastStream::new(self.inner.changes.subscribe())
            .filter_map(|result| async { result.ok() })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use kasgate_common::domain::Sompi;
    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    #[test]
    fn test_frame_decoding() {
        let response = serde_json::from_str::<RpcFrame>(
            r#"{"id":7,"result":{"blueScore":123}}"#,
        )
        .unwrap();
        assert_eq!(response.id, Some(7));
        assert_eq!(response.result["blueScore"], 123);

        let notification = serde_json::from_str::<RpcFrame>(
            r#"{"method":"utxosChanged","params":{"added":[],"removed":[]}}"#,
        )
        .unwrap();
        assert_eq!(notification.id, None);
        assert_eq!(notification.method.as_deref(), Some("utxosChanged"));

        let error = serde_json::from_str::<RpcFrame>(r#"{"id":1,"error":"no such method"}"#).unwrap();
        assert_eq!(error.error.as_deref(), Some("no such method"));
    }

    /// Minimal in-process node: answers blue-score requests, acknowledges subscriptions and
    /// emits one change notification after the first subscribe.
    async fn serve_fake_node(listener: TcpListener) {
        let (stream, _) = listener.accept().await.expect("client connects");
        let mut ws = accept_async(stream).await.expect("handshake succeeds");

        while let Some(Ok(message)) = ws.next().await {
            let Message::Text(text) = message else { continue };
            let frame = serde_json::from_str::<RpcFrame>(text.as_str()).unwrap();

            match frame.method.as_deref() {
                Some("getSinkBlueScore") => {
                    let response = json!({ "id": frame.id, "result": { "blueScore": 4711 } });
                    ws.send(Message::Text(response.to_string().into())).await.unwrap();
                }

                Some("notifyUtxosChanged") => {
                    let response = json!({ "id": frame.id, "result": {} });
                    ws.send(Message::Text(response.to_string().into())).await.unwrap();

                    let notification = json!({
                        "method": "utxosChanged",
                        "params": {
                            "added": [{
                                "address": "kaspatest:qqnotified",
                                "outpoint": { "transactionId": "feed", "index": 0 },
                                "utxoEntry": { "amount": "1500", "blockDaaScore": "9" }
                            }],
                            "removed": []
                        }
                    });
                    ws.send(Message::Text(notification.to_string().into())).await.unwrap();
                }

                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn test_request_and_notification_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        tokio::spawn(serve_fake_node(listener));

        let node = WrpcNode::spawn(
            Config {
                url: Some(url),
                connect_timeout: Duration::from_secs(2),
                ..Default::default()
            },
            NetworkId::Testnet10,
        );

        // Wait for the supervisor to establish the connection.
        for _ in 0..50 {
            if node.is_connected() {
                break;
            }
            sleep(Duration::from_millis(20)).await;
        }
        assert!(node.is_connected());

        let mut changes = node.utxo_changes();
        node.subscribe_utxo_changes(&["kaspatest:qqnotified".to_owned()])
            .await
            .unwrap();

        let change = timeout(Duration::from_secs(2), changes.next())
            .await
            .expect("notification arrives")
            .expect("stream is open");
        assert_eq!(change.added.len(), 1);
        assert_eq!(change.added[0].address.as_deref(), Some("kaspatest:qqnotified"));
        assert_eq!(change.added[0].amount, Sompi(1_500));

        assert_eq!(node.get_sink_blue_score().await.unwrap(), 4_711);
    }

    #[tokio::test]
    async fn test_request_while_disconnected() {
        let node = WrpcNode::spawn(
            Config {
                url: Some("ws://127.0.0.1:9".to_owned()),
                connect_timeout: Duration::from_millis(100),
                ..Default::default()
            },
            NetworkId::Testnet10,
        );

        assert!(!node.is_connected());
        assert_matches::assert_matches!(
            node.get_sink_blue_score().await,
            Err(WrpcNodeError::NotConnected)
        );

        // Subscriptions are remembered for replay even while disconnected.
        node.subscribe_utxo_changes(&["kaspatest:qqlater".to_owned()])
            .await
            .unwrap();
        assert!(node.inner.subscriptions.lock().contains("kaspatest:qqlater"));
    }
}
