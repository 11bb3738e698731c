// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    domain::{indexer::LedgerIndexer, node::UtxoEntry},
    infra::wire::UtxoDto,
};
use kasgate_common::domain::{Address, BlueScore, NetworkId};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the REST indexer; the per-network default is used when absent.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(with = "humantime_serde", default = "request_timeout_default")]
    pub request_timeout: Duration,

    #[serde(with = "humantime_serde", default = "probe_timeout_default")]
    pub probe_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout: request_timeout_default(),
            probe_timeout: probe_timeout_default(),
        }
    }
}

const fn request_timeout_default() -> Duration {
    Duration::from_secs(10)
}

const fn probe_timeout_default() -> Duration {
    Duration::from_secs(5)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlueScoreResponse {
    blue_score: BlueScore,
}

/// A [LedgerIndexer] implementation against the public REST indexer.
#[derive(Debug, Clone)]
pub struct HttpIndexer {
    client: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
}

impl HttpIndexer {
    pub fn new(config: Config, network_id: NetworkId) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let base_url = config
            .base_url
            .unwrap_or_else(|| network_id.default_indexer_url().to_owned());

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            probe_timeout: config.probe_timeout,
        })
    }
}

impl LedgerIndexer for HttpIndexer {
    type Error = reqwest::Error;

    async fn get_utxos_by_address(
        &self,
        address: &Address,
    ) -> Result<Vec<UtxoEntry>, Self::Error> {
        let url = format!("{}/addresses/{address}/utxos", self.base_url);

        let utxos = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<UtxoDto>>()
            .await?;

        Ok(utxos.into_iter().map(UtxoEntry::from).collect())
    }

    async fn get_virtual_chain_blue_score(&self) -> Result<BlueScore, Self::Error> {
        let url = format!("{}/info/virtual-chain-blue-score", self.base_url);

        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<BlueScoreResponse>()
            .await?;

        Ok(response.blue_score)
    }

    async fn probe(&self) -> Result<(), Self::Error> {
        let url = format!("{}/info/health", self.base_url);

        self.client
            .get(url)
            .timeout(self.probe_timeout)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, routing::get};
    use kasgate_common::domain::Sompi;
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    async fn serve_fake_indexer() -> String {
        let app = Router::new()
            .route(
                "/addresses/{address}/utxos",
                get(|| async {
                    Json(json!([{
                        "address": "kaspatest:qqpolled",
                        "outpoint": { "transactionId": "abcd", "index": 0 },
                        "utxoEntry": { "amount": "250000", "blockDaaScore": "12" }
                    }]))
                }),
            )
            .route(
                "/info/virtual-chain-blue-score",
                get(|| async { Json(json!({ "blueScore": 98765 })) }),
            )
            .route("/info/health", get(|| async { Json(Value::Null) }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        base_url
    }

    #[tokio::test]
    async fn test_indexer_round_trip() {
        let base_url = serve_fake_indexer().await;
        let indexer = HttpIndexer::new(
            Config {
                base_url: Some(base_url),
                ..Default::default()
            },
            NetworkId::Testnet10,
        )
        .unwrap();

        let utxos = indexer
            .get_utxos_by_address(&"kaspatest:qqpolled".to_owned())
            .await
            .unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].amount, Sompi(250_000));
        assert_eq!(utxos[0].block_daa_score, 12);

        assert_eq!(indexer.get_virtual_chain_blue_score().await.unwrap(), 98_765);
        assert!(indexer.probe().await.is_ok());
    }

    #[test]
    fn test_default_base_url_follows_network() {
        let indexer = HttpIndexer::new(Config::default(), NetworkId::Mainnet).unwrap();
        assert_eq!(indexer.base_url, "https://api.kaspa.org");
    }
}
