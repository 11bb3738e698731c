// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::domain::{
    Merchant, Session, WebhookDelivery, WebhookEvent, format_ts, storage::Storage,
};
use chrono::{Duration as ChronoDuration, Utc};
use fastrace::trace;
use hmac::{Hmac, Mac};
use kasgate_common::domain::{PaymentEvent, Sompi, constant_time_eq};
use log::{debug, info, warn};
use metrics::counter;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{collections::BTreeMap, time::Duration};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const RESPONSE_SNIPPET_MAX_LEN: usize = 512;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Timeout of a single delivery attempt.
    #[serde(with = "humantime_serde", default = "delivery_timeout_default")]
    pub delivery_timeout: Duration,

    /// Total attempt budget per delivery, the initial send included.
    #[serde(default = "max_attempts_default")]
    pub max_attempts: u32,

    /// Cadence of the retry worker.
    #[serde(with = "humantime_serde", default = "retry_interval_default")]
    pub retry_interval: Duration,

    /// Base of the exponential backoff between attempts.
    #[serde(with = "humantime_serde", default = "backoff_base_default")]
    pub backoff_base: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delivery_timeout: delivery_timeout_default(),
            max_attempts: max_attempts_default(),
            retry_interval: retry_interval_default(),
            backoff_base: backoff_base_default(),
        }
    }
}

const fn delivery_timeout_default() -> Duration {
    Duration::from_secs(10)
}

const fn max_attempts_default() -> u32 {
    5
}

const fn retry_interval_default() -> Duration {
    Duration::from_secs(30)
}

const fn backoff_base_default() -> Duration {
    Duration::from_secs(1)
}

/// Hex HMAC-SHA256 of the raw payload bytes under the merchant's webhook secret.
pub fn sign_payload(payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(payload);
    const_hex::encode(mac.finalize().into_bytes())
}

/// Constant-time verification of a signature produced by [`sign_payload`]. Exposed so tests
/// and merchant-side integrations can mirror the gateway's check.
pub fn verify_webhook_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    let expected = sign_payload(payload, secret);
    constant_time_eq(signature.to_ascii_lowercase().as_bytes(), expected.as_bytes())
}

/// The signed JSON body. `timestamp` and `delivery_id` live inside the signed bytes, so a
/// replayed payload is detectable by the merchant.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload<'a> {
    event: &'a str,
    session_id: Uuid,
    merchant_id: Uuid,
    amount: Sompi,
    address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirmations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a BTreeMap<String, String>>,
    timestamp: String,
    delivery_id: Uuid,
}

/// Delivers signed payment notifications with at-least-once semantics: every attempt is
/// recorded, failed deliveries back off exponentially, and the frozen payload is re-signed
/// under the merchant's current secret on retries.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher<S> {
    storage: S,
    client: reqwest::Client,
    config: Config,
}

impl<S> WebhookDispatcher<S>
where
    S: Storage,
{
    pub fn new(storage: S, config: Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.delivery_timeout)
            .build()?;

        Ok(Self {
            storage,
            client,
            config,
        })
    }

    pub fn retry_interval(&self) -> Duration {
        self.config.retry_interval
    }

    /// Delay between attempt `n` and `n + 1`: `base · 2^(n−1)`.
    pub fn backoff(&self, attempts: u32) -> Duration {
        self.config.backoff_base * 2u32.pow(attempts.saturating_sub(1).min(16))
    }

    /// Turn a bus event into a webhook delivery for the owning merchant, if one is due and a
    /// webhook URL is configured.
    #[trace]
    pub async fn handle_event(&self, event: &PaymentEvent) -> Result<(), sqlx::Error> {
        let (session_id, webhook_event) = match event {
            PaymentEvent::SessionCreated { session_id, .. } => (*session_id, WebhookEvent::Pending),
            PaymentEvent::StatusChanged {
                session_id, status, ..
            } => (*session_id, WebhookEvent::from(*status)),
            // Detection and confirmation-count updates are not webhook-worthy; subscribers
            // get those over the realtime channel.
            _ => return Ok(()),
        };

        let Some(session) = self.storage.get_session(session_id).await? else {
            warn!(session_id:%; "cannot deliver webhook for unknown session");
            return Ok(());
        };
        let Some(merchant) = self.storage.get_merchant_by_id(session.merchant_id).await? else {
            warn!(merchant_id:% = session.merchant_id; "cannot deliver webhook for unknown merchant");
            return Ok(());
        };
        let Some(webhook_url) = merchant.webhook_url.clone() else {
            debug!(merchant_id:% = merchant.id; "no webhook URL configured, skipping notification");
            return Ok(());
        };

        let delivery = build_delivery(&session, &merchant, webhook_event);
        self.storage.insert_webhook_delivery(&delivery).await?;

        self.attempt(&delivery, &webhook_url, &merchant.webhook_secret)
            .await
    }

    /// One pass of the retry worker: re-deliver every due row, re-reading the merchant's
    /// possibly-rotated webhook URL and secret.
    #[trace]
    pub async fn retry_due(&self) -> Result<(), sqlx::Error> {
        let due = self
            .storage
            .get_due_webhook_deliveries(Utc::now(), self.config.max_attempts)
            .await?;

        for delivery in due {
            let merchant = self.storage.get_merchant_by_id(delivery.merchant_id).await?;

            match merchant.and_then(|m| m.webhook_url.clone().map(|url| (url, m.webhook_secret))) {
                Some((webhook_url, webhook_secret)) => {
                    self.attempt(&delivery, &webhook_url, &webhook_secret).await?;
                }

                None => {
                    // The merchant dropped its webhook URL; the chain ends here.
                    self.storage
                        .record_webhook_attempt(
                            delivery.id,
                            delivery.attempts + 1,
                            None,
                            Some("webhook URL no longer configured"),
                            None,
                            None,
                        )
                        .await?;
                }
            }
        }

        Ok(())
    }

    async fn attempt(
        &self,
        delivery: &WebhookDelivery,
        webhook_url: &str,
        webhook_secret: &str,
    ) -> Result<(), sqlx::Error> {
        let attempts = delivery.attempts + 1;
        let signature = sign_payload(delivery.payload.as_bytes(), webhook_secret);
        let timestamp = payload_timestamp(&delivery.payload);

        let response = self
            .client
            .post(webhook_url)
            .header("Content-Type", "application/json")
            .header("X-KasGate-Signature", signature)
            .header("X-KasGate-Event", delivery.event.as_str())
            .header("X-KasGate-Timestamp", timestamp)
            .header("X-KasGate-Delivery-Id", delivery.delivery_id.to_string())
            .body(delivery.payload.clone())
            .send()
            .await;

        let now = Utc::now();
        match response {
            Ok(response) if response.status().is_success() => {
                counter!("kasgate_webhooks_delivered").increment(1);
                info!(
                    delivery_id:% = delivery.delivery_id,
                    event:% = delivery.event,
                    attempts;
                    "webhook delivered"
                );

                self.storage
                    .record_webhook_attempt(
                        delivery.id,
                        attempts,
                        Some(response.status().as_u16()),
                        None,
                        None,
                        Some(now),
                    )
                    .await
            }

            Ok(response) => {
                let status_code = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();

                self.record_failure(delivery, attempts, Some(status_code), &body)
                    .await
            }

            Err(error) => {
                self.record_failure(delivery, attempts, None, &error.to_string())
                    .await
            }
        }
    }

    async fn record_failure(
        &self,
        delivery: &WebhookDelivery,
        attempts: u32,
        status_code: Option<u16>,
        body: &str,
    ) -> Result<(), sqlx::Error> {
        counter!("kasgate_webhooks_failed").increment(1);

        // Once the budget is exhausted the retry timestamp is cleared for good.
        let next_retry_at = (attempts < self.config.max_attempts)
            .then(|| Utc::now() + ChronoDuration::from_std(self.backoff(attempts)).unwrap_or_default());

        warn!(
            delivery_id:% = delivery.delivery_id,
            event:% = delivery.event,
            attempts,
            status_code:?,
            will_retry = next_retry_at.is_some();
            "webhook delivery failed"
        );

        self.storage
            .record_webhook_attempt(
                delivery.id,
                attempts,
                status_code,
                Some(truncate_snippet(body)),
                next_retry_at,
                None,
            )
            .await
    }
}

fn build_delivery(session: &Session, merchant: &Merchant, event: WebhookEvent) -> WebhookDelivery {
    let now = Utc::now();
    let delivery_id = Uuid::new_v4();

    let include_confirmations = matches!(
        event,
        WebhookEvent::Confirming | WebhookEvent::Confirmed
    );
    let payload = WebhookPayload {
        event: event.as_str(),
        session_id: session.id,
        merchant_id: merchant.id,
        amount: session.amount,
        address: &session.address,
        tx_id: session.tx_id.as_deref(),
        confirmations: include_confirmations.then_some(session.confirmations),
        order_id: session.order_id.as_deref(),
        metadata: session.metadata.as_ref(),
        timestamp: format_ts(now),
        delivery_id,
    };
    let payload = serde_json::to_string(&payload).expect("webhook payload serializes");

    WebhookDelivery {
        id: Uuid::new_v4(),
        session_id: session.id,
        merchant_id: merchant.id,
        event,
        payload,
        delivery_id,
        attempts: 0,
        last_status_code: None,
        last_response_body: None,
        next_retry_at: None,
        created_at: now,
        delivered_at: None,
    }
}

/// The `timestamp` field of a frozen payload; sent as `X-KasGate-Timestamp` on every attempt.
fn payload_timestamp(payload: &str) -> String {
    serde_json::from_str::<serde_json::Value>(payload)
        .ok()
        .and_then(|value| {
            value
                .get("timestamp")
                .and_then(|ts| ts.as_str())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_default()
}

fn truncate_snippet(body: &str) -> &str {
    match body.char_indices().nth(RESPONSE_SNIPPET_MAX_LEN) {
        Some((offset, _)) => &body[..offset],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::sqlite::SqliteStorage;
    use chrono::DateTime;
    use kasgate_common::{
        domain::SessionStatus,
        infra::pool::sqlite::{Config as PoolConfig, SqlitePool},
    };

    #[test]
    fn test_sign_and_verify() {
        let body = br#"{"event":"payment.confirming","amount":"100000000"}"#;

        let signature = sign_payload(body, "whsec_s1");
        assert!(verify_webhook_signature(body, &signature, "whsec_s1"));
        assert!(verify_webhook_signature(body, &signature.to_uppercase(), "whsec_s1"));

        // A different secret or different bytes must not verify.
        assert!(!verify_webhook_signature(body, &signature, "whsec_s2"));
        assert!(!verify_webhook_signature(b"tampered", &signature, "whsec_s1"));
        assert!(!verify_webhook_signature(body, "deadbeef", "whsec_s1"));
    }

    #[test]
    fn test_signature_is_hex_of_fixed_len() {
        let signature = sign_payload(b"x", "secret");
        assert_eq!(signature.len(), 64);
        assert!(signature.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_backoff_schedule() {
        let pool = SqlitePool::new(PoolConfig::in_memory()).await.unwrap();
        let dispatcher =
            WebhookDispatcher::new(SqliteStorage::new(pool), Config::default()).unwrap();

        assert_eq!(dispatcher.backoff(1), Duration::from_secs(1));
        assert_eq!(dispatcher.backoff(2), Duration::from_secs(2));
        assert_eq!(dispatcher.backoff(3), Duration::from_secs(4));
        assert_eq!(dispatcher.backoff(4), Duration::from_secs(8));
        assert_eq!(dispatcher.backoff(5), Duration::from_secs(16));
    }

    #[test]
    fn test_payload_shape() {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            merchant_id: Uuid::new_v4(),
            address: "kaspatest:qqtest".to_owned(),
            address_index: 0,
            amount: Sompi(100_000_000),
            status: SessionStatus::Confirming,
            subscription_token: "token".to_owned(),
            tx_id: Some("deadbeef".to_owned()),
            confirmations: 0,
            initial_blue_score: Some(1),
            order_id: Some("ORDER-001".to_owned()),
            metadata: None,
            redirect_url: None,
            created_at: now,
            expires_at: now,
            paid_at: Some(now),
            confirmed_at: None,
        };
        let merchant = Merchant {
            id: session.merchant_id,
            name: "shop".to_owned(),
            email: None,
            xpub: "kpub".to_owned(),
            next_address_index: 1,
            api_key: None,
            api_key_digest: None,
            webhook_url: Some("https://example.com".to_owned()),
            webhook_secret: "whsec_x".to_owned(),
            created_at: now,
            updated_at: now,
        };

        let delivery = build_delivery(&session, &merchant, WebhookEvent::Confirming);
        let value = serde_json::from_str::<serde_json::Value>(&delivery.payload).unwrap();

        assert_eq!(value["event"], "payment.confirming");
        assert_eq!(value["sessionId"], session.id.to_string());
        assert_eq!(value["merchantId"], merchant.id.to_string());
        assert_eq!(value["amount"], "100000000");
        assert_eq!(value["address"], "kaspatest:qqtest");
        assert_eq!(value["txId"], "deadbeef");
        assert_eq!(value["confirmations"], 0);
        assert_eq!(value["orderId"], "ORDER-001");
        assert_eq!(value["deliveryId"], delivery.delivery_id.to_string());
        assert!(value.get("metadata").is_none());

        // The timestamp inside the signed body is the one carried in the header.
        let timestamp = payload_timestamp(&delivery.payload);
        assert!(DateTime::parse_from_rfc3339(&timestamp).is_ok());

        // Pending and expired payloads carry no confirmation count.
        let pending = build_delivery(&session, &merchant, WebhookEvent::Expired);
        let value = serde_json::from_str::<serde_json::Value>(&pending.payload).unwrap();
        assert!(value.get("confirmations").is_none());
    }

    #[test]
    fn test_truncate_snippet() {
        let long = "x".repeat(2 * RESPONSE_SNIPPET_MAX_LEN);
        assert_eq!(truncate_snippet(&long).len(), RESPONSE_SNIPPET_MAX_LEN);
        assert_eq!(truncate_snippet("short"), "short");
    }
}
