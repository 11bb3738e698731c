// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod deriver;
pub mod indexer;
pub mod node;
pub mod storage;

use chrono::{DateTime, SecondsFormat, Utc};
use derive_more::Debug;
use kasgate_common::domain::{Address, BlueScore, SessionStatus, Sompi, TransactionId};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    str::FromStr,
};
use uuid::Uuid;

/// A merchant as stored. `api_key` holds the issued plaintext until it is redacted; lookups go
/// through `api_key_digest` exclusively.
#[derive(Debug, Clone)]
pub struct Merchant {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub xpub: String,
    pub next_address_index: u32,
    #[debug(skip)]
    pub api_key: Option<String>,
    pub api_key_digest: Option<String>,
    pub webhook_url: Option<String>,
    #[debug(skip)]
    pub webhook_secret: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A one-shot payment intent: fresh address, expected amount, TTL, observed state.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub address: Address,
    pub address_index: u32,
    pub amount: Sompi,
    pub status: SessionStatus,
    #[debug(skip)]
    pub subscription_token: String,
    pub tx_id: Option<TransactionId>,
    pub confirmations: u64,
    /// Blue score at payment detection, written inside the `mark_payment_received`
    /// transaction. Confirmation counts survive restarts because of this column.
    pub initial_blue_score: Option<BlueScore>,
    pub order_id: Option<String>,
    pub metadata: Option<BTreeMap<String, String>>,
    pub redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Webhook notification kind, `payment.`-prefixed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEvent {
    Pending,
    Confirming,
    Confirmed,
    Expired,
    Failed,
}

impl WebhookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::Pending => "payment.pending",
            WebhookEvent::Confirming => "payment.confirming",
            WebhookEvent::Confirmed => "payment.confirmed",
            WebhookEvent::Expired => "payment.expired",
            WebhookEvent::Failed => "payment.failed",
        }
    }
}

impl From<SessionStatus> for WebhookEvent {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Pending => WebhookEvent::Pending,
            SessionStatus::Confirming => WebhookEvent::Confirming,
            SessionStatus::Confirmed => WebhookEvent::Confirmed,
            SessionStatus::Expired => WebhookEvent::Expired,
            SessionStatus::Failed => WebhookEvent::Failed,
        }
    }
}

impl Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookEvent {
    type Err = UnknownWebhookEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment.pending" => Ok(WebhookEvent::Pending),
            "payment.confirming" => Ok(WebhookEvent::Confirming),
            "payment.confirmed" => Ok(WebhookEvent::Confirmed),
            "payment.expired" => Ok(WebhookEvent::Expired),
            "payment.failed" => Ok(WebhookEvent::Failed),
            other => Err(UnknownWebhookEvent(other.to_owned())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown webhook event {0}")]
pub struct UnknownWebhookEvent(String);

/// One row of the webhook delivery log. `payload` is the frozen JSON exactly as signed on the
/// first attempt; retries re-sign these same bytes under the merchant's current secret.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    pub id: Uuid,
    pub session_id: Uuid,
    pub merchant_id: Uuid,
    pub event: WebhookEvent,
    pub payload: String,
    pub delivery_id: Uuid,
    pub attempts: u32,
    pub last_status_code: Option<u16>,
    pub last_response_body: Option<String>,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Timestamps are stored as RFC-3339 UTC TEXT with fixed millisecond precision, so that
/// lexicographic comparison inside SQL matches chronological order.
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_ts(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ts_round_trip() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 45).unwrap();
        assert_eq!(parse_ts(&format_ts(ts)).unwrap(), ts);
    }

    #[test]
    fn test_ts_text_ordering_matches_chronology() {
        let earlier = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 45).unwrap();
        let later = earlier + chrono::Duration::seconds(1);
        assert!(format_ts(earlier) < format_ts(later));
    }

    #[test]
    fn test_webhook_event_round_trip() {
        for event in [
            WebhookEvent::Pending,
            WebhookEvent::Confirming,
            WebhookEvent::Confirmed,
            WebhookEvent::Expired,
            WebhookEvent::Failed,
        ] {
            assert_eq!(event.as_str().parse::<WebhookEvent>().unwrap(), event);
        }
    }

    #[test]
    fn test_merchant_debug_redacts_key_material() {
        let merchant = Merchant {
            id: Uuid::new_v4(),
            name: "shop".to_owned(),
            email: None,
            xpub: "kpub".to_owned(),
            next_address_index: 0,
            api_key: Some("kg_live_secret".to_owned()),
            api_key_digest: None,
            webhook_url: None,
            webhook_secret: "whsec_secret".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let debug = format!("{merchant:?}");
        assert!(!debug.contains("kg_live_secret"));
        assert!(!debug.contains("whsec_secret"));
    }
}
