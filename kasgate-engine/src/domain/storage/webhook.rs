// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::domain::{WebhookDelivery, WebhookEvent};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[trait_variant::make(Send)]
pub trait WebhookStorage
where
    Self: Clone + Send + Sync + 'static,
{
    async fn insert_webhook_delivery(
        &self,
        delivery: &WebhookDelivery,
    ) -> Result<(), sqlx::Error>;

    async fn get_webhook_delivery(
        &self,
        id: Uuid,
    ) -> Result<Option<WebhookDelivery>, sqlx::Error>;

    /// Record the outcome of one delivery attempt. Rows with a non-null `delivered_at` are
    /// never written again; the attempt counter only moves forward.
    async fn record_webhook_attempt(
        &self,
        id: Uuid,
        attempts: u32,
        last_status_code: Option<u16>,
        last_response_body: Option<&str>,
        next_retry_at: Option<DateTime<Utc>>,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Result<(), sqlx::Error>;

    /// Undelivered rows whose `next_retry_at` has passed and whose attempt budget is not
    /// exhausted.
    async fn get_due_webhook_deliveries(
        &self,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<Vec<WebhookDelivery>, sqlx::Error>;

    async fn get_merchant_webhook_deliveries(
        &self,
        merchant_id: Uuid,
        event: Option<WebhookEvent>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<WebhookDelivery>, u64), sqlx::Error>;

    /// Re-queue an undelivered row for the owning merchant: `next_retry_at := now`, one
    /// attempt refunded. Returns false when the row does not exist, is owned by somebody
    /// else, or was already delivered.
    async fn requeue_webhook_delivery(
        &self,
        id: Uuid,
        merchant_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error>;
}
