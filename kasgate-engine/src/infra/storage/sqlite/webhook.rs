// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    domain::{WebhookDelivery, WebhookEvent, format_ts, storage::WebhookStorage},
    infra::storage::sqlite::{SqliteStorage, webhook_delivery_from_row},
};
use chrono::{DateTime, Utc};
use indoc::{formatdoc, indoc};
use uuid::Uuid;

const WEBHOOK_COLUMNS: &str = indoc! {"
    id, session_id, merchant_id, event, payload, delivery_id, attempts,
    last_status_code, last_response_body, next_retry_at, created_at, delivered_at
"};

impl WebhookStorage for SqliteStorage {
    async fn insert_webhook_delivery(
        &self,
        delivery: &WebhookDelivery,
    ) -> Result<(), sqlx::Error> {
        let query = indoc! {"
            INSERT INTO webhook_logs (
                id, session_id, merchant_id, event, payload, delivery_id, attempts,
                last_status_code, last_response_body, next_retry_at, created_at, delivered_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "};

        sqlx::query(query)
            .bind(delivery.id.to_string())
            .bind(delivery.session_id.to_string())
            .bind(delivery.merchant_id.to_string())
            .bind(delivery.event.as_str())
            .bind(&delivery.payload)
            .bind(delivery.delivery_id.to_string())
            .bind(delivery.attempts as i64)
            .bind(delivery.last_status_code.map(|code| code as i64))
            .bind(&delivery.last_response_body)
            .bind(delivery.next_retry_at.map(format_ts))
            .bind(format_ts(delivery.created_at))
            .bind(delivery.delivered_at.map(format_ts))
            .execute(&**self.pool())
            .await?;

        Ok(())
    }

    async fn get_webhook_delivery(
        &self,
        id: Uuid,
    ) -> Result<Option<WebhookDelivery>, sqlx::Error> {
        let query = format!("SELECT {WEBHOOK_COLUMNS} FROM webhook_logs WHERE id = $1");

        sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&**self.pool())
            .await?
            .map(|row| webhook_delivery_from_row(&row))
            .transpose()
    }

    async fn record_webhook_attempt(
        &self,
        id: Uuid,
        attempts: u32,
        last_status_code: Option<u16>,
        last_response_body: Option<&str>,
        next_retry_at: Option<DateTime<Utc>>,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Result<(), sqlx::Error> {
        // Delivered rows are final; the filter makes double-writes a no-op even under races.
        let query = indoc! {"
            UPDATE webhook_logs
            SET attempts = $2,
                last_status_code = $3,
                last_response_body = $4,
                next_retry_at = $5,
                delivered_at = $6
            WHERE id = $1 AND delivered_at IS NULL AND attempts < $2
        "};

        sqlx::query(query)
            .bind(id.to_string())
            .bind(attempts as i64)
            .bind(last_status_code.map(|code| code as i64))
            .bind(last_response_body)
            .bind(next_retry_at.map(format_ts))
            .bind(delivered_at.map(format_ts))
            .execute(&**self.pool())
            .await?;

        Ok(())
    }

    async fn get_due_webhook_deliveries(
        &self,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<Vec<WebhookDelivery>, sqlx::Error> {
        let query = formatdoc! {"
            SELECT {WEBHOOK_COLUMNS}
            FROM webhook_logs
            WHERE delivered_at IS NULL
              AND next_retry_at IS NOT NULL
              AND next_retry_at <= $1
              AND attempts < $2
            ORDER BY next_retry_at
        "};

        sqlx::query(&query)
            .bind(format_ts(now))
            .bind(max_attempts as i64)
            .fetch_all(&**self.pool())
            .await?
            .iter()
            .map(webhook_delivery_from_row)
            .collect()
    }

    async fn get_merchant_webhook_deliveries(
        &self,
        merchant_id: Uuid,
        event: Option<WebhookEvent>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<WebhookDelivery>, u64), sqlx::Error> {
        let event_filter = event.map(|event| event.as_str().to_owned());

        let query = indoc! {"
            SELECT count(*)
            FROM webhook_logs
            WHERE merchant_id = $1 AND ($2 IS NULL OR event = $2)
        "};
        let (total,) = sqlx::query_as::<_, (i64,)>(query)
            .bind(merchant_id.to_string())
            .bind(&event_filter)
            .fetch_one(&**self.pool())
            .await?;

        let query = formatdoc! {"
            SELECT {WEBHOOK_COLUMNS}
            FROM webhook_logs
            WHERE merchant_id = $1 AND ($2 IS NULL OR event = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
        "};
        let deliveries = sqlx::query(&query)
            .bind(merchant_id.to_string())
            .bind(&event_filter)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&**self.pool())
            .await?
            .iter()
            .map(webhook_delivery_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((deliveries, total as u64))
    }

    async fn requeue_webhook_delivery(
        &self,
        id: Uuid,
        merchant_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let query = indoc! {"
            UPDATE webhook_logs
            SET next_retry_at = $3,
                attempts = CASE WHEN attempts > 0 THEN attempts - 1 ELSE 0 END
            WHERE id = $1 AND merchant_id = $2 AND delivered_at IS NULL
        "};

        let result = sqlx::query(query)
            .bind(id.to_string())
            .bind(merchant_id.to_string())
            .bind(format_ts(now))
            .execute(&**self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
