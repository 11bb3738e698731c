// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    domain::{
        Session, format_ts,
        storage::{SessionStorage, Tx},
    },
    infra::storage::sqlite::{SqliteStorage, decode_error, session_from_row},
};
use chrono::{DateTime, Utc};
use indoc::{formatdoc, indoc};
use kasgate_common::domain::{SessionStatus, Sompi, TransactionId};
use uuid::Uuid;

const SESSION_COLUMNS: &str = indoc! {"
    id, merchant_id, address, address_index, amount, status, subscription_token,
    tx_id, confirmations, initial_blue_score, order_id, metadata, redirect_url,
    created_at, expires_at, paid_at, confirmed_at
"};

impl SessionStorage for SqliteStorage {
    async fn begin(&self) -> Result<Tx, sqlx::Error> {
        self.pool().begin().await
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&**self.pool())
            .await
            .map(|_| ())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1");

        sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&**self.pool())
            .await?
            .map(|row| session_from_row(&row))
            .transpose()
    }

    async fn get_session_in_tx(
        &self,
        id: Uuid,
        tx: &mut Tx,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1");

        sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut **tx)
            .await?
            .map(|row| session_from_row(&row))
            .transpose()
    }

    async fn insert_session(&self, session: &Session, tx: &mut Tx) -> Result<(), sqlx::Error> {
        let metadata = session
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(decode_error)?;

        let query = indoc! {"
            INSERT INTO sessions (
                id, merchant_id, address, address_index, amount, status, subscription_token,
                tx_id, confirmations, initial_blue_score, order_id, metadata, redirect_url,
                created_at, expires_at, paid_at, confirmed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        "};

        sqlx::query(query)
            .bind(session.id.to_string())
            .bind(session.merchant_id.to_string())
            .bind(&session.address)
            .bind(session.address_index as i64)
            .bind(session.amount.to_string())
            .bind(session.status.as_str())
            .bind(&session.subscription_token)
            .bind(&session.tx_id)
            .bind(session.confirmations as i64)
            .bind(session.initial_blue_score.map(|score| score as i64))
            .bind(&session.order_id)
            .bind(metadata)
            .bind(&session.redirect_url)
            .bind(format_ts(session.created_at))
            .bind(format_ts(session.expires_at))
            .bind(session.paid_at.map(format_ts))
            .bind(session.confirmed_at.map(format_ts))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn mark_session_received(
        &self,
        id: Uuid,
        tx_id: &TransactionId,
        paid_at: DateTime<Utc>,
        initial_blue_score: u64,
        tx: &mut Tx,
    ) -> Result<(), sqlx::Error> {
        let query = indoc! {"
            UPDATE sessions
            SET status = 'confirming', tx_id = $2, paid_at = $3, initial_blue_score = $4
            WHERE id = $1 AND status = 'pending'
        "};

        sqlx::query(query)
            .bind(id.to_string())
            .bind(tx_id)
            .bind(format_ts(paid_at))
            .bind(initial_blue_score as i64)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn update_session_status(
        &self,
        id: Uuid,
        status: SessionStatus,
        at: DateTime<Utc>,
        tx: &mut Tx,
    ) -> Result<(), sqlx::Error> {
        let query = indoc! {"
            UPDATE sessions
            SET status = $2,
                confirmed_at = CASE WHEN $2 = 'confirmed' THEN $3 ELSE confirmed_at END
            WHERE id = $1
        "};

        sqlx::query(query)
            .bind(id.to_string())
            .bind(status.as_str())
            .bind(format_ts(at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn raise_session_confirmations(
        &self,
        id: Uuid,
        confirmations: u64,
    ) -> Result<Option<u64>, sqlx::Error> {
        let query = indoc! {"
            UPDATE sessions
            SET confirmations = max(confirmations, $2)
            WHERE id = $1 AND status = 'confirming'
            RETURNING confirmations
        "};

        let stored = sqlx::query_as::<_, (i64,)>(query)
            .bind(id.to_string())
            .bind(confirmations as i64)
            .fetch_optional(&**self.pool())
            .await?;

        Ok(stored.map(|(confirmations,)| confirmations as u64))
    }

    async fn expire_overdue_sessions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let now = format_ts(now);

        let mut tx = self.pool().begin().await?;

        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE status = 'pending' AND expires_at <= $1"
        );
        let overdue = sqlx::query(&query)
            .bind(&now)
            .fetch_all(&mut *tx)
            .await?
            .iter()
            .map(session_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        if overdue.is_empty() {
            tx.commit().await?;
            return Ok(Vec::new());
        }

        let query = indoc! {"
            UPDATE sessions
            SET status = 'expired'
            WHERE status = 'pending' AND expires_at <= $1
        "};
        sqlx::query(query).bind(&now).execute(&mut *tx).await?;

        tx.commit().await?;

        Ok(overdue
            .into_iter()
            .map(|session| Session {
                status: SessionStatus::Expired,
                ..session
            })
            .collect())
    }

    async fn get_sessions_by_status(
        &self,
        status: SessionStatus,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE status = $1 ORDER BY created_at"
        );

        sqlx::query(&query)
            .bind(status.as_str())
            .fetch_all(&**self.pool())
            .await?
            .iter()
            .map(session_from_row)
            .collect()
    }

    async fn get_merchant_sessions(
        &self,
        merchant_id: Uuid,
        status: Option<SessionStatus>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Session>, u64), sqlx::Error> {
        let status_filter = status.map(|status| status.as_str().to_owned());

        let query = indoc! {"
            SELECT count(*)
            FROM sessions
            WHERE merchant_id = $1 AND ($2 IS NULL OR status = $2)
        "};
        let (total,) = sqlx::query_as::<_, (i64,)>(query)
            .bind(merchant_id.to_string())
            .bind(&status_filter)
            .fetch_one(&**self.pool())
            .await?;

        let query = formatdoc! {"
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE merchant_id = $1 AND ($2 IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
        "};
        let sessions = sqlx::query(&query)
            .bind(merchant_id.to_string())
            .bind(&status_filter)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&**self.pool())
            .await?
            .iter()
            .map(session_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((sessions, total as u64))
    }

    async fn get_status_counts(
        &self,
        merchant_id: Uuid,
    ) -> Result<Vec<(SessionStatus, u64)>, sqlx::Error> {
        let query = indoc! {"
            SELECT status, count(*)
            FROM sessions
            WHERE merchant_id = $1
            GROUP BY status
        "};

        sqlx::query_as::<_, (String, i64)>(query)
            .bind(merchant_id.to_string())
            .fetch_all(&**self.pool())
            .await?
            .into_iter()
            .map(|(status, count)| {
                let status = status.parse().map_err(decode_error)?;
                Ok((status, count as u64))
            })
            .collect()
    }

    async fn get_confirmed_amounts(
        &self,
        merchant_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<(String, Sompi)>, sqlx::Error> {
        let query = indoc! {"
            SELECT substr(confirmed_at, 1, 10), amount
            FROM sessions
            WHERE merchant_id = $1
              AND status = 'confirmed'
              AND ($2 IS NULL OR confirmed_at >= $2)
              AND ($3 IS NULL OR confirmed_at < $3)
            ORDER BY confirmed_at
        "};

        sqlx::query_as::<_, (String, String)>(query)
            .bind(merchant_id.to_string())
            .bind(from.map(format_ts))
            .bind(to.map(format_ts))
            .fetch_all(&**self.pool())
            .await?
            .into_iter()
            .map(|(day, amount)| {
                let amount = amount.parse::<Sompi>().map_err(decode_error)?;
                Ok((day, amount))
            })
            .collect()
    }

    async fn get_daily_session_counts(
        &self,
        merchant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(String, u64)>, sqlx::Error> {
        let query = indoc! {"
            SELECT substr(created_at, 1, 10) AS day, count(*)
            FROM sessions
            WHERE merchant_id = $1 AND created_at >= $2 AND created_at < $3
            GROUP BY day
            ORDER BY day
        "};

        let counts = sqlx::query_as::<_, (String, i64)>(query)
            .bind(merchant_id.to_string())
            .bind(format_ts(from))
            .bind(format_ts(to))
            .fetch_all(&**self.pool())
            .await?;

        Ok(counts
            .into_iter()
            .map(|(day, count)| (day, count as u64))
            .collect())
    }

    async fn get_session_count_between(
        &self,
        merchant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let query = indoc! {"
            SELECT count(*)
            FROM sessions
            WHERE merchant_id = $1 AND created_at >= $2 AND created_at < $3
        "};

        let (count,) = sqlx::query_as::<_, (i64,)>(query)
            .bind(merchant_id.to_string())
            .bind(format_ts(from))
            .bind(format_ts(to))
            .fetch_one(&**self.pool())
            .await?;

        Ok(count as u64)
    }

    async fn get_top_sessions(
        &self,
        merchant_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let query = formatdoc! {"
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE merchant_id = $1
              AND status = 'confirmed'
              AND ($2 IS NULL OR confirmed_at >= $2)
              AND ($3 IS NULL OR confirmed_at < $3)
            ORDER BY CAST(amount AS INTEGER) DESC
            LIMIT $4
        "};

        sqlx::query(&query)
            .bind(merchant_id.to_string())
            .bind(from.map(format_ts))
            .bind(to.map(format_ts))
            .bind(limit as i64)
            .fetch_all(&**self.pool())
            .await?
            .iter()
            .map(session_from_row)
            .collect()
    }
}
