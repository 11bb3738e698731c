// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::domain::{Session, storage::Tx};
use chrono::{DateTime, Utc};
use kasgate_common::domain::{BlueScore, SessionStatus, Sompi, TransactionId};
use uuid::Uuid;

#[trait_variant::make(Send)]
pub trait SessionStorage
where
    Self: Clone + Send + Sync + 'static,
{
    async fn begin(&self) -> Result<Tx, sqlx::Error>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), sqlx::Error>;

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, sqlx::Error>;

    async fn get_session_in_tx(
        &self,
        id: Uuid,
        tx: &mut Tx,
    ) -> Result<Option<Session>, sqlx::Error>;

    async fn insert_session(&self, session: &Session, tx: &mut Tx) -> Result<(), sqlx::Error>;

    /// Move a pending session to confirming, recording the transaction ID, the wall clock and
    /// the blue score observed at detection.
    async fn mark_session_received(
        &self,
        id: Uuid,
        tx_id: &TransactionId,
        paid_at: DateTime<Utc>,
        initial_blue_score: BlueScore,
        tx: &mut Tx,
    ) -> Result<(), sqlx::Error>;

    /// Single-statement status update; `confirmed_at` is set when the new status is confirmed.
    async fn update_session_status(
        &self,
        id: Uuid,
        status: SessionStatus,
        at: DateTime<Utc>,
        tx: &mut Tx,
    ) -> Result<(), sqlx::Error>;

    /// Raise the confirmation count of a confirming session, clamped so it never decreases.
    /// Returns the stored count, or `None` if the session is not confirming.
    async fn raise_session_confirmations(
        &self,
        id: Uuid,
        confirmations: u64,
    ) -> Result<Option<u64>, sqlx::Error>;

    /// Expire every pending session whose `expires_at` has passed and return the newly expired
    /// rows. Idempotent: a second run right after the first finds nothing.
    async fn expire_overdue_sessions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, sqlx::Error>;

    /// All sessions in the given status; used to rehydrate monitors and trackers on restart.
    async fn get_sessions_by_status(
        &self,
        status: SessionStatus,
    ) -> Result<Vec<Session>, sqlx::Error>;

    async fn get_merchant_sessions(
        &self,
        merchant_id: Uuid,
        status: Option<SessionStatus>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Session>, u64), sqlx::Error>;

    // Analytics queries. Read-only and deliberately unaware of any in-memory state.

    async fn get_status_counts(
        &self,
        merchant_id: Uuid,
    ) -> Result<Vec<(SessionStatus, u64)>, sqlx::Error>;

    /// `(day, amount)` of confirmed sessions in the window, keyed by the confirmation day
    /// (`YYYY-MM-DD`). Amounts are summed by the caller to keep 128-bit precision.
    async fn get_confirmed_amounts(
        &self,
        merchant_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<(String, Sompi)>, sqlx::Error>;

    /// `(day, count)` of sessions created in the window, keyed by the creation day.
    async fn get_daily_session_counts(
        &self,
        merchant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(String, u64)>, sqlx::Error>;

    async fn get_session_count_between(
        &self,
        merchant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error>;

    /// Largest confirmed sessions in the window, by amount.
    async fn get_top_sessions(
        &self,
        merchant_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<Session>, sqlx::Error>;
}
