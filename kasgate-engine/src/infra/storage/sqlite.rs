// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

mod merchant;
mod session;
mod webhook;

use crate::domain::{Merchant, Session, WebhookDelivery, WebhookEvent, parse_ts, storage::Storage};
use chrono::{DateTime, Utc};
use kasgate_common::{domain::Sompi, infra::pool::sqlite::SqlitePool};
use sqlx::{Row, sqlite::SqliteRow};
use std::{collections::BTreeMap, str::FromStr};
use uuid::Uuid;

/// Sqlite based implementation of [Storage].
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new [SqliteStorage].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Storage for SqliteStorage {}

fn decode_error(error: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(error))
}

fn get_uuid(row: &SqliteRow, column: &str) -> Result<Uuid, sqlx::Error> {
    let value = row.try_get::<String, _>(column)?;
    Uuid::parse_str(&value).map_err(decode_error)
}

fn get_ts(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let value = row.try_get::<String, _>(column)?;
    parse_ts(&value).map_err(decode_error)
}

fn get_ts_opt(row: &SqliteRow, column: &str) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    row.try_get::<Option<String>, _>(column)?
        .map(|value| parse_ts(&value).map_err(decode_error))
        .transpose()
}

fn get_sompi(row: &SqliteRow, column: &str) -> Result<Sompi, sqlx::Error> {
    let value = row.try_get::<String, _>(column)?;
    value.parse().map_err(decode_error)
}

fn merchant_from_row(row: &SqliteRow) -> Result<Merchant, sqlx::Error> {
    Ok(Merchant {
        id: get_uuid(row, "id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        xpub: row.try_get("xpub")?,
        next_address_index: row.try_get::<i64, _>("next_address_index")? as u32,
        api_key: row.try_get("api_key")?,
        api_key_digest: row.try_get("api_key_digest")?,
        webhook_url: row.try_get("webhook_url")?,
        webhook_secret: row.try_get("webhook_secret")?,
        created_at: get_ts(row, "created_at")?,
        updated_at: get_ts(row, "updated_at")?,
    })
}

fn session_from_row(row: &SqliteRow) -> Result<Session, sqlx::Error> {
    let status = row.try_get::<String, _>("status")?;
    let metadata = row
        .try_get::<Option<String>, _>("metadata")?
        .map(|value| serde_json::from_str::<BTreeMap<String, String>>(&value))
        .transpose()
        .map_err(decode_error)?;

    Ok(Session {
        id: get_uuid(row, "id")?,
        merchant_id: get_uuid(row, "merchant_id")?,
        address: row.try_get("address")?,
        address_index: row.try_get::<i64, _>("address_index")? as u32,
        amount: get_sompi(row, "amount")?,
        status: status.parse().map_err(decode_error)?,
        subscription_token: row.try_get("subscription_token")?,
        tx_id: row.try_get("tx_id")?,
        confirmations: row.try_get::<i64, _>("confirmations")? as u64,
        initial_blue_score: row
            .try_get::<Option<i64>, _>("initial_blue_score")?
            .map(|score| score as u64),
        order_id: row.try_get("order_id")?,
        metadata,
        redirect_url: row.try_get("redirect_url")?,
        created_at: get_ts(row, "created_at")?,
        expires_at: get_ts(row, "expires_at")?,
        paid_at: get_ts_opt(row, "paid_at")?,
        confirmed_at: get_ts_opt(row, "confirmed_at")?,
    })
}

fn webhook_delivery_from_row(row: &SqliteRow) -> Result<WebhookDelivery, sqlx::Error> {
    let event = row.try_get::<String, _>("event")?;

    Ok(WebhookDelivery {
        id: get_uuid(row, "id")?,
        session_id: get_uuid(row, "session_id")?,
        merchant_id: get_uuid(row, "merchant_id")?,
        event: WebhookEvent::from_str(&event).map_err(decode_error)?,
        payload: row.try_get("payload")?,
        delivery_id: get_uuid(row, "delivery_id")?,
        attempts: row.try_get::<i64, _>("attempts")? as u32,
        last_status_code: row
            .try_get::<Option<i64>, _>("last_status_code")?
            .map(|code| code as u16),
        last_response_body: row.try_get("last_response_body")?,
        next_retry_at: get_ts_opt(row, "next_retry_at")?,
        created_at: get_ts(row, "created_at")?,
        delivered_at: get_ts_opt(row, "delivered_at")?,
    })
}
