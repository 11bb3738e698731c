// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::infra::pool::sqlite::SqlitePool;
use indoc::indoc;

/// Idempotent schema initialization. Every statement is `IF NOT EXISTS`, so running this on an
/// already initialized database is a no-op.
///
/// Amounts are stored as decimal TEXT to preserve 128-bit precision, timestamps as RFC-3339
/// UTC TEXT, IDs as hyphenated UUID TEXT.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = [
        indoc! {"
            CREATE TABLE IF NOT EXISTS merchants (
                id                 TEXT PRIMARY KEY,
                name               TEXT NOT NULL,
                email              TEXT UNIQUE,
                xpub               TEXT NOT NULL,
                next_address_index INTEGER NOT NULL DEFAULT 0,
                api_key            TEXT,
                api_key_digest     TEXT,
                webhook_url        TEXT,
                webhook_secret     TEXT NOT NULL,
                created_at         TEXT NOT NULL,
                updated_at         TEXT NOT NULL
            )
        "},
        indoc! {"
            CREATE INDEX IF NOT EXISTS merchants_api_key_digest
            ON merchants (api_key_digest)
        "},
        indoc! {"
            CREATE TABLE IF NOT EXISTS sessions (
                id                 TEXT PRIMARY KEY,
                merchant_id        TEXT NOT NULL REFERENCES merchants (id),
                address            TEXT NOT NULL,
                address_index      INTEGER NOT NULL,
                amount             TEXT NOT NULL,
                status             TEXT NOT NULL,
                subscription_token TEXT NOT NULL,
                tx_id              TEXT,
                confirmations      INTEGER NOT NULL DEFAULT 0,
                initial_blue_score INTEGER,
                order_id           TEXT,
                metadata           TEXT,
                redirect_url       TEXT,
                created_at         TEXT NOT NULL,
                expires_at         TEXT NOT NULL,
                paid_at            TEXT,
                confirmed_at       TEXT
            )
        "},
        indoc! {"
            CREATE UNIQUE INDEX IF NOT EXISTS sessions_address
            ON sessions (address)
        "},
        indoc! {"
            CREATE UNIQUE INDEX IF NOT EXISTS sessions_merchant_address_index
            ON sessions (merchant_id, address_index)
        "},
        indoc! {"
            CREATE INDEX IF NOT EXISTS sessions_merchant_status_created
            ON sessions (merchant_id, status, created_at)
        "},
        indoc! {"
            CREATE INDEX IF NOT EXISTS sessions_status
            ON sessions (status)
        "},
        indoc! {"
            CREATE TABLE IF NOT EXISTS webhook_logs (
                id                 TEXT PRIMARY KEY,
                session_id         TEXT NOT NULL REFERENCES sessions (id),
                merchant_id        TEXT NOT NULL REFERENCES merchants (id),
                event              TEXT NOT NULL,
                payload            TEXT NOT NULL,
                delivery_id        TEXT NOT NULL,
                attempts           INTEGER NOT NULL DEFAULT 0,
                last_status_code   INTEGER,
                last_response_body TEXT,
                next_retry_at      TEXT,
                created_at         TEXT NOT NULL,
                delivered_at       TEXT
            )
        "},
        indoc! {"
            CREATE INDEX IF NOT EXISTS webhook_logs_due
            ON webhook_logs (next_retry_at)
            WHERE delivered_at IS NULL
        "},
        indoc! {"
            CREATE INDEX IF NOT EXISTS webhook_logs_merchant_created
            ON webhook_logs (merchant_id, created_at)
        "},
    ];

    for statement in statements {
        sqlx::query(statement).execute(&**pool).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::pool::sqlite::{Config, SqlitePool};

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let pool = SqlitePool::new(Config::in_memory())
            .await
            .expect("pool can be created");

        run(&pool).await.expect("first run succeeds");
        run(&pool).await.expect("second run succeeds");

        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT count(*) FROM merchants")
            .fetch_one(&*pool)
            .await
            .expect("merchants table exists");
        assert_eq!(count, 0);
    }
}
