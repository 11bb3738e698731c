// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::ops::Deref;

/// Path of the database file, or `:memory:` for an ephemeral in-memory database.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_path: String,
}

impl Config {
    pub fn in_memory() -> Self {
        Self {
            database_path: ":memory:".to_owned(),
        }
    }
}

/// Single-writer SQLite pool. The store is the synchronization authority for all durable
/// state, hence exactly one connection: writers serialize on the pool instead of on SQLite
/// busy-retries.
#[derive(Debug, Clone)]
pub struct SqlitePool(sqlx::SqlitePool);

impl SqlitePool {
    pub async fn new(config: Config) -> Result<Self, sqlx::Error> {
        let options = if config.database_path == ":memory:" {
            SqliteConnectOptions::new().in_memory(true)
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        }
        .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self(pool))
    }
}

impl Deref for SqlitePool {
    type Target = sqlx::SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_pool() {
        let pool = SqlitePool::new(Config::in_memory())
            .await
            .expect("pool can be created");

        let (value,) = sqlx::query_as::<_, (i64,)>("SELECT 41 + 1")
            .fetch_one(&*pool)
            .await
            .expect("query succeeds");
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_file_pool() {
        let dir = tempfile::tempdir().expect("temp dir can be created");
        let database_path = dir.path().join("kasgate.db").display().to_string();

        let pool = SqlitePool::new(Config { database_path })
            .await
            .expect("pool can be created");

        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(&*pool)
            .await
            .expect("DDL succeeds");
    }
}
