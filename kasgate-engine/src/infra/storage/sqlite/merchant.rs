// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    domain::{
        Merchant, format_ts,
        storage::{MerchantPatch, MerchantStorage, Tx},
    },
    infra::storage::sqlite::{SqliteStorage, merchant_from_row},
};
use chrono::Utc;
use indoc::indoc;
use uuid::Uuid;

const MERCHANT_COLUMNS: &str = indoc! {"
    id, name, email, xpub, next_address_index, api_key, api_key_digest,
    webhook_url, webhook_secret, created_at, updated_at
"};

impl MerchantStorage for SqliteStorage {
    async fn save_merchant(&self, merchant: &Merchant) -> Result<(), sqlx::Error> {
        let query = indoc! {"
            INSERT INTO merchants (
                id, name, email, xpub, next_address_index, api_key, api_key_digest,
                webhook_url, webhook_secret, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "};

        sqlx::query(query)
            .bind(merchant.id.to_string())
            .bind(&merchant.name)
            .bind(&merchant.email)
            .bind(&merchant.xpub)
            .bind(merchant.next_address_index as i64)
            .bind(&merchant.api_key)
            .bind(&merchant.api_key_digest)
            .bind(&merchant.webhook_url)
            .bind(&merchant.webhook_secret)
            .bind(format_ts(merchant.created_at))
            .bind(format_ts(merchant.updated_at))
            .execute(&**self.pool())
            .await?;

        Ok(())
    }

    async fn get_merchant_by_id(&self, id: Uuid) -> Result<Option<Merchant>, sqlx::Error> {
        let query = format!("SELECT {MERCHANT_COLUMNS} FROM merchants WHERE id = $1");

        sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&**self.pool())
            .await?
            .map(|row| merchant_from_row(&row))
            .transpose()
    }

    async fn get_merchant_by_api_key_digest(
        &self,
        digest: &str,
    ) -> Result<Option<Merchant>, sqlx::Error> {
        let query = format!("SELECT {MERCHANT_COLUMNS} FROM merchants WHERE api_key_digest = $1");

        sqlx::query(&query)
            .bind(digest)
            .fetch_optional(&**self.pool())
            .await?
            .map(|row| merchant_from_row(&row))
            .transpose()
    }

    async fn get_merchant_by_plaintext_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<Merchant>, sqlx::Error> {
        let query = format!(
            "SELECT {MERCHANT_COLUMNS} FROM merchants WHERE api_key = $1 AND api_key_digest IS NULL"
        );

        sqlx::query(&query)
            .bind(api_key)
            .fetch_optional(&**self.pool())
            .await?
            .map(|row| merchant_from_row(&row))
            .transpose()
    }

    async fn set_api_key_digest(&self, id: Uuid, digest: &str) -> Result<(), sqlx::Error> {
        let query = indoc! {"
            UPDATE merchants
            SET api_key_digest = $2, updated_at = $3
            WHERE id = $1
        "};

        sqlx::query(query)
            .bind(id.to_string())
            .bind(digest)
            .bind(format_ts(Utc::now()))
            .execute(&**self.pool())
            .await?;

        Ok(())
    }

    async fn get_merchant_in_tx(
        &self,
        id: Uuid,
        tx: &mut Tx,
    ) -> Result<Option<Merchant>, sqlx::Error> {
        let query = format!("SELECT {MERCHANT_COLUMNS} FROM merchants WHERE id = $1");

        sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut **tx)
            .await?
            .map(|row| merchant_from_row(&row))
            .transpose()
    }

    async fn set_next_address_index(
        &self,
        id: Uuid,
        next_address_index: u32,
        tx: &mut Tx,
    ) -> Result<(), sqlx::Error> {
        let query = indoc! {"
            UPDATE merchants
            SET next_address_index = $2, updated_at = $3
            WHERE id = $1
        "};

        sqlx::query(query)
            .bind(id.to_string())
            .bind(next_address_index as i64)
            .bind(format_ts(Utc::now()))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn update_merchant(
        &self,
        id: Uuid,
        patch: &MerchantPatch,
    ) -> Result<Option<Merchant>, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let Some(merchant) = self.get_merchant_in_tx(id, &mut tx).await? else {
            return Ok(None);
        };

        let merchant = Merchant {
            name: patch.name.clone().unwrap_or(merchant.name),
            email: patch.email.clone().unwrap_or(merchant.email),
            webhook_url: patch.webhook_url.clone().unwrap_or(merchant.webhook_url),
            updated_at: Utc::now(),
            ..merchant
        };

        let query = indoc! {"
            UPDATE merchants
            SET name = $2, email = $3, webhook_url = $4, updated_at = $5
            WHERE id = $1
        "};
        sqlx::query(query)
            .bind(id.to_string())
            .bind(&merchant.name)
            .bind(&merchant.email)
            .bind(&merchant.webhook_url)
            .bind(format_ts(merchant.updated_at))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(merchant))
    }

    async fn rotate_api_key(
        &self,
        id: Uuid,
        api_key: &str,
        api_key_digest: &str,
    ) -> Result<bool, sqlx::Error> {
        let query = indoc! {"
            UPDATE merchants
            SET api_key = $2, api_key_digest = $3, updated_at = $4
            WHERE id = $1
        "};

        let result = sqlx::query(query)
            .bind(id.to_string())
            .bind(api_key)
            .bind(api_key_digest)
            .bind(format_ts(Utc::now()))
            .execute(&**self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn rotate_webhook_secret(
        &self,
        id: Uuid,
        webhook_secret: &str,
    ) -> Result<bool, sqlx::Error> {
        let query = indoc! {"
            UPDATE merchants
            SET webhook_secret = $2, updated_at = $3
            WHERE id = $1
        "};

        let result = sqlx::query(query)
            .bind(id.to_string())
            .bind(webhook_secret)
            .bind(format_ts(Utc::now()))
            .execute(&**self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
