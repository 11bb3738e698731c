// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::domain::{Merchant, storage::{MerchantPatch, Storage}};
use chrono::Utc;
use fastrace::trace;
use kasgate_common::domain::{api_key_digest, mint_api_key, mint_webhook_secret};
use log::info;
use metrics::counter;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewMerchant {
    pub name: String,
    pub email: Option<String>,
    pub xpub: String,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum MerchantError {
    #[error("merchant {0} not found")]
    NotFound(Uuid),

    #[error("a merchant with this email already exists")]
    DuplicateEmail,

    #[error("database error")]
    Storage(#[from] sqlx::Error),
}

/// Merchant registry and key custodian. API keys are looked up by digest only; the plaintext
/// column exists so the key can be shown once and is free to be redacted afterwards.
#[derive(Debug, Clone)]
pub struct MerchantService<S> {
    storage: S,
}

impl<S> MerchantService<S>
where
    S: Storage,
{
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Mint key material and store the merchant. The returned row carries the API-key
    /// plaintext; this is the only time it leaves the service.
    #[trace]
    pub async fn create_merchant(&self, new: NewMerchant) -> Result<Merchant, MerchantError> {
        let api_key = mint_api_key();
        let webhook_secret = mint_webhook_secret();
        let now = Utc::now();

        let merchant = Merchant {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            xpub: new.xpub,
            next_address_index: 0,
            api_key: Some(api_key.expose_secret().to_owned()),
            api_key_digest: Some(api_key_digest(api_key.expose_secret())),
            webhook_url: new.webhook_url,
            webhook_secret: webhook_secret.expose_secret().to_owned(),
            created_at: now,
            updated_at: now,
        };

        self.storage
            .save_merchant(&merchant)
            .await
            .map_err(into_merchant_error)?;

        counter!("kasgate_merchants_created").increment(1);
        info!(merchant_id:% = merchant.id, name:% = merchant.name; "merchant created");

        Ok(merchant)
    }

    /// Resolve an API key to its merchant by digest. Unknown keys and unknown merchants are
    /// indistinguishable. Legacy rows without a digest are matched by plaintext once and the
    /// digest is backfilled.
    pub async fn lookup_by_api_key(&self, api_key: &str) -> Result<Option<Merchant>, sqlx::Error> {
        let digest = api_key_digest(api_key);

        if let Some(merchant) = self
            .storage
            .get_merchant_by_api_key_digest(&digest)
            .await?
        {
            return Ok(Some(merchant));
        }

        match self
            .storage
            .get_merchant_by_plaintext_api_key(api_key)
            .await?
        {
            Some(merchant) => {
                self.storage.set_api_key_digest(merchant.id, &digest).await?;
                info!(merchant_id:% = merchant.id; "backfilled API key digest for legacy row");

                Ok(Some(Merchant {
                    api_key_digest: Some(digest),
                    ..merchant
                }))
            }
            None => Ok(None),
        }
    }

    pub async fn get_merchant(&self, id: Uuid) -> Result<Merchant, MerchantError> {
        self.storage
            .get_merchant_by_id(id)
            .await?
            .ok_or(MerchantError::NotFound(id))
    }

    pub async fn update_merchant(
        &self,
        id: Uuid,
        patch: MerchantPatch,
    ) -> Result<Merchant, MerchantError> {
        self.storage
            .update_merchant(id, &patch)
            .await
            .map_err(into_merchant_error)?
            .ok_or(MerchantError::NotFound(id))
    }

    /// Rotate the API key. The old key is invalid the moment the transaction commits.
    #[trace]
    pub async fn regenerate_api_key(&self, id: Uuid) -> Result<SecretString, MerchantError> {
        let api_key = mint_api_key();
        let digest = api_key_digest(api_key.expose_secret());

        let rotated = self
            .storage
            .rotate_api_key(id, api_key.expose_secret(), &digest)
            .await?;
        if !rotated {
            return Err(MerchantError::NotFound(id));
        }

        info!(merchant_id:% = id; "API key rotated");

        Ok(api_key)
    }

    /// Rotate the webhook secret. Pending retries re-sign their frozen payloads under the new
    /// secret.
    #[trace]
    pub async fn regenerate_webhook_secret(&self, id: Uuid) -> Result<SecretString, MerchantError> {
        let webhook_secret = mint_webhook_secret();

        let rotated = self
            .storage
            .rotate_webhook_secret(id, webhook_secret.expose_secret())
            .await?;
        if !rotated {
            return Err(MerchantError::NotFound(id));
        }

        info!(merchant_id:% = id; "webhook secret rotated");

        Ok(webhook_secret)
    }
}

fn into_merchant_error(error: sqlx::Error) -> MerchantError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            MerchantError::DuplicateEmail
        }
        _ => MerchantError::Storage(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::sqlite::SqliteStorage;
    use assert_matches::assert_matches;
    use kasgate_common::{
        domain::API_KEY_PREFIX,
        infra::{migrations, pool::sqlite::{Config, SqlitePool}},
    };

    async fn test_service() -> MerchantService<SqliteStorage> {
        let pool = SqlitePool::new(Config::in_memory())
            .await
            .expect("pool can be created");
        migrations::sqlite::run(&pool)
            .await
            .expect("migrations succeed");

        MerchantService::new(SqliteStorage::new(pool))
    }

    fn new_merchant(email: Option<&str>) -> NewMerchant {
        NewMerchant {
            name: "Test Shop".to_owned(),
            email: email.map(ToOwned::to_owned),
            xpub: format!("kpub{}", "B".repeat(104)),
            webhook_url: Some("https://example.com/hooks/kas".to_owned()),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let service = test_service().await;
        let merchant = service.create_merchant(new_merchant(None)).await.unwrap();

        let api_key = merchant.api_key.clone().expect("plaintext is present once");
        assert!(api_key.starts_with(API_KEY_PREFIX));
        assert_eq!(
            merchant.api_key_digest.as_deref(),
            Some(api_key_digest(&api_key).as_str())
        );

        let found = service
            .lookup_by_api_key(&api_key)
            .await
            .unwrap()
            .expect("merchant resolves");
        assert_eq!(found.id, merchant.id);

        assert!(service.lookup_by_api_key("kg_live_bogus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let service = test_service().await;
        service
            .create_merchant(new_merchant(Some("shop@example.com")))
            .await
            .unwrap();

        assert_matches!(
            service
                .create_merchant(new_merchant(Some("shop@example.com")))
                .await,
            Err(MerchantError::DuplicateEmail)
        );
    }

    #[tokio::test]
    async fn test_regenerate_api_key_invalidates_old() {
        let service = test_service().await;
        let merchant = service.create_merchant(new_merchant(None)).await.unwrap();
        let old_key = merchant.api_key.clone().unwrap();

        let new_key = service.regenerate_api_key(merchant.id).await.unwrap();

        assert!(service.lookup_by_api_key(&old_key).await.unwrap().is_none());
        assert_eq!(
            service
                .lookup_by_api_key(new_key.expose_secret())
                .await
                .unwrap()
                .unwrap()
                .id,
            merchant.id
        );
    }

    #[tokio::test]
    async fn test_lookup_backfills_legacy_digest() {
        let service = test_service().await;
        let merchant = service.create_merchant(new_merchant(None)).await.unwrap();
        let api_key = merchant.api_key.clone().unwrap();

        // Simulate a legacy row: plaintext stored, digest never computed.
        sqlx::query("UPDATE merchants SET api_key_digest = NULL WHERE id = $1")
            .bind(merchant.id.to_string())
            .execute(&*service.storage.pool())
            .await
            .unwrap();

        let found = service
            .lookup_by_api_key(&api_key)
            .await
            .unwrap()
            .expect("legacy row resolves by plaintext");
        assert_eq!(found.api_key_digest, Some(api_key_digest(&api_key)));

        // Digest is now persisted; erasing the plaintext no longer affects verification.
        sqlx::query("UPDATE merchants SET api_key = NULL WHERE id = $1")
            .bind(merchant.id.to_string())
            .execute(&*service.storage.pool())
            .await
            .unwrap();

        assert!(service.lookup_by_api_key(&api_key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_merchant_patch() {
        let service = test_service().await;
        let merchant = service.create_merchant(new_merchant(None)).await.unwrap();

        let updated = service
            .update_merchant(
                merchant.id,
                MerchantPatch {
                    name: Some("Renamed".to_owned()),
                    email: Some(Some("new@example.com".to_owned())),
                    webhook_url: Some(None),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email.as_deref(), Some("new@example.com"));
        assert_eq!(updated.webhook_url, None);
        assert!(updated.updated_at >= merchant.updated_at);
    }

    #[tokio::test]
    async fn test_unknown_merchant_is_not_found() {
        let service = test_service().await;

        assert_matches!(
            service.regenerate_api_key(Uuid::new_v4()).await,
            Err(MerchantError::NotFound(_))
        );
        assert_matches!(
            service.get_merchant(Uuid::new_v4()).await,
            Err(MerchantError::NotFound(_))
        );
    }
}
