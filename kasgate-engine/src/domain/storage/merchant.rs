// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::domain::{Merchant, storage::Tx};
use uuid::Uuid;

/// A partial update of merchant profile fields. `None` leaves a field untouched;
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct MerchantPatch {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub webhook_url: Option<Option<String>>,
}

#[trait_variant::make(Send)]
pub trait MerchantStorage
where
    Self: Clone + Send + Sync + 'static,
{
    async fn save_merchant(&self, merchant: &Merchant) -> Result<(), sqlx::Error>;

    async fn get_merchant_by_id(&self, id: Uuid) -> Result<Option<Merchant>, sqlx::Error>;

    /// Look a merchant up by the SHA-256 digest of its API key. The only lookup path used for
    /// authentication; cost is independent of the key length.
    async fn get_merchant_by_api_key_digest(
        &self,
        digest: &str,
    ) -> Result<Option<Merchant>, sqlx::Error>;

    /// Legacy rows carry a plaintext key but no digest yet. This is the only query that reads
    /// the plaintext column.
    async fn get_merchant_by_plaintext_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<Merchant>, sqlx::Error>;

    /// Backfill the digest of a legacy row.
    async fn set_api_key_digest(&self, id: Uuid, digest: &str) -> Result<(), sqlx::Error>;

    /// Get a merchant inside a transaction; the single pool connection serializes this with
    /// every other write until commit.
    async fn get_merchant_in_tx(
        &self,
        id: Uuid,
        tx: &mut Tx,
    ) -> Result<Option<Merchant>, sqlx::Error>;

    /// Advance `next_address_index` to the given value inside the session-creation transaction.
    async fn set_next_address_index(
        &self,
        id: Uuid,
        next_address_index: u32,
        tx: &mut Tx,
    ) -> Result<(), sqlx::Error>;

    async fn update_merchant(
        &self,
        id: Uuid,
        patch: &MerchantPatch,
    ) -> Result<Option<Merchant>, sqlx::Error>;

    /// Replace plaintext and digest in one statement; the old key is invalid the moment this
    /// returns.
    async fn rotate_api_key(
        &self,
        id: Uuid,
        api_key: &str,
        api_key_digest: &str,
    ) -> Result<bool, sqlx::Error>;

    async fn rotate_webhook_secret(
        &self,
        id: Uuid,
        webhook_secret: &str,
    ) -> Result<bool, sqlx::Error>;
}
