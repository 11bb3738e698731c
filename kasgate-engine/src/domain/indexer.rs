// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::domain::node::UtxoEntry;
use kasgate_common::domain::{Address, BlueScore};
use std::error::Error as StdError;

/// Poll backend: a public REST indexer. Always running as the baseline watcher, because push
/// notifications may be dropped during network hiccups.
#[trait_variant::make(Send)]
pub trait LedgerIndexer
where
    Self: Clone + Send + Sync + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    async fn get_utxos_by_address(
        &self,
        address: &Address,
    ) -> Result<Vec<UtxoEntry>, Self::Error>;

    async fn get_virtual_chain_blue_score(&self) -> Result<BlueScore, Self::Error>;

    /// Cheap health probe, bounded by a short timeout.
    async fn probe(&self) -> Result<(), Self::Error>;
}
