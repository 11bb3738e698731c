// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use futures::Stream;
use kasgate_common::domain::{Address, BlueScore, Sompi, TransactionId};
use std::error::Error as StdError;

/// A block-included or mempool UTXO paying some address. `block_daa_score` is zero while the
/// containing transaction is mempool-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxoEntry {
    /// Absent when the node only reports the script public key; the watcher maps the script
    /// back to the address it populated at subscription time.
    pub address: Option<Address>,
    pub tx_id: TransactionId,
    pub output_index: u32,
    pub amount: Sompi,
    pub script_public_key: String,
    pub block_daa_score: BlueScore,
}

impl UtxoEntry {
    pub fn is_block_included(&self) -> bool {
        self.block_daa_score > 0
    }

    pub fn outpoint(&self) -> (TransactionId, u32) {
        (self.tx_id.clone(), self.output_index)
    }
}

/// A UTXO-change notification from the push backend.
#[derive(Debug, Clone, Default)]
pub struct UtxoChange {
    pub added: Vec<UtxoEntry>,
    pub removed: Vec<UtxoEntry>,
}

/// Push backend: a node reached over a persistent bidirectional connection. The
/// implementation owns connection lifecycle, reconnecting with exponential backoff and
/// replaying active subscriptions; consumers only see the subscription surface.
#[trait_variant::make(Send)]
pub trait Node
where
    Self: Clone + Send + Sync + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    fn is_connected(&self) -> bool;

    /// Subscribe to UTXO-change notifications for the given addresses.
    async fn subscribe_utxo_changes(&self, addresses: &[Address]) -> Result<(), Self::Error>;

    async fn unsubscribe_utxo_changes(&self, addresses: &[Address]) -> Result<(), Self::Error>;

    /// One-shot UTXO fetch; used to populate the script-key map at subscription time and to
    /// compute totals when a change notification arrives.
    async fn get_utxos_by_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<UtxoEntry>, Self::Error>;

    /// Blue score of the current virtual sink.
    async fn get_sink_blue_score(&self) -> Result<BlueScore, Self::Error>;

    /// Stream of change notifications. Each call returns an independent stream observing all
    /// notifications from the point of the call on.
    fn utxo_changes(&self) -> impl Stream<Item = UtxoChange> + Send + Unpin + 'static;
}

/// Sum of the block-included outputs in the given entries.
pub fn block_included_total<'a>(utxos: impl IntoIterator<Item = &'a UtxoEntry>) -> Sompi {
    utxos
        .into_iter()
        .filter(|utxo| utxo.is_block_included())
        .fold(Sompi(0), |total, utxo| total + utxo.amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utxo(amount: u128, block_daa_score: u64) -> UtxoEntry {
        UtxoEntry {
            address: None,
            tx_id: "tx".to_owned(),
            output_index: 0,
            amount: Sompi(amount),
            script_public_key: String::new(),
            block_daa_score,
        }
    }

    #[test]
    fn test_mempool_only_outputs_are_excluded() {
        let utxos = [utxo(100, 0), utxo(200, 5), utxo(300, 1)];
        assert_eq!(block_included_total(&utxos), Sompi(500));
    }

    #[test]
    fn test_score_of_one_is_included() {
        assert!(utxo(1, 1).is_block_included());
        assert!(!utxo(1, 0).is_block_included());
    }
}
