// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wire types shared by the push-backend client and the REST indexer client. Numeric fields
//! arrive either as JSON numbers or as decimal strings depending on the server, so decoding is
//! lenient about both.

use crate::domain::node::UtxoEntry;
use kasgate_common::domain::Sompi;
use serde::{Deserialize, Deserializer, Serialize, de};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub outpoint: OutpointDto,
    pub utxo_entry: UtxoEntryDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutpointDto {
    pub transaction_id: String,
    pub index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoEntryDto {
    #[serde(deserialize_with = "u128_flexible")]
    pub amount: u128,
    #[serde(default)]
    pub script_public_key: Option<ScriptPublicKeyDto>,
    #[serde(default, deserialize_with = "u64_flexible")]
    pub block_daa_score: u64,
    #[serde(default)]
    pub is_coinbase: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptPublicKeyDto {
    #[serde(default)]
    pub version: u16,
    pub script_public_key: String,
}

impl From<UtxoDto> for UtxoEntry {
    fn from(dto: UtxoDto) -> Self {
        UtxoEntry {
            address: dto.address,
            tx_id: dto.outpoint.transaction_id,
            output_index: dto.outpoint.index,
            amount: Sompi(dto.utxo_entry.amount),
            script_public_key: dto
                .utxo_entry
                .script_public_key
                .map(|script| script.script_public_key)
                .unwrap_or_default(),
            block_daa_score: dto.utxo_entry.block_daa_score,
        }
    }
}

fn u64_flexible<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(value) => value.parse().map_err(de::Error::custom),
    }
}

fn u128_flexible<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u128),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(value) => value.parse().map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_rest_shape() {
        // Amounts and scores as decimal strings, the public indexer's shape.
        let value = json!({
            "address": "kaspatest:qqaddress",
            "outpoint": { "transactionId": "deadbeef", "index": 1 },
            "utxoEntry": {
                "amount": "500000000",
                "scriptPublicKey": { "scriptPublicKey": "20aabbac" },
                "blockDaaScore": "18867232",
                "isCoinbase": false
            }
        });

        let utxo = UtxoEntry::from(serde_json::from_value::<UtxoDto>(value).unwrap());
        assert_eq!(utxo.address.as_deref(), Some("kaspatest:qqaddress"));
        assert_eq!(utxo.tx_id, "deadbeef");
        assert_eq!(utxo.output_index, 1);
        assert_eq!(utxo.amount, Sompi(500_000_000));
        assert_eq!(utxo.script_public_key, "20aabbac");
        assert_eq!(utxo.block_daa_score, 18_867_232);
    }

    #[test]
    fn test_decode_numeric_shape() {
        // Numbers instead of strings, no address, no script.
        let value = json!({
            "outpoint": { "transactionId": "cafe", "index": 0 },
            "utxoEntry": { "amount": 42, "blockDaaScore": 7 }
        });

        let utxo = UtxoEntry::from(serde_json::from_value::<UtxoDto>(value).unwrap());
        assert_eq!(utxo.address, None);
        assert_eq!(utxo.amount, Sompi(42));
        assert_eq!(utxo.block_daa_score, 7);
        assert_eq!(utxo.script_public_key, "");
    }
}
