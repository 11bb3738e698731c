// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error;

/// The Kaspa network a gateway instance is bound to. The network selects the address prefix,
/// the public indexer, the default node endpoints, the explorer and the confirmation threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkId {
    Mainnet,
    Testnet10,
}

impl NetworkId {
    /// The bech32 address prefix, e.g. `kaspa` for `kaspa:qq…`.
    pub fn address_prefix(&self) -> &'static str {
        match self {
            NetworkId::Mainnet => "kaspa",
            NetworkId::Testnet10 => "kaspatest",
        }
    }

    /// Base URL of the public REST indexer.
    pub fn default_indexer_url(&self) -> &'static str {
        match self {
            NetworkId::Mainnet => "https://api.kaspa.org",
            NetworkId::Testnet10 => "https://api-tn10.kaspa.org",
        }
    }

    /// wRPC endpoints tried in order when connecting the push backend.
    pub fn default_node_endpoints(&self) -> &'static [&'static str] {
        match self {
            NetworkId::Mainnet => &[
                "wss://node.kaspa.ws/mainnet",
                "wss://kaspa.aspectron.org/mainnet",
            ],
            NetworkId::Testnet10 => &["wss://node-tn10.kaspa.ws/testnet-10"],
        }
    }

    /// Base URL of the block explorer used for outbound links.
    pub fn explorer_url(&self) -> &'static str {
        match self {
            NetworkId::Mainnet => "https://explorer.kaspa.org",
            NetworkId::Testnet10 => "https://explorer-tn10.kaspa.org",
        }
    }

    /// Blue-score delta after which a payment is considered final.
    pub fn confirmation_threshold(&self) -> u64 {
        match self {
            NetworkId::Mainnet => 10,
            NetworkId::Testnet10 => 10,
        }
    }
}

impl Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkId::Mainnet => write!(f, "mainnet"),
            NetworkId::Testnet10 => write!(f, "testnet-10"),
        }
    }
}

impl FromStr for NetworkId {
    type Err = UnknownNetworkId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(NetworkId::Mainnet),
            "testnet-10" => Ok(NetworkId::Testnet10),
            other => Err(UnknownNetworkId(other.to_owned())),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown network ID {0}, expected mainnet or testnet-10")]
pub struct UnknownNetworkId(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("mainnet".parse::<NetworkId>().unwrap(), NetworkId::Mainnet);
        assert_eq!(
            "testnet-10".parse::<NetworkId>().unwrap(),
            NetworkId::Testnet10
        );
        assert!("testnet".parse::<NetworkId>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for network_id in [NetworkId::Mainnet, NetworkId::Testnet10] {
            assert_eq!(
                network_id.to_string().parse::<NetworkId>().unwrap(),
                network_id
            );
        }
    }
}
