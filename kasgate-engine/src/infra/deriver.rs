// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::domain::deriver::AddressDeriver;
use kasgate_common::domain::{Address, NetworkId};
use kaspa_addresses::{Prefix, Version};
use kaspa_bip32::{ChildNumber, ExtendedPublicKey, secp256k1::PublicKey};
use std::str::FromStr;
use thiserror::Error;

type Xpub = ExtendedPublicKey<PublicKey>;

#[derive(Debug, Error)]
pub enum KaspaDeriverError {
    #[error("cannot parse extended public key")]
    Parse(#[source] kaspa_bip32::Error),

    #[error("cannot derive receive address at index {index}")]
    Derive {
        #[source]
        source: kaspa_bip32::Error,
        index: u32,
    },
}

/// [AddressDeriver] over the Kaspa BIP-32 derivation library. Receive addresses follow the
/// external chain `m/0/<index>` of the merchant's xPub; the payload is the schnorr x-only
/// public key.
#[derive(Debug, Clone)]
pub struct KaspaDeriver {
    prefix: Prefix,
}

impl KaspaDeriver {
    pub fn new(network_id: NetworkId) -> Self {
        let prefix = match network_id {
            NetworkId::Mainnet => Prefix::Mainnet,
            NetworkId::Testnet10 => Prefix::Testnet,
        };

        Self { prefix }
    }

    fn derive_from_xpub(&self, xpub: &Xpub, index: u32) -> Result<Address, KaspaDeriverError> {
        let derive_error = |source| KaspaDeriverError::Derive { source, index };

        let receive_chain = xpub
            .derive_child(ChildNumber::new(0, false).map_err(derive_error)?)
            .map_err(derive_error)?;
        let child = receive_chain
            .derive_child(ChildNumber::new(index, false).map_err(derive_error)?)
            .map_err(derive_error)?;

        let (x_only, _) = child.public_key().x_only_public_key();

        Ok(kaspa_addresses::Address::new(self.prefix, Version::PubKey, &x_only.serialize())
            .to_string())
    }
}

impl AddressDeriver for KaspaDeriver {
    type Error = KaspaDeriverError;

    fn parse(&self, xpub: &str) -> Result<(), Self::Error> {
        Xpub::from_str(xpub)
            .map(|_| ())
            .map_err(KaspaDeriverError::Parse)
    }

    fn derive(&self, xpub: &str, index: u32) -> Result<Address, Self::Error> {
        let xpub = Xpub::from_str(xpub).map_err(KaspaDeriverError::Parse)?;
        self.derive_from_xpub(&xpub, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use kaspa_bip32::{ExtendedPrivateKey, Language, Mnemonic, secp256k1::SecretKey};

    const MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_xpub() -> Xpub {
        let mnemonic = Mnemonic::new(MNEMONIC, Language::English).expect("mnemonic is valid");
        let xprv = ExtendedPrivateKey::<SecretKey>::new(mnemonic.to_seed(""))
            .expect("seed yields a master key");
        xprv.public_key()
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let deriver = KaspaDeriver::new(NetworkId::Mainnet);
        let xpub = test_xpub();

        let first = deriver.derive_from_xpub(&xpub, 0).unwrap();
        let again = deriver.derive_from_xpub(&xpub, 0).unwrap();
        let second = deriver.derive_from_xpub(&xpub, 1).unwrap();

        assert_eq!(first, again);
        assert_ne!(first, second);
        assert!(first.starts_with("kaspa:"));
    }

    #[test]
    fn test_prefix_follows_network() {
        let xpub = test_xpub();

        let mainnet = KaspaDeriver::new(NetworkId::Mainnet)
            .derive_from_xpub(&xpub, 0)
            .unwrap();
        let testnet = KaspaDeriver::new(NetworkId::Testnet10)
            .derive_from_xpub(&xpub, 0)
            .unwrap();

        assert!(mainnet.starts_with("kaspa:"));
        assert!(testnet.starts_with("kaspatest:"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let deriver = KaspaDeriver::new(NetworkId::Mainnet);

        assert_matches!(deriver.parse("not-an-xpub"), Err(KaspaDeriverError::Parse(_)));
        assert_matches!(
            deriver.derive("kpubJunkJunkJunk", 0),
            Err(KaspaDeriverError::Parse(_))
        );
    }
}
