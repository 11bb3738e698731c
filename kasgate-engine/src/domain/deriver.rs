// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use kasgate_common::domain::Address;
use std::error::Error as StdError;

/// Receive-address derivation from a merchant's extended public key. Pure and synchronous:
/// `derive` performs no I/O and is safe to call inside the session-creation transaction.
pub trait AddressDeriver
where
    Self: Clone + Send + Sync + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    /// Validate that the given xPub parses; used at merchant registration.
    fn parse(&self, xpub: &str) -> Result<(), Self::Error>;

    /// Derive the receive address at the given index.
    fn derive(&self, xpub: &str, index: u32) -> Result<Address, Self::Error>;
}
