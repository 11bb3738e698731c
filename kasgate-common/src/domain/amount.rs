// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{
    fmt::{self, Display},
    ops::Add,
    str::FromStr,
};
use thiserror::Error;

/// Number of sompi in one KAS.
pub const SOMPI_PER_KAS: u128 = 100_000_000;

/// Smallest accepted payment: 0.001 KAS.
pub const MIN_PAYMENT_SOMPI: Sompi = Sompi(100_000);

/// An amount in sompi, the smallest unit of the ledger. Carried as a 128-bit integer in memory
/// and as a decimal string at rest and on the wire to avoid precision loss in JSON consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sompi(pub u128);

impl Sompi {
    pub fn saturating_sub(self, other: Sompi) -> Sompi {
        Sompi(self.0.saturating_sub(other.0))
    }
}

impl Add for Sompi {
    type Output = Sompi;

    fn add(self, other: Sompi) -> Sompi {
        Sompi(self.0 + other.0)
    }
}

impl From<u64> for Sompi {
    fn from(value: u64) -> Self {
        Sompi(value as u128)
    }
}

impl Display for Sompi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Sompi {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<u128>()
            .map_err(|_| AmountError::Malformed(s.to_owned()))?;
        Ok(Sompi(value))
    }
}

impl Serialize for Sompi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Sompi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("malformed amount {0}, expected a decimal number with at most 8 fractional digits")]
    Malformed(String),

    #[error("amount {0} exceeds the representable range")]
    Overflow(String),
}

/// Parse a KAS amount like `1`, `0.001` or `12.34567800` into sompi. At most eight fractional
/// digits are accepted, matching the ledger's precision.
pub fn kas_to_sompi(kas: &str) -> Result<Sompi, AmountError> {
    let malformed = || AmountError::Malformed(kas.to_owned());

    let (int_part, frac_part) = match kas.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (kas, ""),
    };

    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    if kas.contains('.')
        && (frac_part.is_empty() || frac_part.len() > 8 || !frac_part.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(malformed());
    }

    let int_value = int_part
        .parse::<u128>()
        .map_err(|_| AmountError::Overflow(kas.to_owned()))?;

    // Right-pad the fraction to eight digits, e.g. "5" -> 50_000_000 sompi.
    let mut frac_value = frac_part.parse::<u128>().unwrap_or_default();
    frac_value *= 10u128.pow(8 - frac_part.len() as u32);

    int_value
        .checked_mul(SOMPI_PER_KAS)
        .and_then(|sompi| sompi.checked_add(frac_value))
        .map(Sompi)
        .ok_or_else(|| AmountError::Overflow(kas.to_owned()))
}

/// Format sompi as a canonical KAS string: no trailing fractional zeros, no trailing dot.
pub fn sompi_to_kas(sompi: Sompi) -> String {
    let int_part = sompi.0 / SOMPI_PER_KAS;
    let frac_part = sompi.0 % SOMPI_PER_KAS;

    if frac_part == 0 {
        return int_part.to_string();
    }

    let frac = format!("{frac_part:08}");
    format!("{int_part}.{}", frac.trim_end_matches('0'))
}
