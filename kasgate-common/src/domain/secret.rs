// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use secrecy::SecretString;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Prefix of merchant API keys.
pub const API_KEY_PREFIX: &str = "kg_live_";

/// Prefix of merchant webhook secrets.
pub const WEBHOOK_SECRET_PREFIX: &str = "whsec_";

const SECRET_LEN: usize = 24;

/// Mint a fresh merchant API key: `kg_live_` followed by 24 random bytes, base64url encoded.
pub fn mint_api_key() -> SecretString {
    SecretString::from(format!("{API_KEY_PREFIX}{}", random_token()))
}

/// Mint a fresh webhook secret: `whsec_` followed by 24 random bytes, base64url encoded.
pub fn mint_webhook_secret() -> SecretString {
    SecretString::from(format!("{WEBHOOK_SECRET_PREFIX}{}", random_token()))
}

/// Mint a per-session subscription token. Opaque and high-entropy; the only thing that matters
/// is that it cannot be guessed and compares in constant time.
pub fn mint_subscription_token() -> String {
    random_token()
}

fn random_token() -> String {
    let mut bytes = [0; SECRET_LEN];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Lowercase hex SHA-256 of the given bytes.
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    const_hex::encode(Sha256::digest(data.as_ref()))
}

/// Digest under which an API key is stored and looked up. Lookups never touch the plaintext
/// column, so plaintext can be redacted at rest without affecting verification.
pub fn api_key_digest(key: &str) -> String {
    sha256_hex(key.as_bytes())
}

/// Constant-time equality. Inputs of different length compare unequal without shortcutting on
/// content.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_key_formats() {
        let api_key = mint_api_key();
        let api_key = api_key.expose_secret();
        assert!(api_key.starts_with(API_KEY_PREFIX));
        assert_eq!(api_key.len(), API_KEY_PREFIX.len() + 32);

        let webhook_secret = mint_webhook_secret();
        assert!(webhook_secret.expose_secret().starts_with(WEBHOOK_SECRET_PREFIX));
    }

    #[test]
    fn test_mint_is_not_deterministic() {
        assert_ne!(
            mint_api_key().expose_secret(),
            mint_api_key().expose_secret()
        );
        assert_ne!(mint_subscription_token(), mint_subscription_token());
    }

    #[test]
    fn test_digest_is_stable() {
        let digest = api_key_digest("kg_live_test");
        assert_eq!(digest, api_key_digest("kg_live_test"));
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, api_key_digest("kg_live_test2"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
