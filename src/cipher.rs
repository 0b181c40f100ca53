//! The stash's cryptographic envelope (component A).
//!
//! AES-256-GCM authenticated encryption with a key derived from the stash
//! passphrase via Argon2id. Unlike the teacher's backup format — which
//! generates a fresh salt per backup — the stash derives **one** key per
//! passphrase with a fixed, crate-constant salt: every record shares that
//! key, so the same passphrase always re-derives the same key and a stash
//! exported under one passphrase can be `load`ed into a fresh stash
//! initialised with the same passphrase. Confidentiality against
//! brute-forcing still comes from Argon2id's cost parameters; what is
//! fixed is only the salt, not the security margin.
//!
//! Each individual `encrypt` call still draws a fresh random nonce, so two
//! encryptions of the same plaintext under the same key produce different
//! ciphertext.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
use base64::{engine::general_purpose, Engine as _};

use crate::error::StashError;

/// Crate-constant Argon2 salt. Fixed (not random) so `derive` is
/// deterministic over the passphrase alone — see module docs.
const KDF_SALT: &[u8; 16] = b"ghost-stash-salt";

const NONCE_LEN: usize = 12;

/// A key derived from the stash passphrase. Holds only the derived bytes;
/// the passphrase itself is never stored here.
pub struct Cipher {
    key: [u8; 32],
}

impl Cipher {
    /// Derive a `Cipher` from a passphrase via Argon2id (64 MiB, 3
    /// iterations, single-threaded — the same cost parameters the teacher
    /// uses for backup encryption, reused here for passphrase→key
    /// derivation instead of file backup).
    pub fn derive(passphrase: &str) -> Result<Self, StashError> {
        let params = Params::new(65536, 3, 1, Some(32))
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("invalid Argon2 params: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt_string = argon2::password_hash::SaltString::encode_b64(KDF_SALT)
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("failed to encode salt: {e}")))?;

        let password_hash = argon2
            .hash_password(passphrase.as_bytes(), &salt_string)
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("Argon2id key derivation failed: {e}")))?;

        let hash_output = password_hash
            .hash
            .ok_or_else(|| StashError::BackendFailure(anyhow::anyhow!("Argon2id produced no hash output")))?;

        let key_bytes = hash_output.as_bytes();
        if key_bytes.len() < 32 {
            return Err(StashError::BackendFailure(anyhow::anyhow!(
                "derived key too short: {} bytes",
                key_bytes.len()
            )));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&key_bytes[..32]);
        Ok(Self { key })
    }

    /// Encrypt `plaintext`, returning a self-contained token:
    /// `nonce(12) || ciphertext`, Base64-encoded (standard alphabet).
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, StashError> {
        let cipher = Aes256Gcm::new((&self.key).into());

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("AES-256-GCM encryption failed: {e}")))?;

        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&ciphertext);
        Ok(token)
    }

    /// Decrypt a token produced by [`Cipher::encrypt`]. Any tampering,
    /// truncation, or wrong key surfaces as [`StashError::DecryptionFailed`]
    /// — the message deliberately does not distinguish those causes, to
    /// avoid leaking which check failed.
    pub fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>, StashError> {
        if token.len() < NONCE_LEN {
            return Err(StashError::DecryptionFailed);
        }
        let (nonce_bytes, ciphertext) = token.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new((&self.key).into());
        let nonce = Nonce::from_slice(nonce_bytes);

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| StashError::DecryptionFailed)
    }

    /// Encrypt a value mapping's canonical JSON serialization, returning
    /// the Base64-stringified ciphertext token as stored on backends that
    /// need a text-safe representation.
    pub fn encrypt_value(&self, value: &serde_json::Value) -> Result<String, StashError> {
        let plaintext = serde_json::to_vec(value)
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("failed to serialise value: {e}")))?;
        let token = self.encrypt(&plaintext)?;
        Ok(general_purpose::STANDARD.encode(token))
    }

    /// Decrypt a Base64-stringified ciphertext token back into a value
    /// mapping.
    pub fn decrypt_value(&self, encoded: &str) -> Result<serde_json::Value, StashError> {
        let token = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| StashError::DecryptionFailed)?;
        let plaintext = self.decrypt(&token)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("decrypted payload is not valid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roundtrip() {
        let cipher = Cipher::derive("correct-horse-battery-staple").unwrap();
        let value = json!({"key": "value"});
        let encoded = cipher.encrypt_value(&value).unwrap();
        let decoded = cipher.decrypt_value(&encoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn two_encryptions_differ() {
        let cipher = Cipher::derive("pw").unwrap();
        let value = json!({"key": "value"});
        let a = cipher.encrypt_value(&value).unwrap();
        let b = cipher.encrypt_value(&value).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn same_passphrase_same_key() {
        let a = Cipher::derive("shared").unwrap();
        let b = Cipher::derive("shared").unwrap();
        let value = json!({"x": "y"});
        let encoded = a.encrypt_value(&value).unwrap();
        assert_eq!(b.decrypt_value(&encoded).unwrap(), value);
    }

    #[test]
    fn wrong_passphrase_fails() {
        let a = Cipher::derive("right").unwrap();
        let b = Cipher::derive("wrong").unwrap();
        let encoded = a.encrypt_value(&json!({"k": "v"})).unwrap();
        assert!(matches!(b.decrypt_value(&encoded), Err(StashError::DecryptionFailed)));
    }

    #[test]
    fn tampered_ciphertext_rejected() {
        let cipher = Cipher::derive("pw").unwrap();
        let encoded = cipher.encrypt_value(&json!({"k": "v"})).unwrap();
        let mut raw = general_purpose::STANDARD.decode(&encoded).unwrap();
        let idx = raw.len() - 1;
        raw[idx] ^= 0xFF;
        let tampered = general_purpose::STANDARD.encode(raw);
        assert!(matches!(cipher.decrypt_value(&tampered), Err(StashError::DecryptionFailed)));
    }
}
