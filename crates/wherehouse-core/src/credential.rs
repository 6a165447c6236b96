//! # Credential Hasher
//!
//! Salts and hashes passwords, and verifies a password against a stored record.
//!
//! ## Record Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base64( salt[16] ‖ PBKDF2-HMAC-SHA256(password, salt, 10 000)[32] )    │
//! │                                                                         │
//! │  hash("hunter2")                                                        │
//! │       │                                                                 │
//! │       ├── salt  ← 16 bytes from the OS CSPRNG                          │
//! │       ├── key   ← PBKDF2(password, salt) → 32 bytes                    │
//! │       └── record = base64(salt ‖ key)        (64 characters)           │
//! │                                                                         │
//! │  verify("hunter2", record)                                              │
//! │       ├── decode record  ── fails? → CorruptCredential                 │
//! │       ├── salt = record[..16], key = record[16..]                      │
//! │       └── re-derive and compare in constant time → true / false        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The layout and iteration count are fixed so that records written by earlier
//! deployments keep verifying.

use std::num::NonZeroU32;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{CoreError, CoreResult};

pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;
const RECORD_LEN: usize = SALT_LEN + KEY_LEN;

const PBKDF2_ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;
const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(10_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};

/// Hashes and verifies account passwords.
///
/// ## Usage
/// ```rust
/// use wherehouse_core::CredentialHasher;
///
/// let hasher = CredentialHasher::new();
/// let record = hasher.hash("hunter2").unwrap();
///
/// assert!(hasher.verify("hunter2", &record).unwrap());
/// assert!(!hasher.verify("hunter3", &record).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    rng: SystemRandom,
}

impl CredentialHasher {
    pub fn new() -> Self {
        CredentialHasher {
            rng: SystemRandom::new(),
        }
    }

    /// Produces a fresh salted record. Hashing the same secret twice yields
    /// two different records.
    pub fn hash(&self, secret: &str) -> CoreResult<String> {
        let mut record = [0u8; RECORD_LEN];
        let (salt, key) = record.split_at_mut(SALT_LEN);

        self.rng
            .fill(salt)
            .map_err(|_| CoreError::RandomUnavailable)?;

        pbkdf2::derive(PBKDF2_ALGORITHM, PBKDF2_ITERATIONS, salt, secret.as_bytes(), key);

        Ok(STANDARD.encode(record))
    }

    /// Checks `secret` against a stored record.
    ///
    /// ## Returns
    /// * `Ok(true)` - secret matches
    /// * `Ok(false)` - secret does not match
    /// * `Err(CoreError::CorruptCredential)` - record is not valid base64 or
    ///   not `salt ‖ key` sized
    pub fn verify(&self, secret: &str, record: &str) -> CoreResult<bool> {
        let bytes = STANDARD
            .decode(record)
            .map_err(|e| CoreError::CorruptCredential(e.to_string()))?;

        if bytes.len() != RECORD_LEN {
            return Err(CoreError::CorruptCredential(format!(
                "expected {} bytes, found {}",
                RECORD_LEN,
                bytes.len()
            )));
        }

        let (salt, key) = bytes.split_at(SALT_LEN);

        // ring compares the derived key in constant time
        Ok(pbkdf2::verify(PBKDF2_ALGORITHM, PBKDF2_ITERATIONS, salt, secret.as_bytes(), key).is_ok())
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_hash_then_verify() {
        let hasher = CredentialHasher::new();
        for secret in ["password", "", "correct horse battery staple", "pässwörd"] {
            let record = hasher.hash(secret).unwrap();
            assert!(hasher.verify(secret, &record).unwrap(), "secret {:?}", secret);
        }
    }

    #[test]
    fn test_different_secret_does_not_verify() {
        let hasher = CredentialHasher::new();
        let record = hasher.hash("password").unwrap();
        assert!(!hasher.verify("Password", &record).unwrap());
        assert!(!hasher.verify("password ", &record).unwrap());
    }

    #[test]
    fn test_same_secret_hashes_differently() {
        let hasher = CredentialHasher::new();
        let a = hasher.hash("password").unwrap();
        let b = hasher.hash("password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_record_layout() {
        let record = CredentialHasher::new().hash("password").unwrap();
        let bytes = STANDARD.decode(&record).unwrap();
        assert_eq!(bytes.len(), SALT_LEN + KEY_LEN);
        assert_eq!(record.len(), 64);
    }

    #[test]
    fn test_known_record_from_fixed_salt() {
        // Build a record with a known salt and check verification uses the
        // stored salt rather than a fresh one.
        let salt = [7u8; SALT_LEN];
        let mut key = [0u8; KEY_LEN];
        pbkdf2::derive(PBKDF2_ALGORITHM, PBKDF2_ITERATIONS, &salt, b"letmein", &mut key);
        let mut raw = salt.to_vec();
        raw.extend_from_slice(&key);
        let record = STANDARD.encode(raw);

        let hasher = CredentialHasher::new();
        assert!(hasher.verify("letmein", &record).unwrap());
        assert!(!hasher.verify("letmeout", &record).unwrap());
    }

    #[test]
    fn test_undecodable_record_is_corrupt() {
        let hasher = CredentialHasher::new();
        let err = hasher.verify("password", "not*base64!").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptCredential);
    }

    #[test]
    fn test_short_record_is_corrupt() {
        let hasher = CredentialHasher::new();
        let short = STANDARD.encode([1u8; 20]);
        let err = hasher.verify("password", &short).unwrap_err();
        assert!(matches!(err, CoreError::CorruptCredential(_)));
    }
}
