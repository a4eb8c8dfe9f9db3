// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Core cryptographic traits
//!
//! Abstract interfaces for the primitives the engine consumes. Keeping the
//! traits narrow lets the anchor simulator and tests substitute
//! deterministic implementations.

use crate::error::CryptoError;
use zeroize::Zeroize;

/// Hash function trait
///
/// Provides both one-shot and incremental hashing.
pub trait Hash: Sized {
    /// Output size in bytes
    const OUTPUT_SIZE: usize;

    /// Output type
    type Output: AsRef<[u8]> + Clone;

    /// Hash a message in one shot
    fn hash(message: &[u8]) -> Self::Output;

    /// Create a new incremental hasher
    fn new() -> Self;

    /// Update the hasher with data
    fn update(&mut self, data: &[u8]);

    /// Finalize and return the hash
    fn finalize(self) -> Self::Output;
}

/// AEAD (Authenticated Encryption with Associated Data) trait
pub trait Aead {
    /// Key size in bytes
    const KEY_SIZE: usize;
    /// Nonce size in bytes
    const NONCE_SIZE: usize;
    /// Authentication tag size in bytes
    const TAG_SIZE: usize;

    /// Key type (zeroized on drop)
    type Key: AsRef<[u8]> + Zeroize;
    /// Nonce type
    type Nonce: AsRef<[u8]>;

    /// Encrypt plaintext with associated data
    ///
    /// `ciphertext` must hold `plaintext.len() + TAG_SIZE` bytes; the tag is
    /// appended after the ciphertext. Returns the total bytes written.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::BufferTooSmall` if the output buffer is too
    /// small.
    fn encrypt(
        key: &Self::Key,
        nonce: &Self::Nonce,
        plaintext: &[u8],
        aad: &[u8],
        ciphertext: &mut [u8],
    ) -> Result<usize, CryptoError>;

    /// Decrypt ciphertext (with trailing tag) with associated data
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::AuthenticationFailed` if the tag does not
    /// verify.
    fn decrypt(
        key: &Self::Key,
        nonce: &Self::Nonce,
        ciphertext: &[u8],
        aad: &[u8],
        plaintext: &mut [u8],
    ) -> Result<usize, CryptoError>;
}

/// Cryptographically secure random number generator trait
pub trait CryptoRng {
    /// Fill buffer with random bytes
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::RngFailure` if the RNG fails.
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), CryptoError>;

    /// Generate a random u64
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::RngFailure` if the RNG fails.
    fn next_u64(&mut self) -> Result<u64, CryptoError> {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
}

/// Constant-time comparison
///
/// Compares two byte slices in constant time to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abcd", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abce"));
        assert!(!constant_time_eq(b"abcd", b"abc"));
        assert!(constant_time_eq(b"", b""));
    }
}
