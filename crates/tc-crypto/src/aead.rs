// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! AEAD (Authenticated Encryption with Associated Data)
//!
//! AES-256-GCM carries the attestation session channel. Keys are zeroized
//! on drop; nonces are incrementable so a session can run a counter-based
//! nonce sequence for repeated exports.
//!
//! # Nonce Management
//!
//! **CRITICAL**: Never reuse a nonce with the same key. The session layer
//! dedicates the base nonce to the prover's response and advances the
//! counter before every export message.

use crate::error::CryptoError;
use crate::traits::Aead;
use zeroize::{Zeroize, ZeroizeOnDrop};

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm as Aes256GcmImpl, Nonce,
};

/// AES-256-GCM key (32 bytes)
///
/// This type wraps a 256-bit key and ensures it is securely zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Aes256Key([u8; 32]);

impl Aes256Key {
    /// Create a new key from bytes
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create from slice
    ///
    /// Returns `None` if slice length is not exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != 32 {
            return None;
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Some(Self(bytes))
    }

    /// Generate a random key
    pub fn generate<R: crate::traits::CryptoRng>(rng: &mut R) -> Result<Self, CryptoError> {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes)?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Aes256Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// AES-GCM nonce (12 bytes / 96 bits)
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AesGcmNonce([u8; 12]);

impl AesGcmNonce {
    /// Create a new nonce from bytes
    #[must_use]
    pub const fn new(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Create from slice
    ///
    /// Returns `None` if slice length is not exactly 12 bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != 12 {
            return None;
        }
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(slice);
        Some(Self(bytes))
    }

    /// Increment nonce by 1 (big-endian counter semantics)
    pub fn increment(&mut self) {
        for byte in self.0.iter_mut().rev() {
            let (new_val, overflow) = byte.overflowing_add(1);
            *byte = new_val;
            if !overflow {
                break;
            }
        }
    }
}

impl AsRef<[u8]> for AesGcmNonce {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// AES-256-GCM AEAD implementation
///
/// NIST-approved authenticated encryption; hardware accelerated on
/// platforms with AES instructions.
pub struct Aes256Gcm;

impl Aead for Aes256Gcm {
    const KEY_SIZE: usize = 32;
    const NONCE_SIZE: usize = 12;
    const TAG_SIZE: usize = 16;

    type Key = Aes256Key;
    type Nonce = AesGcmNonce;

    fn encrypt(
        key: &Self::Key,
        nonce: &Self::Nonce,
        plaintext: &[u8],
        aad: &[u8],
        ciphertext: &mut [u8],
    ) -> Result<usize, CryptoError> {
        let required_len = plaintext.len() + Self::TAG_SIZE;
        if ciphertext.len() < required_len {
            return Err(CryptoError::BufferTooSmall);
        }

        ciphertext[..plaintext.len()].copy_from_slice(plaintext);

        let cipher =
            Aes256GcmImpl::new_from_slice(&key.0).map_err(|_| CryptoError::InvalidKey)?;

        let gcm_nonce = Nonce::from_slice(&nonce.0);

        let tag = cipher
            .encrypt_in_place_detached(gcm_nonce, aad, &mut ciphertext[..plaintext.len()])
            .map_err(|_| CryptoError::InternalError)?;

        ciphertext[plaintext.len()..required_len].copy_from_slice(&tag);

        Ok(required_len)
    }

    fn decrypt(
        key: &Self::Key,
        nonce: &Self::Nonce,
        ciphertext: &[u8],
        aad: &[u8],
        plaintext: &mut [u8],
    ) -> Result<usize, CryptoError> {
        if ciphertext.len() < Self::TAG_SIZE {
            return Err(CryptoError::InvalidCiphertext);
        }

        let plaintext_len = ciphertext.len() - Self::TAG_SIZE;
        if plaintext.len() < plaintext_len {
            return Err(CryptoError::BufferTooSmall);
        }

        let cipher =
            Aes256GcmImpl::new_from_slice(&key.0).map_err(|_| CryptoError::InvalidKey)?;

        let gcm_nonce = Nonce::from_slice(&nonce.0);

        plaintext[..plaintext_len].copy_from_slice(&ciphertext[..plaintext_len]);

        let tag = aes_gcm::Tag::from_slice(&ciphertext[plaintext_len..]);

        cipher
            .decrypt_in_place_detached(gcm_nonce, aad, &mut plaintext[..plaintext_len], tag)
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        Ok(plaintext_len)
    }
}
