// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Cryptographic error types

use core::fmt;

/// Error type for cryptographic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid key format or size
    InvalidKey,
    /// Ciphertext is malformed (e.g. shorter than the tag)
    InvalidCiphertext,
    /// AEAD authentication failed
    AuthenticationFailed,
    /// Invalid nonce
    InvalidNonce,
    /// Random number generator failure
    RngFailure,
    /// DRBG must be reseeded before producing more output
    ReseedRequired,
    /// Buffer is too small for the operation
    BufferTooSmall,
    /// Internal error (should not occur)
    InternalError,
}

impl CryptoError {
    /// Get error code for logging/debugging
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidKey => 0x0101,
            Self::InvalidCiphertext => 0x0102,
            Self::AuthenticationFailed => 0x0103,
            Self::InvalidNonce => 0x0104,
            Self::RngFailure => 0x0105,
            Self::ReseedRequired => 0x0106,
            Self::BufferTooSmall => 0x0107,
            Self::InternalError => 0x01FF,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidKey => "invalid key",
            Self::InvalidCiphertext => "invalid ciphertext",
            Self::AuthenticationFailed => "authentication failed",
            Self::InvalidNonce => "invalid nonce",
            Self::RngFailure => "RNG failure",
            Self::ReseedRequired => "DRBG reseed required",
            Self::BufferTooSmall => "buffer too small",
            Self::InternalError => "internal error",
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

impl From<CryptoError> for tc_common::Error {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidKey => Self::InvalidKey,
            CryptoError::InvalidCiphertext | CryptoError::AuthenticationFailed => {
                Self::AuthenticationFailed
            }
            CryptoError::InvalidNonce => Self::AeadError,
            CryptoError::RngFailure | CryptoError::ReseedRequired => Self::RngFailure,
            CryptoError::BufferTooSmall => Self::BufferTooSmall,
            CryptoError::InternalError => Self::InternalError,
        }
    }
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;
