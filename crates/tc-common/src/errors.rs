// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Error types for the TrustCore engine
//!
//! This module defines the unified error type used throughout the engine.
//! All errors are no_std compatible and carry no heap-allocated context.

use core::fmt;

/// Result type alias for TrustCore operations
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the TrustCore engine
///
/// Callers can distinguish transient failures (worth retrying) from
/// permanent rejections via [`Error::is_retryable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Cryptographic Errors (0x01xx)
    // =========================================================================
    /// Random number generator failure
    RngFailure,
    /// AEAD encryption/decryption failed
    AeadError,
    /// Invalid cryptographic key format or size
    InvalidKey,

    // =========================================================================
    // Key Custody Errors (0x02xx)
    // =========================================================================
    /// A key with this id is already present
    AlreadyExists,
    /// Key table has no free entries
    KeyStoreFull,

    // =========================================================================
    // Measurement Log Errors (0x03xx)
    // =========================================================================
    /// An event with this timestamp is already stored
    TimestampCollision,
    /// Event record is malformed or truncated
    MalformedRecord,
    /// Event store has no free entries
    EventlogFull,

    // =========================================================================
    // Attestation Errors (0x04xx)
    // =========================================================================
    /// Nonce/timestamp mismatch or authenticated decryption failure
    AuthenticationFailed,
    /// Recomputed register digest does not match the claimed value
    ValidationFailed,

    // =========================================================================
    // Rollback Protection Errors (0x05xx)
    // =========================================================================
    /// Candidate version is below the stored counter
    RollbackDetected,
    /// Rollback counter has not been defined yet
    CounterNotDefined,

    // =========================================================================
    // Trust Anchor Errors (0x06xx)
    // =========================================================================
    /// Underlying Trust Anchor call failed
    AnchorFailure,

    // =========================================================================
    // General Errors (0xFFxx)
    // =========================================================================
    /// Null or zero-length input
    InvalidArgument,
    /// Buffer is too small for the operation
    BufferTooSmall,
    /// Session table full or allocation failure
    ResourceExhausted,
    /// Unknown key id or unknown/inactive session
    NotFound,
    /// Operation is invalid in the current state
    InvalidState,
    /// Internal error (should not occur)
    InternalError,
}

impl Error {
    /// Get the error code for this error
    ///
    /// Error codes are organized by category:
    /// - 0x01xx: Cryptographic errors
    /// - 0x02xx: Key custody errors
    /// - 0x03xx: Measurement log errors
    /// - 0x04xx: Attestation errors
    /// - 0x05xx: Rollback protection errors
    /// - 0x06xx: Trust anchor errors
    /// - 0xFFxx: General errors
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::RngFailure => 0x0101,
            Self::AeadError => 0x0102,
            Self::InvalidKey => 0x0103,

            Self::AlreadyExists => 0x0201,
            Self::KeyStoreFull => 0x0202,

            Self::TimestampCollision => 0x0301,
            Self::MalformedRecord => 0x0302,
            Self::EventlogFull => 0x0303,

            Self::AuthenticationFailed => 0x0401,
            Self::ValidationFailed => 0x0402,

            Self::RollbackDetected => 0x0501,
            Self::CounterNotDefined => 0x0502,

            Self::AnchorFailure => 0x0601,

            Self::InvalidArgument => 0xFF01,
            Self::BufferTooSmall => 0xFF02,
            Self::ResourceExhausted => 0xFF03,
            Self::NotFound => 0xFF04,
            Self::InvalidState => 0xFF05,
            Self::InternalError => 0xFFFF,
        }
    }

    /// Check if this is a security-critical error
    #[must_use]
    pub const fn is_security_error(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed
                | Self::ValidationFailed
                | Self::RollbackDetected
                | Self::AeadError
        )
    }

    /// Check if the failed operation is worth retrying
    ///
    /// Resource exhaustion and anchor failures are transient; authentication,
    /// validation and rollback failures are permanent rejections.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ResourceExhausted
                | Self::AnchorFailure
                | Self::RngFailure
                | Self::KeyStoreFull
                | Self::EventlogFull
        )
    }

    /// Get a short description of the error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::RngFailure => "RNG failure",
            Self::AeadError => "AEAD operation failed",
            Self::InvalidKey => "invalid cryptographic key",

            Self::AlreadyExists => "key id already present",
            Self::KeyStoreFull => "key table full",

            Self::TimestampCollision => "event timestamp collision",
            Self::MalformedRecord => "malformed event record",
            Self::EventlogFull => "event store full",

            Self::AuthenticationFailed => "authentication failed",
            Self::ValidationFailed => "register validation failed",

            Self::RollbackDetected => "rollback detected",
            Self::CounterNotDefined => "rollback counter not defined",

            Self::AnchorFailure => "trust anchor call failed",

            Self::InvalidArgument => "invalid argument",
            Self::BufferTooSmall => "buffer too small",
            Self::ResourceExhausted => "resource exhausted",
            Self::NotFound => "not found",
            Self::InvalidState => "invalid state",
            Self::InternalError => "internal error",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_unique() {
        let all = [
            Error::RngFailure,
            Error::AeadError,
            Error::InvalidKey,
            Error::AlreadyExists,
            Error::KeyStoreFull,
            Error::TimestampCollision,
            Error::MalformedRecord,
            Error::EventlogFull,
            Error::AuthenticationFailed,
            Error::ValidationFailed,
            Error::RollbackDetected,
            Error::CounterNotDefined,
            Error::AnchorFailure,
            Error::InvalidArgument,
            Error::BufferTooSmall,
            Error::ResourceExhausted,
            Error::NotFound,
            Error::InvalidState,
            Error::InternalError,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code(), "{a:?} and {b:?} share a code");
            }
        }
    }

    #[test]
    fn test_retryable_split() {
        assert!(Error::ResourceExhausted.is_retryable());
        assert!(Error::AnchorFailure.is_retryable());
        assert!(!Error::AuthenticationFailed.is_retryable());
        assert!(!Error::ValidationFailed.is_retryable());
        assert!(!Error::RollbackDetected.is_retryable());
    }

    #[test]
    fn test_security_errors() {
        assert!(Error::AuthenticationFailed.is_security_error());
        assert!(Error::RollbackDetected.is_security_error());
        assert!(!Error::NotFound.is_security_error());
    }
}
