// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Hash function implementations
//!
//! SHA3-256 (FIPS 202) backs every digest in the engine: key fingerprints,
//! the measurement-register fold, and policy digests. Implementation from
//! the sha3 crate.

use crate::traits::Hash;
use sha3::{Digest, Sha3_256 as Sha3_256Impl};

/// SHA3-256 hash output
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Sha3_256Output([u8; 32]);

impl Sha3_256Output {
    /// Create from bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the output as a fixed-size array
    #[must_use]
    pub const fn into_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl AsRef<[u8]> for Sha3_256Output {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha3_256Output {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// SHA3-256 hasher
pub struct Sha3_256 {
    inner: Sha3_256Impl,
}

impl Hash for Sha3_256 {
    const OUTPUT_SIZE: usize = 32;

    type Output = Sha3_256Output;

    fn hash(message: &[u8]) -> Self::Output {
        let result = Sha3_256Impl::digest(message);
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        Sha3_256Output(output)
    }

    fn new() -> Self {
        Self {
            inner: Sha3_256Impl::new(),
        }
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    fn finalize(self) -> Self::Output {
        let result = self.inner.finalize();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        Sha3_256Output(output)
    }
}

impl Default for Sha3_256 {
    fn default() -> Self {
        Self::new()
    }
}

/// One step of the measurement-register fold
///
/// `acc_i = SHA3-256(acc_{i-1} || digest_i)`, seeded from the all-zero
/// accumulator. Every component that recomputes a register value must use
/// this exact rule so independently computed chains agree byte-for-byte.
#[must_use]
pub fn fold_digest(acc: &[u8; 32], digest: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(acc);
    hasher.update(digest);
    hasher.finalize().into_bytes()
}
