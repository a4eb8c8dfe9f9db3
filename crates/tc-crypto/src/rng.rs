// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Deterministic random bit generation
//!
//! A SHA3-256 Hash-DRBG in the shape of NIST SP 800-90A. The hardware
//! random source lives behind the Trust Anchor; this DRBG backs the anchor
//! simulator and any host environment without one. `TestRng` gives tests a
//! reproducible stream.

use crate::error::CryptoError;
use crate::hash::Sha3_256;
use crate::traits::{CryptoRng, Hash};
use crate::zeroize_utils::secure_zero;
use zeroize::Zeroize;

/// DRBG seed length in bytes
pub const SEED_LEN: usize = 48;

/// Maximum generate calls before a reseed is required
pub const RESEED_INTERVAL: u64 = 1 << 20;

/// SHA3-256 Hash-DRBG
pub struct HashDrbg {
    /// Working state V
    v: [u8; SEED_LEN],
    /// Constant C derived at (re)seed time
    c: [u8; SEED_LEN],
    /// Generate calls since last reseed
    reseed_counter: u64,
}

impl HashDrbg {
    /// Instantiate from entropy input
    #[must_use]
    pub fn new(entropy: &[u8]) -> Self {
        let mut drbg = Self {
            v: [0u8; SEED_LEN],
            c: [0u8; SEED_LEN],
            reseed_counter: 1,
        };
        drbg.seed(entropy, &[]);
        drbg
    }

    /// Reseed with fresh entropy and optional additional input
    pub fn reseed(&mut self, entropy: &[u8], additional: &[u8]) {
        let mut material = [0u8; SEED_LEN];
        material.copy_from_slice(&self.v);
        self.seed_with_prefix(0x01, &material, entropy, additional);
        secure_zero(&mut material);
        self.reseed_counter = 1;
    }

    fn seed(&mut self, entropy: &[u8], personalization: &[u8]) {
        self.seed_with_prefix(0x00, &[], entropy, personalization);
    }

    /// Derive V and C via hash_df over the seed material
    fn seed_with_prefix(&mut self, prefix: u8, carry: &[u8], entropy: &[u8], extra: &[u8]) {
        hash_df(&[&[prefix], carry, entropy, extra], &mut self.v);

        let v_copy = self.v;
        hash_df(&[&[0x00], &v_copy], &mut self.c);
    }

    /// Fill `dest` with pseudorandom output
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::ReseedRequired` once the reseed interval is
    /// exhausted.
    pub fn generate(&mut self, dest: &mut [u8]) -> Result<(), CryptoError> {
        if self.reseed_counter > RESEED_INTERVAL {
            return Err(CryptoError::ReseedRequired);
        }

        // hashgen: leftmost bytes of H(V), H(V+1), ...
        let mut data = self.v;
        let mut offset = 0;
        while offset < dest.len() {
            let block = Sha3_256::hash(&data);
            let take = (dest.len() - offset).min(32);
            dest[offset..offset + take].copy_from_slice(&block.as_ref()[..take]);
            offset += take;
            increment(&mut data);
        }

        // V = V + H(0x03 || V) + C + reseed_counter
        let mut hasher = Sha3_256::new();
        hasher.update(&[0x03]);
        hasher.update(&self.v);
        let h = hasher.finalize();

        add_into(&mut self.v, h.as_ref());
        let c = self.c;
        add_into(&mut self.v, &c);
        add_into(&mut self.v, &self.reseed_counter.to_be_bytes());

        self.reseed_counter += 1;
        Ok(())
    }
}

impl CryptoRng for HashDrbg {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), CryptoError> {
        self.generate(dest)
    }
}

impl Drop for HashDrbg {
    fn drop(&mut self) {
        self.v.zeroize();
        self.c.zeroize();
    }
}

/// hash_df: derive `out.len()` bytes from the concatenation of `inputs`
fn hash_df(inputs: &[&[u8]], out: &mut [u8]) {
    let out_bits = (out.len() as u32) * 8;
    let mut counter = 1u8;
    let mut offset = 0;

    while offset < out.len() {
        let mut hasher = Sha3_256::new();
        hasher.update(&[counter]);
        hasher.update(&out_bits.to_be_bytes());
        for input in inputs {
            hasher.update(input);
        }
        let block = hasher.finalize();

        let take = (out.len() - offset).min(32);
        out[offset..offset + take].copy_from_slice(&block.as_ref()[..take]);
        offset += take;
        counter = counter.wrapping_add(1);
    }
}

/// Big-endian increment of a byte string
fn increment(data: &mut [u8]) {
    for byte in data.iter_mut().rev() {
        let (new_val, overflow) = byte.overflowing_add(1);
        *byte = new_val;
        if !overflow {
            break;
        }
    }
}

/// Big-endian addition of `addend` into `acc` (modulo 2^(8*acc.len()))
fn add_into(acc: &mut [u8], addend: &[u8]) {
    let mut carry = 0u16;
    let mut ai = acc.len();
    let mut bi = addend.len();

    while ai > 0 {
        ai -= 1;
        let b = if bi > 0 {
            bi -= 1;
            addend[bi] as u16
        } else if carry == 0 {
            break;
        } else {
            0
        };
        let sum = acc[ai] as u16 + b + carry;
        acc[ai] = sum as u8;
        carry = sum >> 8;
    }
}

/// Deterministic RNG for tests
///
/// Produces a reproducible byte stream from a u64 seed. Never use outside
/// of tests.
pub struct TestRng {
    drbg: HashDrbg,
}

impl TestRng {
    /// Create a test RNG from a fixed seed
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        let mut entropy = [0u8; SEED_LEN];
        entropy[..8].copy_from_slice(&seed.to_le_bytes());
        Self {
            drbg: HashDrbg::new(&entropy),
        }
    }
}

impl CryptoRng for TestRng {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), CryptoError> {
        self.drbg.generate(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_for_same_seed() {
        let mut a = TestRng::from_seed(42);
        let mut b = TestRng::from_seed(42);

        let mut buf_a = [0u8; 64];
        let mut buf_b = [0u8; 64];
        a.fill_bytes(&mut buf_a).unwrap();
        b.fill_bytes(&mut buf_b).unwrap();

        assert_eq!(buf_a, buf_b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = TestRng::from_seed(1);
        let mut b = TestRng::from_seed(2);

        let mut buf_a = [0u8; 32];
        let mut buf_b = [0u8; 32];
        a.fill_bytes(&mut buf_a).unwrap();
        b.fill_bytes(&mut buf_b).unwrap();

        assert_ne!(buf_a, buf_b);
    }

    #[test]
    fn test_successive_outputs_differ() {
        let mut rng = TestRng::from_seed(7);
        let mut first = [0u8; 32];
        let mut second = [0u8; 32];
        rng.fill_bytes(&mut first).unwrap();
        rng.fill_bytes(&mut second).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_reseed_changes_stream() {
        let mut rng = HashDrbg::new(b"initial entropy input");
        let mut before = [0u8; 32];
        rng.generate(&mut before).unwrap();

        rng.reseed(b"fresh entropy", b"");
        let mut after = [0u8; 32];
        rng.generate(&mut after).unwrap();

        assert_ne!(before, after);
    }
}
