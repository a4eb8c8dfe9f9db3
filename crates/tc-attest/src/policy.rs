// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Policy digest evaluation
//!
//! A policy selects a subset of measurement registers through a bit mask;
//! its digest is `SHA3-256(mask_le || composite)` where the composite is
//! the concatenation of the selected registers' current values in
//! ascending register order.
//!
//! Results are cached in a single slot with a TTL. The slot is not keyed
//! by mask: within the TTL it answers for whatever mask it was filled
//! with. Callers mixing masks inside one TTL window must bypass the cache.

use tc_anchor::TrustAnchor;
use tc_common::time::Ticks;
use tc_common::{Error, Result};
use tc_crypto::hash::Sha3_256;
use tc_crypto::Hash;

/// A register-selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Bit mask of selected registers (bit N selects register N)
    pub register_mask: u32,
}

#[derive(Debug, Clone, Copy)]
struct CacheSlot {
    digest: [u8; 32],
    mask: u32,
    cached_at: Ticks,
    valid: bool,
}

/// Policy digest evaluator with a single-slot TTL cache
pub struct PolicyEvaluator {
    cache: CacheSlot,
    ttl: u64,
}

impl PolicyEvaluator {
    /// Create an evaluator with the given cache TTL in ticks
    #[must_use]
    pub const fn new(ttl: u64) -> Self {
        Self {
            cache: CacheSlot {
                digest: [0u8; 32],
                mask: 0,
                cached_at: Ticks::new(0),
                valid: false,
            },
            ttl,
        }
    }

    /// Evaluate a policy digest
    ///
    /// With `use_cache` set and a live cache slot, the cached digest is
    /// returned unchanged. Otherwise the composite is rebuilt from the
    /// anchor's current register values, hashed, cached and returned.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for a zero mask or a mask bit with
    /// no backing register.
    pub fn evaluate<A: TrustAnchor>(
        &mut self,
        anchor: &A,
        policy: &Policy,
        use_cache: bool,
        now: Ticks,
    ) -> Result<[u8; 32]> {
        if policy.register_mask == 0 {
            return Err(Error::InvalidArgument);
        }

        if use_cache && self.cache.valid && !self.cache.cached_at.has_elapsed(now, self.ttl) {
            return Ok(self.cache.digest);
        }

        let mut hasher = Sha3_256::new();
        hasher.update(&policy.register_mask.to_le_bytes());
        for index in 0..32 {
            if policy.register_mask & (1 << index) == 0 {
                continue;
            }
            let value = anchor
                .read_register(index)
                .map_err(|_| Error::InvalidArgument)?;
            hasher.update(&value);
        }
        let digest = hasher.finalize().into_bytes();

        self.cache = CacheSlot {
            digest,
            mask: policy.register_mask,
            cached_at: now,
            valid: true,
        };

        Ok(digest)
    }

    /// The mask the cache slot was last filled with
    #[must_use]
    pub const fn cached_mask(&self) -> Option<u32> {
        if self.cache.valid {
            Some(self.cache.mask)
        } else {
            None
        }
    }

    /// Invalidate the cache slot
    pub fn invalidate(&mut self) {
        self.cache.valid = false;
    }
}
