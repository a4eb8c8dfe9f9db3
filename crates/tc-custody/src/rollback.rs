// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Firmware anti-rollback guard
//!
//! A single monotonically non-decreasing u64 held in anchor-protected
//! storage gates firmware acceptance. `verify` is read-only; callers that
//! accept a load must call `increment` explicitly afterwards.

use tc_anchor::{AnchorError, TrustAnchor};
use tc_common::{Error, Result};

/// Define the rollback counter if it does not exist yet
///
/// Write-once: an already-defined counter is left untouched and the call
/// succeeds, so init is safe to run on every boot.
pub fn init<A: TrustAnchor>(anchor: &mut A) -> Result<()> {
    match anchor.counter_define(0) {
        Ok(()) | Err(AnchorError::CounterAlreadyDefined) => Ok(()),
        Err(e) => Err(Error::from(e)),
    }
}

/// Read the stored counter value without side effects
pub fn version<A: TrustAnchor>(anchor: &A) -> Result<u64> {
    anchor.counter_read().map_err(Error::from)
}

/// Check a candidate firmware version against the stored counter
///
/// Fails with `RollbackDetected` if `candidate` is below the stored value;
/// succeeds with no state change otherwise.
pub fn verify<A: TrustAnchor>(anchor: &A, candidate: u64) -> Result<()> {
    let stored = version(anchor)?;
    if candidate < stored {
        return Err(Error::RollbackDetected);
    }
    Ok(())
}

/// Advance the counter by exactly one; returns the new value
pub fn increment<A: TrustAnchor>(anchor: &mut A) -> Result<u64> {
    anchor.counter_increment().map_err(Error::from)
}
