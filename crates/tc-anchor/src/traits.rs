// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Trust anchor trait definition
//!
//! The engine consumes the anchor purely through this trait; nothing in the
//! engine knows whether the other side is a secure element or the software
//! simulator. Calls are assumed to complete in bounded time and are never
//! cancelled once issued - callers needing deadlines must enforce them
//! outside the engine.

use crate::error::AnchorResult;

/// Capability interface to the device trust anchor
pub trait TrustAnchor {
    /// Maximum object size accepted by protected storage
    const MAX_OBJECT_SIZE: usize;

    /// Number of measurement registers the anchor exposes
    const NUM_REGISTERS: usize;

    /// Fill a buffer from the hardware random source
    fn fill_random(&mut self, dest: &mut [u8]) -> AnchorResult<()>;

    /// Read the current value of a measurement register
    fn read_register(&self, index: u32) -> AnchorResult<[u8; 32]>;

    /// Extend a measurement register with a digest
    ///
    /// The register advances by the fold rule
    /// `new = SHA3-256(old || digest)`; the previous value is
    /// unrecoverable afterwards.
    fn extend_register(&mut self, index: u32, digest: &[u8; 32]) -> AnchorResult<()>;

    /// Drain pending measurement-event records
    ///
    /// Copies up to `buf.len()` bytes of encoded records (see
    /// [`crate::record`]) into `buf` and removes them from the anchor's
    /// queue. Returns the number of bytes copied; zero means no events are
    /// pending.
    fn drain_events(&mut self, buf: &mut [u8]) -> AnchorResult<usize>;

    /// Persist an object in policy-protected storage under `id`
    ///
    /// An existing object under the same id is replaced.
    fn store_object(&mut self, id: u32, data: &[u8]) -> AnchorResult<()>;

    /// Delete the object stored under `id`
    fn delete_object(&mut self, id: u32) -> AnchorResult<()>;

    /// Check that the object stored under `id` hashes to `fingerprint`
    ///
    /// Returns `Ok(false)` on mismatch; errors are reserved for anchor
    /// failures (missing object included).
    fn verify_object(&self, id: u32, fingerprint: &[u8; 32]) -> AnchorResult<bool>;

    /// Define the monotonic counter with an initial value
    ///
    /// Write-once: fails with `CounterAlreadyDefined` if the counter
    /// exists. The persisted form is 8 big-endian bytes.
    fn counter_define(&mut self, initial: u64) -> AnchorResult<()>;

    /// Read the monotonic counter without side effects
    fn counter_read(&self) -> AnchorResult<u64>;

    /// Advance the monotonic counter by exactly one
    ///
    /// The increment is anchor-enforced to be irreversible. Returns the new
    /// value.
    fn counter_increment(&mut self) -> AnchorResult<u64>;
}
