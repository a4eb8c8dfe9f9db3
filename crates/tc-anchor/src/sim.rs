// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Software trust anchor simulator
//!
//! `SoftAnchor` implements the full [`TrustAnchor`] capability in memory:
//! fold-extended measurement registers, slot-keyed object storage, a
//! define-once monotonic counter and a DRBG-backed random source. It exists
//! for policy simulation and for test environments without a secure
//! element; it provides no tamper resistance and must never ship as the
//! production anchor.

use heapless::Vec;
use tc_common::constants::{COUNTER_SIZE, MAX_KEY_MATERIAL_SIZE, NUM_REGISTERS};
use tc_crypto::hash::{fold_digest, Sha3_256};
use tc_crypto::rng::HashDrbg;
use tc_crypto::{constant_time_eq, Hash};

use crate::error::{AnchorError, AnchorResult};
use crate::record::EventRecord;
use crate::traits::TrustAnchor;

/// Number of protected storage slots
pub const NUM_OBJECT_SLOTS: usize = 32;

/// Capacity of the pending event queue in bytes
pub const EVENT_QUEUE_SIZE: usize = 8192;

struct StoredObject {
    id: u32,
    data: Vec<u8, MAX_KEY_MATERIAL_SIZE>,
}

/// In-memory trust anchor
pub struct SoftAnchor {
    registers: [[u8; 32]; NUM_REGISTERS],
    objects: Vec<StoredObject, NUM_OBJECT_SLOTS>,
    counter: Option<[u8; COUNTER_SIZE]>,
    drbg: HashDrbg,
    pending: Vec<u8, EVENT_QUEUE_SIZE>,
    fail_next_store: bool,
    fail_next_verify: bool,
}

impl SoftAnchor {
    /// Create a simulator seeded from a fixed value
    ///
    /// Deterministic seeding keeps host test runs reproducible.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut entropy = [0u8; 48];
        entropy[..8].copy_from_slice(&seed.to_le_bytes());
        entropy[8..24].copy_from_slice(b"tc-anchor-sim-v1");
        Self {
            registers: [[0u8; 32]; NUM_REGISTERS],
            objects: Vec::new(),
            counter: None,
            drbg: HashDrbg::new(&entropy),
            pending: Vec::new(),
            fail_next_store: false,
            fail_next_verify: false,
        }
    }

    /// Queue a measurement-event record for the next drain
    ///
    /// # Errors
    ///
    /// Returns `StorageFull` if the pending queue cannot hold the record.
    pub fn push_event(&mut self, record: &EventRecord<'_>) -> AnchorResult<()> {
        let mut buf = [0u8; 2048];
        let len = record
            .encode_into(&mut buf)
            .map_err(|_| AnchorError::StorageFull)?;
        self.pending
            .extend_from_slice(&buf[..len])
            .map_err(|()| AnchorError::StorageFull)
    }

    /// Queue raw bytes as if they were drained from the anchor
    ///
    /// Lets tests exercise the malformed-record handling of the event log.
    pub fn push_raw_event_bytes(&mut self, bytes: &[u8]) -> AnchorResult<()> {
        self.pending
            .extend_from_slice(bytes)
            .map_err(|()| AnchorError::StorageFull)
    }

    /// Make the next `store_object` call fail
    pub fn fail_next_store(&mut self) {
        self.fail_next_store = true;
    }

    /// Make the next `verify_object` call fail
    pub fn fail_next_verify(&mut self) {
        self.fail_next_verify = true;
    }

    /// Number of objects currently stored
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn find_object(&self, id: u32) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }
}

impl TrustAnchor for SoftAnchor {
    const MAX_OBJECT_SIZE: usize = MAX_KEY_MATERIAL_SIZE;
    const NUM_REGISTERS: usize = NUM_REGISTERS;

    fn fill_random(&mut self, dest: &mut [u8]) -> AnchorResult<()> {
        self.drbg
            .generate(dest)
            .map_err(|_| AnchorError::RandomUnavailable)
    }

    fn read_register(&self, index: u32) -> AnchorResult<[u8; 32]> {
        self.registers
            .get(index as usize)
            .copied()
            .ok_or(AnchorError::BadRegisterIndex)
    }

    fn extend_register(&mut self, index: u32, digest: &[u8; 32]) -> AnchorResult<()> {
        let register = self
            .registers
            .get_mut(index as usize)
            .ok_or(AnchorError::BadRegisterIndex)?;
        *register = fold_digest(register, digest);
        Ok(())
    }

    fn drain_events(&mut self, buf: &mut [u8]) -> AnchorResult<usize> {
        let take = self.pending.len().min(buf.len());
        buf[..take].copy_from_slice(&self.pending[..take]);

        // Shift the remainder to the front of the queue
        let remaining = self.pending.len() - take;
        for i in 0..remaining {
            self.pending[i] = self.pending[take + i];
        }
        self.pending.truncate(remaining);

        Ok(take)
    }

    fn store_object(&mut self, id: u32, data: &[u8]) -> AnchorResult<()> {
        if self.fail_next_store {
            self.fail_next_store = false;
            return Err(AnchorError::Failure);
        }
        if data.len() > Self::MAX_OBJECT_SIZE {
            return Err(AnchorError::StorageFull);
        }

        let mut copy = Vec::new();
        copy.extend_from_slice(data)
            .map_err(|()| AnchorError::StorageFull)?;

        if let Some(pos) = self.find_object(id) {
            self.objects[pos].data = copy;
            return Ok(());
        }

        self.objects
            .push(StoredObject { id, data: copy })
            .map_err(|_| AnchorError::StorageFull)
    }

    fn delete_object(&mut self, id: u32) -> AnchorResult<()> {
        let pos = self.find_object(id).ok_or(AnchorError::ObjectNotFound)?;
        self.objects.swap_remove(pos);
        Ok(())
    }

    fn verify_object(&self, id: u32, fingerprint: &[u8; 32]) -> AnchorResult<bool> {
        if self.fail_next_verify {
            return Err(AnchorError::Failure);
        }
        let pos = self.find_object(id).ok_or(AnchorError::ObjectNotFound)?;
        let digest = Sha3_256::hash(&self.objects[pos].data);
        Ok(constant_time_eq(digest.as_ref(), fingerprint))
    }

    fn counter_define(&mut self, initial: u64) -> AnchorResult<()> {
        if self.counter.is_some() {
            return Err(AnchorError::CounterAlreadyDefined);
        }
        self.counter = Some(initial.to_be_bytes());
        Ok(())
    }

    fn counter_read(&self) -> AnchorResult<u64> {
        self.counter
            .map(u64::from_be_bytes)
            .ok_or(AnchorError::CounterNotDefined)
    }

    fn counter_increment(&mut self) -> AnchorResult<u64> {
        let bytes = self.counter.ok_or(AnchorError::CounterNotDefined)?;
        let next = u64::from_be_bytes(bytes)
            .checked_add(1)
            .ok_or(AnchorError::CounterExhausted)?;
        self.counter = Some(next.to_be_bytes());
        Ok(next)
    }
}
