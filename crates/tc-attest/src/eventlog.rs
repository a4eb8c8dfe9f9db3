// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Measurement event log
//!
//! Ordered, hash-chained log of measurement events, keyed by timestamp.
//! Register values are never stored; they are recomputed on demand by
//! folding the stored event digests in ascending timestamp order:
//!
//! ```text
//! acc_0 = 0^32
//! acc_i = SHA3-256(acc_{i-1} || digest_i)
//! ```
//!
//! Validation therefore only agrees with the prover when both sides saw the
//! same events in the same order - the property remote attestation rests
//! on.
//!
//! Timestamps are unique keys: two events with colliding timestamps cannot
//! both be stored. Colliding records are rejected at ingest, a known
//! limitation of the record format.

use heapless::Vec;
use tc_anchor::{EventRecord, TrustAnchor};
use tc_common::constants::{EXPORT_PAYLOAD_CAP, MAX_EVENTS, MAX_EVENT_PAYLOAD_SIZE};
use tc_common::log::{LogBuffer, LogLevel};
use tc_common::{Error, Result};
use tc_crypto::hash::{fold_digest, Sha3_256};
use tc_crypto::{constant_time_eq, Hash};

use crate::wire::{EventEntryExport, EventExport, EventlogStats, MAX_EXPORT_PAGE};

/// Size of the drain buffer used per update batch
const DRAIN_BUFFER_SIZE: usize = 4096;

/// A stored measurement event
#[derive(Debug, Clone)]
pub struct MeasurementEvent {
    /// Measurement register the event extends
    pub register_index: u32,
    /// Event type discriminator
    pub event_type: u32,
    /// Digest folded into the register
    pub digest: [u8; 32],
    /// Event timestamp; unique key within the log
    pub timestamp: u64,
    payload: Vec<u8, MAX_EVENT_PAYLOAD_SIZE>,
}

impl MeasurementEvent {
    /// Event payload bytes
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Ordered measurement event store
pub struct MeasurementLog {
    events: Vec<MeasurementEvent, MAX_EVENTS>,
    last_update: u64,
}

impl MeasurementLog {
    /// Create an empty log
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            last_update: 0,
        }
    }

    /// Number of stored events
    #[must_use]
    pub fn count(&self) -> usize {
        self.events.len()
    }

    /// Insert one event, keeping the store ordered by timestamp
    fn insert(&mut self, event: MeasurementEvent) -> Result<()> {
        if self.events.len() == self.events.capacity() {
            return Err(Error::EventlogFull);
        }

        let pos = match self
            .events
            .binary_search_by_key(&event.timestamp, |e| e.timestamp)
        {
            Ok(_) => return Err(Error::TimestampCollision),
            Err(pos) => pos,
        };

        self.events
            .insert(pos, event)
            .map_err(|_| Error::EventlogFull)
    }

    /// Ingest newly available events from the trust anchor
    ///
    /// Drains one batch of encoded records and stores them. A malformed or
    /// truncated record aborts the remaining batch; everything ingested up
    /// to the fault is retained and the fault is logged. A timestamp
    /// collision rejects only the colliding record. Returns the number of
    /// events ingested.
    pub fn update<A: TrustAnchor>(
        &mut self,
        anchor: &mut A,
        log: &mut LogBuffer,
        now: u64,
    ) -> Result<usize> {
        let mut buf = [0u8; DRAIN_BUFFER_SIZE];
        let len = anchor
            .drain_events(&mut buf)
            .map_err(|_| Error::AnchorFailure)?;

        let mut ingested = 0;
        let mut offset = 0;
        while offset < len {
            let (record, consumed) = match EventRecord::parse(&buf[offset..len]) {
                Ok(parsed) => parsed,
                Err(_) => {
                    log.log(
                        LogLevel::Warn,
                        now,
                        "eventlog",
                        format_args!("malformed record at offset {offset}, batch aborted"),
                    );
                    break;
                }
            };
            offset += consumed;

            let mut payload = Vec::new();
            // EventRecord::parse bounds the payload to MAX_EVENT_PAYLOAD_SIZE
            let _ = payload.extend_from_slice(record.payload);

            let event = MeasurementEvent {
                register_index: record.register_index,
                event_type: record.event_type,
                digest: record.digest,
                timestamp: record.timestamp,
                payload,
            };

            match self.insert(event) {
                Ok(()) => ingested += 1,
                Err(Error::TimestampCollision) => {
                    log.log(
                        LogLevel::Warn,
                        now,
                        "eventlog",
                        format_args!("timestamp collision at {}, record dropped", record.timestamp),
                    );
                }
                Err(e) => {
                    self.last_update = now;
                    return Err(e);
                }
            }
        }

        self.last_update = now;
        Ok(ingested)
    }

    /// Record an event directly and return its digest
    ///
    /// The digest is `SHA3-256(payload)`; the caller forwards it to the
    /// anchor when the hardware register must advance as well.
    pub fn extend(
        &mut self,
        register_index: u32,
        event_type: u32,
        payload: &[u8],
        timestamp: u64,
    ) -> Result<[u8; 32]> {
        if payload.is_empty() {
            return Err(Error::InvalidArgument);
        }
        if payload.len() > MAX_EVENT_PAYLOAD_SIZE {
            return Err(Error::BufferTooSmall);
        }

        let digest = Sha3_256::hash(payload).into_bytes();

        let mut stored = Vec::new();
        // Length checked above
        let _ = stored.extend_from_slice(payload);

        self.insert(MeasurementEvent {
            register_index,
            event_type,
            digest,
            timestamp,
            payload: stored,
        })?;

        Ok(digest)
    }

    /// Recompute the accumulated value of a register
    ///
    /// Folds every stored event for `register_index` in ascending timestamp
    /// order, starting from the all-zero accumulator. The store is kept
    /// sorted, so one pass suffices.
    #[must_use]
    pub fn accumulated(&self, register_index: u32) -> [u8; 32] {
        let mut acc = [0u8; 32];
        for event in self
            .events
            .iter()
            .filter(|e| e.register_index == register_index)
        {
            acc = fold_digest(&acc, &event.digest);
        }
        acc
    }

    /// Validate a claimed register value against the recomputed one
    ///
    /// # Errors
    ///
    /// Returns `Error::ValidationFailed` on any byte difference.
    pub fn validate_register(&self, register_index: u32, expected: &[u8; 32]) -> Result<()> {
        let computed = self.accumulated(register_index);
        if !constant_time_eq(&computed, expected) {
            return Err(Error::ValidationFailed);
        }
        Ok(())
    }

    /// Export a page of events
    ///
    /// Skips `start` entries in log order, then copies up to `count`
    /// (bounded by the page size). Payloads above the export cap are
    /// omitted with their length reported as zero.
    #[must_use]
    pub fn export(&self, start: usize, count: usize) -> EventExport {
        let mut page = EventExport::default();

        for event in self
            .events
            .iter()
            .skip(start)
            .take(count.min(MAX_EXPORT_PAGE))
        {
            let mut data = Vec::new();
            let data_len = if event.payload.len() <= EXPORT_PAYLOAD_CAP {
                let _ = data.extend_from_slice(&event.payload);
                event.payload.len() as u32
            } else {
                0
            };

            let _ = page.events.push(EventEntryExport {
                register_index: event.register_index,
                event_type: event.event_type,
                digest: event.digest,
                timestamp: event.timestamp,
                data_len,
                data,
            });
        }

        page
    }

    /// Event log statistics
    #[must_use]
    pub fn stats(&self) -> EventlogStats {
        EventlogStats {
            event_count: self.events.len() as u32,
            last_update: self.last_update,
        }
    }

    /// Drop every stored event
    pub fn reset(&mut self) {
        self.events.clear();
        self.last_update = 0;
    }

    /// Remove the event stored under `timestamp`, if any
    ///
    /// Unwind hook for a failed extend; stored events are otherwise
    /// immutable.
    pub(crate) fn remove(&mut self, timestamp: u64) -> bool {
        match self
            .events
            .binary_search_by_key(&timestamp, |e| e.timestamp)
        {
            Ok(pos) => {
                self.events.remove(pos);
                true
            }
            Err(_) => false,
        }
    }
}

impl Default for MeasurementLog {
    fn default() -> Self {
        Self::new()
    }
}
