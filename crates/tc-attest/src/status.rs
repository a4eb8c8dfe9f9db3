// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Read-only diagnostic surface
//!
//! Informational queries for host tooling: event log status and a liveness
//! probe for the attestation service. Nothing here is part of the security
//! boundary.

use tc_anchor::TrustAnchor;
use tc_common::SessionId;

use crate::engine::TrustEngine;
use crate::wire::EventlogStats;

/// Session id reserved for the liveness probe
///
/// The probe reuses one table slot; repeated probes rekey it rather than
/// consuming further slots.
pub const DIAG_SESSION_ID: SessionId = SessionId::new([
    0xD7, 0x1A, 0x60, 0x05, 0xD7, 0x1A, 0x60, 0x05, 0xD7, 0x1A, 0x60, 0x05, 0xD7, 0x1A, 0x60,
    0x05,
]);

/// Snapshot of engine health
#[derive(Debug, Clone, Copy)]
pub struct ServiceStatus {
    /// The attestation service answered a throwaway challenge
    pub attestation_alive: bool,
    /// Event log statistics
    pub eventlog: EventlogStats,
    /// Keys currently in custody
    pub key_count: u32,
}

impl<A: TrustAnchor> TrustEngine<A> {
    /// Probe engine health
    ///
    /// Issues a throwaway challenge against the reserved diagnostic session
    /// id to confirm the attestation service is answering, and snapshots
    /// the event log counters.
    pub fn service_status(&self, now: u64) -> ServiceStatus {
        let attestation_alive = self.challenge(DIAG_SESSION_ID, now).is_ok();

        ServiceStatus {
            attestation_alive,
            eventlog: self.log_stats(),
            key_count: self.key_count() as u32,
        }
    }
}
