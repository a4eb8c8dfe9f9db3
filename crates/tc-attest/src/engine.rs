// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Trust engine facade
//!
//! One `TrustEngine` exists per device. It owns every mutable component -
//! key table, measurement log, session table, policy cache, diagnostic log,
//! and the anchor handle - each behind its own lock. All operations are
//! synchronous; guards are taken at method entry and released on every
//! return path. Critical sections cover in-memory work plus at most one
//! anchor call.
//!
//! Lock order: sessions, then measurement log, then keys, then policy,
//! then anchor, then diagnostic log. `verify` is the only method holding
//! two data-bearing component locks at once (sessions + log); the anchor
//! and diagnostic-log locks are always taken last.
//!
//! Callers only ever receive copies; nothing owned by the engine escapes
//! by reference.

use spin::Mutex;
use tc_anchor::TrustAnchor;
use tc_common::log::{LogBuffer, LogEntry};
use tc_common::time::Ticks;
use tc_common::{EngineConfig, Error, Result, SessionId};
use tc_custody::keystore::{KeyEntry, KeyMeta, KeyRequest, KeyStore};
use tc_custody::rollback;

use crate::eventlog::MeasurementLog;
use crate::policy::{Policy, PolicyEvaluator};
use crate::session::{SessionChannel, SessionState, SessionTable};
use crate::wire::{Challenge, EventExport, EventlogStats, ExportMsg, Response};

/// The firmware trust custody and remote attestation engine
pub struct TrustEngine<A: TrustAnchor> {
    config: EngineConfig,
    anchor: Mutex<A>,
    keys: Mutex<KeyStore>,
    log: Mutex<MeasurementLog>,
    sessions: Mutex<SessionTable>,
    policy: Mutex<PolicyEvaluator>,
    diag: Mutex<LogBuffer>,
}

impl<A: TrustAnchor> TrustEngine<A> {
    /// Construct an engine around an anchor handle
    pub fn new(anchor: A, config: EngineConfig) -> Self {
        let mut diag = LogBuffer::new();
        diag.set_min_level(config.log_level);
        Self {
            config,
            anchor: Mutex::new(anchor),
            keys: Mutex::new(KeyStore::new()),
            log: Mutex::new(MeasurementLog::new()),
            sessions: Mutex::new(SessionTable::new()),
            policy: Mutex::new(PolicyEvaluator::new(config.policy_cache_ttl)),
            diag: Mutex::new(diag),
        }
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Key custody
    // =========================================================================

    /// Add a key entry
    pub fn key_add(&self, req: &KeyRequest<'_>) -> Result<()> {
        let mut keys = self.keys.lock();
        let mut anchor = self.anchor.lock();
        keys.add(&mut *anchor, req)
    }

    /// Remove a key entry
    pub fn key_remove(&self, id: u32) -> Result<()> {
        let mut keys = self.keys.lock();
        let mut anchor = self.anchor.lock();
        keys.remove(&mut *anchor, id)
    }

    /// Revoke a key
    pub fn key_revoke(&self, id: u32, now: u64) -> Result<()> {
        let mut keys = self.keys.lock();
        let mut anchor = self.anchor.lock();
        let mut diag = self.diag.lock();
        keys.revoke(&mut *anchor, &mut diag, id, now)
    }

    /// Get a copy of a key entry
    pub fn key_get(&self, id: u32) -> Result<KeyEntry> {
        self.keys.lock().get(id)
    }

    /// Copy up to `out.len()` key metadata records; returns the count
    pub fn key_list(&self, out: &mut [KeyMeta]) -> usize {
        self.keys.lock().list(out)
    }

    /// Number of keys currently in custody
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.lock().count()
    }

    /// Rotate a key: add the replacement, then revoke the old entry
    pub fn key_rotate(&self, old_id: u32, req: &KeyRequest<'_>, now: u64) -> Result<()> {
        let mut keys = self.keys.lock();
        let mut anchor = self.anchor.lock();
        let mut diag = self.diag.lock();
        keys.rotate(&mut *anchor, &mut diag, old_id, req, now)
    }

    // =========================================================================
    // Rollback protection
    // =========================================================================

    /// Define the rollback counter if absent
    pub fn rollback_init(&self) -> Result<()> {
        rollback::init(&mut *self.anchor.lock())
    }

    /// Read the stored firmware version counter
    pub fn rollback_version(&self) -> Result<u64> {
        rollback::version(&*self.anchor.lock())
    }

    /// Check a candidate firmware version; no state change
    pub fn rollback_verify(&self, candidate: u64) -> Result<()> {
        rollback::verify(&*self.anchor.lock(), candidate)
    }

    /// Advance the counter after an accepted load
    pub fn rollback_increment(&self) -> Result<u64> {
        rollback::increment(&mut *self.anchor.lock())
    }

    // =========================================================================
    // Measurement event log
    // =========================================================================

    /// Ingest newly available events from the anchor
    pub fn log_update(&self, now: u64) -> Result<usize> {
        let mut log = self.log.lock();
        let mut anchor = self.anchor.lock();
        let mut diag = self.diag.lock();
        log.update(&mut *anchor, &mut diag, now)
    }

    /// Record a measurement event and extend the hardware register
    ///
    /// The log entry is unwound if the anchor-side extend fails, so the
    /// log and the hardware register advance together or not at all.
    pub fn log_extend(
        &self,
        register_index: u32,
        event_type: u32,
        payload: &[u8],
        timestamp: u64,
    ) -> Result<()> {
        let mut log = self.log.lock();
        let digest = log.extend(register_index, event_type, payload, timestamp)?;

        if let Err(e) = self.anchor.lock().extend_register(register_index, &digest) {
            log.remove(timestamp);
            return Err(Error::from(e));
        }
        Ok(())
    }

    /// Validate a claimed register value
    pub fn log_validate(&self, register_index: u32, expected: &[u8; 32]) -> Result<()> {
        self.log.lock().validate_register(register_index, expected)
    }

    /// Export a page of events
    #[must_use]
    pub fn log_export(&self, start: usize, count: usize) -> EventExport {
        self.log.lock().export(start, count)
    }

    /// Event log statistics
    #[must_use]
    pub fn log_stats(&self) -> EventlogStats {
        self.log.lock().stats()
    }

    /// Drop every stored measurement event
    pub fn log_reset(&self) {
        self.log.lock().reset();
    }

    // =========================================================================
    // Attestation sessions
    // =========================================================================

    /// Issue (or reissue) a challenge for a session id
    pub fn challenge(&self, id: SessionId, now: u64) -> Result<Challenge> {
        let mut sessions = self.sessions.lock();
        let mut anchor = self.anchor.lock();
        sessions.challenge(&mut *anchor, id, now)
    }

    /// Copy out a session's channel material for transport provisioning
    pub fn session_channel(&self, id: SessionId) -> Result<SessionChannel> {
        self.sessions.lock().channel(id)
    }

    /// Verify an attestation response; fails closed on first mismatch
    pub fn verify(&self, id: SessionId, response: &Response) -> Result<()> {
        let mut sessions = self.sessions.lock();
        let log = self.log.lock();
        sessions.verify(&log, &self.config.attested_registers, id, response)
    }

    /// Encrypt data for release over an established session channel
    pub fn export(&self, id: SessionId, plaintext: &[u8]) -> Result<ExportMsg> {
        self.sessions.lock().export(id, plaintext)
    }

    /// Protocol state of a session, if one is active
    #[must_use]
    pub fn session_state(&self, id: SessionId) -> Option<SessionState> {
        self.sessions.lock().state(id)
    }

    // =========================================================================
    // Policy
    // =========================================================================

    /// Evaluate a policy digest, optionally via the cache slot
    pub fn policy_evaluate(
        &self,
        policy: &Policy,
        use_cache: bool,
        now: Ticks,
    ) -> Result<[u8; 32]> {
        let mut evaluator = self.policy.lock();
        let anchor = self.anchor.lock();
        evaluator.evaluate(&*anchor, policy, use_cache, now)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Copy out up to `N` diagnostic log entries, oldest first
    #[must_use]
    pub fn diagnostics<const N: usize>(&self) -> heapless::Vec<LogEntry, N> {
        let diag = self.diag.lock();
        let mut out = heapless::Vec::new();
        for entry in diag.iter() {
            if out.push(entry.clone()).is_err() {
                break;
            }
        }
        out
    }

    /// Deactivate all sessions and clear transient state
    pub fn shutdown(&self) {
        self.sessions.lock().shutdown();
        self.policy.lock().invalidate();
        self.diag.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_anchor::SoftAnchor;

    fn engine() -> TrustEngine<SoftAnchor> {
        TrustEngine::new(SoftAnchor::with_seed(11), EngineConfig::DEFAULT)
    }

    #[test]
    fn test_extend_advances_log_and_anchor_in_step() {
        let engine = engine();
        engine.log_extend(0, 1, b"boot stage", 1).unwrap();
        engine.log_extend(0, 1, b"kernel image", 2).unwrap();

        // The log's recomputed value matches the anchor's register
        let folded = {
            let log = engine.log.lock();
            log.accumulated(0)
        };
        let hardware = engine.anchor.lock().read_register(0).unwrap();
        assert_eq!(folded, hardware);
    }

    #[test]
    fn test_policy_sees_extended_registers() {
        let engine = engine();
        let policy = Policy { register_mask: 0b0001 };

        let before = engine
            .policy_evaluate(&policy, false, Ticks::new(0))
            .unwrap();
        engine.log_extend(0, 1, b"measurement", 1).unwrap();
        let after = engine
            .policy_evaluate(&policy, false, Ticks::new(1))
            .unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_shutdown_clears_sessions() {
        let engine = engine();
        let id = SessionId::new([1; 16]);
        engine.challenge(id, 0).unwrap();
        assert!(engine.session_state(id).is_some());

        engine.shutdown();
        assert!(engine.session_state(id).is_none());
    }
}
