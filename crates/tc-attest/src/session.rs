// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Attestation session management
//!
//! Bounded table of attestation sessions keyed by a caller-chosen 16-byte
//! correlator. Each challenge establishes fresh channel material (nonce,
//! AES-256-GCM key, IV); the response payload is authenticated under that
//! channel with the session IV as associated data.
//!
//! A repeat challenge against an already-active session id overwrites the
//! slot's channel material, invalidating any outstanding challenge for that
//! id. Session ids are not themselves authenticated, so a party that can
//! guess another's id can disrupt its in-flight exchange; the deployed
//! verifier fleet relies on ids drawn from a private space.
//!
//! Exports are served to any active session whether or not it has passed
//! verification; verifiers that require attestation-gated release must
//! check the session outcome themselves.

use heapless::Vec;
use tc_anchor::TrustAnchor;
use tc_common::constants::{
    ATTESTED_REGISTER_COUNT, MAX_EXPORT_SIZE, MAX_SESSIONS, NONCE_SIZE, SESSION_IV_SIZE,
    SESSION_KEY_SIZE, TAG_SIZE,
};
use tc_common::{Error, Result, SessionId};
use tc_crypto::aead::{Aes256Gcm, Aes256Key, AesGcmNonce};
use tc_crypto::{constant_time_eq, Aead};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::eventlog::MeasurementLog;
use crate::wire::{Challenge, ExportMsg, Response};

/// Per-session protocol state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Challenge issued, response outstanding
    Challenged,
    /// Response authenticated and register values validated
    Verified,
    /// Response failed authentication or validation
    Rejected,
}

/// Channel material handed to the transport layer
///
/// A copy of the session's AEAD key and IV, released once per challenge so
/// the transport can program the prover's cipher engine. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionChannel {
    /// AES-256-GCM session key
    pub key: [u8; SESSION_KEY_SIZE],
    /// Session IV; the leading 12 bytes seed the GCM nonce, the full value
    /// is the associated data
    pub iv: [u8; SESSION_IV_SIZE],
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct Session {
    #[zeroize(skip)]
    id: SessionId,
    #[zeroize(skip)]
    nonce: [u8; NONCE_SIZE],
    key: [u8; SESSION_KEY_SIZE],
    iv: [u8; SESSION_IV_SIZE],
    #[zeroize(skip)]
    export_nonce: AesGcmNonce,
    #[zeroize(skip)]
    timestamp: u64,
    #[zeroize(skip)]
    state: SessionState,
    #[zeroize(skip)]
    active: bool,
}

impl Session {
    fn base_nonce(&self) -> AesGcmNonce {
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&self.iv[..12]);
        AesGcmNonce::new(bytes)
    }
}

/// Bounded attestation session table
///
/// Slots are reused, never freed; allocation is a linear scan, bounding
/// worst-case latency by the table size.
pub struct SessionTable {
    slots: [Option<Session>; MAX_SESSIONS],
}

impl SessionTable {
    /// Create an empty table
    #[must_use]
    pub const fn new() -> Self {
        const NONE: Option<Session> = None;
        Self {
            slots: [NONE; MAX_SESSIONS],
        }
    }

    /// Number of active sessions
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.as_ref().is_some_and(|s| s.active))
            .count()
    }

    fn position(&self, id: SessionId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.id == id && s.active))
    }

    /// Issue (or reissue) a challenge for `id`
    ///
    /// Finds the slot already bound to `id` or claims a free one; a table
    /// with no free slot is a resource error. Fresh nonce, key and IV come
    /// from the anchor's random source; prior channel material for a
    /// rechallenged id is discarded.
    pub fn challenge<A: TrustAnchor>(
        &mut self,
        anchor: &mut A,
        id: SessionId,
        now: u64,
    ) -> Result<Challenge> {
        let slot = match self.position(id) {
            Some(pos) => pos,
            None => self
                .slots
                .iter()
                .position(Option::is_none)
                .ok_or(Error::ResourceExhausted)?,
        };

        let mut material = [0u8; NONCE_SIZE + SESSION_KEY_SIZE + SESSION_IV_SIZE];
        anchor
            .fill_random(&mut material)
            .map_err(|_| Error::RngFailure)?;

        let mut nonce = [0u8; NONCE_SIZE];
        let mut key = [0u8; SESSION_KEY_SIZE];
        let mut iv = [0u8; SESSION_IV_SIZE];
        nonce.copy_from_slice(&material[..NONCE_SIZE]);
        key.copy_from_slice(&material[NONCE_SIZE..NONCE_SIZE + SESSION_KEY_SIZE]);
        iv.copy_from_slice(&material[NONCE_SIZE + SESSION_KEY_SIZE..]);
        material.zeroize();

        let mut session = Session {
            id,
            nonce,
            key,
            iv,
            export_nonce: AesGcmNonce::new([0u8; 12]),
            timestamp: now,
            state: SessionState::Challenged,
            active: true,
        };
        session.export_nonce = session.base_nonce();

        // Dropping the previous occupant zeroizes its key material
        self.slots[slot] = Some(session);

        Ok(Challenge {
            nonce,
            timestamp: now,
        })
    }

    /// Copy out the channel material for an active session
    pub fn channel(&self, id: SessionId) -> Result<SessionChannel> {
        let pos = self.position(id).ok_or(Error::NotFound)?;
        let session = self.slots[pos].as_ref().ok_or(Error::InternalError)?;
        Ok(SessionChannel {
            key: session.key,
            iv: session.iv,
        })
    }

    /// Verify an attestation response
    ///
    /// Fails closed: the first mismatch rejects the session and nothing
    /// about the response is trusted afterwards. Checks run in order:
    /// nonce echo, timestamp echo, authenticated decryption of the payload
    /// (session IV as associated data), then an independent recomputation
    /// of every attested register.
    pub fn verify(
        &mut self,
        log: &MeasurementLog,
        attested_registers: &[u32; ATTESTED_REGISTER_COUNT],
        id: SessionId,
        response: &Response,
    ) -> Result<()> {
        let pos = self.position(id).ok_or(Error::NotFound)?;
        let session = self.slots[pos].as_mut().ok_or(Error::InternalError)?;

        if !constant_time_eq(&response.nonce, &session.nonce)
            || response.timestamp != session.timestamp
        {
            session.state = SessionState::Rejected;
            return Err(Error::AuthenticationFailed);
        }

        if response.data.len() > MAX_EXPORT_SIZE {
            session.state = SessionState::Rejected;
            return Err(Error::AuthenticationFailed);
        }

        let mut ciphertext = [0u8; MAX_EXPORT_SIZE + TAG_SIZE];
        let ct_len = response.data.len() + TAG_SIZE;
        ciphertext[..response.data.len()].copy_from_slice(&response.data);
        ciphertext[response.data.len()..ct_len].copy_from_slice(&response.tag);

        let key = Aes256Key::new(session.key);
        let nonce = session.base_nonce();
        let mut plaintext = [0u8; MAX_EXPORT_SIZE];
        if Aes256Gcm::decrypt(
            &key,
            &nonce,
            &ciphertext[..ct_len],
            &session.iv,
            &mut plaintext,
        )
        .is_err()
        {
            session.state = SessionState::Rejected;
            return Err(Error::AuthenticationFailed);
        }

        for (register, claimed) in attested_registers.iter().zip(&response.register_values) {
            if log.validate_register(*register, claimed).is_err() {
                session.state = SessionState::Rejected;
                return Err(Error::ValidationFailed);
            }
        }

        session.state = SessionState::Verified;
        Ok(())
    }

    /// Encrypt caller-supplied data under an active session's channel
    ///
    /// Advances the session's export nonce first, so repeated exports never
    /// reuse a nonce under the session key. Requires only an active
    /// session; prior successful verification is not checked (see module
    /// docs).
    pub fn export(&mut self, id: SessionId, plaintext: &[u8]) -> Result<ExportMsg> {
        if plaintext.is_empty() {
            return Err(Error::InvalidArgument);
        }
        if plaintext.len() > MAX_EXPORT_SIZE {
            return Err(Error::BufferTooSmall);
        }

        let pos = self.position(id).ok_or(Error::NotFound)?;
        let session = self.slots[pos].as_mut().ok_or(Error::InternalError)?;

        session.export_nonce.increment();

        let key = Aes256Key::new(session.key);
        let mut ciphertext = [0u8; MAX_EXPORT_SIZE + TAG_SIZE];
        let ct_len = Aes256Gcm::encrypt(
            &key,
            &session.export_nonce,
            plaintext,
            &session.iv,
            &mut ciphertext,
        )
        .map_err(|_| Error::AeadError)?;

        let data_len = ct_len - TAG_SIZE;
        let mut data = Vec::new();
        // Bounded by MAX_EXPORT_SIZE, checked above
        let _ = data.extend_from_slice(&ciphertext[..data_len]);
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&ciphertext[data_len..ct_len]);

        Ok(ExportMsg { data, tag })
    }

    /// Protocol state of a session, if one is active for `id`
    #[must_use]
    pub fn state(&self, id: SessionId) -> Option<SessionState> {
        let pos = self.position(id)?;
        self.slots[pos].as_ref().map(|s| s.state)
    }

    /// Deactivate every session (engine shutdown)
    pub fn shutdown(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_anchor::SoftAnchor;

    const REGS: [u32; ATTESTED_REGISTER_COUNT] = [0, 1, 2];

    fn session_id(byte: u8) -> SessionId {
        SessionId::new([byte; 16])
    }

    /// Build a response the way a well-behaved prover would
    fn build_response(
        channel: &SessionChannel,
        challenge: &Challenge,
        log: &MeasurementLog,
        payload: &[u8],
    ) -> Response {
        let key = Aes256Key::new(channel.key);
        let nonce = AesGcmNonce::from_slice(&channel.iv[..12]).unwrap();

        let mut ciphertext = [0u8; MAX_EXPORT_SIZE + TAG_SIZE];
        let ct_len =
            Aes256Gcm::encrypt(&key, &nonce, payload, &channel.iv, &mut ciphertext).unwrap();
        let data_len = ct_len - TAG_SIZE;

        let mut data = Vec::new();
        data.extend_from_slice(&ciphertext[..data_len]).unwrap();
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&ciphertext[data_len..ct_len]);

        let mut register_values = [[0u8; 32]; ATTESTED_REGISTER_COUNT];
        for (value, register) in register_values.iter_mut().zip(REGS.iter()) {
            *value = log.accumulated(*register);
        }

        Response {
            nonce: challenge.nonce,
            timestamp: challenge.timestamp,
            register_values,
            data,
            tag,
        }
    }

    fn seeded_log() -> MeasurementLog {
        let mut log = MeasurementLog::new();
        log.extend(0, 1, b"boot stage", 1).unwrap();
        log.extend(1, 2, b"firmware segment", 2).unwrap();
        log.extend(2, 3, b"device config", 3).unwrap();
        log
    }

    #[test]
    fn test_roundtrip_attestation() {
        let mut anchor = SoftAnchor::with_seed(5);
        let mut table = SessionTable::new();
        let log = seeded_log();

        let id = session_id(0xA1);
        let challenge = table.challenge(&mut anchor, id, 777).unwrap();
        let channel = table.channel(id).unwrap();

        let response = build_response(&channel, &challenge, &log, b"quote");
        table.verify(&log, &REGS, id, &response).unwrap();
        assert_eq!(table.state(id), Some(SessionState::Verified));
    }

    #[test]
    fn test_single_bit_mutations_all_fail() {
        let mut anchor = SoftAnchor::with_seed(5);
        let log = seeded_log();

        let cases: [fn(&mut Response); 4] = [
            |r| r.tag[0] ^= 0x01,
            |r| r.nonce[0] ^= 0x01,
            |r| r.timestamp ^= 0x01,
            |r| r.register_values[1][0] ^= 0x01,
        ];

        for (i, mutate) in cases.iter().enumerate() {
            let mut table = SessionTable::new();
            let id = session_id(i as u8 + 1);
            let challenge = table.challenge(&mut anchor, id, 10).unwrap();
            let channel = table.channel(id).unwrap();

            let mut response = build_response(&channel, &challenge, &log, b"quote");
            mutate(&mut response);

            let result = table.verify(&log, &REGS, id, &response);
            assert!(result.is_err(), "mutation case {i} was accepted");
            assert_eq!(table.state(id), Some(SessionState::Rejected));
        }
    }

    #[test]
    fn test_wrong_register_value_fails_closed() {
        let mut anchor = SoftAnchor::with_seed(5);
        let mut table = SessionTable::new();
        let log = seeded_log();

        let id = session_id(0xB2);
        let challenge = table.challenge(&mut anchor, id, 20).unwrap();
        let channel = table.channel(id).unwrap();

        let mut response = build_response(&channel, &challenge, &log, b"quote");
        response.register_values[0] = [0xFF; 32];

        assert_eq!(
            table.verify(&log, &REGS, id, &response),
            Err(Error::ValidationFailed)
        );
    }

    #[test]
    fn test_table_bound_is_enforced() {
        let mut anchor = SoftAnchor::with_seed(5);
        let mut table = SessionTable::new();

        for i in 0..MAX_SESSIONS {
            table
                .challenge(&mut anchor, session_id(i as u8), 0)
                .unwrap();
        }

        assert_eq!(
            table
                .challenge(&mut anchor, session_id(0xFF), 0)
                .unwrap_err(),
            Error::ResourceExhausted
        );

        // An existing id still rechallenges fine
        assert!(table.challenge(&mut anchor, session_id(0), 1).is_ok());
    }

    #[test]
    fn test_repeat_challenge_rekeys() {
        let mut anchor = SoftAnchor::with_seed(5);
        let mut table = SessionTable::new();
        let log = seeded_log();

        let id = session_id(0xC3);
        let first = table.challenge(&mut anchor, id, 30).unwrap();
        let first_channel = table.channel(id).unwrap();

        // Rechallenge: prior channel material is discarded
        let second = table.challenge(&mut anchor, id, 31).unwrap();
        assert_ne!(first.nonce, second.nonce);

        // A response built against the first challenge no longer verifies
        let stale = build_response(&first_channel, &first, &log, b"quote");
        assert!(table.verify(&log, &REGS, id, &stale).is_err());
        assert_eq!(table.active_count(), 1);
    }

    #[test]
    fn test_export_does_not_require_verify() {
        let mut anchor = SoftAnchor::with_seed(5);
        let mut table = SessionTable::new();

        let id = session_id(0xD4);
        table.challenge(&mut anchor, id, 40).unwrap();

        // No verify has happened; export is still served
        let msg = table.export(id, b"diagnostic dump").unwrap();
        assert_eq!(msg.data.len(), b"diagnostic dump".len());
    }

    #[test]
    fn test_export_decrypts_under_counter_nonce() {
        let mut anchor = SoftAnchor::with_seed(5);
        let mut table = SessionTable::new();

        let id = session_id(0xE5);
        table.challenge(&mut anchor, id, 50).unwrap();
        let channel = table.channel(id).unwrap();

        let first = table.export(id, b"page-1").unwrap();
        let second = table.export(id, b"page-2").unwrap();

        // First export uses base nonce + 1, second base + 2
        let key = Aes256Key::new(channel.key);
        let mut nonce = AesGcmNonce::from_slice(&channel.iv[..12]).unwrap();

        for (msg, expected) in [(first, b"page-1"), (second, b"page-2")] {
            nonce.increment();
            let mut ct = [0u8; MAX_EXPORT_SIZE + TAG_SIZE];
            let ct_len = msg.data.len() + TAG_SIZE;
            ct[..msg.data.len()].copy_from_slice(&msg.data);
            ct[msg.data.len()..ct_len].copy_from_slice(&msg.tag);

            let mut pt = [0u8; MAX_EXPORT_SIZE];
            let pt_len =
                Aes256Gcm::decrypt(&key, &nonce, &ct[..ct_len], &channel.iv, &mut pt).unwrap();
            assert_eq!(&pt[..pt_len], &expected[..]);
        }
    }

    #[test]
    fn test_unknown_session_rejected() {
        let mut table = SessionTable::new();
        let log = seeded_log();

        let response = Response {
            nonce: [0; 32],
            timestamp: 0,
            register_values: [[0; 32]; ATTESTED_REGISTER_COUNT],
            data: Vec::new(),
            tag: [0; 16],
        };

        assert_eq!(
            table.verify(&log, &REGS, session_id(9), &response),
            Err(Error::NotFound)
        );
        assert_eq!(
            table.export(session_id(9), b"x").unwrap_err(),
            Error::NotFound
        );
    }

    #[test]
    fn test_export_rejects_empty_and_oversized() {
        let mut anchor = SoftAnchor::with_seed(5);
        let mut table = SessionTable::new();
        let id = session_id(0xF6);
        table.challenge(&mut anchor, id, 60).unwrap();

        assert_eq!(table.export(id, b"").unwrap_err(), Error::InvalidArgument);

        let big = [0u8; MAX_EXPORT_SIZE + 1];
        assert_eq!(table.export(id, &big).unwrap_err(), Error::BufferTooSmall);
    }
}
