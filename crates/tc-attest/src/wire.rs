// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Attestation protocol wire format
//!
//! Message shapes are fixed by the deployed verifier fleet and must not
//! change between firmware revisions. All integers are little-endian.

use heapless::Vec;
use tc_common::constants::{
    ATTESTED_REGISTER_COUNT, EXPORT_PAYLOAD_CAP, MAX_EXPORT_SIZE, NONCE_SIZE, TAG_SIZE,
};
use tc_common::{Error, Result};

/// Events per export page
pub const MAX_EXPORT_PAGE: usize = 8;

/// Serialized size of the fixed response prefix in bytes
pub const RESPONSE_FIXED_SIZE: usize = NONCE_SIZE + 8 + ATTESTED_REGISTER_COUNT * 32 + 4 + TAG_SIZE;

/// Maximum serialized response size in bytes
pub const RESPONSE_MAX_SIZE: usize = RESPONSE_FIXED_SIZE + MAX_EXPORT_SIZE;

/// Challenge issued to a prover
///
/// ```text
/// Offset  Size  Field
/// 0       32    nonce
/// 32      8     timestamp (LE)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    /// Fresh random nonce the prover must echo
    pub nonce: [u8; NONCE_SIZE],
    /// Challenge timestamp the prover must echo
    pub timestamp: u64,
}

impl Challenge {
    /// Serialized size in bytes
    pub const SIZE: usize = NONCE_SIZE + 8;

    /// Serialize to bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..NONCE_SIZE].copy_from_slice(&self.nonce);
        bytes[NONCE_SIZE..].copy_from_slice(&self.timestamp.to_le_bytes());
        bytes
    }

    /// Parse from bytes
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferTooSmall` if `data` is shorter than
    /// [`Challenge::SIZE`].
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::BufferTooSmall);
        }
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&data[..NONCE_SIZE]);
        let timestamp = u64::from_le_bytes([
            data[32], data[33], data[34], data[35], data[36], data[37], data[38], data[39],
        ]);
        Ok(Self { nonce, timestamp })
    }
}

/// Attestation response from a prover
///
/// ```text
/// Offset  Size  Field
/// 0       32    nonce (echo)
/// 32      8     timestamp (echo, LE)
/// 40      96    register_values (3 x 32 bytes)
/// 136     4     data_len (LE)
/// 140     16    tag
/// 156     N     data (N = data_len)
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    /// Echo of the challenge nonce
    pub nonce: [u8; NONCE_SIZE],
    /// Echo of the challenge timestamp
    pub timestamp: u64,
    /// Claimed values of the attested registers
    pub register_values: [[u8; 32]; ATTESTED_REGISTER_COUNT],
    /// Encrypted payload
    pub data: Vec<u8, MAX_EXPORT_SIZE>,
    /// AEAD authentication tag over the payload
    pub tag: [u8; TAG_SIZE],
}

impl Response {
    /// Serialized size of the fixed prefix in bytes
    pub const FIXED_SIZE: usize = RESPONSE_FIXED_SIZE;

    /// Serialize to bytes
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8, RESPONSE_MAX_SIZE> {
        let mut bytes = Vec::new();
        let _ = bytes.extend_from_slice(&self.nonce);
        let _ = bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        for value in &self.register_values {
            let _ = bytes.extend_from_slice(value);
        }
        let _ = bytes.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        let _ = bytes.extend_from_slice(&self.tag);
        let _ = bytes.extend_from_slice(&self.data);
        bytes
    }

    /// Parse from bytes
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferTooSmall` for a short buffer and
    /// `Error::MalformedRecord` for an out-of-bounds payload length.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::FIXED_SIZE {
            return Err(Error::BufferTooSmall);
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&data[..32]);
        let timestamp = u64::from_le_bytes([
            data[32], data[33], data[34], data[35], data[36], data[37], data[38], data[39],
        ]);

        let mut register_values = [[0u8; 32]; ATTESTED_REGISTER_COUNT];
        for (i, value) in register_values.iter_mut().enumerate() {
            let start = 40 + i * 32;
            value.copy_from_slice(&data[start..start + 32]);
        }

        let data_len =
            u32::from_le_bytes([data[136], data[137], data[138], data[139]]) as usize;
        if data_len > MAX_EXPORT_SIZE {
            return Err(Error::MalformedRecord);
        }

        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&data[140..156]);

        if data.len() < Self::FIXED_SIZE + data_len {
            return Err(Error::MalformedRecord);
        }

        let mut payload = Vec::new();
        let _ = payload.extend_from_slice(&data[Self::FIXED_SIZE..Self::FIXED_SIZE + data_len]);

        Ok(Self {
            nonce,
            timestamp,
            register_values,
            data: payload,
            tag,
        })
    }
}

/// Encrypted data released over an established session channel
#[derive(Debug, Clone)]
pub struct ExportMsg {
    /// Ciphertext (same length as the submitted plaintext)
    pub data: Vec<u8, MAX_EXPORT_SIZE>,
    /// AEAD authentication tag
    pub tag: [u8; TAG_SIZE],
}

/// One exported measurement event
///
/// Payloads above [`EXPORT_PAYLOAD_CAP`] are omitted with `data_len`
/// reported as zero.
#[derive(Debug, Clone)]
pub struct EventEntryExport {
    /// Measurement register the event extended
    pub register_index: u32,
    /// Event type discriminator
    pub event_type: u32,
    /// Digest folded into the register
    pub digest: [u8; 32],
    /// Event timestamp
    pub timestamp: u64,
    /// Payload length, zero when the payload was omitted
    pub data_len: u32,
    /// Event payload
    pub data: Vec<u8, EXPORT_PAYLOAD_CAP>,
}

/// A page of exported measurement events
#[derive(Debug, Clone, Default)]
pub struct EventExport {
    /// Exported events, in log order
    pub events: Vec<EventEntryExport, MAX_EXPORT_PAGE>,
}

impl EventExport {
    /// Number of events in the page
    #[must_use]
    pub fn count(&self) -> usize {
        self.events.len()
    }
}

/// Event log statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventlogStats {
    /// Number of stored events
    pub event_count: u32,
    /// Timestamp of the last ingest
    pub last_update: u64,
}
