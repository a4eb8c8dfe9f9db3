// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Measurement-event record format
//!
//! Events cross the anchor boundary as a fixed 52-byte header followed by a
//! variable payload:
//!
//! ```text
//! Offset  Size  Field
//! 0       4     register_index (LE)
//! 4       4     event_type (LE)
//! 8       8     timestamp (LE)
//! 16      4     payload_len (LE)
//! 20      32    digest
//! 52      N     payload (N = payload_len)
//! ```
//!
//! Several records may be concatenated in one drain batch.

use tc_common::constants::{DIGEST_SIZE, MAX_EVENT_PAYLOAD_SIZE};
use tc_common::{Error, Result};

/// Size of the fixed record header in bytes
pub const RECORD_HEADER_SIZE: usize = 20 + DIGEST_SIZE;

/// A measurement-event record borrowed from a drain batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord<'a> {
    /// Measurement register the event extends
    pub register_index: u32,
    /// Event type discriminator (device-specific)
    pub event_type: u32,
    /// Event timestamp; unique key within the log
    pub timestamp: u64,
    /// Digest folded into the register
    pub digest: [u8; 32],
    /// Raw event payload
    pub payload: &'a [u8],
}

impl<'a> EventRecord<'a> {
    /// Parse one record from the front of `data`
    ///
    /// Returns the record and the number of bytes it occupied.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedRecord` for a truncated header, a payload
    /// length beyond the event-payload bound, or a truncated payload.
    pub fn parse(data: &'a [u8]) -> Result<(Self, usize)> {
        if data.len() < RECORD_HEADER_SIZE {
            return Err(Error::MalformedRecord);
        }

        let register_index = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let event_type = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        let timestamp = u64::from_le_bytes([
            data[8], data[9], data[10], data[11], data[12], data[13], data[14], data[15],
        ]);
        let payload_len = u32::from_le_bytes([data[16], data[17], data[18], data[19]]) as usize;

        if payload_len > MAX_EVENT_PAYLOAD_SIZE {
            return Err(Error::MalformedRecord);
        }

        let total = RECORD_HEADER_SIZE + payload_len;
        if data.len() < total {
            return Err(Error::MalformedRecord);
        }

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&data[20..52]);

        Ok((
            Self {
                register_index,
                event_type,
                timestamp,
                digest,
                payload: &data[RECORD_HEADER_SIZE..total],
            },
            total,
        ))
    }

    /// Encoded size of this record
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        RECORD_HEADER_SIZE + self.payload.len()
    }

    /// Encode this record into `out`
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferTooSmall` if `out` cannot hold the record.
    pub fn encode_into(&self, out: &mut [u8]) -> Result<usize> {
        let total = self.encoded_len();
        if out.len() < total {
            return Err(Error::BufferTooSmall);
        }

        out[0..4].copy_from_slice(&self.register_index.to_le_bytes());
        out[4..8].copy_from_slice(&self.event_type.to_le_bytes());
        out[8..16].copy_from_slice(&self.timestamp.to_le_bytes());
        out[16..20].copy_from_slice(&(self.payload.len() as u32).to_le_bytes());
        out[20..52].copy_from_slice(&self.digest);
        out[RECORD_HEADER_SIZE..total].copy_from_slice(self.payload);

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrip() {
        let record = EventRecord {
            register_index: 8,
            event_type: 2,
            timestamp: 0x0102_0304_0506_0708,
            digest: [0xAB; 32],
            payload: b"fw-segment",
        };

        let mut buf = [0u8; 128];
        let written = record.encode_into(&mut buf).unwrap();
        assert_eq!(written, RECORD_HEADER_SIZE + 10);

        let (parsed, consumed) = EventRecord::parse(&buf[..written]).unwrap();
        assert_eq!(consumed, written);
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_truncated_header_rejected() {
        let buf = [0u8; RECORD_HEADER_SIZE - 1];
        assert_eq!(EventRecord::parse(&buf), Err(Error::MalformedRecord));
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let record = EventRecord {
            register_index: 0,
            event_type: 0,
            timestamp: 1,
            digest: [0; 32],
            payload: &[0x55; 16],
        };
        let mut buf = [0u8; 128];
        let written = record.encode_into(&mut buf).unwrap();

        // Drop the last payload byte
        assert_eq!(
            EventRecord::parse(&buf[..written - 1]),
            Err(Error::MalformedRecord)
        );
    }

    #[test]
    fn test_oversized_payload_len_rejected() {
        let mut buf = [0u8; RECORD_HEADER_SIZE];
        buf[16..20].copy_from_slice(&(u32::MAX).to_le_bytes());
        assert_eq!(EventRecord::parse(&buf), Err(Error::MalformedRecord));
    }
}
