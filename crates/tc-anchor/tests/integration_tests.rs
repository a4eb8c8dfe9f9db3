// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Integration tests for tc-anchor
//!
//! Exercises the simulator through the `TrustAnchor` trait the way the
//! engine does, plus the event-record batch format.

use tc_anchor::{EventRecord, SoftAnchor, TrustAnchor};

mod register_tests {
    use super::*;

    #[test]
    fn test_registers_start_at_zero() {
        let anchor = SoftAnchor::with_seed(1);
        for index in 0..(SoftAnchor::NUM_REGISTERS as u32) {
            assert_eq!(anchor.read_register(index).unwrap(), [0u8; 32]);
        }
    }

    #[test]
    fn test_extend_is_irreversible() {
        let mut anchor = SoftAnchor::with_seed(1);
        anchor.extend_register(0, &[0x01; 32]).unwrap();
        let after_one = anchor.read_register(0).unwrap();

        anchor.extend_register(0, &[0x02; 32]).unwrap();
        assert_ne!(anchor.read_register(0).unwrap(), after_one);
        assert_ne!(anchor.read_register(0).unwrap(), [0u8; 32]);
    }
}

mod batch_tests {
    use super::*;

    #[test]
    fn test_multiple_records_drain_in_order() {
        let mut anchor = SoftAnchor::with_seed(1);
        for t in 1..=3u64 {
            anchor
                .push_event(&EventRecord {
                    register_index: 0,
                    event_type: 4,
                    timestamp: t,
                    digest: [t as u8; 32],
                    payload: b"entry",
                })
                .unwrap();
        }

        let mut buf = [0u8; 1024];
        let len = anchor.drain_events(&mut buf).unwrap();

        let mut offset = 0;
        let mut expected = 1u64;
        while offset < len {
            let (record, consumed) = EventRecord::parse(&buf[offset..len]).unwrap();
            assert_eq!(record.timestamp, expected);
            expected += 1;
            offset += consumed;
        }
        assert_eq!(expected, 4);
    }

    #[test]
    fn test_small_buffer_truncates_tail_record() {
        let mut anchor = SoftAnchor::with_seed(1);
        anchor
            .push_event(&EventRecord {
                register_index: 0,
                event_type: 1,
                timestamp: 1,
                digest: [0xAA; 32],
                payload: b"0123456789",
            })
            .unwrap();

        // Drain into a buffer smaller than the record
        let mut buf = [0u8; 40];
        let len = anchor.drain_events(&mut buf).unwrap();
        assert_eq!(len, 40);

        // The truncated head parses as malformed
        assert!(EventRecord::parse(&buf[..len]).is_err());
    }
}

mod counter_tests {
    use super::*;

    #[test]
    fn test_counter_survives_other_operations() {
        let mut anchor = SoftAnchor::with_seed(1);
        anchor.counter_define(3).unwrap();
        anchor.store_object(1, b"obj").unwrap();
        anchor.extend_register(0, &[1; 32]).unwrap();

        assert_eq!(anchor.counter_read().unwrap(), 3);
        assert_eq!(anchor.counter_increment().unwrap(), 4);
    }
}
