// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Integration tests for tc-common
//!
//! Exercises the error taxonomy, session id type, key version ordering and
//! the circular log buffer on the host platform.

mod error_tests {
    use tc_common::Error;

    #[test]
    fn test_error_display_includes_code() {
        let rendered = format!("{}", Error::RollbackDetected);
        assert!(rendered.contains("0x0501"));
        assert!(rendered.contains("rollback"));
    }

    #[test]
    fn test_transient_vs_permanent() {
        // "try again" kinds
        for e in [Error::ResourceExhausted, Error::AnchorFailure] {
            assert!(e.is_retryable(), "{e:?} should be retryable");
        }
        // "reject permanently" kinds
        for e in [
            Error::AuthenticationFailed,
            Error::ValidationFailed,
            Error::RollbackDetected,
        ] {
            assert!(!e.is_retryable(), "{e:?} should not be retryable");
            assert!(e.is_security_error(), "{e:?} should be security-relevant");
        }
    }
}

mod types_tests {
    use tc_common::SessionId;

    #[test]
    fn test_session_id_equality() {
        let a = SessionId::new([7u8; 16]);
        let b = SessionId::from_slice(&[7u8; 16]).unwrap();
        assert_eq!(a, b);
    }
}

mod version_tests {
    use tc_common::KeyVersion;

    #[test]
    fn test_rotation_produces_newer_version() {
        let v = KeyVersion::new(2, 1, 41);
        let next = v.next_revision();
        assert!(next.is_newer_than(&v));
        assert_eq!(next.revision, 42);
    }
}

mod log_tests {
    use tc_common::log::{LogBuffer, LogLevel};

    #[test]
    fn test_buffer_records_failopen_path() {
        let mut buf = LogBuffer::new();
        buf.log(
            LogLevel::Warn,
            1000,
            "custody",
            format_args!("anchor verify failed for key {}, revocation kept", 9),
        );

        let entry = buf.iter().next().unwrap();
        assert_eq!(entry.level, LogLevel::Warn);
        assert!(entry.message.contains("revocation kept"));
    }
}
